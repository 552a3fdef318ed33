//! Execution of the command a critter chose.
//!
//! Every action is paid for before it happens. A critter whose energy
//! drops to 0 or below dies on the spot and the action does not take place.

use rand::Rng;

use crate::interpret::Command;
use crate::interpret::memory::{MAX_MARK, SIZE, TAG};
use crate::world::reproduction::{crossover, mutate_newborn};
use crate::world::{Content, Coord, CritterSpec, Direction, World, damage};

impl World {
    /// Carry out `command` for the critter in `slot`.
    pub(super) fn execute(&mut self, slot: usize, command: Command) {
        let Some(critter) = self.critters[slot].as_mut() else {
            return;
        };
        if command != Command::Mate {
            critter.ready_to_mate = false;
        }
        match command {
            Command::Wait => self.rest(slot),
            Command::Forward => self.walk(slot, false),
            Command::Backward => self.walk(slot, true),
            Command::Left => self.turn(slot, Direction::left),
            Command::Right => self.turn(slot, Direction::right),
            Command::Eat => self.eat(slot),
            Command::Attack => self.attack(slot),
            Command::Grow => self.grow(slot),
            Command::Bud => self.bud(slot),
            Command::Mate => self.mate(slot),
            Command::Tag(value) => self.tag(slot, value),
            Command::Serve(amount) => self.serve(slot, amount),
        }
    }

    /// Deduct `cost` from the critter in `slot`, killing it if that empties
    /// its store. Returns whether it survived.
    fn charge(&mut self, slot: usize, cost: i32) -> bool {
        let Some(critter) = self.critters[slot].as_mut() else {
            return false;
        };
        critter.add_energy(cost.saturating_neg());
        if critter.energy() > 0 {
            return true;
        }
        self.kill(slot);
        false
    }

    /// Stamp the hex of the critter in `slot` after its looks changed.
    pub(super) fn restamp(&mut self, slot: usize) {
        if let Some(critter) = self.critters[slot].as_ref() {
            self.grid.touch(critter.position, self.version);
        }
    }

    /// Size of the critter in `slot`, or 0 if it is gone.
    fn size_of(&self, slot: usize) -> i32 {
        self.critters[slot].as_ref().map_or(0, |c| c.size())
    }

    /// Slot of the live critter on the hex in front of `slot`.
    fn facing_partner(&self, slot: usize) -> Option<usize> {
        let critter = self.critters[slot].as_ref()?;
        let ahead = critter.position.neighbor(critter.facing)?;
        match self.grid.content(ahead)? {
            Content::Critter(id) => self.index.get(&id).copied(),
            _ => None,
        }
    }

    /// The hex in front of `slot` and its content.
    fn ahead_of(&self, slot: usize) -> Option<(Coord, Content)> {
        let critter = self.critters[slot].as_ref()?;
        let ahead = critter.position.neighbor(critter.facing)?;
        Some((ahead, self.grid.content(ahead)?))
    }

    fn rest(&mut self, slot: usize) {
        let constants = self.constants;
        if let Some(critter) = self.critters[slot].as_mut() {
            let gain = critter.size().saturating_mul(constants.solar_flux);
            let energy = critter.energy();
            // Resting never drains a critter already above its cap.
            let rested = energy
                .saturating_add(gain)
                .min(critter.max_energy(&constants))
                .max(energy);
            critter.set_energy(rested);
        }
    }

    fn walk(&mut self, slot: usize, backward: bool) {
        if !self.charge(slot, self.size_of(slot).saturating_mul(self.constants.move_cost)) {
            return;
        }
        let version = self.version;
        let Some(critter) = self.critters[slot].as_mut() else {
            return;
        };
        let dir = if backward {
            critter.facing.opposite()
        } else {
            critter.facing
        };
        let Some(target) = critter.position.neighbor(dir) else {
            return;
        };
        if self.grid.content(target) != Some(Content::Empty) {
            return;
        }
        self.grid.set(critter.position, Content::Empty, version);
        self.grid.set(target, Content::Critter(critter.id), version);
        critter.position = target;
    }

    fn turn(&mut self, slot: usize, rotate: fn(Direction) -> Direction) {
        if !self.charge(slot, self.size_of(slot)) {
            return;
        }
        if let Some(critter) = self.critters[slot].as_mut() {
            critter.facing = rotate(critter.facing);
        }
        self.restamp(slot);
    }

    fn eat(&mut self, slot: usize) {
        if !self.charge(slot, self.size_of(slot)) {
            return;
        }
        let Some((ahead, Content::Food(food))) = self.ahead_of(slot) else {
            return;
        };
        let (version, constants) = (self.version, self.constants);
        let Some(critter) = self.critters[slot].as_mut() else {
            return;
        };
        let room = critter
            .max_energy(&constants)
            .saturating_sub(critter.energy())
            .max(0);
        let eaten = food.min(room);
        critter.add_energy(eaten);
        let left = food - eaten;
        let content = if left > 0 {
            Content::Food(left)
        } else {
            Content::Empty
        };
        self.grid.set(ahead, content, version);
    }

    fn attack(&mut self, slot: usize) {
        let cost = self.size_of(slot).saturating_mul(self.constants.attack_cost);
        if !self.charge(slot, cost) {
            return;
        }
        let Some(target) = self.facing_partner(slot) else {
            return;
        };
        let (Some(attacker), Some(defender)) = (&self.critters[slot], &self.critters[target])
        else {
            return;
        };
        let hit = damage(&attacker.memory, &defender.memory, &self.constants);
        tracing::debug!(attacker = %attacker.id, defender = %defender.id, hit, "attack");
        self.charge(target, hit);
    }

    fn grow(&mut self, slot: usize) {
        let Some(critter) = self.critters[slot].as_ref() else {
            return;
        };
        let cost = critter
            .size()
            .saturating_mul(critter.complexity(&self.constants))
            .saturating_mul(self.constants.grow_cost);
        if !self.charge(slot, cost) {
            return;
        }
        if let Some(critter) = self.critters[slot].as_mut() {
            let size = critter.size().saturating_add(1);
            critter.memory.set(SIZE, size);
        }
        self.restamp(slot);
    }

    fn bud(&mut self, slot: usize) {
        let Some(critter) = self.critters[slot].as_ref() else {
            return;
        };
        let cost = critter
            .complexity(&self.constants)
            .saturating_mul(self.constants.bud_cost);
        if !self.charge(slot, cost) {
            return;
        }
        let Some(parent) = self.critters[slot].as_ref() else {
            return;
        };
        let Some(behind) = parent.position.neighbor(parent.facing.opposite()) else {
            return;
        };
        if self.grid.content(behind) != Some(Content::Empty) {
            return;
        }
        let mut memory = parent.memory.newborn(self.constants.initial_energy);
        let mut program = parent.program.clone();
        let species = parent.species.clone();
        let parent_id = parent.id;
        mutate_newborn(
            &mut memory,
            &mut program,
            &self.constants,
            &self.mutation,
            &mut self.rng,
        );
        let facing = Direction::new(self.rng.gen_range(0..6));
        let child = self.spawn(
            CritterSpec {
                species,
                memory,
                program,
            },
            behind,
            facing,
            None,
        );
        tracing::debug!(parent = %parent_id, %child, "critter budded");
    }

    fn mate(&mut self, slot: usize) {
        let Some(critter) = self.critters[slot].as_mut() else {
            return;
        };
        critter.ready_to_mate = true;
        let facing = critter.facing;
        let partner = self.facing_partner(slot).filter(|&other| {
            self.critters[other]
                .as_ref()
                .is_some_and(|c| c.ready_to_mate && c.facing == facing.opposite())
        });
        let Some(partner) = partner else {
            self.charge(slot, self.size_of(slot));
            return;
        };

        let cost = |world: &World, s: usize| {
            world.critters[s].as_ref().map_or(0, |c| {
                c.complexity(&world.constants)
                    .saturating_mul(world.constants.mate_cost)
            })
        };
        let (own_cost, partner_cost) = (cost(self, slot), cost(self, partner));
        let own_alive = self.charge(slot, own_cost);
        let partner_alive = self.charge(partner, partner_cost);
        if !own_alive || !partner_alive {
            // The survivor gets its payment back and is charged as for a
            // failed attempt.
            if own_alive {
                self.refund(slot, own_cost);
            }
            if partner_alive {
                self.refund(partner, partner_cost);
            }
            return;
        }

        let (home, other) = if self.rng.gen_bool(0.5) {
            (slot, partner)
        } else {
            (partner, slot)
        };
        let (Some(a), Some(b)) = (&self.critters[home], &self.critters[other]) else {
            return;
        };
        let behind = a.position.neighbor(a.facing.opposite());
        if behind.and_then(|c| self.grid.content(c)) != Some(Content::Empty) {
            self.refund(slot, own_cost);
            self.refund(partner, partner_cost);
            return;
        }
        let Some(behind) = behind else {
            return;
        };
        let mut memory = a.memory.newborn(self.constants.initial_energy);
        let species = a.species.clone();
        let facing = a.facing;
        let (a_id, b_id) = (a.id, b.id);
        let mut program = crossover(&a.program, &b.program, &mut self.rng);
        mutate_newborn(
            &mut memory,
            &mut program,
            &self.constants,
            &self.mutation,
            &mut self.rng,
        );
        let child = self.spawn(
            CritterSpec {
                species,
                memory,
                program,
            },
            behind,
            facing,
            None,
        );
        for s in [slot, partner] {
            if let Some(parent) = self.critters[s].as_mut() {
                parent.ready_to_mate = false;
            }
        }
        tracing::debug!(first = %a_id, second = %b_id, %child, "critters mated");
    }

    /// Return `amount` to a critter and charge it its size instead.
    fn refund(&mut self, slot: usize, amount: i32) {
        if let Some(critter) = self.critters[slot].as_mut() {
            critter.add_energy(amount);
        }
        self.charge(slot, self.size_of(slot));
    }

    fn tag(&mut self, slot: usize, value: i32) {
        if !self.charge(slot, self.size_of(slot)) {
            return;
        }
        if !(0..=MAX_MARK).contains(&value) {
            return;
        }
        let Some(target) = self.facing_partner(slot) else {
            return;
        };
        if let Some(other) = self.critters[target].as_mut() {
            other.memory.set(TAG, value);
        }
        self.restamp(target);
    }

    fn serve(&mut self, slot: usize, amount: i32) {
        let Some(critter) = self.critters[slot].as_ref() else {
            return;
        };
        let amount = amount.clamp(0, critter.energy().max(0));
        if !self.charge(slot, self.size_of(slot).saturating_add(amount)) {
            return;
        }
        if amount == 0 {
            return;
        }
        let food = match self.ahead_of(slot) {
            Some((ahead, Content::Empty)) => Some((ahead, amount)),
            Some((ahead, Content::Food(existing))) => {
                Some((ahead, existing.saturating_add(amount)))
            }
            _ => None,
        };
        if let Some((ahead, total)) = food {
            self.grid.set(ahead, Content::Food(total), self.version);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpret::{Command, Memory};
    use crate::parse::parse;
    use crate::world::{Constants, Content, Coord, CritterId, CritterSpec, Direction, World};

    fn spec(memory: &[i32]) -> CritterSpec {
        CritterSpec {
            species: "test".to_string(),
            memory: Memory::sanitize(memory, 8).0,
            program: parse("1 = 1 --> wait;").unwrap(),
        }
    }

    fn world() -> World {
        World::new(Constants::default(), "actions", 10, 12, 7).unwrap()
    }

    fn place(world: &mut World, memory: &[i32], col: i32, row: i32, dir: i32) -> CritterId {
        world
            .add_critter(spec(memory), Coord::new(col, row), Direction::new(dir), None)
            .unwrap()
    }

    fn act(world: &mut World, id: CritterId, command: Command) {
        let slot = world.index[&id];
        world.execute(slot, command);
    }

    #[test]
    fn test_wait_caps_at_max_energy() {
        let mut world = world();
        let id = place(&mut world, &[8, 1, 1, 2, 999], 2, 2, 0);
        act(&mut world, id, Command::Wait);
        assert_eq!(world.critter(id).unwrap().energy(), 1000);
        act(&mut world, id, Command::Wait);
        assert_eq!(world.critter(id).unwrap().energy(), 1000);
    }

    #[test]
    fn test_move_costs_even_when_blocked() {
        let mut world = world();
        let id = place(&mut world, &[8, 1, 1, 1, 100], 2, 2, 0);
        world.add_rock(Coord::new(2, 3)).unwrap();
        act(&mut world, id, Command::Forward);
        let critter = world.critter(id).unwrap();
        assert_eq!(critter.position, Coord::new(2, 2));
        assert_eq!(critter.energy(), 97);
        act(&mut world, id, Command::Backward);
        assert_eq!(world.critter(id).unwrap().position, Coord::new(2, 1));
        assert_eq!(world.hex_content(Coord::new(2, 2)), Some(Content::Empty));
    }

    #[test]
    fn test_turning() {
        let mut world = world();
        let id = place(&mut world, &[8, 1, 1, 1, 100], 2, 2, 0);
        act(&mut world, id, Command::Left);
        assert_eq!(world.critter(id).unwrap().facing, Direction::new(5));
        act(&mut world, id, Command::Right);
        act(&mut world, id, Command::Right);
        assert_eq!(world.critter(id).unwrap().facing, Direction::new(1));
        assert_eq!(world.critter(id).unwrap().energy(), 97);
    }

    #[test]
    fn test_eat_leaves_leftovers() {
        let mut world = world();
        let id = place(&mut world, &[8, 1, 1, 1, 450], 2, 2, 0);
        world.add_food(Coord::new(2, 3), 100).unwrap();
        act(&mut world, id, Command::Eat);
        assert_eq!(world.critter(id).unwrap().energy(), 500);
        assert_eq!(world.hex_content(Coord::new(2, 3)), Some(Content::Food(49)));
    }

    #[test]
    fn test_starving_critter_dies_and_feeds() {
        let mut world = world();
        let id = place(&mut world, &[8, 1, 1, 2, 5], 2, 2, 0);
        act(&mut world, id, Command::Forward);
        assert!(world.critter(id).is_none());
        assert_eq!(world.hex_content(Coord::new(2, 2)), Some(Content::Food(400)));
        assert_eq!(world.dead_since(0)[0].id, id);
    }

    #[test]
    fn test_attack_damages_and_kills() {
        let mut world = world();
        let attacker = place(&mut world, &[8, 1, 1, 1, 100], 2, 2, 0);
        let victim = place(&mut world, &[8, 1, 1, 1, 60], 2, 3, 3);
        act(&mut world, attacker, Command::Attack);
        assert_eq!(world.critter(attacker).unwrap().energy(), 95);
        assert_eq!(world.critter(victim).unwrap().energy(), 10);
        act(&mut world, attacker, Command::Attack);
        assert!(world.critter(victim).is_none());
        assert_eq!(world.hex_content(Coord::new(2, 3)), Some(Content::Food(200)));
    }

    #[test]
    fn test_grow() {
        let mut world = world();
        let id = place(&mut world, &[8, 1, 1, 1, 100], 2, 2, 0);
        act(&mut world, id, Command::Grow);
        let critter = world.critter(id).unwrap();
        // complexity = 1 rule * 2 + 2 abilities * 25
        assert_eq!(critter.energy(), 100 - 52);
        assert_eq!(critter.size(), 2);
    }

    #[test]
    fn test_bud_places_child_behind() {
        let mut world = world();
        let id = place(&mut world, &[9, 1, 1, 3, 1000, 0, 40, 7, 5], 2, 2, 0);
        act(&mut world, id, Command::Bud);
        assert_eq!(world.population(), 2);
        assert_eq!(world.critter(id).unwrap().energy(), 1000 - 52 * 9);
        let child = world.critters().find(|c| c.id != id).unwrap();
        assert_eq!(child.position, Coord::new(2, 1));
        assert_eq!(child.species, "test");
        assert_eq!(child.size(), 1);
        assert_eq!(child.energy(), 250);
        assert_eq!(child.memory.tag(), 0);
        assert_eq!(child.memory.posture(), 0);
    }

    #[test]
    fn test_mate_needs_a_willing_partner() {
        let mut world = world();
        let a = place(&mut world, &[8, 1, 1, 1, 1000], 2, 2, 0);
        let b = place(&mut world, &[8, 1, 1, 1, 1000], 2, 3, 3);
        act(&mut world, a, Command::Mate);
        assert_eq!(world.population(), 2);
        assert_eq!(world.critter(a).unwrap().energy(), 999);
        assert!(world.critter(a).unwrap().ready_to_mate);

        act(&mut world, b, Command::Mate);
        assert_eq!(world.population(), 3);
        assert_eq!(world.critter(a).unwrap().energy(), 999 - 260);
        assert_eq!(world.critter(b).unwrap().energy(), 1000 - 260);
        assert!(!world.critter(a).unwrap().ready_to_mate);
        assert!(!world.critter(b).unwrap().ready_to_mate);
        let child = world.critters().find(|c| c.id != a && c.id != b).unwrap();
        assert!(child.position == Coord::new(2, 1) || child.position == Coord::new(2, 4));
    }

    #[test]
    fn test_other_actions_clear_readiness() {
        let mut world = world();
        let a = place(&mut world, &[8, 1, 1, 1, 1000], 2, 2, 0);
        act(&mut world, a, Command::Mate);
        assert!(world.critter(a).unwrap().ready_to_mate);
        act(&mut world, a, Command::Wait);
        assert!(!world.critter(a).unwrap().ready_to_mate);
    }

    #[test]
    fn test_tag_and_serve() {
        let mut world = world();
        let a = place(&mut world, &[8, 1, 1, 1, 100], 2, 2, 0);
        let b = place(&mut world, &[8, 1, 1, 1, 100], 2, 3, 3);
        act(&mut world, a, Command::Tag(42));
        assert_eq!(world.critter(b).unwrap().memory.tag(), 42);
        act(&mut world, a, Command::Tag(100));
        assert_eq!(world.critter(b).unwrap().memory.tag(), 42);
        assert_eq!(world.critter(a).unwrap().energy(), 98);

        act(&mut world, b, Command::Right);
        act(&mut world, b, Command::Serve(30));
        assert_eq!(world.critter(b).unwrap().energy(), 100 - 1 - 1 - 30);
        let ahead = Coord::new(2, 3).neighbor(Direction::new(4)).unwrap();
        assert_eq!(world.hex_content(ahead), Some(Content::Food(30)));
        act(&mut world, b, Command::Serve(-5));
        assert_eq!(world.hex_content(ahead), Some(Content::Food(30)));
    }
}
