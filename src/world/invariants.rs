//! World invariants - consistency checks that detect bugs.
//!
//! These should never trigger: every action keeps the grid and the critter
//! list in agreement. A violation means the simulation itself is broken.

use crate::interpret::memory::MEMSIZE;
use crate::world::{Content, World};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut report = |message: String| violations.push(InvariantViolation { message });

    for critter in world.critters() {
        let id = critter.id;
        match world.grid.content(critter.position) {
            Some(Content::Critter(on_hex)) if on_hex == id => {}
            other => report(format!(
                "Critter {id} at {} but the hex holds {other:?}",
                critter.position
            )),
        }
        let indexed = world
            .index
            .get(&id)
            .and_then(|&slot| world.critters.get(slot))
            .and_then(Option::as_ref);
        if indexed.map(|c| c.id) != Some(id) {
            report(format!("Critter {id} is not indexed at its slot"));
        }
        let memory = &critter.memory;
        if usize::try_from(memory.as_slice()[MEMSIZE]).ok() != Some(memory.len()) {
            report(format!(
                "Critter {id} has {} memory slots but capacity {}",
                memory.len(),
                memory.capacity()
            ));
        }
        if memory.size() < 1 || memory.defense() < 1 || memory.offense() < 1 {
            report(format!(
                "Critter {id} has size {}, defense {}, offense {}",
                memory.size(),
                memory.defense(),
                memory.offense()
            ));
        }
        if !(0..6).contains(&critter.facing.value()) {
            report(format!("Critter {id} faces {}", critter.facing.value()));
        }
        if memory.energy() <= 0 {
            report(format!(
                "Critter {id} is alive with energy {}",
                memory.energy()
            ));
        }
    }

    for (coord, hex) in world.grid.iter() {
        match hex.content {
            Content::Food(amount) if amount <= 0 => {
                report(format!("Hex {coord} holds {amount} food"));
            }
            Content::Critter(id) => match world.critter(id) {
                Some(critter) if critter.position == coord => {}
                Some(critter) => report(format!(
                    "Hex {coord} holds critter {id}, which is at {}",
                    critter.position
                )),
                None => report(format!("Hex {coord} holds dead critter {id}")),
            },
            _ => {}
        }
        if hex.last_updated > world.version {
            report(format!(
                "Hex {coord} stamped {} after world version {}",
                hex.last_updated, world.version
            ));
        }
    }

    if world.index.len() != world.critters().count() {
        report(format!(
            "Index holds {} critters but {} are alive",
            world.index.len(),
            world.critters().count()
        ));
    }

    violations
}

/// Assert all world invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(world: &World) {
    let violations = check_invariants(world);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("World invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_world: &World) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::Memory;
    use crate::interpret::memory::ENERGY;
    use crate::parse::parse;
    use crate::world::{Constants, Coord, CritterSpec, Direction};

    fn create_valid_world() -> World {
        let mut world = World::new(Constants::default(), "check", 6, 8, 0).unwrap();
        let spec = CritterSpec {
            species: "s".to_string(),
            memory: Memory::sanitize(&[8, 1, 1, 1, 10], 8).0,
            program: parse("1 = 1 --> wait;").unwrap(),
        };
        world
            .add_critter(spec, Coord::new(2, 2), Direction::new(0), None)
            .unwrap();
        world.add_food(Coord::new(3, 3), 40).unwrap();
        world
    }

    #[test]
    fn test_valid_world_passes() {
        let world = create_valid_world();
        assert!(check_invariants(&world).is_empty());
    }

    #[test]
    fn test_misplaced_critter_detected() {
        let mut world = create_valid_world();
        world.grid.set(Coord::new(2, 2), Content::Empty, 0);
        let violations = check_invariants(&world);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("Critter"));
    }

    #[test]
    fn test_empty_food_detected() {
        let mut world = create_valid_world();
        world.grid.set(Coord::new(3, 3), Content::Food(0), 0);
        let violations = check_invariants(&world);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("food"));
    }

    #[test]
    fn test_starved_critter_detected() {
        let mut world = create_valid_world();
        if let Some(critter) = world.critters[0].as_mut() {
            critter.memory.set(ENERGY, 0);
        }
        let violations = check_invariants(&world);
        assert!(violations.iter().any(|v| v.message.contains("energy")));
    }

    #[test]
    #[should_panic(expected = "World invariant violations")]
    #[cfg(debug_assertions)]
    fn test_assert_panics_on_violation() {
        let mut world = create_valid_world();
        world.grid.set(Coord::new(3, 3), Content::Food(-1), 0);
        assert_invariants(&world);
    }
}
