//! World state and the turn scheduler.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::error::{LoadError, LoadResult, WorldError, WorldResult};
use crate::interpret::{Command, Interpreter};
use crate::mutation::MutationConfig;
use crate::world::senses::Surroundings;
use crate::world::{
    Constants, Content, Coord, Critter, CritterId, CritterSpec, DeadCritter, Direction, Grid,
    SessionId, assert_invariants,
};

/// Name given to worlds that do not declare one.
pub const DEFAULT_NAME: &str = "New World";

/// The complete simulation.
///
/// Critters act one at a time in list order, so later critters in a tick
/// see the effects of earlier ones. Critters that die mid-tick leave a hole
/// in the list that is compacted once the tick is over.
#[derive(Debug, Clone)]
pub struct World {
    pub(super) name: String,
    pub(super) constants: Constants,
    pub(super) mutation: MutationConfig,
    pub(super) grid: Grid,
    pub(super) critters: Vec<Option<Critter>>,
    pub(super) index: HashMap<CritterId, usize>,
    pub(super) dead: Vec<DeadCritter>,
    pub(super) version: u64,
    pub(super) steps: u64,
    pub(super) next_id: u64,
    pub(super) rate: f64,
    pub(super) rng: SmallRng,
}

impl World {
    /// An empty world of `columns` by `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidSize`] if `columns < 1`,
    /// `rows < (columns + 1) / 2`, or the grid would exceed
    /// [`MAX_HEXES`](crate::world::MAX_HEXES).
    pub fn new(
        constants: Constants,
        name: impl Into<String>,
        columns: i32,
        rows: i32,
        seed: u64,
    ) -> LoadResult<Self> {
        let grid = Grid::new(columns, rows).ok_or(LoadError::InvalidSize { columns, rows })?;
        let name = name.into();
        tracing::info!(%name, columns, rows, seed, "world created");
        Ok(Self {
            name,
            constants,
            mutation: MutationConfig::default(),
            grid,
            critters: Vec::new(),
            index: HashMap::new(),
            dead: Vec::new(),
            version: 0,
            steps: 0,
            next_id: 1,
            rate: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// An empty world of the default size from `constants`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidSize`] if the configured size is invalid.
    pub fn default_world(constants: Constants, seed: u64) -> LoadResult<Self> {
        let (columns, rows) = (constants.columns, constants.rows);
        Self::new(constants, DEFAULT_NAME, columns, rows, seed)
    }

    /// Use `config` for birth mutation from now on.
    pub fn set_mutation_config(&mut self, config: MutationConfig) {
        self.mutation = config;
    }

    /// World name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constants this world runs with.
    #[must_use]
    pub const fn constants(&self) -> &Constants {
        &self.constants
    }

    /// Birth mutation settings.
    #[must_use]
    pub const fn mutation_config(&self) -> &MutationConfig {
        &self.mutation
    }

    /// The hex grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current version. Bumped by every tick and every edit.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Ticks simulated so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Steps per second of continuous running, or 0 when stopped.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    pub(crate) fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Number of live critters.
    #[must_use]
    pub fn population(&self) -> usize {
        self.index.len()
    }

    /// Live critters in turn order.
    pub fn critters(&self) -> impl Iterator<Item = &Critter> + '_ {
        self.critters.iter().flatten()
    }

    /// A live critter by id.
    #[must_use]
    pub fn critter(&self, id: CritterId) -> Option<&Critter> {
        self.index
            .get(&id)
            .and_then(|&slot| self.critters.get(slot))
            .and_then(Option::as_ref)
    }

    /// Content of the hex at `coord`, or `None` off the grid.
    #[must_use]
    pub fn hex_content(&self, coord: Coord) -> Option<Content> {
        self.grid.content(coord)
    }

    /// Simulate `n` ticks.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NegativeSteps`] if `n < 0`.
    pub fn advance_time(&mut self, n: i32) -> WorldResult<()> {
        if n < 0 {
            return Err(WorldError::NegativeSteps(n));
        }
        for _ in 0..n {
            self.tick();
        }
        tracing::info!(
            steps = n,
            total = self.steps,
            population = self.population(),
            "advanced time"
        );
        Ok(())
    }

    /// One tick: every critter alive at the start takes a turn.
    pub(crate) fn tick(&mut self) {
        self.version += 1;
        let count = self.critters.len();
        for slot in 0..count {
            if self.critters[slot].is_some() {
                self.take_turn(slot);
            }
        }
        self.compact();
        self.steps += 1;
        assert_invariants(self);
    }

    fn take_turn(&mut self, slot: usize) {
        let Some(critter) = self.critters[slot].as_ref() else {
            return;
        };
        let mut memory = critter.memory.clone();
        let fired = {
            let mut env = Surroundings {
                grid: &self.grid,
                critters: &self.critters,
                index: &self.index,
                constants: &self.constants,
                rng: &mut self.rng,
                position: critter.position,
                facing: critter.facing,
            };
            Interpreter::new(&critter.program, &mut memory, &mut env)
                .run_turn(self.constants.max_rules_per_turn)
        };
        let Some(critter) = self.critters[slot].as_mut() else {
            return;
        };
        let posture = critter.memory.posture();
        critter.memory = memory;
        if let Some(fired) = fired {
            critter.last_rule = Some(fired.rule);
        }
        if critter.memory.posture() != posture {
            self.restamp(slot);
        }
        self.execute(slot, fired.map_or(Command::Wait, |fired| fired.command));
    }

    /// Drop the holes left by dead critters and reindex.
    fn compact(&mut self) {
        self.critters.retain(Option::is_some);
        self.index = self
            .critters
            .iter()
            .enumerate()
            .filter_map(|(slot, critter)| critter.as_ref().map(|c| (c.id, slot)))
            .collect();
    }

    /// Put a new critter on an empty hex, stamped with the current version.
    pub(super) fn spawn(
        &mut self,
        spec: CritterSpec,
        position: Coord,
        facing: Direction,
        session: Option<SessionId>,
    ) -> CritterId {
        let id = CritterId(self.next_id);
        self.next_id += 1;
        self.grid.set(position, Content::Critter(id), self.version);
        self.index.insert(id, self.critters.len());
        self.critters
            .push(Some(Critter::new(id, spec, position, facing, session)));
        id
    }

    /// Remove the critter in `slot`, leave food behind, and record the death.
    pub(super) fn kill(&mut self, slot: usize) {
        let Some(critter) = self.critters.get_mut(slot).and_then(Option::take) else {
            return;
        };
        self.index.remove(&critter.id);
        let food = critter.size().saturating_mul(self.constants.food_per_size);
        let content = if food > 0 {
            Content::Food(food)
        } else {
            Content::Empty
        };
        self.grid.set(critter.position, content, self.version);
        self.dead.push(DeadCritter {
            id: critter.id,
            version: self.version,
        });
        tracing::debug!(id = %critter.id, species = %critter.species, "critter died");
    }

    fn check_empty(&self, coord: Coord) -> WorldResult<()> {
        match self.grid.content(coord) {
            None => Err(WorldError::OffGrid(coord)),
            Some(Content::Empty) => Ok(()),
            Some(_) => Err(WorldError::Occupied(coord)),
        }
    }

    /// Place a rock on an empty hex.
    ///
    /// # Errors
    ///
    /// Fails if the hex is off the grid or not empty.
    pub fn add_rock(&mut self, coord: Coord) -> WorldResult<()> {
        self.check_empty(coord)?;
        self.version += 1;
        self.grid.set(coord, Content::Rock, self.version);
        Ok(())
    }

    /// Place `amount` food on an empty hex.
    ///
    /// # Errors
    ///
    /// Fails if `amount` is not positive or the hex is off the grid or
    /// not empty.
    pub fn add_food(&mut self, coord: Coord, amount: i32) -> WorldResult<()> {
        if amount <= 0 {
            return Err(WorldError::InvalidAmount(amount));
        }
        self.check_empty(coord)?;
        self.version += 1;
        self.grid.set(coord, Content::Food(amount), self.version);
        Ok(())
    }

    /// Place a critter on an empty hex.
    ///
    /// # Errors
    ///
    /// Fails if the hex is off the grid or not empty.
    pub fn add_critter(
        &mut self,
        spec: CritterSpec,
        coord: Coord,
        facing: Direction,
        session: Option<SessionId>,
    ) -> WorldResult<CritterId> {
        self.check_empty(coord)?;
        self.version += 1;
        let species = spec.species.clone();
        let id = self.spawn(spec, coord, facing, session);
        tracing::debug!(%id, %species, %coord, "critter added");
        Ok(id)
    }

    /// Place up to `n` copies of a critter on distinct random empty hexes
    /// with random facings. Stops early when the grid fills up.
    pub fn add_critters_random(
        &mut self,
        spec: &CritterSpec,
        n: usize,
        session: Option<SessionId>,
    ) -> Vec<CritterId> {
        let mut free: Vec<Coord> = self
            .grid
            .iter()
            .filter(|(_, hex)| hex.content.is_empty())
            .map(|(coord, _)| coord)
            .collect();
        let (chosen, _) = free.partial_shuffle(&mut self.rng, n);
        let chosen = chosen.to_vec();
        if chosen.is_empty() {
            return Vec::new();
        }
        self.version += 1;
        let mut ids = Vec::with_capacity(chosen.len());
        for coord in chosen {
            let facing = Direction::new(self.rng.gen_range(0..6));
            ids.push(self.spawn(spec.clone(), coord, facing, session));
        }
        tracing::debug!(
            species = %spec.species,
            placed = ids.len(),
            requested = n,
            "critters added"
        );
        ids
    }

    /// A uniformly random empty hex, if there is one.
    pub(crate) fn random_empty(&mut self) -> Option<Coord> {
        let free: Vec<Coord> = self
            .grid
            .iter()
            .filter(|(_, hex)| hex.content.is_empty())
            .map(|(coord, _)| coord)
            .collect();
        free.choose(&mut self.rng).copied()
    }

    /// Remove a live critter without leaving food.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownCritter`] if no live critter has `id`.
    pub fn remove_critter(&mut self, id: CritterId) -> WorldResult<()> {
        let slot = *self.index.get(&id).ok_or(WorldError::UnknownCritter(id))?;
        self.version += 1;
        if let Some(critter) = self.critters[slot].take() {
            self.grid.set(critter.position, Content::Empty, self.version);
        }
        self.index.remove(&id);
        self.dead.push(DeadCritter {
            id,
            version: self.version,
        });
        self.compact();
        Ok(())
    }

    /// Install a freshly loaded world in place of this one.
    ///
    /// The version keeps counting from the old world, so every hex of the
    /// new world reads as changed to clients that synced before. The dead
    /// critter ledger carries over, and new critter ids continue after the
    /// old ones.
    pub fn replace_world(&mut self, mut world: World) {
        let version = self.version.max(world.version) + 1;
        world.version = version;
        world.grid.touch_all(version);
        world.dead = std::mem::take(&mut self.dead);
        world.rate = self.rate;
        let offset = self.next_id.saturating_sub(1);
        if offset > 0 {
            world.renumber(offset);
        }
        tracing::info!(name = %world.name, version, "world replaced");
        *self = world;
    }

    /// Shift every critter id by `offset`.
    fn renumber(&mut self, offset: u64) {
        for critter in self.critters.iter_mut().flatten() {
            critter.id = CritterId(critter.id.0 + offset);
            self.grid
                .set(critter.position, Content::Critter(critter.id), self.version);
        }
        self.next_id += offset;
        self.compact();
    }
}
