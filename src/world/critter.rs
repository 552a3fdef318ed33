//! Critter state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{NodeId, Program};
use crate::interpret::Memory;
use crate::world::{Constants, Coord, Direction};

/// Unique identifier of a critter within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CritterId(pub u64);

impl fmt::Display for CritterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client session that created a critter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to place a new critter: a loaded critter file.
#[derive(Debug, Clone)]
pub struct CritterSpec {
    /// Species name.
    pub species: String,
    /// Validated initial memory.
    pub memory: Memory,
    /// Genome.
    pub program: Program,
}

/// A live critter.
#[derive(Debug, Clone)]
pub struct Critter {
    /// Identifier, unique for the life of the world.
    pub id: CritterId,
    /// Species name, inherited by offspring.
    pub species: String,
    /// Session that placed the critter, if any.
    pub session: Option<SessionId>,
    /// Memory slots.
    pub memory: Memory,
    /// Genome.
    pub program: Program,
    /// Facing.
    pub facing: Direction,
    /// Current hex.
    pub position: Coord,
    /// Rule that fired on the most recent turn.
    pub last_rule: Option<NodeId>,
    /// Set by a mate attempt; cleared by any other action.
    pub ready_to_mate: bool,
}

impl Critter {
    /// Create a critter at `position`.
    #[must_use]
    pub fn new(
        id: CritterId,
        spec: CritterSpec,
        position: Coord,
        facing: Direction,
        session: Option<SessionId>,
    ) -> Self {
        Self {
            id,
            species: spec.species,
            session,
            memory: spec.memory,
            program: spec.program,
            facing,
            position,
            last_rule: None,
            ready_to_mate: false,
        }
    }

    /// Body size.
    #[must_use]
    pub fn size(&self) -> i32 {
        self.memory.size()
    }

    /// Stored energy.
    #[must_use]
    pub fn energy(&self) -> i32 {
        self.memory.energy()
    }

    /// Energy the critter can hold at its current size.
    #[must_use]
    pub fn max_energy(&self, constants: &Constants) -> i32 {
        self.size().saturating_mul(constants.energy_per_size)
    }

    /// `rules * RULE_COST + (defense + offense) * ABILITY_COST`.
    #[must_use]
    pub fn complexity(&self, constants: &Constants) -> i32 {
        let rules = i32::try_from(self.program.rule_count()).unwrap_or(i32::MAX);
        let abilities = self.memory.defense().saturating_add(self.memory.offense());
        rules
            .saturating_mul(constants.rule_cost)
            .saturating_add(abilities.saturating_mul(constants.ability_cost))
    }

    /// Sensor reading of this critter: `size*100000 + tag*1000 + posture*10 + facing`.
    #[must_use]
    pub fn appearance(&self) -> i32 {
        self.size()
            .saturating_mul(100_000)
            .saturating_add(self.memory.tag() * 1000)
            .saturating_add(self.memory.posture() * 10)
            .saturating_add(self.facing.value())
    }

    /// Add `amount` (possibly negative) to stored energy.
    pub(crate) fn add_energy(&mut self, amount: i32) {
        let energy = self.energy().saturating_add(amount);
        self.memory.set(crate::interpret::memory::ENERGY, energy);
    }

    /// Set stored energy.
    pub(crate) fn set_energy(&mut self, energy: i32) {
        self.memory.set(crate::interpret::memory::ENERGY, energy);
    }
}
