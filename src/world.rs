//! The hex world critters live in.
//!
//! - Hex grid with rocks, food, and critters
//! - Turn scheduler driving the interpreter once per critter per tick
//! - Energy economy, combat, and reproduction
//! - Versioned snapshots for incremental clients

mod actions;
mod combat;
mod constants;
mod critter;
mod hex;
mod invariants;
mod render;
mod reproduction;
mod senses;
mod snapshot;
mod state;

pub use combat::{damage, sigmoid};
pub use constants::Constants;
pub(crate) use constants::Assignment;
pub use critter::{Critter, CritterId, CritterSpec, SessionId};
pub use hex::{Content, Coord, Direction, Grid, Hex, MAX_HEXES};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use reproduction::{crossover, mutate_newborn};
pub use senses::{NO_FOOD, smell};
pub use snapshot::{CritterSnapshot, DeadCritter, HexInfo, HexView, Region, Viewer, WorldStatus};
pub use state::{DEFAULT_NAME, World};
