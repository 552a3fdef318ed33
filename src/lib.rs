// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Critterworld: an artificial life simulator on a hex grid.
//!
//! Critters carry a genome written in a small rule language. Every tick each
//! critter runs its program against what it senses and performs one action.
//! Offspring inherit mutated copies of their parents' programs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   SharedWorld + Runner (shared)     │
//! ├─────────────────────────────────────┤
//! │   World: grid, critters, actions    │
//! ├──────────────────┬──────────────────┤
//! │   Interpreter    │   Mutation       │
//! ├──────────────────┴──────────────────┤
//! │   Program arena (ast) + parser      │
//! └─────────────────────────────────────┘
//! ```

pub mod ast;
pub mod error;
pub mod interpret;
pub mod loader;
pub mod mutation;
pub mod parse;
pub mod shared;
pub mod world;

pub use ast::Program;
pub use error::{LoadError, LoadResult, ParseError, ParseResult, WorldError, WorldResult};
pub use interpret::{Command, Interpreter, Memory};
pub use mutation::{Mutation, MutationConfig, mutate};
pub use parse::parse;
pub use shared::SharedWorld;
pub use world::{Constants, Coord, CritterId, CritterSpec, Direction, World};
