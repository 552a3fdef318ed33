//! Abstract syntax of the critter language.
//!
//! A [`Program`] owns every node of its tree in a single arena. Nodes refer to
//! their children and parent through [`NodeId`] handles, which keeps rewrites
//! (see [`crate::mutation`]) down to index rewiring and makes a deep copy a
//! plain traversal.
//!
//! Nodes are addressed two ways:
//! - by handle, which is stable across edits of other parts of the tree;
//! - by pre-order index through [`Program::node_at`], which is what random
//!   mutation samples from.

mod node;
mod print;
mod program;

pub use node::{
    ActionKind, ArithOp, BinaryOp, Category, MemAddr, NodeId, NodeKind, RelOp, SensorKind, Sugar,
};
pub use print::NodeDisplay;
pub use program::{Node, Program};
