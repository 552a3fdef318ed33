//! Grammar-preserving rewrites of critter programs.
//!
//! Six operators act on a single node, chosen by its pre-order index:
//!
//! | Operator  | Effect |
//! |-----------|--------|
//! | Remove    | deletes a rule, update, or action; an expression or nested connective is replaced by one of its own children |
//! | Swap      | exchanges the operands of a binary node, or two rules |
//! | Replace   | swaps the node for a freshly generated one of the same slot |
//! | Transform | changes only the operator or tag, keeping the children |
//! | Insert    | wraps the node in a new parent whose other operand is copied from elsewhere |
//! | Duplicate | appends a copy of an existing rule or update |
//!
//! An operator that cannot apply returns `false` and leaves the program
//! untouched. [`mutate`] retries random `(index, operator)` pairs until the
//! printed program actually changes.

mod operators;
mod synth;

pub use operators::apply;
pub use synth::random_program;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ast::Program;

/// One of the six rewrite operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    /// Delete the node, promoting a child where the grammar needs one.
    Remove,
    /// Exchange two operands, or two rules.
    Swap,
    /// Substitute a freshly generated subtree.
    Replace,
    /// Change the operator or tag only.
    Transform,
    /// Wrap in a new parent.
    Insert,
    /// Append a copy of a rule or update.
    Duplicate,
}

impl Mutation {
    /// Every operator.
    pub const ALL: [Mutation; 6] = [
        Mutation::Remove,
        Mutation::Swap,
        Mutation::Replace,
        Mutation::Transform,
        Mutation::Insert,
        Mutation::Duplicate,
    ];

    /// Uniformly random operator.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Mutation::Remove => "remove",
            Mutation::Swap => "swap",
            Mutation::Replace => "replace",
            Mutation::Transform => "transform",
            Mutation::Insert => "insert",
            Mutation::Duplicate => "duplicate",
        }
    }
}

/// Tuning for random synthesis and reproduction-time mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Maximum depth of freshly generated subtrees.
    pub max_depth: usize,
    /// Fresh literals are drawn from `[-literal_range, literal_range]`.
    pub literal_range: i32,
    /// Largest change a Transform applies to a literal.
    pub num_delta: i32,
    /// Probability of each further round of mutation at birth.
    pub birth_rate: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            literal_range: 100,
            num_delta: 10,
            birth_rate: 0.25,
        }
    }
}

/// A mutated copy of `program`.
///
/// The copy differs from the original in its printed form. A program without
/// rules has nothing to mutate and comes back unchanged.
#[must_use]
pub fn mutate<R: Rng>(program: &Program, config: &MutationConfig, rng: &mut R) -> Program {
    if program.rule_count() == 0 {
        return program.clone();
    }
    let before = program.to_string();
    loop {
        let mut candidate = program.clone();
        let index = rng.gen_range(0..candidate.size());
        let mutation = Mutation::random(rng);
        let Ok(target) = candidate.node_at(index) else {
            continue;
        };
        if apply(&mut candidate, target, mutation, config, rng) && candidate.to_string() != before
        {
            tracing::trace!(index, mutation = mutation.name(), "program mutated");
            candidate.compact();
            return candidate;
        }
    }
}
