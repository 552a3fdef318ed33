//! Random subtree synthesis.
//!
//! Every generator allocates into an existing arena and returns a detached
//! handle. Depth bounds recursion: at depth zero only leaves are produced.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::ast::{
    ActionKind, ArithOp, BinaryOp, MemAddr, NodeId, NodeKind, Program, RelOp, SensorKind, Sugar,
};
use crate::mutation::MutationConfig;

/// A fresh literal within the configured range.
fn random_literal<R: Rng>(config: &MutationConfig, rng: &mut R) -> i32 {
    let range = config.literal_range.max(0);
    rng.gen_range(-range..=range)
}

pub(crate) fn random_sugar<R: Rng>(rng: &mut R) -> Sugar {
    Sugar::ALL[rng.gen_range(0..Sugar::ALL.len())]
}

/// A memory expression: a sugar slot or `mem[expr]`.
pub(crate) fn random_mem<R: Rng>(
    program: &mut Program,
    depth: usize,
    config: &MutationConfig,
    rng: &mut R,
) -> NodeId {
    if depth == 0 || rng.gen_bool(0.5) {
        program.alloc(NodeKind::Mem(MemAddr::Sugar(random_sugar(rng))))
    } else {
        let index = random_expr(program, depth - 1, config, rng);
        program.alloc(NodeKind::Mem(MemAddr::Index(index)))
    }
}

/// Any expression.
pub(crate) fn random_expr<R: Rng>(
    program: &mut Program,
    depth: usize,
    config: &MutationConfig,
    rng: &mut R,
) -> NodeId {
    if depth == 0 {
        let kind = match rng.gen_range(0..3) {
            0 => NodeKind::Num(random_literal(config, rng)),
            1 => NodeKind::Mem(MemAddr::Sugar(random_sugar(rng))),
            _ => NodeKind::Sensor {
                kind: SensorKind::Smell,
                arg: None,
            },
        };
        return program.alloc(kind);
    }
    let next = depth - 1;
    match rng.gen_range(0..6) {
        0 => program.alloc(NodeKind::Num(random_literal(config, rng))),
        1 => random_mem(program, depth, config, rng),
        2 => {
            let op = ArithOp::ALL[rng.gen_range(0..ArithOp::ALL.len())];
            let left = random_expr(program, next, config, rng);
            let right = random_expr(program, next, config, rng);
            program.alloc(NodeKind::arith(op, left, right))
        }
        3 => {
            let kind = *[
                SensorKind::Nearby,
                SensorKind::Ahead,
                SensorKind::Random,
                SensorKind::Smell,
            ]
            .choose(rng)
            .unwrap_or(&SensorKind::Smell);
            let arg = kind
                .takes_operand()
                .then(|| random_expr(program, next, config, rng));
            program.alloc(NodeKind::Sensor { kind, arg })
        }
        4 => {
            let inner = random_expr(program, next, config, rng);
            program.alloc(NodeKind::Unary(inner))
        }
        _ => random_expr(program, 0, config, rng),
    }
}

/// A relation, or at positive depth possibly a connective.
pub(crate) fn random_condition<R: Rng>(
    program: &mut Program,
    depth: usize,
    config: &MutationConfig,
    rng: &mut R,
) -> NodeId {
    if depth > 0 && rng.gen_bool(0.3) {
        let op = BinaryOp::ALL[rng.gen_range(0..BinaryOp::ALL.len())];
        let left = random_condition(program, depth - 1, config, rng);
        let right = random_condition(program, depth - 1, config, rng);
        return program.alloc(NodeKind::Binary { op, left, right });
    }
    let op = RelOp::ALL[rng.gen_range(0..RelOp::ALL.len())];
    let left = random_expr(program, depth, config, rng);
    let right = random_expr(program, depth, config, rng);
    program.alloc(NodeKind::Relation { op, left, right })
}

/// An action, with an operand when the action takes one.
pub(crate) fn random_action<R: Rng>(
    program: &mut Program,
    depth: usize,
    config: &MutationConfig,
    rng: &mut R,
) -> NodeId {
    let kind = ActionKind::ALL[rng.gen_range(0..ActionKind::ALL.len())];
    let arg = kind
        .takes_operand()
        .then(|| random_expr(program, depth, config, rng));
    program.alloc(NodeKind::Action { kind, arg })
}

/// `mem := expr`.
pub(crate) fn random_update<R: Rng>(
    program: &mut Program,
    depth: usize,
    config: &MutationConfig,
    rng: &mut R,
) -> NodeId {
    let target = random_mem(program, depth, config, rng);
    let value = random_expr(program, depth, config, rng);
    program.alloc(NodeKind::Update { target, value })
}

/// A rule with up to two updates; a rule without updates always acts.
pub(crate) fn random_rule<R: Rng>(
    program: &mut Program,
    depth: usize,
    config: &MutationConfig,
    rng: &mut R,
) -> NodeId {
    let condition = random_condition(program, depth, config, rng);
    let updates: Vec<NodeId> = (0..rng.gen_range(0..=2))
        .map(|_| random_update(program, depth, config, rng))
        .collect();
    let action = (updates.is_empty() || rng.gen_bool(0.8))
        .then(|| random_action(program, depth, config, rng));
    program.alloc(NodeKind::Rule {
        condition,
        updates,
        action,
    })
}

/// A fresh program of `rules` random rules.
pub fn random_program<R: Rng>(rules: usize, config: &MutationConfig, rng: &mut R) -> Program {
    let mut program = Program::new();
    for _ in 0..rules {
        let rule = random_rule(&mut program, config.max_depth, config, rng);
        program.push_rule(rule);
    }
    program
}
