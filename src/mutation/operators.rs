//! The six operators, dispatched on the kind of the target node.

use rand::Rng;

use crate::ast::{
    ActionKind, ArithOp, BinaryOp, Category, MemAddr, NodeId, NodeKind, Program, RelOp, SensorKind,
    Sugar,
};
use crate::mutation::synth::{
    random_action, random_condition, random_expr, random_mem, random_rule, random_update,
};
use crate::mutation::{Mutation, MutationConfig};

/// What the grammar allows in the position a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Root,
    Rule,
    /// Directly under a rule.
    RuleCondition,
    /// Operand of a connective.
    NestedCondition,
    Expr,
    /// Left side of an update: memory expressions only.
    UpdateTarget,
    Update,
    Action,
}

fn slot_of(program: &Program, id: NodeId) -> Slot {
    let Some(parent) = program.parent(id) else {
        return Slot::Root;
    };
    match program.kind(parent) {
        NodeKind::Program { .. } => Slot::Rule,
        NodeKind::Rule {
            condition, action, ..
        } => {
            if *condition == id {
                Slot::RuleCondition
            } else if *action == Some(id) {
                Slot::Action
            } else {
                Slot::Update
            }
        }
        NodeKind::Binary { .. } => Slot::NestedCondition,
        NodeKind::Update { target, .. } if *target == id => Slot::UpdateTarget,
        _ => Slot::Expr,
    }
}

/// Apply `mutation` at `target`. Returns `false`, with the program untouched,
/// when the operator does not apply to that node.
pub fn apply<R: Rng>(
    program: &mut Program,
    target: NodeId,
    mutation: Mutation,
    config: &MutationConfig,
    rng: &mut R,
) -> bool {
    match mutation {
        Mutation::Remove => remove(program, target, rng),
        Mutation::Swap => swap(program, target, rng),
        Mutation::Replace => replace(program, target, config, rng),
        Mutation::Transform => transform(program, target, config, rng),
        Mutation::Insert => insert(program, target, rng),
        Mutation::Duplicate => duplicate(program, target, rng),
    }
}

fn pick<R: Rng>(items: &[NodeId], rng: &mut R) -> Option<NodeId> {
    if items.is_empty() {
        None
    } else {
        Some(items[rng.gen_range(0..items.len())])
    }
}

fn remove<R: Rng>(program: &mut Program, target: NodeId, rng: &mut R) -> bool {
    let slot = slot_of(program, target);
    match slot {
        Slot::Root | Slot::RuleCondition => false,
        Slot::Rule | Slot::Action => match program.parent(target) {
            Some(parent) => program.detach(parent, target),
            None => false,
        },
        Slot::Update => {
            let Some(rule) = program.parent(target) else {
                return false;
            };
            let NodeKind::Rule {
                updates, action, ..
            } = program.kind(rule)
            else {
                return false;
            };
            if updates.len() < 2 && action.is_none() {
                return false;
            }
            program.detach(rule, target)
        }
        Slot::NestedCondition | Slot::Expr | Slot::UpdateTarget => {
            let candidates: Vec<NodeId> = program
                .children(target)
                .into_iter()
                .filter(|&child| fits(program, child, slot))
                .collect();
            match pick(&candidates, rng) {
                Some(child) => program.replace(target, child),
                None => false,
            }
        }
    }
}

/// Whether `id` may be placed in `slot`.
fn fits(program: &Program, id: NodeId, slot: Slot) -> bool {
    let kind = program.kind(id);
    match slot {
        Slot::RuleCondition | Slot::NestedCondition => kind.category() == Category::Condition,
        Slot::Expr => kind.category() == Category::Expr,
        Slot::UpdateTarget => matches!(kind, NodeKind::Mem(_)),
        Slot::Rule => kind.category() == Category::Rule,
        Slot::Update => kind.category() == Category::Update,
        Slot::Action => kind.category() == Category::Action,
        Slot::Root => false,
    }
}

fn swap<R: Rng>(program: &mut Program, target: NodeId, rng: &mut R) -> bool {
    match program.kind_mut(target) {
        NodeKind::Binary { left, right, .. }
        | NodeKind::Relation { left, right, .. }
        | NodeKind::Term { left, right, .. }
        | NodeKind::Factor { left, right, .. } => {
            std::mem::swap(left, right);
            true
        }
        NodeKind::Program { rules } if rules.len() >= 2 => {
            let first = rng.gen_range(0..rules.len());
            let mut second = rng.gen_range(0..rules.len() - 1);
            if second >= first {
                second += 1;
            }
            rules.swap(first, second);
            true
        }
        _ => false,
    }
}

fn replace<R: Rng>(
    program: &mut Program,
    target: NodeId,
    config: &MutationConfig,
    rng: &mut R,
) -> bool {
    let depth = config.max_depth;
    let fresh = match slot_of(program, target) {
        Slot::Root => return false,
        Slot::Rule => random_rule(program, depth, config, rng),
        Slot::RuleCondition | Slot::NestedCondition => {
            random_condition(program, depth, config, rng)
        }
        Slot::Expr => random_expr(program, depth, config, rng),
        Slot::UpdateTarget => random_mem(program, depth, config, rng),
        Slot::Update => random_update(program, depth, config, rng),
        Slot::Action => random_action(program, depth, config, rng),
    };
    program.replace(target, fresh)
}

/// Uniform choice from `options` other than `current`.
fn other<T: Copy + PartialEq, R: Rng>(options: &[T], current: T, rng: &mut R) -> Option<T> {
    let rest: Vec<T> = options.iter().copied().filter(|&o| o != current).collect();
    if rest.is_empty() {
        None
    } else {
        Some(rest[rng.gen_range(0..rest.len())])
    }
}

fn transform<R: Rng>(
    program: &mut Program,
    target: NodeId,
    config: &MutationConfig,
    rng: &mut R,
) -> bool {
    let new_kind = match program.kind(target).clone() {
        NodeKind::Binary { op, left, right } => {
            let Some(op) = other(&BinaryOp::ALL, op, rng) else {
                return false;
            };
            NodeKind::Binary { op, left, right }
        }
        NodeKind::Relation { op, left, right } => {
            let Some(op) = other(&RelOp::ALL, op, rng) else {
                return false;
            };
            NodeKind::Relation { op, left, right }
        }
        NodeKind::Term { op, left, right } | NodeKind::Factor { op, left, right } => {
            let Some(op) = other(&ArithOp::ALL, op, rng) else {
                return false;
            };
            NodeKind::arith(op, left, right)
        }
        NodeKind::Num(value) => {
            let span = config.num_delta.max(1);
            let magnitude = rng.gen_range(1..=span);
            let delta = if rng.gen_bool(0.5) {
                magnitude
            } else {
                -magnitude
            };
            NodeKind::Num(value.wrapping_add(delta))
        }
        NodeKind::Mem(MemAddr::Sugar(sugar)) => {
            let Some(sugar) = other(&Sugar::ALL, sugar, rng) else {
                return false;
            };
            NodeKind::Mem(MemAddr::Sugar(sugar))
        }
        NodeKind::Sensor {
            kind,
            arg: Some(arg),
        } => {
            let Some(kind) = other(&SensorKind::WITH_OPERAND, kind, rng) else {
                return false;
            };
            NodeKind::Sensor {
                kind,
                arg: Some(arg),
            }
        }
        NodeKind::Action { kind, arg } => {
            let options: &[ActionKind] = if kind.takes_operand() {
                &[ActionKind::Tag, ActionKind::Serve]
            } else {
                &ActionKind::SIMPLE
            };
            let Some(kind) = other(options, kind, rng) else {
                return false;
            };
            NodeKind::Action { kind, arg }
        }
        NodeKind::Program { .. }
        | NodeKind::Rule { .. }
        | NodeKind::Mem(MemAddr::Index(_))
        | NodeKind::Sensor { arg: None, .. }
        | NodeKind::Unary(_)
        | NodeKind::Update { .. } => return false,
    };
    *program.kind_mut(target) = new_kind;
    true
}

/// Copy of a random node of `category` other than `target`.
fn copy_of_other<R: Rng>(
    program: &mut Program,
    target: NodeId,
    category: Category,
    rng: &mut R,
) -> Option<NodeId> {
    let candidates: Vec<NodeId> = program
        .descendants(program.root())
        .into_iter()
        .filter(|&id| id != target && program.category(id) == category)
        .collect();
    let source = pick(&candidates, rng)?;
    Some(program.copy_within(source))
}

fn insert<R: Rng>(program: &mut Program, target: NodeId, rng: &mut R) -> bool {
    let Some(parent) = program.parent(target) else {
        return false;
    };
    let wrapper = match slot_of(program, target) {
        Slot::RuleCondition | Slot::NestedCondition => {
            let Some(copy) = copy_of_other(program, target, Category::Condition, rng) else {
                return false;
            };
            let op = BinaryOp::ALL[rng.gen_range(0..BinaryOp::ALL.len())];
            let (left, right) = if rng.gen_bool(0.5) {
                (target, copy)
            } else {
                (copy, target)
            };
            NodeKind::Binary { op, left, right }
        }
        Slot::UpdateTarget => NodeKind::Mem(MemAddr::Index(target)),
        Slot::Expr => wrap_expr(program, target, rng),
        Slot::Root | Slot::Rule | Slot::Update | Slot::Action => return false,
    };
    // the wrapper adopts `target`, so splice the slot before allocating it
    let placeholder = program.alloc(NodeKind::Num(0));
    if !program.relink(parent, target, placeholder) {
        return false;
    }
    let wrapped = program.alloc(wrapper);
    program.relink(parent, placeholder, wrapped)
}

/// A new parent for an expression: arithmetic with a copied operand, or one
/// of the single-operand wrappers.
fn wrap_expr<R: Rng>(program: &mut Program, target: NodeId, rng: &mut R) -> NodeKind {
    let choice = rng.gen_range(0..4);
    if choice == 0 {
        if let Some(copy) = copy_of_other(program, target, Category::Expr, rng) {
            let op = ArithOp::ALL[rng.gen_range(0..ArithOp::ALL.len())];
            let (left, right) = if rng.gen_bool(0.5) {
                (target, copy)
            } else {
                (copy, target)
            };
            return NodeKind::arith(op, left, right);
        }
    }
    match choice {
        1 => NodeKind::Mem(MemAddr::Index(target)),
        2 => NodeKind::Sensor {
            kind: SensorKind::WITH_OPERAND[rng.gen_range(0..SensorKind::WITH_OPERAND.len())],
            arg: Some(target),
        },
        _ => NodeKind::Unary(target),
    }
}

fn duplicate<R: Rng>(program: &mut Program, target: NodeId, rng: &mut R) -> bool {
    match program.kind(target).clone() {
        NodeKind::Program { rules } => {
            let Some(rule) = pick(&rules, rng) else {
                return false;
            };
            let copy = program.copy_within(rule);
            program.push_rule(copy);
            true
        }
        NodeKind::Rule { updates, .. } => {
            let Some(update) = pick(&updates, rng) else {
                return false;
            };
            let copy = program.copy_within(update);
            program.push_update(target, copy)
        }
        _ => false,
    }
}
