//! Pretty-printing.
//!
//! The printed form parses back to a structurally identical program: nested
//! arithmetic is parenthesized and nested connectives are braced, so operator
//! precedence never has to be recovered from layout.

use std::fmt;

use crate::ast::node::{MemAddr, NodeId, NodeKind};
use crate::ast::program::Program;

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &rule) in self.rules().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", self.display_node(rule))?;
        }
        Ok(())
    }
}

/// Display adapter for one subtree, from [`Program::display_node`].
#[derive(Debug, Clone, Copy)]
pub struct NodeDisplay<'a> {
    program: &'a Program,
    id: NodeId,
}

impl Program {
    /// Printable view of the subtree rooted at `id`.
    #[must_use]
    pub const fn display_node(&self, id: NodeId) -> NodeDisplay<'_> {
        NodeDisplay { program: self, id }
    }
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self.program, self.id, f)
    }
}

fn write_node(program: &Program, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match program.kind(id) {
        NodeKind::Program { .. } => write!(f, "{program}"),
        NodeKind::Rule {
            condition,
            updates,
            action,
        } => {
            let head = format!("{} --> ", program.display_node(*condition));
            f.write_str(&head)?;
            let indent = " ".repeat(head.len());
            for (i, item) in updates.iter().chain(action.iter()).enumerate() {
                if i > 0 {
                    write!(f, "\n{indent}")?;
                }
                write_node(program, *item, f)?;
            }
            f.write_str(";")
        }
        NodeKind::Binary { op, left, right } => {
            write_connective_operand(program, *left, f)?;
            write!(f, " {} ", op.keyword())?;
            write_connective_operand(program, *right, f)
        }
        NodeKind::Relation { op, left, right } => {
            write_node(program, *left, f)?;
            write!(f, " {} ", op.symbol())?;
            write_node(program, *right, f)
        }
        NodeKind::Term { op, left, right } | NodeKind::Factor { op, left, right } => {
            write_arith_operand(program, *left, f)?;
            write!(f, " {} ", op.symbol())?;
            write_arith_operand(program, *right, f)
        }
        NodeKind::Num(value) => write!(f, "{value}"),
        NodeKind::Mem(MemAddr::Sugar(sugar)) => f.write_str(sugar.keyword()),
        NodeKind::Mem(MemAddr::Index(index)) => {
            write!(f, "mem[{}]", program.display_node(*index))
        }
        NodeKind::Sensor { kind, arg } => write_call(program, kind.keyword(), *arg, f),
        NodeKind::Action { kind, arg } => write_call(program, kind.keyword(), *arg, f),
        NodeKind::Unary(inner) => write!(f, "-({})", program.display_node(*inner)),
        NodeKind::Update { target, value } => {
            write_node(program, *target, f)?;
            f.write_str(" := ")?;
            write_node(program, *value, f)
        }
    }
}

/// `keyword` alone, or `keyword[arg]`.
fn write_call(
    program: &Program,
    keyword: &str,
    arg: Option<NodeId>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.write_str(keyword)?;
    match arg {
        Some(arg) => write!(f, "[{}]", program.display_node(arg)),
        None => Ok(()),
    }
}

fn write_arith_operand(program: &Program, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if program.kind(id).is_arith() {
        write!(f, "({})", program.display_node(id))
    } else {
        write_node(program, id, f)
    }
}

fn write_connective_operand(
    program: &Program,
    id: NodeId,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    if matches!(program.kind(id), NodeKind::Binary { .. }) {
        write!(f, "{{{}}}", program.display_node(id))
    } else {
        write_node(program, id, f)
    }
}
