//! Node kinds of the critter language.

/// Stable handle of a node inside a [`Program`](crate::ast::Program) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena slot.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Boolean connective of a [`NodeKind::Binary`] condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Both operands hold.
    And,
    /// Either operand holds.
    Or,
}

impl BinaryOp {
    /// Every connective, in grammar order.
    pub const ALL: [BinaryOp; 2] = [BinaryOp::And, BinaryOp::Or];

    /// Source keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// Comparison of a [`NodeKind::Relation`] condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `=`
    Eq,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `!=`
    Ne,
}

impl RelOp {
    /// Every comparison, in grammar order.
    pub const ALL: [RelOp; 6] = [
        RelOp::Lt,
        RelOp::Le,
        RelOp::Eq,
        RelOp::Ge,
        RelOp::Gt,
        RelOp::Ne,
    ];

    /// Source symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Eq => "=",
            RelOp::Ge => ">=",
            RelOp::Gt => ">",
            RelOp::Ne => "!=",
        }
    }

    /// Apply the comparison.
    #[must_use]
    pub const fn holds(self, left: i32, right: i32) -> bool {
        match self {
            RelOp::Lt => left < right,
            RelOp::Le => left <= right,
            RelOp::Eq => left == right,
            RelOp::Ge => left >= right,
            RelOp::Gt => left > right,
            RelOp::Ne => left != right,
        }
    }
}

/// Arithmetic operator. Additive operators form a Term, the rest a Factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`, zero divisor yields 0
    Div,
    /// `mod`, zero divisor yields 0
    Mod,
}

impl ArithOp {
    /// Every arithmetic operator.
    pub const ALL: [ArithOp; 5] = [
        ArithOp::Add,
        ArithOp::Sub,
        ArithOp::Mul,
        ArithOp::Div,
        ArithOp::Mod,
    ];

    /// Whether this operator builds a Term (`+`, `-`) rather than a Factor.
    #[must_use]
    pub const fn is_additive(self) -> bool {
        matches!(self, ArithOp::Add | ArithOp::Sub)
    }

    /// Source symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "mod",
        }
    }

    /// Apply the operator with wrapping arithmetic.
    #[must_use]
    pub const fn apply(self, left: i32, right: i32) -> i32 {
        match self {
            ArithOp::Add => left.wrapping_add(right),
            ArithOp::Sub => left.wrapping_sub(right),
            ArithOp::Mul => left.wrapping_mul(right),
            ArithOp::Div => {
                if right == 0 {
                    0
                } else {
                    left.wrapping_div(right)
                }
            }
            ArithOp::Mod => {
                if right == 0 {
                    0
                } else {
                    left.wrapping_rem(right)
                }
            }
        }
    }
}

/// Named alias for one of the fixed low memory slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sugar {
    /// Slot 0, memory capacity.
    MemSize,
    /// Slot 1.
    Defense,
    /// Slot 2.
    Offense,
    /// Slot 3.
    Size,
    /// Slot 4.
    Energy,
    /// Slot 5, passes taken this turn.
    Pass,
    /// Slot 6.
    Tag,
    /// Slot 7.
    Posture,
}

impl Sugar {
    /// Every sugar token, ordered by slot.
    pub const ALL: [Sugar; 8] = [
        Sugar::MemSize,
        Sugar::Defense,
        Sugar::Offense,
        Sugar::Size,
        Sugar::Energy,
        Sugar::Pass,
        Sugar::Tag,
        Sugar::Posture,
    ];

    /// Memory slot this token reads.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Source keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Sugar::MemSize => "memsize",
            Sugar::Defense => "defense",
            Sugar::Offense => "offense",
            Sugar::Size => "size",
            Sugar::Energy => "energy",
            Sugar::Pass => "pass",
            Sugar::Tag => "tag",
            Sugar::Posture => "posture",
        }
    }

    /// Look up a keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sugar| sugar.keyword() == word)
    }
}

/// World sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Contents of the adjacent hex in a direction relative to facing.
    Nearby,
    /// Contents of the hex a distance straight ahead.
    Ahead,
    /// Uniform random value below the operand.
    Random,
    /// Distance and direction to the closest food.
    Smell,
}

impl SensorKind {
    /// Sensors that take an operand.
    pub const WITH_OPERAND: [SensorKind; 3] =
        [SensorKind::Nearby, SensorKind::Ahead, SensorKind::Random];

    /// Source keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            SensorKind::Nearby => "nearby",
            SensorKind::Ahead => "ahead",
            SensorKind::Random => "random",
            SensorKind::Smell => "smell",
        }
    }

    /// Whether the sensor is written with a bracketed operand.
    #[must_use]
    pub const fn takes_operand(self) -> bool {
        !matches!(self, SensorKind::Smell)
    }
}

/// Critter action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Rest and absorb solar energy.
    Wait,
    /// Step one hex along facing.
    Forward,
    /// Step one hex against facing.
    Backward,
    /// Rotate counter-clockwise.
    Left,
    /// Rotate clockwise.
    Right,
    /// Consume food ahead.
    Eat,
    /// Damage the critter ahead.
    Attack,
    /// Increase size by one.
    Grow,
    /// Asexual reproduction.
    Bud,
    /// Sexual reproduction with the critter ahead.
    Mate,
    /// Set the tag of the critter ahead.
    Tag,
    /// Convert own energy into food ahead.
    Serve,
}

impl ActionKind {
    /// Actions without an operand.
    pub const SIMPLE: [ActionKind; 10] = [
        ActionKind::Wait,
        ActionKind::Forward,
        ActionKind::Backward,
        ActionKind::Left,
        ActionKind::Right,
        ActionKind::Eat,
        ActionKind::Attack,
        ActionKind::Grow,
        ActionKind::Bud,
        ActionKind::Mate,
    ];

    /// Every action.
    pub const ALL: [ActionKind; 12] = [
        ActionKind::Wait,
        ActionKind::Forward,
        ActionKind::Backward,
        ActionKind::Left,
        ActionKind::Right,
        ActionKind::Eat,
        ActionKind::Attack,
        ActionKind::Grow,
        ActionKind::Bud,
        ActionKind::Mate,
        ActionKind::Tag,
        ActionKind::Serve,
    ];

    /// Source keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            ActionKind::Wait => "wait",
            ActionKind::Forward => "forward",
            ActionKind::Backward => "backward",
            ActionKind::Left => "left",
            ActionKind::Right => "right",
            ActionKind::Eat => "eat",
            ActionKind::Attack => "attack",
            ActionKind::Grow => "grow",
            ActionKind::Bud => "bud",
            ActionKind::Mate => "mate",
            ActionKind::Tag => "tag",
            ActionKind::Serve => "serve",
        }
    }

    /// Look up a keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == word)
    }

    /// Whether the action is written with a bracketed operand.
    #[must_use]
    pub const fn takes_operand(self) -> bool {
        matches!(self, ActionKind::Tag | ActionKind::Serve)
    }
}

/// Address read or written by a memory expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemAddr {
    /// Fixed slot written as a keyword.
    Sugar(Sugar),
    /// `mem[expr]`.
    Index(NodeId),
}

/// Grammar category of a node, used to keep rewrites well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// The root.
    Program,
    /// A rule.
    Rule,
    /// Binary or relation condition.
    Condition,
    /// Any expression.
    Expr,
    /// A memory assignment.
    Update,
    /// An action.
    Action,
}

/// Tagged node payload. Children are arena handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Ordered rule list.
    Program {
        /// Rules in priority order.
        rules: Vec<NodeId>,
    },
    /// `condition --> updates action;`
    Rule {
        /// Guard.
        condition: NodeId,
        /// Memory assignments applied in order.
        updates: Vec<NodeId>,
        /// Optional action ending the turn.
        action: Option<NodeId>,
    },
    /// `condition and|or condition`
    Binary {
        /// Connective.
        op: BinaryOp,
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// `expr rel expr`
    Relation {
        /// Comparison.
        op: RelOp,
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// `expr + expr` or `expr - expr`
    Term {
        /// Additive operator.
        op: ArithOp,
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// `expr * expr`, `expr / expr` or `expr mod expr`
    Factor {
        /// Multiplicative operator.
        op: ArithOp,
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Integer literal.
    Num(i32),
    /// Memory read, or an update target.
    Mem(MemAddr),
    /// Sensor reading.
    Sensor {
        /// Which sensor.
        kind: SensorKind,
        /// Operand, absent only for `smell`.
        arg: Option<NodeId>,
    },
    /// `-(expr)`
    Unary(NodeId),
    /// `mem := expr`
    Update {
        /// Memory expression written.
        target: NodeId,
        /// Value stored.
        value: NodeId,
    },
    /// Action with its optional operand.
    Action {
        /// Which action.
        kind: ActionKind,
        /// Operand of `tag` and `serve`.
        arg: Option<NodeId>,
    },
}

impl NodeKind {
    /// Build an arithmetic node, choosing Term or Factor from the operator.
    #[must_use]
    pub const fn arith(op: ArithOp, left: NodeId, right: NodeId) -> Self {
        if op.is_additive() {
            NodeKind::Term { op, left, right }
        } else {
            NodeKind::Factor { op, left, right }
        }
    }

    /// Grammar category.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            NodeKind::Program { .. } => Category::Program,
            NodeKind::Rule { .. } => Category::Rule,
            NodeKind::Binary { .. } | NodeKind::Relation { .. } => Category::Condition,
            NodeKind::Update { .. } => Category::Update,
            NodeKind::Action { .. } => Category::Action,
            NodeKind::Term { .. }
            | NodeKind::Factor { .. }
            | NodeKind::Num(_)
            | NodeKind::Mem(_)
            | NodeKind::Sensor { .. }
            | NodeKind::Unary(_) => Category::Expr,
        }
    }

    /// Whether this is a Term or Factor, the nodes parenthesized when nested.
    #[must_use]
    pub const fn is_arith(&self) -> bool {
        matches!(self, NodeKind::Term { .. } | NodeKind::Factor { .. })
    }

    /// Children in pre-order addressing order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { rules } => rules.clone(),
            NodeKind::Rule {
                condition,
                updates,
                action,
            } => {
                let mut out = Vec::with_capacity(updates.len() + 2);
                out.push(*condition);
                out.extend_from_slice(updates);
                out.extend(*action);
                out
            }
            NodeKind::Binary { left, right, .. }
            | NodeKind::Relation { left, right, .. }
            | NodeKind::Term { left, right, .. }
            | NodeKind::Factor { left, right, .. } => vec![*left, *right],
            NodeKind::Update { target, value } => vec![*target, *value],
            NodeKind::Mem(MemAddr::Index(child)) | NodeKind::Unary(child) => vec![*child],
            NodeKind::Sensor { arg, .. } | NodeKind::Action { arg, .. } => {
                arg.iter().copied().collect()
            }
            NodeKind::Num(_) | NodeKind::Mem(MemAddr::Sugar(_)) => Vec::new(),
        }
    }

    /// Same payload with every child handle passed through `f`.
    #[must_use]
    pub fn map_children(&self, mut f: impl FnMut(NodeId) -> NodeId) -> NodeKind {
        match self {
            NodeKind::Program { rules } => NodeKind::Program {
                rules: rules.iter().map(|&rule| f(rule)).collect(),
            },
            NodeKind::Rule {
                condition,
                updates,
                action,
            } => {
                let condition = f(*condition);
                let updates = updates.iter().map(|&update| f(update)).collect();
                let action = action.map(&mut f);
                NodeKind::Rule {
                    condition,
                    updates,
                    action,
                }
            }
            NodeKind::Binary { op, left, right } => {
                let left = f(*left);
                NodeKind::Binary {
                    op: *op,
                    left,
                    right: f(*right),
                }
            }
            NodeKind::Relation { op, left, right } => {
                let left = f(*left);
                NodeKind::Relation {
                    op: *op,
                    left,
                    right: f(*right),
                }
            }
            NodeKind::Term { op, left, right } => {
                let left = f(*left);
                NodeKind::Term {
                    op: *op,
                    left,
                    right: f(*right),
                }
            }
            NodeKind::Factor { op, left, right } => {
                let left = f(*left);
                NodeKind::Factor {
                    op: *op,
                    left,
                    right: f(*right),
                }
            }
            NodeKind::Num(value) => NodeKind::Num(*value),
            NodeKind::Mem(MemAddr::Sugar(sugar)) => NodeKind::Mem(MemAddr::Sugar(*sugar)),
            NodeKind::Mem(MemAddr::Index(child)) => NodeKind::Mem(MemAddr::Index(f(*child))),
            NodeKind::Sensor { kind, arg } => NodeKind::Sensor {
                kind: *kind,
                arg: arg.map(&mut f),
            },
            NodeKind::Unary(child) => NodeKind::Unary(f(*child)),
            NodeKind::Update { target, value } => {
                let target = f(*target);
                NodeKind::Update {
                    target,
                    value: f(*value),
                }
            }
            NodeKind::Action { kind, arg } => NodeKind::Action {
                kind: *kind,
                arg: arg.map(&mut f),
            },
        }
    }

    /// Point the slot holding `old` at `new`. Returns `false` if `old` is not a child.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        let swap = |slot: &mut NodeId| {
            if *slot == old {
                *slot = new;
                true
            } else {
                false
            }
        };
        match self {
            NodeKind::Program { rules } => rules.iter_mut().any(swap),
            NodeKind::Rule {
                condition,
                updates,
                action,
            } => {
                swap(condition)
                    || updates.iter_mut().any(swap)
                    || action.as_mut().is_some_and(swap)
            }
            NodeKind::Binary { left, right, .. }
            | NodeKind::Relation { left, right, .. }
            | NodeKind::Term { left, right, .. }
            | NodeKind::Factor { left, right, .. } => swap(left) || swap(right),
            NodeKind::Update { target, value } => swap(target) || swap(value),
            NodeKind::Mem(MemAddr::Index(child)) | NodeKind::Unary(child) => swap(child),
            NodeKind::Sensor { arg, .. } | NodeKind::Action { arg, .. } => {
                arg.as_mut().is_some_and(swap)
            }
            NodeKind::Num(_) | NodeKind::Mem(MemAddr::Sugar(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arith_picks_term_or_factor() {
        let (a, b) = (NodeId(1), NodeId(2));
        assert!(matches!(NodeKind::arith(ArithOp::Sub, a, b), NodeKind::Term { .. }));
        assert!(matches!(NodeKind::arith(ArithOp::Mod, a, b), NodeKind::Factor { .. }));
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert_eq!(ArithOp::Div.apply(10, 0), 0);
        assert_eq!(ArithOp::Mod.apply(10, 0), 0);
        assert_eq!(ArithOp::Div.apply(i32::MIN, -1), i32::MIN);
    }

    #[test]
    fn test_rule_children_order() {
        let kind = NodeKind::Rule {
            condition: NodeId(1),
            updates: vec![NodeId(2), NodeId(3)],
            action: Some(NodeId(4)),
        };
        assert_eq!(kind.children(), vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);
    }

    #[test]
    fn test_replace_child_optional_slot() {
        let mut kind = NodeKind::Action {
            kind: ActionKind::Serve,
            arg: Some(NodeId(7)),
        };
        assert!(kind.replace_child(NodeId(7), NodeId(9)));
        assert!(!kind.replace_child(NodeId(7), NodeId(9)));
        assert_eq!(kind.children(), vec![NodeId(9)]);
    }

    #[test]
    fn test_sugar_keywords_round_trip() {
        for sugar in Sugar::ALL {
            assert_eq!(Sugar::from_keyword(sugar.keyword()), Some(sugar));
        }
        assert_eq!(Sugar::Posture.slot(), 7);
    }
}
