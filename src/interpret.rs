//! Tree-walking evaluation of critter programs.
//!
//! The interpreter only touches the critter's [`Memory`]; everything it
//! senses comes through an [`Environment`], and the action a rule picks is
//! handed back as a [`Command`] for the world to carry out. Arithmetic never
//! faults: overflow wraps, division or modulus by zero yields 0, and bad
//! memory indices read 0.

pub mod memory;

pub use memory::{Memory, Substitution};

use crate::ast::{ActionKind, BinaryOp, MemAddr, NodeId, NodeKind, Program, SensorKind};

/// What a critter can perceive.
pub trait Environment {
    /// Contents of the adjacent hex `direction` steps clockwise from facing.
    fn nearby(&self, direction: i32) -> i32;
    /// Contents of the hex `distance` steps straight ahead.
    fn ahead(&self, distance: i32) -> i32;
    /// Encoded distance and direction to the nearest food.
    fn smell(&self) -> i32;
    /// Uniform value in `[0, bound)`. Called only with `bound >= 2`.
    fn random(&mut self, bound: i32) -> i32;
}

/// An action with its operand evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Rest.
    Wait,
    /// Step along facing.
    Forward,
    /// Step against facing.
    Backward,
    /// Rotate counter-clockwise.
    Left,
    /// Rotate clockwise.
    Right,
    /// Eat food ahead.
    Eat,
    /// Attack the critter ahead.
    Attack,
    /// Grow by one size.
    Grow,
    /// Reproduce asexually.
    Bud,
    /// Reproduce with the critter ahead.
    Mate,
    /// Tag the critter ahead.
    Tag(i32),
    /// Turn energy into food ahead.
    Serve(i32),
}

/// The rule that ended a turn and the command it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    /// Handle of the rule within the program.
    pub rule: NodeId,
    /// Command to execute.
    pub command: Command,
}

/// Evaluator for one critter turn.
#[derive(Debug)]
pub struct Interpreter<'a, E> {
    program: &'a Program,
    memory: &'a mut Memory,
    env: &'a mut E,
}

impl<'a, E: Environment> Interpreter<'a, E> {
    /// Bind a program to the memory it runs against.
    pub fn new(program: &'a Program, memory: &'a mut Memory, env: &'a mut E) -> Self {
        Self {
            program,
            memory,
            env,
        }
    }

    /// Scan the rules once.
    ///
    /// Every matching rule applies its updates in order. The first matching
    /// rule with an action stops the scan and is returned.
    pub fn run_pass(&mut self) -> Option<Fired> {
        let program = self.program;
        for &rule in program.rules() {
            let NodeKind::Rule {
                condition,
                updates,
                action,
            } = program.kind(rule)
            else {
                continue;
            };
            if !self.holds(*condition) {
                continue;
            }
            for &update in updates {
                self.apply_update(update);
            }
            if let Some(action) = action {
                let command = self.command(*action);
                return Some(Fired { rule, command });
            }
        }
        None
    }

    /// Scan until a rule acts or `max_passes` passes have gone by.
    ///
    /// The pass counter counts the failed passes and is reset to 0 before
    /// returning. `None` means the critter found nothing to do.
    pub fn run_turn(&mut self, max_passes: i32) -> Option<Fired> {
        let mut fired = None;
        while self.memory.pass() < max_passes {
            fired = self.run_pass();
            if fired.is_some() {
                break;
            }
            let pass = self.memory.pass().saturating_add(1);
            self.memory.set(memory::PASS, pass);
        }
        self.memory.set(memory::PASS, 0);
        fired
    }

    /// Evaluate a condition, short-circuiting connectives left to right.
    pub fn holds(&mut self, id: NodeId) -> bool {
        let program = self.program;
        match program.kind(id) {
            NodeKind::Binary { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                match op {
                    BinaryOp::And => self.holds(left) && self.holds(right),
                    BinaryOp::Or => self.holds(left) || self.holds(right),
                }
            }
            NodeKind::Relation { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                let left = self.evaluate(left);
                let right = self.evaluate(right);
                op.holds(left, right)
            }
            _ => false,
        }
    }

    /// Evaluate an expression.
    pub fn evaluate(&mut self, id: NodeId) -> i32 {
        let program = self.program;
        match program.kind(id) {
            NodeKind::Num(value) => *value,
            NodeKind::Term { op, left, right } | NodeKind::Factor { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                let left = self.evaluate(left);
                let right = self.evaluate(right);
                op.apply(left, right)
            }
            NodeKind::Mem(addr) => {
                let addr = *addr;
                let index = self.address(addr);
                self.memory.read(index)
            }
            NodeKind::Sensor { kind, arg } => {
                let (kind, arg) = (*kind, *arg);
                let operand = arg.map_or(0, |arg| self.evaluate(arg));
                match kind {
                    SensorKind::Nearby => self.env.nearby(operand),
                    SensorKind::Ahead => self.env.ahead(operand),
                    SensorKind::Smell => self.env.smell(),
                    SensorKind::Random if operand < 2 => 0,
                    SensorKind::Random => self.env.random(operand),
                }
            }
            NodeKind::Unary(inner) => {
                let inner = *inner;
                self.evaluate(inner).wrapping_neg()
            }
            _ => 0,
        }
    }

    fn address(&mut self, addr: MemAddr) -> i32 {
        match addr {
            MemAddr::Sugar(sugar) => i32::try_from(sugar.slot()).unwrap_or(0),
            MemAddr::Index(index) => self.evaluate(index),
        }
    }

    fn apply_update(&mut self, update: NodeId) {
        let program = self.program;
        let NodeKind::Update { target, value } = program.kind(update) else {
            return;
        };
        let (target, value) = (*target, *value);
        let NodeKind::Mem(addr) = program.kind(target) else {
            return;
        };
        let index = self.address(*addr);
        let value = self.evaluate(value);
        self.memory.write(index, value);
    }

    fn command(&mut self, action: NodeId) -> Command {
        let program = self.program;
        let NodeKind::Action { kind, arg } = program.kind(action) else {
            return Command::Wait;
        };
        let (kind, arg) = (*kind, *arg);
        let mut operand = || arg.map_or(0, |arg| self.evaluate(arg));
        match kind {
            ActionKind::Wait => Command::Wait,
            ActionKind::Forward => Command::Forward,
            ActionKind::Backward => Command::Backward,
            ActionKind::Left => Command::Left,
            ActionKind::Right => Command::Right,
            ActionKind::Eat => Command::Eat,
            ActionKind::Attack => Command::Attack,
            ActionKind::Grow => Command::Grow,
            ActionKind::Bud => Command::Bud,
            ActionKind::Mate => Command::Mate,
            ActionKind::Tag => Command::Tag(operand()),
            ActionKind::Serve => Command::Serve(operand()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    /// Fixed readings for every sensor.
    struct Stub {
        nearby: i32,
        ahead: i32,
        smell: i32,
        random_calls: usize,
    }

    impl Environment for Stub {
        fn nearby(&self, direction: i32) -> i32 {
            self.nearby + direction
        }

        fn ahead(&self, distance: i32) -> i32 {
            self.ahead * distance
        }

        fn smell(&self) -> i32 {
            self.smell
        }

        fn random(&mut self, bound: i32) -> i32 {
            self.random_calls += 1;
            bound - 1
        }
    }

    fn stub() -> Stub {
        Stub {
            nearby: 100,
            ahead: 3,
            smell: 2001,
            random_calls: 0,
        }
    }

    fn memory(values: &[i32]) -> Memory {
        Memory::sanitize(values, 8).0
    }

    #[test]
    fn test_rule_fires_and_updates_memory() {
        let program = parse("mem[0] > 5 --> mem[7] := mem[7] + 1 forward;").unwrap();
        let mut memory = memory(&[10, 1, 1, 1, 100, 0, 0, 0]);
        let mut env = stub();
        let fired = Interpreter::new(&program, &mut memory, &mut env).run_turn(999);
        let fired = fired.unwrap();
        assert_eq!(fired.rule, program.rules()[0]);
        assert_eq!(fired.command, Command::Forward);
        assert_eq!(memory.posture(), 1);
    }

    #[test]
    fn test_protected_slot_update_is_ignored() {
        let program = parse("mem[0] > 5 --> mem[1] := mem[1] + 1 forward;").unwrap();
        let mut memory = memory(&[10, 1, 1, 1, 100]);
        let mut env = stub();
        let fired = Interpreter::new(&program, &mut memory, &mut env).run_turn(999);
        assert_eq!(fired.map(|f| f.command), Some(Command::Forward));
        assert_eq!(memory.defense(), 1);
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        let program = parse("10 / 0 = 0 and 10 mod 0 = 0 --> wait;").unwrap();
        let mut memory = memory(&[8, 1, 1, 1, 1]);
        let mut env = stub();
        let fired = Interpreter::new(&program, &mut memory, &mut env).run_turn(999);
        assert_eq!(fired.map(|f| f.command), Some(Command::Wait));
    }

    #[test]
    fn test_actionless_rules_update_and_scan_on() {
        let program = parse(
            "mem[8] = 0 --> mem[8] := 5;\n\
             mem[8] = 5 --> mem[9] := 7 serve[mem[8] * 2];",
        )
        .unwrap();
        let mut memory = memory(&[10, 1, 1, 1, 100]);
        let mut env = stub();
        let fired = Interpreter::new(&program, &mut memory, &mut env)
            .run_turn(999)
            .unwrap();
        assert_eq!(fired.rule, program.rules()[1]);
        assert_eq!(fired.command, Command::Serve(10));
        assert_eq!(memory.read(9), 7);
    }

    #[test]
    fn test_pass_counter_and_cap() {
        let program = parse("pass < 3 --> mem[8] := mem[8] + 1;\npass = 3 --> eat;").unwrap();
        let mut memory = memory(&[10, 1, 1, 1, 100]);
        let mut env = stub();
        let fired = Interpreter::new(&program, &mut memory, &mut env).run_turn(999);
        assert_eq!(fired.map(|f| f.command), Some(Command::Eat));
        assert_eq!(memory.read(8), 3);
        assert_eq!(memory.pass(), 0);

        let idle = parse("1 = 2 --> wait;").unwrap();
        let fired = Interpreter::new(&idle, &mut memory, &mut env).run_turn(999);
        assert_eq!(fired, None);
        assert_eq!(memory.pass(), 0);
    }

    #[test]
    fn test_short_circuit() {
        let program = parse("1 = 2 and random[10] = 9 --> wait;\n1 = 1 or random[10] = 9 --> eat;")
            .unwrap();
        let mut memory = memory(&[8, 1, 1, 1, 1]);
        let mut env = stub();
        let fired = Interpreter::new(&program, &mut memory, &mut env).run_turn(999);
        assert_eq!(fired.map(|f| f.command), Some(Command::Eat));
        assert_eq!(env.random_calls, 0);
    }

    #[test]
    fn test_sensors() {
        let program = parse(
            "nearby[2] = 102 and ahead[4] = 12 and smell = 2001 and random[1] = 0 \
             and random[5] = 4 --> tag[-(3)];",
        )
        .unwrap();
        let mut memory = memory(&[8, 1, 1, 1, 1]);
        let mut env = stub();
        let fired = Interpreter::new(&program, &mut memory, &mut env).run_turn(999);
        assert_eq!(fired.map(|f| f.command), Some(Command::Tag(-3)));
        assert_eq!(env.random_calls, 1);
    }
}
