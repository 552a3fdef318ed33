//! Genome recombination and birth-time mutation.

use rand::Rng;

use crate::ast::Program;
use crate::interpret::Memory;
use crate::interpret::memory::{DEFENSE, MAX_MEMORY, OFFENSE};
use crate::mutation::{MutationConfig, mutate};
use crate::world::Constants;

/// Upper bound on birth mutation rounds, reached only with rates near 1.
const MAX_ROUNDS: usize = 64;

/// Child genome of two parents, built rule by rule.
///
/// The child has as many rules as the longer parent. Where both parents
/// have a rule at an index, either one is taken with equal probability;
/// past the end of the shorter parent, the longer parent's rules are copied.
pub fn crossover<R: Rng>(first: &Program, second: &Program, rng: &mut R) -> Program {
    let mut child = Program::new();
    let (a, b) = (first.rules(), second.rules());
    for i in 0..a.len().max(b.len()) {
        let (source, rule) = match (a.get(i), b.get(i)) {
            (Some(&x), Some(&y)) => {
                if rng.gen_bool(0.5) {
                    (first, x)
                } else {
                    (second, y)
                }
            }
            (Some(&x), None) => (first, x),
            (None, Some(&y)) => (second, y),
            (None, None) => break,
        };
        let copy = child.copy_subtree(source, rule);
        child.push_rule(copy);
    }
    child
}

/// Apply the rounds of random change a newborn goes through.
///
/// Each round happens with probability `birth_rate` and either mutates the
/// program or nudges memory size, defense, or offense by one, never below
/// their minimums. Returns the number of rounds applied.
pub fn mutate_newborn<R: Rng>(
    memory: &mut Memory,
    program: &mut Program,
    constants: &Constants,
    config: &MutationConfig,
    rng: &mut R,
) -> usize {
    let rate = if config.birth_rate.is_nan() {
        0.0
    } else {
        config.birth_rate.clamp(0.0, 1.0)
    };
    let mut rounds = 0;
    while rng.gen_bool(rate) {
        rounds += 1;
        if rng.gen_bool(0.5) {
            *program = mutate(program, config, rng);
            continue;
        }
        let delta = if rng.gen_bool(0.5) { 1 } else { -1 };
        match rng.gen_range(0..3) {
            0 => {
                let capacity = if delta > 0 {
                    memory.len().saturating_add(1)
                } else {
                    memory.len().saturating_sub(1)
                };
                memory.resize(capacity.clamp(constants.min_memory_slots(), MAX_MEMORY));
            }
            1 => memory.set(DEFENSE, memory.defense().saturating_add(delta).max(1)),
            _ => memory.set(OFFENSE, memory.offense().saturating_add(delta).max(1)),
        }
        if rounds >= MAX_ROUNDS {
            break;
        }
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_crossover_takes_longer_tail() {
        let short = parse("1 = 1 --> wait;").unwrap();
        let long = parse("2 = 2 --> eat;\n3 = 3 --> grow;\n4 = 4 --> bud;").unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..20 {
            let child = crossover(&short, &long, &mut rng);
            assert_eq!(child.rule_count(), 3);
            let text = child.to_string();
            assert!(text.contains("3 = 3 --> grow;"));
            assert!(text.contains("4 = 4 --> bud;"));
            assert!(text.starts_with("1 = 1") || text.starts_with("2 = 2"));
        }
    }

    #[test]
    fn test_crossover_mixes_both_parents() {
        let a = parse("1 = 1 --> wait;\n1 = 1 --> wait;\n1 = 1 --> wait;\n1 = 1 --> wait;")
            .unwrap();
        let b = parse("2 = 2 --> eat;\n2 = 2 --> eat;\n2 = 2 --> eat;\n2 = 2 --> eat;").unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut seen_a = false;
        let mut seen_b = false;
        for _ in 0..20 {
            let text = crossover(&a, &b, &mut rng).to_string();
            seen_a |= text.contains("wait");
            seen_b |= text.contains("eat");
        }
        assert!(seen_a && seen_b);
    }

    #[test]
    fn test_newborn_mutation_respects_minimums() {
        let constants = Constants {
            min_memory: 5,
            ..Constants::default()
        };
        let config = MutationConfig {
            birth_rate: 0.9,
            ..MutationConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            let mut memory = Memory::sanitize(&[8, 1, 1, 1, 250], 8).0;
            let mut program = parse("1 = 1 --> wait;\nsmell < 100 --> eat;").unwrap();
            mutate_newborn(&mut memory, &mut program, &constants, &config, &mut rng);
            assert!(memory.capacity() >= 8);
            assert_eq!(memory.len(), usize::try_from(memory.capacity()).unwrap());
            assert!(memory.defense() >= 1);
            assert!(memory.offense() >= 1);
        }
    }

    #[test]
    fn test_zero_rate_leaves_newborn_alone() {
        let constants = Constants::default();
        let config = MutationConfig {
            birth_rate: 0.0,
            ..MutationConfig::default()
        };
        let mut memory = Memory::sanitize(&[8, 1, 1, 1, 250], 8).0;
        let mut program = parse("1 = 1 --> wait;").unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        let rounds = mutate_newborn(&mut memory, &mut program, &constants, &config, &mut rng);
        assert_eq!(rounds, 0);
        assert_eq!(program.to_string(), "1 = 1 --> wait;\n");
    }
}
