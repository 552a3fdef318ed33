//! Property-based tests for programs and mutation.
//!
//! Run with: cargo test --release prop_program

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use critterworld::mutation::{apply, random_program};
use critterworld::{Mutation, MutationConfig, mutate, parse};

const SEEKER: &str = include_str!("../demos/seeker.txt");

/// Program text of a demo critter file, past its header lines.
fn demo_program() -> String {
    SEEKER
        .lines()
        .skip_while(|line| line.contains(':') && !line.contains(":="))
        .collect::<Vec<_>>()
        .join("\n")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Printing and reparsing a random program is a fixed point.
    #[test]
    fn prop_random_program_round_trips(seed in any::<u64>(), rules in 1usize..6) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let program = random_program(rules, &MutationConfig::default(), &mut rng);
        let text = program.to_string();
        let reparsed = parse(&text).unwrap();
        prop_assert_eq!(reparsed.to_string(), text);
        prop_assert_eq!(reparsed.size(), program.size());
    }

    /// Every index below the size names a distinct node; the size does not.
    #[test]
    fn prop_node_at_is_a_bijection(seed in any::<u64>(), rules in 1usize..5) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let program = random_program(rules, &MutationConfig::default(), &mut rng);
        prop_assert_eq!(program.node_at(0).unwrap(), program.root());
        let mut ids: Vec<_> = (0..program.size()).map(|i| program.node_at(i).unwrap()).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), program.size());
        prop_assert!(program.node_at(program.size()).is_err());
        for &rule in program.rules() {
            prop_assert_eq!(program.parent(rule), Some(program.root()));
        }
    }

    /// Mutating a clone never touches the original.
    #[test]
    fn prop_clone_is_independent(seed in any::<u64>(), index in any::<prop::sample::Index>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let config = MutationConfig::default();
        let program = random_program(3, &config, &mut rng);
        let before = program.to_string();
        let mut copy = program.clone();
        prop_assert_eq!(copy.to_string(), before.clone());

        let target = copy.node_at(index.index(copy.size())).unwrap();
        let mutation = Mutation::random(&mut rng);
        apply(&mut copy, target, mutation, &config, &mut rng);
        prop_assert_eq!(program.to_string(), before);
    }

    /// Every mutation changes the text and still parses to the same text.
    #[test]
    fn prop_mutations_stay_well_formed(seed in any::<u64>(), rounds in 1usize..30) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let config = MutationConfig::default();
        let mut program = parse(&demo_program()).unwrap();
        for _ in 0..rounds {
            let previous = program.to_string();
            program = mutate(&program, &config, &mut rng);
            let text = program.to_string();
            prop_assert_ne!(&text, &previous);
            prop_assert_eq!(parse(&text).unwrap().to_string(), text);
        }
    }
}

#[test]
fn test_thousand_successive_mutations() {
    let mut rng = SmallRng::seed_from_u64(2024);
    let config = MutationConfig::default();
    let mut program = parse(&demo_program()).unwrap();
    for _ in 0..1000 {
        program = mutate(&program, &config, &mut rng);
        if program.rule_count() == 0 {
            break;
        }
        let text = program.to_string();
        assert_eq!(parse(&text).unwrap().to_string(), text);
    }
}
