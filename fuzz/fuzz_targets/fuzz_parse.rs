#![no_main]

use critterworld::{MutationConfig, mutate, parse};
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(program) = parse(text) else {
        return;
    };

    // Printing is a fixed point of parsing
    let printed = program.to_string();
    let reparsed = parse(&printed).expect("printed program must parse");
    assert_eq!(reparsed.to_string(), printed);

    // Mutants stay well formed
    let mut rng = SmallRng::seed_from_u64(data.len() as u64);
    let mut current = program;
    for _ in 0..8 {
        current = mutate(&current, &MutationConfig::default(), &mut rng);
        let text = current.to_string();
        assert!(parse(&text).is_ok(), "mutant does not parse:\n{text}");
    }
});
