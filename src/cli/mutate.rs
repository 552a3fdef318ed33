//! Mutate command implementation.

use super::{CliError, seed_or_random};
use critterworld::MutationConfig;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::fs;
use std::path::Path;

/// Execute the mutate command: print the program, then `count` successive
/// mutations, each derived from the one before.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub(crate) fn execute(file: &Path, count: u32, seed: Option<u64>) -> Result<(), CliError> {
    let text = fs::read_to_string(file)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", file.display())))?;
    let mut program = critterworld::parse(&text)?;
    let mut rng = SmallRng::seed_from_u64(seed_or_random(seed));
    let config = MutationConfig::default();

    println!("// original");
    print!("{program}");
    for i in 1..=count {
        program = critterworld::mutate(&program, &config, &mut rng);
        println!();
        println!("// mutation {i}");
        print!("{program}");
    }
    Ok(())
}
