//! Run command implementation.

use super::output::format_status_text;
use super::{CliError, OutputFormat, constants_from, seed_or_random};
use critterworld::loader::load_world;
use std::path::Path;
use std::time::Instant;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the world or constants cannot be loaded.
pub(crate) fn execute(
    world_file: &Path,
    steps: i32,
    seed: Option<u64>,
    constants: Option<&Path>,
    format: OutputFormat,
    map: bool,
) -> Result<(), CliError> {
    let constants = constants_from(constants)?;
    let seed = seed_or_random(seed);
    let mut world = load_world(world_file, constants, seed)?;

    let start = Instant::now();
    world.advance_time(steps)?;
    let duration = start.elapsed();

    let status = world.status(0, None);
    match format {
        OutputFormat::Text => {
            print!("{}", format_status_text(&status, seed));
            if map {
                println!();
                print!("{}", world.render());
            }
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }
    Ok(())
}
