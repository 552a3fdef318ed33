//! Survey command implementation.

use super::output::{SurveyStats, WorldOutcome, format_survey_text};
use super::{CliError, OutputFormat, constants_from, seed_or_random};
use critterworld::WorldError;
use critterworld::loader::parse_world;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Arguments of the survey command.
#[derive(Debug)]
pub(crate) struct SurveyArgs {
    pub(crate) world: PathBuf,
    pub(crate) worlds: u64,
    pub(crate) steps: i32,
    pub(crate) seed: Option<u64>,
    pub(crate) constants: Option<PathBuf>,
    pub(crate) threads: Option<usize>,
    pub(crate) format: OutputFormat,
    pub(crate) progress: bool,
}

/// Execute the survey command.
///
/// # Errors
///
/// Returns an error if the world description or constants cannot be read,
/// or if the first world fails to load.
pub(crate) fn execute(args: &SurveyArgs) -> Result<(), CliError> {
    if args.steps < 0 {
        return Err(WorldError::NegativeSteps(args.steps).into());
    }
    let constants = constants_from(args.constants.as_deref())?;
    let text = fs::read_to_string(&args.world)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", args.world.display())))?;
    let base = args.world.parent().unwrap_or_else(|| Path::new("."));
    let base_seed = seed_or_random(args.seed);

    // Surface description errors once instead of per world.
    parse_world(&text, base, constants, base_seed)?;

    // Set thread pool size if specified
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if args.progress {
        let pb = ProgressBar::new(args.worlds);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} worlds ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread accumulates its own stats, merged at the end
    let stats = (0..args.worlds)
        .into_par_iter()
        .fold(SurveyStats::default, |mut local, i| {
            let seed = base_seed.wrapping_add(i);
            let outcome = parse_world(&text, base, constants, seed)
                .map_err(CliError::from)
                .and_then(|mut world| {
                    world.advance_time(args.steps)?;
                    Ok(WorldOutcome::of(&world))
                });
            match outcome {
                Ok(outcome) => local.add(&outcome),
                Err(err) => {
                    tracing::warn!(seed, %err, "surveyed world failed");
                    local.add_failure();
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(SurveyStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    match args.format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_survey_text(&stats, args.steps));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
