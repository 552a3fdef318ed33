//! Critterworld CLI - parse, mutate, and run critter worlds.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Critterworld - artificial life on a hex grid
#[derive(Parser, Debug)]
#[command(name = "critterworld")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log per-critter events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a program file and print it back
    Parse {
        /// Program file
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Print a program followed by successive mutations of it
    Mutate {
        /// Program file
        #[arg(required = true)]
        file: PathBuf,

        /// Number of mutations
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Load a world, advance it, and print its status
    Run {
        /// World description file
        #[arg(required = true)]
        world: PathBuf,

        /// Ticks to simulate (default: 100)
        #[arg(long, default_value = "100")]
        steps: i32,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Constants file, JSON or `NAME value` lines
        #[arg(short, long)]
        constants: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Print the final map
        #[arg(long)]
        map: bool,
    },

    /// Run many independently seeded copies of a world in parallel
    Survey {
        /// World description file
        #[arg(required = true)]
        world: PathBuf,

        /// Number of copies (default: 100)
        #[arg(short, long, default_value = "100")]
        worlds: u64,

        /// Ticks per copy (default: 1000)
        #[arg(long, default_value = "1000")]
        steps: i32,

        /// Starting seed (increments for each copy)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Constants file, JSON or `NAME value` lines
        #[arg(short, long)]
        constants: Option<PathBuf>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let result = match args.command {
        Commands::Parse { file } => cli::parse::execute(&file),

        Commands::Mutate { file, count, seed } => cli::mutate::execute(&file, count, seed),

        Commands::Run {
            world,
            steps,
            seed,
            constants,
            format,
            map,
        } => cli::run::execute(&world, steps, seed, constants.as_deref(), format, map),

        Commands::Survey {
            world,
            worlds,
            steps,
            seed,
            constants,
            threads,
            format,
            progress,
        } => cli::survey::execute(&cli::survey::SurveyArgs {
            world,
            worlds,
            steps,
            seed,
            constants,
            threads,
            format,
            progress,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
