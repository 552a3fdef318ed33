//! Output formatting utilities for CLI.

use critterworld::World;
use critterworld::world::WorldStatus;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Format a world status as human-readable text.
pub(super) fn format_status_text(status: &WorldStatus, seed: u64) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "World: {} (seed: {seed})", status.name);
    let _ = writeln!(output, "  Size: {} x {}", status.cols, status.rows);
    let _ = writeln!(output, "  Steps: {}", status.current_timestep);
    let _ = writeln!(output, "  Version: {}", status.current_version);
    let _ = writeln!(output, "  Population: {}", status.population);
    let _ = writeln!(output, "  Deaths: {}", status.dead_critters.len());
    output
}

/// Outcome of one surveyed world.
#[derive(Debug, Clone)]
pub(super) struct WorldOutcome {
    /// Live critters at the end.
    pub(super) population: usize,
    /// Critters that died or were removed.
    pub(super) deaths: usize,
    /// Live critters per species.
    pub(super) species: BTreeMap<String, usize>,
}

impl WorldOutcome {
    /// Summarize a finished world.
    pub(super) fn of(world: &World) -> Self {
        let mut species = BTreeMap::new();
        for critter in world.critters() {
            *species.entry(critter.species.clone()).or_insert(0) += 1;
        }
        Self {
            population: world.population(),
            deaths: world.dead_since(0).len(),
            species,
        }
    }
}

/// Survival statistics for one species across surveyed worlds.
#[derive(Debug, Clone, Default, Serialize)]
pub(super) struct SpeciesStats {
    /// Worlds in which the species survived.
    pub(super) worlds_alive: u64,
    /// Live critters summed over all worlds.
    pub(super) critters: u64,
}

/// Statistics accumulated over surveyed worlds.
#[derive(Debug, Clone, Default, Serialize)]
pub(super) struct SurveyStats {
    /// Worlds surveyed.
    pub(super) worlds: u64,
    /// Worlds that failed to load or run.
    pub(super) failed: u64,
    /// Worlds ending with no critters.
    pub(super) extinct: u64,
    /// Final population summed over worlds.
    pub(super) total_population: u64,
    /// Smallest final population.
    pub(super) min_population: Option<u64>,
    /// Largest final population.
    pub(super) max_population: u64,
    /// Deaths summed over worlds.
    pub(super) total_deaths: u64,
    /// Per-species survival.
    pub(super) species: BTreeMap<String, SpeciesStats>,
}

impl SurveyStats {
    /// Add one world's outcome.
    pub(super) fn add(&mut self, outcome: &WorldOutcome) {
        let population = u64::try_from(outcome.population).unwrap_or(u64::MAX);
        self.worlds += 1;
        if population == 0 {
            self.extinct += 1;
        }
        self.total_population += population;
        self.min_population = Some(self.min_population.map_or(population, |m| m.min(population)));
        self.max_population = self.max_population.max(population);
        self.total_deaths += u64::try_from(outcome.deaths).unwrap_or(u64::MAX);
        for (name, &count) in &outcome.species {
            let entry = self.species.entry(name.clone()).or_default();
            entry.worlds_alive += 1;
            entry.critters += u64::try_from(count).unwrap_or(u64::MAX);
        }
    }

    /// Record a world that failed.
    pub(super) fn add_failure(&mut self) {
        self.failed += 1;
    }

    /// Merge statistics from another thread.
    pub(super) fn merge(&mut self, other: &Self) {
        self.worlds += other.worlds;
        self.failed += other.failed;
        self.extinct += other.extinct;
        self.total_population += other.total_population;
        self.min_population = match (self.min_population, other.min_population) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max_population = self.max_population.max(other.max_population);
        self.total_deaths += other.total_deaths;
        for (name, stats) in &other.species {
            let entry = self.species.entry(name.clone()).or_default();
            entry.worlds_alive += stats.worlds_alive;
            entry.critters += stats.critters;
        }
    }
}

// Averages over survey counts lose precision only beyond 2^52 worlds.
#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Format survey statistics as human-readable text.
pub(super) fn format_survey_text(stats: &SurveyStats, steps: i32) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Survey Results ({} worlds, {steps} steps each)", stats.worlds);
    if stats.failed > 0 {
        let _ = writeln!(output, "  Failed: {}", stats.failed);
    }
    let _ = writeln!(
        output,
        "  Extinct: {} ({:.1}%)",
        stats.extinct,
        ratio(stats.extinct, stats.worlds) * 100.0
    );
    let _ = writeln!(
        output,
        "  Population: mean {:.1}, min {}, max {}",
        ratio(stats.total_population, stats.worlds),
        stats.min_population.unwrap_or(0),
        stats.max_population
    );
    let _ = writeln!(
        output,
        "  Deaths: mean {:.1}",
        ratio(stats.total_deaths, stats.worlds)
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "  {:<20} {:>10} {:>14}", "Species", "Survival", "Mean critters");
    for (name, species) in &stats.species {
        let _ = writeln!(
            output,
            "  {:<20} {:>9.1}% {:>14.1}",
            name,
            ratio(species.worlds_alive, stats.worlds) * 100.0,
            ratio(species.critters, stats.worlds)
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(population: usize, species: &[(&str, usize)]) -> WorldOutcome {
        WorldOutcome {
            population,
            deaths: 2,
            species: species.iter().map(|(n, c)| ((*n).to_string(), *c)).collect(),
        }
    }

    #[test]
    fn test_survey_stats_merge() {
        let mut a = SurveyStats::default();
        a.add(&outcome(3, &[("ant", 3)]));
        let mut b = SurveyStats::default();
        b.add(&outcome(0, &[]));
        b.add(&outcome(5, &[("ant", 1), ("bee", 4)]));
        a.merge(&b);

        assert_eq!(a.worlds, 3);
        assert_eq!(a.extinct, 1);
        assert_eq!(a.min_population, Some(0));
        assert_eq!(a.max_population, 5);
        assert_eq!(a.total_deaths, 6);
        assert_eq!(a.species["ant"].worlds_alive, 2);
        assert_eq!(a.species["bee"].critters, 4);

        let text = format_survey_text(&a, 10);
        assert!(text.contains("3 worlds"));
        assert!(text.contains("ant"));
    }
}
