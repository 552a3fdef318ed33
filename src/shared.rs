//! Thread-safe access to one world.
//!
//! Readers share the world; steps and edits take it exclusively for their
//! whole duration, so no half-applied tick is ever observable. Continuous
//! running is a background [`Runner`] that takes the same exclusive lock
//! once per tick.

mod runner;

use std::sync::{Arc, Mutex, PoisonError, RwLock};

pub use runner::Runner;

use crate::error::{WorldError, WorldResult};
use crate::world::{Region, World, WorldStatus};

/// A world shared between threads.
///
/// Clones are handles to the same world.
#[derive(Debug, Clone)]
pub struct SharedWorld {
    world: Arc<RwLock<World>>,
    runner: Arc<Mutex<Option<Runner>>>,
}

impl SharedWorld {
    /// Share `world`.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world: Arc::new(RwLock::new(world)),
            runner: Arc::new(Mutex::new(None)),
        }
    }

    /// Run `f` with shared access. Any number of readers may run at once.
    pub fn read<T>(&self, f: impl FnOnce(&World) -> T) -> T {
        let world = self.world.read().unwrap_or_else(PoisonError::into_inner);
        f(&world)
    }

    /// Run `f` with exclusive access.
    pub fn write<T>(&self, f: impl FnOnce(&mut World) -> T) -> T {
        let mut world = self.world.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut world)
    }

    /// Status since `since`, see [`World::status`].
    #[must_use]
    pub fn status(&self, since: u64, region: Option<Region>) -> WorldStatus {
        self.read(|world| world.status(since, region))
    }

    /// Whether a runner is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.runner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Advance `n` ticks atomically.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Running`] while a runner is active and
    /// [`WorldError::NegativeSteps`] for `n < 0`.
    pub fn step(&self, n: i32) -> WorldResult<()> {
        let runner = self.runner.lock().unwrap_or_else(PoisonError::into_inner);
        if runner.is_some() {
            return Err(WorldError::Running);
        }
        self.write(|world| world.advance_time(n))
    }

    /// Run continuously at `rate` ticks per second. A rate of 0 stops.
    ///
    /// Replaces any runner already active.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidRate`] for negative or non-finite rates
    /// and rates too slow to schedule.
    pub fn run(&self, rate: f64) -> WorldResult<()> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(WorldError::InvalidRate(rate));
        }
        let mut runner = self.runner.lock().unwrap_or_else(PoisonError::into_inner);
        // Join the old thread before the new one starts.
        if let Some(old) = runner.take() {
            old.stop();
        }
        if rate > 0.0 {
            *runner = Some(Runner::start(Arc::clone(&self.world), rate)?);
        }
        self.write(|world| world.set_rate(rate));
        Ok(())
    }

    /// Stop continuous running. Does nothing if no runner is active.
    pub fn stop(&self) {
        let mut runner = self.runner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = runner.take() {
            active.stop();
            self.write(|world| world.set_rate(0.0));
        }
    }

    /// Install a freshly loaded world, see [`World::replace_world`].
    ///
    /// Any active runner keeps running on the new world.
    pub fn replace(&self, world: World) {
        self.write(|current| current.replace_world(world));
    }
}
