//! Background thread ticking a world at a fixed rate.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{WorldError, WorldResult};
use crate::world::World;

/// Handle to a running world. Dropping it stops the thread after the tick
/// in progress, if any.
#[derive(Debug)]
pub struct Runner {
    thread: Option<JoinHandle<()>>,
    stop_tx: Sender<()>,
}

impl Runner {
    /// Tick `world` `rate` times per second on a new thread.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidRate`] unless `1 / rate` is a
    /// representable period.
    pub fn start(world: Arc<RwLock<World>>, rate: f64) -> WorldResult<Self> {
        let period = Duration::try_from_secs_f64(rate.recip())
            .map_err(|_| WorldError::InvalidRate(rate))?;
        let (stop_tx, stop_rx) = mpsc::channel();
        let thread = thread::spawn(move || {
            tracing::info!(rate, "runner started");
            loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        world.write().unwrap_or_else(PoisonError::into_inner).tick();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::info!("runner stopped");
        });
        Ok(Self {
            thread: Some(thread),
            stop_tx,
        })
    }

    /// Stop the thread and wait for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
