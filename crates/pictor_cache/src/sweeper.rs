//! Background eviction loop.

use crate::DerivativeCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const MIN_INTERVAL: Duration = Duration::from_millis(1);
/// Longest period handed to the timer; one year.
const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Periodically evicts expired derivatives from a [`DerivativeCache`].
///
/// The first sweep runs one full interval after spawning.
pub struct Sweeper;

impl Sweeper {
    /// Spawn a sweep loop using the cache's configured interval.
    pub fn spawn(cache: Arc<DerivativeCache>) -> SweeperHandle {
        let interval = cache.config().sweep_interval();
        Self::spawn_every(cache, interval)
    }

    /// Spawn a sweep loop with an explicit interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_every(cache: Arc<DerivativeCache>, interval: Duration) -> SweeperHandle {
        let interval = if interval.is_zero() {
            tracing::warn!("Sweep interval of zero requested, using {:?}", MIN_INTERVAL);
            MIN_INTERVAL
        } else if interval > MAX_INTERVAL {
            tracing::warn!(requested = ?interval, "Sweep interval capped at {:?}", MAX_INTERVAL);
            MAX_INTERVAL
        } else {
            interval
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(cache, interval, stop_rx));
        tracing::info!(interval_ms = interval.as_millis() as u64, "Started derivative sweeper");

        SweeperHandle {
            stop: stop_tx,
            task: Some(task),
        }
    }
}

async fn run(cache: Arc<DerivativeCache>, period: Duration, mut stop: watch::Receiver<bool>) {
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now + MAX_INTERVAL);
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = cache.evict_expired().await;
                tracing::debug!(evicted, "Sweep finished");
            }
            changed = stop.changed() => {
                // A dropped sender also ends the loop.
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Derivative sweeper stopped");
}

/// Handle to a running sweeper.
///
/// Dropping the handle signals the loop to stop without waiting for it.
#[derive(Debug)]
pub struct SweeperHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signal the loop to stop and wait for it to exit.
    ///
    /// A sweep already in progress is allowed to finish.
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "Sweeper task ended abnormally");
        }
    }

    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}
