//! Background expiry sweeper for verification records
//!
//! Runs independently of request traffic and reclaims records whose
//! retention deadline has passed. Each tick is isolated: an error or a panic
//! inside one sweep is logged and the next tick runs as usual.

use chrono::{DateTime, Utc};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::errors::DomainResult;

use super::clock::Clock;
use super::store::VerificationStore;

/// Anything the sweeper can reclaim expired state from
pub trait SweepTarget: Send + Sync {
    /// Remove everything past retention at `now`, returning the count removed
    fn sweep(&self, now: DateTime<Utc>) -> DomainResult<usize>;
}

impl SweepTarget for VerificationStore {
    fn sweep(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        VerificationStore::sweep(self, now)
    }
}

/// Periodic sweeper for a [`SweepTarget`]
pub struct ExpirySweeper {
    target: Arc<dyn SweepTarget>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ExpirySweeper {
    /// Create a sweeper that runs every `interval`
    pub fn new(target: Arc<dyn SweepTarget>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            target,
            clock,
            interval,
        }
    }

    /// Run a single sweep, containing any error or panic.
    ///
    /// Returns the number of records removed, or `None` when the sweep failed.
    pub fn run_once(&self) -> Option<usize> {
        let now = self.clock.now();
        let target = &self.target;

        match panic::catch_unwind(AssertUnwindSafe(|| target.sweep(now))) {
            Ok(Ok(removed)) => {
                if removed > 0 {
                    info!(removed, event = "otp_sweep", "Expired verification records removed");
                }
                Some(removed)
            }
            Ok(Err(e)) => {
                error!(error = %e, event = "otp_sweep_failed", "Verification sweep failed");
                None
            }
            Err(_) => {
                error!(event = "otp_sweep_panicked", "Verification sweep panicked");
                None
            }
        }
    }

    /// Spawn the sweeper as a background task.
    ///
    /// The first sweep happens one full interval after start. The returned
    /// handle stops the task.
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
        // tokio intervals must be non-zero
        let interval = self.interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            info!(
                interval_seconds = interval.as_secs(),
                "Verification sweeper started"
            );

            let mut timer = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        self.run_once();
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Verification sweeper shutting down");
                        break;
                    }
                }
            }
        });

        SweeperHandle { shutdown_tx, task }
    }
}

/// Handle to a running [`ExpirySweeper`]
pub struct SweeperHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper to stop and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "Verification sweeper task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
