//! Background expiry sweeps

use super::store::ArtifactStore;
use super::types::SweepReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle to a running sweeper task.
///
/// Dropping the handle stops the task at its next wake-up because the
/// shutdown channel closes.
pub struct Sweeper {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
    startup: SweepReport,
    completed: Arc<AtomicU64>,
}

impl Sweeper {
    /// Run one sweep immediately, then spawn a task sweeping every `interval`.
    pub async fn start(store: ArtifactStore, interval: Duration) -> Self {
        let startup = store.sweep_once().await;
        let completed = Arc::new(AtomicU64::new(1));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let counter = Arc::clone(&completed);

        let handle = tokio::spawn(async move {
            // first tick one full interval after the startup sweep
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = store.sweep_once().await;
                        counter.fetch_add(1, Ordering::Relaxed);
                        if report.errors > 0 {
                            warn!(errors = report.errors, "Artifact sweep finished with errors");
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("Artifact sweeper shutting down");
                        break;
                    }
                }
            }
        });

        info!(
            interval_secs = interval.as_secs_f64(),
            startup_deleted = startup.deleted,
            "Artifact sweeper started"
        );

        Self {
            shutdown_tx: Some(shutdown_tx),
            handle,
            startup,
            completed,
        }
    }

    /// Report of the sweep run at startup.
    pub fn startup_report(&self) -> &SweepReport {
        &self.startup
    }

    /// Number of sweeps finished so far, the startup sweep included.
    pub fn completed_sweeps(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Signal the task and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            warn!(error = %e, "Artifact sweeper task ended abnormally");
        } else {
            debug!("Artifact sweeper stopped");
        }
    }
}
