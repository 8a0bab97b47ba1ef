//! Interval scheduler driving unforced refresh cycles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{error, info, warn};

use jobscout_core::{Error, Result};

use crate::refresh::RefreshPipeline;

/// Default seconds between scheduled refresh attempts (daily cadence; the
/// freshness gate inside the pipeline absorbs anything more frequent).
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 86_400;

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between refresh attempts.
    pub interval_secs: u64,
    /// Whether scheduled refreshes run at all.
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            enabled: true,
        }
    }
}

impl SchedulerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOBSCOUT_SCHEDULER_ENABLED` | `true` | Enable/disable scheduled refreshes |
    /// | `JOBSCOUT_REFRESH_INTERVAL_SECS` | `86400` | Seconds between attempts |
    pub fn from_env() -> Self {
        let enabled = std::env::var("JOBSCOUT_SCHEDULER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let interval_secs = std::env::var("JOBSCOUT_REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS)
            .max(1);

        Self {
            interval_secs,
            enabled,
        }
    }

    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }
}

/// Handle for controlling a running scheduler.
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    /// Signal the scheduler to shut down gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("Failed to send shutdown signal".into()))
    }
}

/// Timer loop running unforced refresh cycles until shut down.
pub struct RefreshScheduler {
    pipeline: Arc<RefreshPipeline>,
    config: SchedulerConfig,
}

impl RefreshScheduler {
    pub fn new(pipeline: Arc<RefreshPipeline>, config: SchedulerConfig) -> Self {
        Self { pipeline, config }
    }

    /// Start the scheduler and return a handle for control.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        SchedulerHandle { shutdown_tx }
    }

    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            warn!("Refresh scheduler disabled by config");
            return;
        }

        info!(
            interval_secs = self.config.interval_secs,
            "Refresh scheduler started"
        );

        loop {
            tokio::select! {
                _ = sleep(Duration::from_secs(self.config.interval_secs)) => {
                    // Cycle-level failures come back as outcomes; nothing
                    // here can take the scheduler down.
                    let outcome = self.pipeline.run(false).await;
                    if outcome.success {
                        info!(
                            added = outcome.added_new_jobs,
                            deleted = outcome.deleted_old_jobs,
                            total = outcome.total_jobs,
                            "Scheduled refresh finished"
                        );
                    } else {
                        error!(
                            error = outcome.error.as_deref().unwrap_or("unknown"),
                            deleted = outcome.deleted_old_jobs,
                            "Scheduled refresh failed"
                        );
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Refresh scheduler stopped");
                    break;
                }
            }
        }
    }
}
