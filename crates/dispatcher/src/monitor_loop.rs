use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::monitor::{SweepReport, TaskMonitor};

/// Runs the monitor sweep repeatedly.
///
/// The next sweep is scheduled only after the current one returns, so two
/// sweeps never overlap. A shutdown signal is honoured between sweeps; a
/// sweep in progress is allowed to finish.
pub struct MonitorLoop {
    monitor: Arc<TaskMonitor>,
    interval: Duration,
    reports: Option<mpsc::UnboundedSender<SweepReport>>,
}

impl MonitorLoop {
    pub fn new(monitor: Arc<TaskMonitor>) -> Self {
        let interval = monitor.config().sweep_interval();
        Self {
            monitor,
            interval,
            reports: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Publish every sweep report on `sender` once the sweep returns.
    pub fn with_report_sender(mut self, sender: mpsc::UnboundedSender<SweepReport>) -> Self {
        self.reports = Some(sender);
        self
    }

    /// Sweep until `shutdown_rx` fires or its sender is dropped. Returns the
    /// number of sweeps run.
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> u64 {
        info!("Starting monitor loop with interval {:?}", self.interval);
        let mut sweeps = 0;
        let mut reports = self.reports.clone();

        loop {
            let report = self.monitor.monitor_running_tasks().await;
            sweeps += 1;
            if report.examined > 0 || !report.diagnostics.is_empty() {
                debug!(
                    sweep = sweeps,
                    examined = report.examined,
                    transitioned = report.transitioned(),
                    diagnostics = report.diagnostics.len(),
                    "Sweep finished"
                );
            }
            let delivered = reports.as_ref().map(|sender| sender.send(report).is_ok());
            if delivered == Some(false) {
                warn!("Sweep report receiver dropped, no longer publishing reports");
                reports = None;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_rx.recv() => {
                    info!("Monitor loop received shutdown signal");
                    break;
                }
            }
        }

        info!("Monitor loop stopped after {sweeps} sweeps");
        sweeps
    }
}
