//! Structured logging utilities
//!
//! Event-named log records for the sweep and the advisory computations.
//! Every record carries an `event` field so log pipelines can filter on it.

use tracing::{debug, error, info, warn};

use crate::models::{TaskRecord, TerminalKind};

/// Structured logging utilities
pub struct StructuredLogger;

impl StructuredLogger {
    /// Log the start of a monitoring sweep
    pub fn log_sweep_started(running_tasks: usize) {
        info!(
            event = "sweep_started",
            sweep.running_tasks = running_tasks,
            "Monitoring running tasks"
        );
    }

    /// Log the end of a monitoring sweep
    pub fn log_sweep_completed(
        examined: usize,
        transitioned: usize,
        skipped: usize,
        duration_ms: u64,
    ) {
        info!(
            event = "sweep_completed",
            sweep.examined = examined,
            sweep.transitioned = transitioned,
            sweep.skipped = skipped,
            sweep.duration_ms = duration_ms,
            "Monitoring sweep finished"
        );
    }

    /// Log a terminal transition
    pub fn log_task_transitioned(task: &TaskRecord, kind: TerminalKind, detail: Option<&str>) {
        match kind {
            TerminalKind::Completed => info!(
                event = "task_transitioned",
                task.id = %task.task_id,
                task.external_id = %task.external_task_id,
                task.outcome = kind.label(),
                task.result = detail.unwrap_or(""),
                "Task completed"
            ),
            TerminalKind::Failed => error!(
                event = "task_transitioned",
                task.id = %task.task_id,
                task.external_id = %task.external_task_id,
                task.outcome = kind.label(),
                task.error = detail.unwrap_or("Unknown error"),
                "Task failed"
            ),
            TerminalKind::Timeout => warn!(
                event = "task_transitioned",
                task.id = %task.task_id,
                task.external_id = %task.external_task_id,
                task.outcome = kind.label(),
                task.error = detail.unwrap_or("Unknown error"),
                "Task timed out"
            ),
        }
    }

    /// Log a status query that will be retried next sweep
    pub fn log_status_query_failed(task: &TaskRecord, reason: &str) {
        warn!(
            event = "status_query_failed",
            task.id = %task.task_id,
            task.external_id = %task.external_task_id,
            error = reason,
            "Failed to get network status, retrying next sweep"
        );
    }

    /// Log a swallowed failure of a terminal side effect
    pub fn log_side_effect_failed(task_id: &str, side_effect: &str, reason: &str) {
        error!(
            event = "side_effect_failed",
            task.id = task_id,
            side_effect = side_effect,
            error = reason,
            "Terminal side effect failed"
        );
    }

    /// Log a completion-time prediction
    pub fn log_prediction_computed(service_id: &str, predicted_seconds: u64, samples: usize) {
        info!(
            event = "prediction_computed",
            service.id = service_id,
            prediction.seconds = predicted_seconds,
            prediction.samples = samples,
            "Predicted completion time"
        );
    }

    /// Log a priority computation with its components
    pub fn log_priority_computed(
        task_id: &str,
        priority: i64,
        reputation: i64,
        waiting: i64,
        payment: i64,
        success_rate: i64,
    ) {
        debug!(
            event = "priority_computed",
            task.id = task_id,
            priority.total = priority,
            priority.reputation = reputation,
            priority.waiting = waiting,
            priority.payment = payment,
            priority.success_rate = success_rate,
            "Task priority calculated"
        );
    }
}
