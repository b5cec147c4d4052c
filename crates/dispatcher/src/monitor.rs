use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use compute_scheduler_core::{
    Advisory, ChainOutcome, HistoryRecord, HistoryStore, LedgerHook, MonitorConfig,
    MonitoringStats, NetworkState, NoopLedgerHook, ReputationStore, StatusProvider,
    StructuredLogger, TaskRecord, TaskSource, TaskStatus, TerminalKind,
};
use futures::{stream, FutureExt, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::metrics::MonitorMetrics;
use crate::timeout_handler::TimeoutHandler;

/// Result of checking a single running task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TaskCheck {
    /// This check won the conditional write and moved the task.
    Transitioned(TerminalKind),
    /// The network still reports a non-terminal state.
    StillRunning(NetworkState),
    /// Nothing was written; the next sweep will look again.
    Skipped { reason: String },
    /// Another check settled the task first.
    AlreadySettled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDiagnostic {
    /// `None` for sweep-level problems.
    pub task_id: Option<String>,
    pub message: String,
}

/// Summary of one pass over the running tasks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub completed: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub still_running: usize,
    pub skipped: usize,
    pub already_settled: usize,
    pub diagnostics: Vec<TaskDiagnostic>,
    pub duration_ms: u64,
}

impl SweepReport {
    pub fn transitioned(&self) -> usize {
        self.completed + self.failed + self.timed_out
    }

    fn sweep_error(&mut self, message: String) {
        self.diagnostics.push(TaskDiagnostic {
            task_id: None,
            message,
        });
    }

    fn record(&mut self, task_id: String, evaluation: TaskEvaluation) {
        self.examined += 1;
        match &evaluation.check {
            TaskCheck::Transitioned(TerminalKind::Completed) => self.completed += 1,
            TaskCheck::Transitioned(TerminalKind::Failed) => self.failed += 1,
            TaskCheck::Transitioned(TerminalKind::Timeout) => self.timed_out += 1,
            TaskCheck::StillRunning(_) => self.still_running += 1,
            TaskCheck::AlreadySettled => self.already_settled += 1,
            TaskCheck::Skipped { reason } => {
                self.skipped += 1;
                self.diagnostics.push(TaskDiagnostic {
                    task_id: Some(task_id.clone()),
                    message: reason.clone(),
                });
            }
        }
        self.diagnostics
            .extend(evaluation.diagnostics.into_iter().map(|message| TaskDiagnostic {
                task_id: Some(task_id.clone()),
                message,
            }));
    }
}

struct TaskEvaluation {
    check: TaskCheck,
    /// Side effects that failed after the status write succeeded.
    diagnostics: Vec<String>,
}

impl TaskEvaluation {
    fn new(check: TaskCheck) -> Self {
        Self {
            check,
            diagnostics: Vec::new(),
        }
    }

    fn skipped(reason: impl Into<String>) -> Self {
        Self::new(TaskCheck::Skipped {
            reason: reason.into(),
        })
    }
}

/// Drives running tasks to a terminal state.
///
/// The conditional status write on the [`TaskSource`] is the commit point:
/// only the check that wins it records history, updates reputation and
/// calls the ledger hook. Those follow-up writes are attempted once and
/// their failures land in the sweep diagnostics.
pub struct TaskMonitor {
    task_source: Arc<dyn TaskSource>,
    history_store: Arc<dyn HistoryStore>,
    reputation_store: Arc<dyn ReputationStore>,
    status_provider: Arc<dyn StatusProvider>,
    ledger: Arc<dyn LedgerHook>,
    config: MonitorConfig,
    timeout_handler: TimeoutHandler,
    metrics: MonitorMetrics,
}

impl TaskMonitor {
    pub fn new(
        task_source: Arc<dyn TaskSource>,
        history_store: Arc<dyn HistoryStore>,
        reputation_store: Arc<dyn ReputationStore>,
        status_provider: Arc<dyn StatusProvider>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            task_source,
            history_store,
            reputation_store,
            status_provider,
            ledger: Arc::new(NoopLedgerHook),
            timeout_handler: TimeoutHandler::new(config.status_query_timeout()),
            config,
            metrics: MonitorMetrics::new(),
        }
    }

    pub fn with_ledger_hook(mut self, ledger: Arc<dyn LedgerHook>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn is_timed_out(&self, task: &TaskRecord, now: DateTime<Utc>) -> bool {
        task.is_timed_out(now, self.config.task_timeout())
    }

    /// Check every running task once.
    pub async fn monitor_running_tasks(&self) -> SweepReport {
        let started = Instant::now();
        let mut report = SweepReport::default();

        let running = match self.task_source.list_by_status(TaskStatus::Running).await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("Failed to list running tasks: {e}");
                report.sweep_error(format!("failed to list running tasks: {e}"));
                return report;
            }
        };

        if running.is_empty() {
            debug!("No running tasks to monitor");
            return report;
        }

        let running = dedupe_by_task_id(running);
        StructuredLogger::log_sweep_started(running.len());

        let evaluations: Vec<(String, TaskEvaluation)> = stream::iter(running)
            .map(|task| async move {
                let task_id = task.task_id.clone();
                (task_id, self.check_task_isolated(task).await)
            })
            .buffer_unordered(self.config.max_parallel_checks.max(1))
            .collect()
            .await;

        for (task_id, evaluation) in evaluations {
            report.record(task_id, evaluation);
        }

        let elapsed = started.elapsed();
        report.duration_ms = elapsed.as_millis() as u64;
        self.metrics.record_sweep(elapsed.as_secs_f64());
        StructuredLogger::log_sweep_completed(
            report.examined,
            report.transitioned(),
            report.skipped,
            report.duration_ms,
        );

        report
    }

    /// Check one task on demand. Does nothing unless the task exists and
    /// is running.
    pub async fn trigger_manual_monitoring(&self, task_id: &str) -> Advisory<Option<TaskCheck>> {
        info!("Manual monitoring triggered for task: {task_id}");

        let task = match self.task_source.get_by_id(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                warn!("Task {task_id} not found, nothing to monitor");
                return Advisory::ok(None);
            }
            Err(e) => {
                error!("Failed to load task {task_id}: {e}");
                return Advisory::degraded(None, format!("failed to load task {task_id}: {e}"));
            }
        };

        if !task.is_running() {
            info!("Task {task_id} is {}, nothing to monitor", task.status);
            return Advisory::ok(None);
        }

        let evaluation = self.check_task_isolated(task).await;
        Advisory::with_diagnostics(Some(evaluation.check), evaluation.diagnostics)
    }

    pub async fn get_monitoring_stats(&self) -> Advisory<MonitoringStats> {
        let now = Utc::now();
        let mut stats = MonitoringStats::default();
        let mut diagnostics = Vec::new();

        match self.task_source.list_by_status(TaskStatus::Running).await {
            Ok(running) => {
                stats.running_count = running.len();
                stats.timeout_count = running
                    .iter()
                    .filter(|task| self.is_timed_out(task, now))
                    .count();
            }
            Err(e) => diagnostics.push(format!("running tasks unavailable: {e}")),
        }

        match self.history_store.find_by_status(TaskStatus::Completed).await {
            Ok(records) => stats.completed_count = records.len(),
            Err(e) => diagnostics.push(format!("completed history unavailable: {e}")),
        }

        match self.history_store.find_by_status(TaskStatus::Failed).await {
            Ok(records) => stats.failed_count = records.len(),
            Err(e) => diagnostics.push(format!("failed history unavailable: {e}")),
        }

        Advisory::with_diagnostics(stats, diagnostics)
    }

    async fn check_task_isolated(&self, task: TaskRecord) -> TaskEvaluation {
        let task_id = task.task_id.clone();
        match AssertUnwindSafe(self.check_task(task)).catch_unwind().await {
            Ok(evaluation) => evaluation,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(task.id = %task_id, "Task check panicked: {message}");
                TaskEvaluation::skipped(format!("task check panicked: {message}"))
            }
        }
    }

    async fn check_task(&self, task: TaskRecord) -> TaskEvaluation {
        let now = Utc::now();
        if self.is_timed_out(&task, now) {
            let message = format!(
                "task execution timeout after {} minutes",
                self.config.task_timeout_minutes()
            );
            return self
                .settle(&task, TerminalKind::Timeout, None, Some(message), now)
                .await;
        }

        let status = match self
            .timeout_handler
            .status_query(
                self.status_provider.get_status(&task.external_task_id),
                &task.external_task_id,
            )
            .await
        {
            Ok(status) => status,
            Err(e) => {
                self.metrics.record_status_query_failure();
                StructuredLogger::log_status_query_failed(&task, &e.to_string());
                return TaskEvaluation::skipped(format!("status query failed: {e}"));
            }
        };

        match status.state.terminal_kind() {
            Some(TerminalKind::Completed) => {
                self.settle(
                    &task,
                    TerminalKind::Completed,
                    status.result_location,
                    None,
                    Utc::now(),
                )
                .await
            }
            Some(kind) => {
                let message = format!("network task failed with status: {}", status.state);
                self.settle(&task, kind, None, Some(message), Utc::now())
                    .await
            }
            None => {
                debug!(
                    task.id = %task.task_id,
                    network.state = %status.state,
                    "Task still running on the network"
                );
                TaskEvaluation::new(TaskCheck::StillRunning(status.state))
            }
        }
    }

    async fn settle(
        &self,
        task: &TaskRecord,
        kind: TerminalKind,
        result_hash: Option<String>,
        error_message: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> TaskEvaluation {
        let reason = error_message.as_deref().unwrap_or_default();
        let written = match kind {
            TerminalKind::Completed => {
                self.task_source
                    .mark_result(&task.task_id, result_hash.as_deref())
                    .await
            }
            TerminalKind::Failed => self.task_source.mark_error(&task.task_id, reason).await,
            TerminalKind::Timeout => self.task_source.mark_timeout(&task.task_id, reason).await,
        };

        match written {
            Ok(true) => {}
            Ok(false) => {
                debug!(task.id = %task.task_id, "Task already settled by another check");
                return TaskEvaluation::new(TaskCheck::AlreadySettled);
            }
            Err(e) => {
                self.metrics.record_side_effect_failure("task_status");
                StructuredLogger::log_side_effect_failed(&task.task_id, "task_status", &e.to_string());
                return TaskEvaluation::skipped(format!(
                    "failed to record {} status: {e}",
                    kind.label()
                ));
            }
        }

        StructuredLogger::log_task_transitioned(
            task,
            kind,
            result_hash.as_deref().or(error_message.as_deref()),
        );
        self.metrics.record_transition(kind);

        let mut diagnostics = Vec::new();

        let history = HistoryRecord::from_terminal(
            task,
            kind,
            result_hash.clone(),
            error_message.clone(),
            completed_at,
        );
        let history_saved = match self.history_store.save(&history).await {
            Ok(saved) => {
                debug!(task.id = %task.task_id, history.id = saved.id, "History recorded");
                true
            }
            Err(e) => {
                self.side_effect_failed(&task.task_id, "history", &e.to_string(), &mut diagnostics);
                false
            }
        };

        let completed = kind.is_success();
        if let Err(e) = self
            .reputation_store
            .update(&task.user_id, completed, completed, kind.quality_score())
            .await
        {
            self.side_effect_failed(&task.task_id, "reputation", &e.to_string(), &mut diagnostics);
        }

        if history_saved {
            let outcome = match kind {
                TerminalKind::Completed => ChainOutcome::Complete { result_hash },
                TerminalKind::Failed | TerminalKind::Timeout => ChainOutcome::Refund {
                    reason: error_message.unwrap_or_default(),
                },
            };
            if let Err(e) = self.ledger.finalize_on_chain(&task.task_id, &outcome).await {
                self.side_effect_failed(&task.task_id, "ledger", &e.to_string(), &mut diagnostics);
            }
        } else {
            diagnostics.push("ledger finalization skipped: history not recorded".to_string());
        }

        TaskEvaluation {
            check: TaskCheck::Transitioned(kind),
            diagnostics,
        }
    }

    fn side_effect_failed(
        &self,
        task_id: &str,
        side_effect: &'static str,
        reason: &str,
        diagnostics: &mut Vec<String>,
    ) {
        self.metrics.record_side_effect_failure(side_effect);
        StructuredLogger::log_side_effect_failed(task_id, side_effect, reason);
        diagnostics.push(format!("{side_effect} update failed: {reason}"));
    }
}

fn dedupe_by_task_id(tasks: Vec<TaskRecord>) -> Vec<TaskRecord> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| seen.insert(task.task_id.clone()))
        .collect()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let mut first = TaskRecord::new("task-1", "0x01", "svc", "user");
        first.status = TaskStatus::Running;
        let mut duplicate = first.clone();
        duplicate.external_task_id = "0x99".to_string();
        let other = TaskRecord::new("task-2", "0x02", "svc", "user");

        let tasks = dedupe_by_task_id(vec![first, duplicate, other]);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].external_task_id, "0x01");
        assert_eq!(tasks[1].task_id, "task-2");
    }

    #[test]
    fn test_report_counts_and_diagnostics() {
        let mut report = SweepReport::default();
        report.record(
            "a".to_string(),
            TaskEvaluation::new(TaskCheck::Transitioned(TerminalKind::Completed)),
        );
        report.record(
            "b".to_string(),
            TaskEvaluation {
                check: TaskCheck::Transitioned(TerminalKind::Timeout),
                diagnostics: vec!["history update failed: disk full".to_string()],
            },
        );
        report.record("c".to_string(), TaskEvaluation::skipped("status query failed"));
        report.record("d".to_string(), TaskEvaluation::new(TaskCheck::AlreadySettled));

        assert_eq!(report.examined, 4);
        assert_eq!(report.transitioned(), 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.already_settled, 1);
        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(report.diagnostics[0].task_id.as_deref(), Some("b"));
        assert_eq!(report.diagnostics[1].task_id.as_deref(), Some("c"));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
