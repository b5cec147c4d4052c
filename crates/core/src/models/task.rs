use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A task dispatched to the compute network, as seen by the lifecycle layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub external_task_id: String,
    pub service_id: String,
    pub user_id: String,
    pub status: TaskStatus,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result_hash: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "TIMEOUT")]
    Timeout,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Timeout
        )
    }

    /// Status transitions are monotone: terminal states are never left.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        match (self, next) {
            (TaskStatus::Pending, TaskStatus::Running) => true,
            (TaskStatus::Running, next) => next.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three ways a running task can end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    Completed,
    Failed,
    Timeout,
}

impl TerminalKind {
    pub fn status(&self) -> TaskStatus {
        match self {
            TerminalKind::Completed => TaskStatus::Completed,
            TerminalKind::Failed => TaskStatus::Failed,
            TerminalKind::Timeout => TaskStatus::Timeout,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TerminalKind::Completed)
    }

    /// Quality score reported to the reputation store.
    pub fn quality_score(&self) -> f64 {
        match self {
            TerminalKind::Completed => 0.9,
            TerminalKind::Failed | TerminalKind::Timeout => 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TerminalKind::Completed => "completed",
            TerminalKind::Failed => "failed",
            TerminalKind::Timeout => "timeout",
        }
    }
}

/// What the ledger is told once a task has been settled locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainOutcome {
    Complete { result_hash: Option<String> },
    Refund { reason: String },
}

impl TaskRecord {
    pub fn new(
        task_id: impl Into<String>,
        external_task_id: impl Into<String>,
        service_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            external_task_id: external_task_id.into(),
            service_id: service_id.into(),
            user_id: user_id.into(),
            status: TaskStatus::Pending,
            created_at: Some(Utc::now()),
            result_hash: None,
            error_message: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }

    /// Time elapsed since creation, `None` when the creation time is unknown.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.created_at.map(|created_at| now - created_at)
    }

    /// A task without a creation time never times out.
    pub fn is_timed_out(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.age(now).is_some_and(|age| age > timeout)
    }
}
