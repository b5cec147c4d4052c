use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::forecast::ResourceRequirement;
use super::task::{TaskRecord, TaskStatus, TerminalKind};

/// One finished task execution. Written exactly once per terminal task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub id: i64,
    pub task_id: String,
    pub external_task_id: String,
    pub service_id: String,
    pub user_id: String,
    pub final_status: TaskStatus,
    #[serde(default)]
    pub estimated_time: Option<i64>,
    /// Seconds from `created_at` to `completed_at`.
    #[serde(default)]
    pub actual_time: Option<i64>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub resource_requirement: Option<ResourceRequirement>,
    #[serde(default)]
    pub cost_amount: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result_hash: Option<String>,
}

impl HistoryRecord {
    /// Build the history row for a task that just reached `kind`.
    pub fn from_terminal(
        task: &TaskRecord,
        kind: TerminalKind,
        result_hash: Option<String>,
        error_message: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let actual_time = task
            .created_at
            .map(|created_at| (completed_at - created_at).num_seconds());

        Self {
            id: 0, // 将由存储层生成
            task_id: task.task_id.clone(),
            external_task_id: task.external_task_id.clone(),
            service_id: task.service_id.clone(),
            user_id: task.user_id.clone(),
            final_status: kind.status(),
            estimated_time: None,
            actual_time,
            priority: None,
            resource_requirement: None,
            cost_amount: None,
            created_at: task.created_at,
            started_at: None,
            completed_at,
            error_message,
            result_hash,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.final_status == TaskStatus::Completed
    }

    /// Duration usable as a prediction sample.
    pub fn positive_duration(&self) -> Option<i64> {
        self.actual_time.filter(|seconds| *seconds > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn actual_time_spans_creation_to_completion() {
        let now = Utc::now();
        let mut task = TaskRecord::new("task-7", "0x07", "svc1", "0xuser");
        task.status = TaskStatus::Running;
        task.created_at = Some(now - Duration::seconds(125));

        let record = HistoryRecord::from_terminal(
            &task,
            TerminalKind::Completed,
            Some("ipfs://result".to_string()),
            None,
            now,
        );

        assert_eq!(record.actual_time, Some(125));
        assert_eq!(record.final_status, TaskStatus::Completed);
        assert_eq!(record.service_id, "svc1");
        assert_eq!(record.result_hash.as_deref(), Some("ipfs://result"));
        assert!(record.error_message.is_none());
    }

    #[test]
    fn unknown_creation_time_leaves_actual_time_unset() {
        let mut task = TaskRecord::new("task-8", "0x08", "svc1", "0xuser");
        task.created_at = None;

        let record = HistoryRecord::from_terminal(
            &task,
            TerminalKind::Timeout,
            None,
            Some("timeout".to_string()),
            Utc::now(),
        );

        assert!(record.actual_time.is_none());
        assert!(record.positive_duration().is_none());
        assert_eq!(record.final_status, TaskStatus::Timeout);
    }
}
