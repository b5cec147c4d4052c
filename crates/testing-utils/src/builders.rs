//! Test data builders
//!
//! Builders start from a valid record and let a test change only what it
//! cares about.

use chrono::{DateTime, Duration, Utc};
use compute_scheduler_core::{
    HistoryRecord, ResourceRequirement, TaskRecord, TaskStatus,
};

/// Builder for [`TaskRecord`]. Defaults to a running task created just now.
pub struct TaskRecordBuilder {
    task: TaskRecord,
}

impl TaskRecordBuilder {
    pub fn new(task_id: &str) -> Self {
        let mut task = TaskRecord::new(task_id, format!("0x{task_id}"), "svc1", "0xuser");
        task.status = TaskStatus::Running;
        Self { task }
    }

    pub fn with_external_id(mut self, external_task_id: &str) -> Self {
        self.task.external_task_id = external_task_id.to_string();
        self
    }

    pub fn with_service(mut self, service_id: &str) -> Self {
        self.task.service_id = service_id.to_string();
        self
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.task.user_id = user_id.to_string();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn created_minutes_ago(mut self, minutes: i64) -> Self {
        self.task.created_at = Some(Utc::now() - Duration::minutes(minutes));
        self
    }

    pub fn with_created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.task.created_at = created_at;
        self
    }

    pub fn build(self) -> TaskRecord {
        self.task
    }
}

/// Builder for [`HistoryRecord`]. Defaults to a completed run of `svc1`
/// that took 60 seconds and was created a minute ago.
pub struct HistoryRecordBuilder {
    record: HistoryRecord,
}

impl HistoryRecordBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            record: HistoryRecord {
                id: 0,
                task_id: "task".to_string(),
                external_task_id: "0xtask".to_string(),
                service_id: "svc1".to_string(),
                user_id: "0xuser".to_string(),
                final_status: TaskStatus::Completed,
                estimated_time: None,
                actual_time: Some(60),
                priority: None,
                resource_requirement: None,
                cost_amount: None,
                created_at: Some(now - Duration::minutes(1)),
                started_at: None,
                completed_at: now,
                error_message: None,
                result_hash: None,
            },
        }
    }

    pub fn with_task_id(mut self, task_id: &str) -> Self {
        self.record.task_id = task_id.to_string();
        self
    }

    pub fn with_service(mut self, service_id: &str) -> Self {
        self.record.service_id = service_id.to_string();
        self
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.record.user_id = user_id.to_string();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.record.final_status = status;
        self
    }

    pub fn with_actual_time(mut self, seconds: Option<i64>) -> Self {
        self.record.actual_time = seconds;
        self
    }

    pub fn created_minutes_ago(mut self, minutes: i64) -> Self {
        self.record.created_at = Some(Utc::now() - Duration::minutes(minutes));
        self
    }

    pub fn with_created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.record.created_at = created_at;
        self
    }

    pub fn with_resources(mut self, requirement: ResourceRequirement) -> Self {
        self.record.resource_requirement = Some(requirement);
        self
    }

    pub fn build(self) -> HistoryRecord {
        self.record
    }
}

impl Default for HistoryRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
