use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use compute_scheduler_core::{SchedulerResult, TaskRecord, TaskSource, TaskStatus};
use tokio::sync::RwLock;
use tracing::debug;

/// 内存任务仓储
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskSource {
    tasks: Arc<RwLock<HashMap<String, TaskRecord>>>,
}

impl InMemoryTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = TaskRecord>) -> Self {
        let tasks = tasks
            .into_iter()
            .map(|task| (task.task_id.clone(), task))
            .collect();
        Self {
            tasks: Arc::new(RwLock::new(tasks)),
        }
    }

    /// Insert or replace a task.
    pub async fn insert(&self, task: TaskRecord) {
        self.tasks.write().await.insert(task.task_id.clone(), task);
    }

    pub async fn all(&self) -> Vec<TaskRecord> {
        let mut tasks: Vec<TaskRecord> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by(|a, b| a.task_id.cmp(&b.task_id));
        tasks
    }

    /// Apply `update` only if the task is still running.
    async fn settle_if_running(
        &self,
        task_id: &str,
        status: TaskStatus,
        update: impl FnOnce(&mut TaskRecord),
    ) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(task) if task.status.can_transition_to(status) => {
                task.status = status;
                update(task);
                true
            }
            Some(task) => {
                debug!("Task {task_id} is {}, not moving to {status}", task.status);
                false
            }
            None => false,
        }
    }
}

#[async_trait]
impl TaskSource for InMemoryTaskSource {
    async fn list_by_status(&self, status: TaskStatus) -> SchedulerResult<Vec<TaskRecord>> {
        let mut tasks: Vec<TaskRecord> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| task.status == status)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    async fn get_by_id(&self, task_id: &str) -> SchedulerResult<Option<TaskRecord>> {
        Ok(self.tasks.read().await.get(task_id).cloned())
    }

    async fn mark_result(&self, task_id: &str, result_hash: Option<&str>) -> SchedulerResult<bool> {
        Ok(self
            .settle_if_running(task_id, TaskStatus::Completed, |task| {
                task.result_hash = result_hash.map(str::to_string);
            })
            .await)
    }

    async fn mark_error(&self, task_id: &str, message: &str) -> SchedulerResult<bool> {
        Ok(self
            .settle_if_running(task_id, TaskStatus::Failed, |task| {
                task.error_message = Some(message.to_string());
            })
            .await)
    }

    async fn mark_timeout(&self, task_id: &str, message: &str) -> SchedulerResult<bool> {
        Ok(self
            .settle_if_running(task_id, TaskStatus::Timeout, |task| {
                task.error_message = Some(message.to_string());
            })
            .await)
    }
}
