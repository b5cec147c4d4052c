//! 数据仓储层接口定义
//!
//! The scheduling core never owns durable state. It reads and writes through
//! two repository traits supplied by the host:
//!
//! - [`HistoryStore`] - append-only store of finished executions, the input
//!   of every prediction
//! - [`TaskSource`] - the task-lifecycle layer, owner of [`TaskRecord`]
//!
//! ## Conditional terminal writes
//!
//! The `mark_*` methods of [`TaskSource`] must only move a task that is still
//! `Running`, and report whether they did. The monitor treats `Ok(true)` as
//! the commit point of a terminal transition: only the caller that won the
//! write persists history and updates reputation, so a scheduled sweep racing
//! a manual re-check produces a single history row.
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! async fn recent_samples(store: &dyn HistoryStore) -> SchedulerResult<Vec<i64>> {
//!     let records = store.find_by_service("svc1", true).await?;
//!     Ok(records
//!         .iter()
//!         .filter(|r| r.is_completed())
//!         .filter_map(|r| r.positive_duration())
//!         .take(20)
//!         .collect())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{HistoryRecord, TaskRecord, TaskStatus};
use crate::SchedulerResult;

/// 任务历史仓储接口
///
/// Append-only record store of finished task executions.
///
/// # 线程安全
///
/// 此trait要求实现 `Send + Sync`，确保可以在多线程环境中安全使用。
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// All records of a service. With `most_recent_first` the records are
    /// ordered by `created_at` descending, records without a creation time last.
    async fn find_by_service(
        &self,
        service_id: &str,
        most_recent_first: bool,
    ) -> SchedulerResult<Vec<HistoryRecord>>;

    /// All records submitted by a user.
    async fn find_by_user(&self, user_id: &str) -> SchedulerResult<Vec<HistoryRecord>>;

    /// All records with the given final status.
    async fn find_by_status(&self, status: TaskStatus) -> SchedulerResult<Vec<HistoryRecord>>;

    /// Records whose `created_at` lies in `[start, end]`.
    async fn find_by_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulerResult<Vec<HistoryRecord>>;

    /// Mean `actual_time` over the service's completed records, `None` if
    /// there are none.
    async fn average_actual_time(&self, service_id: &str) -> SchedulerResult<Option<f64>>;

    /// Append a record and return it with its store-assigned id.
    async fn save(&self, record: &HistoryRecord) -> SchedulerResult<HistoryRecord>;
}

/// 任务仓储接口
///
/// Read access to tasks plus the three conditional terminal writes.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn list_by_status(&self, status: TaskStatus) -> SchedulerResult<Vec<TaskRecord>>;

    async fn get_by_id(&self, task_id: &str) -> SchedulerResult<Option<TaskRecord>>;

    /// Running → Completed with the result hash. Returns `false` if the task
    /// was no longer running.
    async fn mark_result(&self, task_id: &str, result_hash: Option<&str>) -> SchedulerResult<bool>;

    /// Running → Failed with an error message. Returns `false` if the task
    /// was no longer running.
    async fn mark_error(&self, task_id: &str, message: &str) -> SchedulerResult<bool>;

    /// Running → Timeout with an error message. Returns `false` if the task
    /// was no longer running.
    async fn mark_timeout(&self, task_id: &str, message: &str) -> SchedulerResult<bool>;
}
