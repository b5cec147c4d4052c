use thiserror::Error;

/// 调度器错误类型定义
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("history store error: {0}")]
    HistoryStore(String),

    #[error("task source error: {0}")]
    TaskSource(String),

    #[error("reputation store error: {0}")]
    Reputation(String),

    #[error("status query failed for {external_task_id}: {message}")]
    StatusQuery {
        external_task_id: String,
        message: String,
    },

    #[error("status query for {external_task_id} timed out after {timeout_seconds}s")]
    StatusQueryTimeout {
        external_task_id: String,
        timeout_seconds: u64,
    },

    #[error("malformed status response: {0}")]
    MalformedStatus(String),

    #[error("ledger hook error: {0}")]
    Ledger(String),

    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedulerError {
    /// Errors that leave a task untouched until the next sweep.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SchedulerError::StatusQuery { .. }
                | SchedulerError::StatusQueryTimeout { .. }
                | SchedulerError::MalformedStatus(_)
        )
    }
}
