//! Timeout handling for external status queries
//!
//! A slow network call must not stall the sweep. Queries that exceed the
//! configured budget are reported as [`SchedulerError::StatusQueryTimeout`],
//! which the monitor treats like any other failed query.

use std::future::Future;
use std::time::Duration;

use compute_scheduler_core::{SchedulerError, SchedulerResult};
use tokio::time::timeout;
use tracing::{instrument, warn};

#[derive(Debug, Clone, Copy)]
pub struct TimeoutHandler {
    status_query_timeout: Duration,
}

impl TimeoutHandler {
    pub fn new(status_query_timeout: Duration) -> Self {
        Self {
            status_query_timeout,
        }
    }

    pub fn status_query_timeout(&self) -> Duration {
        self.status_query_timeout
    }

    /// Execute a status query with the configured timeout
    #[instrument(skip(self, operation))]
    pub async fn status_query<F, T>(&self, operation: F, external_task_id: &str) -> SchedulerResult<T>
    where
        F: Future<Output = SchedulerResult<T>>,
    {
        match timeout(self.status_query_timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "status query for '{external_task_id}' timed out after {:?}",
                    self.status_query_timeout
                );
                Err(SchedulerError::StatusQueryTimeout {
                    external_task_id: external_task_id.to_string(),
                    timeout_seconds: self.status_query_timeout.as_secs(),
                })
            }
        }
    }
}
