use async_trait::async_trait;

use crate::models::NetworkTaskStatus;
use crate::SchedulerResult;

/// Queries the compute network for the state of a dispatched task.
///
/// Implementations normalize whatever the network client returns. An
/// unreachable network, an unparseable answer and an unknown task are all
/// errors; the monitor treats every one of them as "try again next sweep".
#[async_trait]
pub trait StatusProvider: Send + Sync {
    async fn get_status(&self, external_task_id: &str) -> SchedulerResult<NetworkTaskStatus>;
}
