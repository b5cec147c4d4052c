use async_trait::async_trait;

use crate::SchedulerResult;

/// User reputation, a score in `[0, 1]`.
#[async_trait]
pub trait ReputationStore: Send + Sync {
    /// `None` when the user has no reputation record yet.
    async fn get_score(&self, user_id: &str) -> SchedulerResult<Option<f64>>;

    async fn update(
        &self,
        user_id: &str,
        completed: bool,
        on_time: bool,
        quality_score: f64,
    ) -> SchedulerResult<()>;
}
