use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use compute_scheduler_core::{ReputationStore, SchedulerResult};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One reputation change reported by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationUpdate {
    pub user_id: String,
    pub completed: bool,
    pub on_time: bool,
    pub quality_score: f64,
}

#[derive(Debug, Default)]
struct ReputationState {
    scores: HashMap<String, f64>,
    samples: HashMap<String, u32>,
    updates: Vec<ReputationUpdate>,
}

/// 内存信誉仓储
///
/// A user's score is the running mean of every quality score reported for
/// them, with a seeded score counting as the first sample.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReputationStore {
    state: Arc<RwLock<ReputationState>>,
}

impl InMemoryReputationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scores(scores: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut state = ReputationState::default();
        for (user_id, score) in scores {
            state.samples.insert(user_id.clone(), 1);
            state.scores.insert(user_id, score.clamp(0.0, 1.0));
        }
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn updates(&self) -> Vec<ReputationUpdate> {
        self.state.read().await.updates.clone()
    }

    pub async fn scores(&self) -> HashMap<String, f64> {
        self.state.read().await.scores.clone()
    }
}

#[async_trait]
impl ReputationStore for InMemoryReputationStore {
    async fn get_score(&self, user_id: &str) -> SchedulerResult<Option<f64>> {
        Ok(self.state.read().await.scores.get(user_id).copied())
    }

    async fn update(
        &self,
        user_id: &str,
        completed: bool,
        on_time: bool,
        quality_score: f64,
    ) -> SchedulerResult<()> {
        let mut state = self.state.write().await;
        let quality = quality_score.clamp(0.0, 1.0);

        let samples = state.samples.entry(user_id.to_string()).or_insert(0);
        *samples += 1;
        let n = f64::from(*samples);

        let score = state.scores.entry(user_id.to_string()).or_insert(0.0);
        *score += (quality - *score) / n;

        state.updates.push(ReputationUpdate {
            user_id: user_id.to_string(),
            completed,
            on_time,
            quality_score,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_has_no_score() {
        let store = InMemoryReputationStore::new();
        assert_eq!(store.get_score("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_blends_with_seeded_score() {
        let store = InMemoryReputationStore::with_scores([("alice".to_string(), 0.5)]);
        store.update("alice", false, false, 0.0).await.unwrap();

        let score = store.get_score("alice").await.unwrap().unwrap();
        assert!((score - 0.25).abs() < 1e-9);
        assert_eq!(store.updates().await.len(), 1);
    }

    #[tokio::test]
    async fn test_first_update_sets_score() {
        let store = InMemoryReputationStore::new();
        store.update("bob", true, true, 0.9).await.unwrap();
        let score = store.get_score("bob").await.unwrap().unwrap();
        assert!((score - 0.9).abs() < 1e-9);
    }
}
