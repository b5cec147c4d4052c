use std::sync::Arc;

use chrono::{DateTime, Utc};
use compute_scheduler_core::{
    Advisory, HistoryStore, ReputationStore, SchedulerResult, StructuredLogger, TaskRecord,
};
use serde::Serialize;
use tracing::warn;

pub const BASE_PRIORITY: i64 = 100;
const MAX_REPUTATION_BONUS: f64 = 50.0;
const MAX_WAITING_BONUS: f64 = 50.0;
const WAITING_BONUS_PER_MINUTE: f64 = 0.5;
const PAYMENT_BONUS: i64 = 15;
const MAX_SUCCESS_RATE_BONUS: f64 = 20.0;
const NEW_USER_SUCCESS_BONUS: i64 = 10;

/// The components that make up a task's priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityBreakdown {
    pub base: i64,
    pub reputation: i64,
    pub waiting: i64,
    pub payment: i64,
    pub success_rate: i64,
}

impl PriorityBreakdown {
    pub fn total(&self) -> i64 {
        self.base + self.reputation + self.waiting + self.payment + self.success_rate
    }
}

/// Ranks pending tasks. Higher scores should be scheduled first.
pub struct PriorityScorer {
    reputation_store: Arc<dyn ReputationStore>,
    history_store: Arc<dyn HistoryStore>,
}

impl PriorityScorer {
    pub fn new(
        reputation_store: Arc<dyn ReputationStore>,
        history_store: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            reputation_store,
            history_store,
        }
    }

    pub async fn calculate_priority(&self, task: &TaskRecord) -> Advisory<i64> {
        self.priority_breakdown(task, Utc::now())
            .await
            .map(|breakdown| breakdown.total())
    }

    /// Score `task` as of `now`. A sub-score whose source cannot be read
    /// counts as zero and is reported in the diagnostics.
    pub async fn priority_breakdown(
        &self,
        task: &TaskRecord,
        now: DateTime<Utc>,
    ) -> Advisory<PriorityBreakdown> {
        let mut diagnostics = Vec::new();

        let reputation = match self.reputation_bonus(&task.user_id).await {
            Ok(bonus) => bonus,
            Err(e) => {
                warn!("Reputation unavailable for user {}: {e}", task.user_id);
                diagnostics.push(format!("reputation bonus unavailable for user {}: {e}", task.user_id));
                0
            }
        };

        let success_rate = match self.success_rate_bonus(&task.user_id).await {
            Ok(bonus) => bonus,
            Err(e) => {
                warn!("History unavailable for user {}: {e}", task.user_id);
                diagnostics.push(format!("success rate bonus unavailable for user {}: {e}", task.user_id));
                0
            }
        };

        let breakdown = PriorityBreakdown {
            base: BASE_PRIORITY,
            reputation,
            waiting: waiting_bonus(task.created_at, now),
            payment: payment_bonus(task),
            success_rate,
        };

        StructuredLogger::log_priority_computed(
            &task.task_id,
            breakdown.total(),
            breakdown.reputation,
            breakdown.waiting,
            breakdown.payment,
            breakdown.success_rate,
        );

        Advisory::with_diagnostics(breakdown, diagnostics)
    }

    async fn reputation_bonus(&self, user_id: &str) -> SchedulerResult<i64> {
        let bonus = match self.reputation_store.get_score(user_id).await? {
            Some(score) => (score.clamp(0.0, 1.0) * MAX_REPUTATION_BONUS).round() as i64,
            None => 0,
        };
        Ok(bonus)
    }

    async fn success_rate_bonus(&self, user_id: &str) -> SchedulerResult<i64> {
        let history = self.history_store.find_by_user(user_id).await?;
        if history.is_empty() {
            return Ok(NEW_USER_SUCCESS_BONUS);
        }

        let completed = history.iter().filter(|record| record.is_completed()).count();
        let rate = completed as f64 / history.len() as f64;
        Ok((rate * MAX_SUCCESS_RATE_BONUS).round() as i64)
    }
}

/// Half a point per whole minute waited, capped at 50.
pub fn waiting_bonus(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(created_at) = created_at else {
        return 0;
    };
    let minutes = (now - created_at).num_minutes().max(0);
    (minutes as f64 * WAITING_BONUS_PER_MINUTE).min(MAX_WAITING_BONUS) as i64
}

// TODO: derive from the amount paid once task records carry it.
pub fn payment_bonus(_task: &TaskRecord) -> i64 {
    PAYMENT_BONUS
}
