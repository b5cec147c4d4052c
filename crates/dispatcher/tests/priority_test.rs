#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use compute_scheduler_core::{SchedulerError, TaskStatus};
    use compute_scheduler_dispatcher::PriorityScorer;
    use compute_scheduler_infrastructure::{InMemoryHistoryStore, InMemoryReputationStore};
    use compute_scheduler_testing_utils::{HistoryRecordBuilder, MockReputation, TaskRecordBuilder};

    fn history_for(user_id: &str, completed: usize, failed: usize) -> InMemoryHistoryStore {
        let completed_records = (0..completed).map(|_| HistoryRecordBuilder::new().with_user(user_id).build());
        let failed_records = (0..failed).map(|_| {
            HistoryRecordBuilder::new()
                .with_user(user_id)
                .with_status(TaskStatus::Failed)
                .build()
        });
        InMemoryHistoryStore::with_records(completed_records.chain(failed_records))
    }

    fn scorer(scores: &[(&str, f64)], history: InMemoryHistoryStore) -> PriorityScorer {
        let reputations = InMemoryReputationStore::with_scores(
            scores.iter().map(|(user, score)| (user.to_string(), *score)),
        );
        PriorityScorer::new(Arc::new(reputations), Arc::new(history))
    }

    #[tokio::test]
    async fn test_priority_combines_all_components() {
        let scorer = scorer(&[("alice", 0.8)], history_for("alice", 3, 1));
        let task = TaskRecordBuilder::new("t1")
            .with_user("alice")
            .with_status(TaskStatus::Pending)
            .created_minutes_ago(10)
            .build();

        let breakdown = scorer.priority_breakdown(&task, Utc::now()).await;
        assert_eq!(breakdown.value.base, 100);
        assert_eq!(breakdown.value.reputation, 40);
        assert_eq!(breakdown.value.waiting, 5);
        assert_eq!(breakdown.value.payment, 15);
        assert_eq!(breakdown.value.success_rate, 15);

        let priority = scorer.calculate_priority(&task).await;
        assert_eq!(priority.value, 175);
        assert!(!priority.is_degraded());
    }

    #[tokio::test]
    async fn test_new_user_gets_neutral_success_bonus() {
        let scorer = scorer(&[], InMemoryHistoryStore::new());
        let task = TaskRecordBuilder::new("t1").with_user("newcomer").build();

        let priority = scorer.calculate_priority(&task).await;
        assert_eq!(priority.value, 100 + 15 + 10);
    }

    #[tokio::test]
    async fn test_waiting_bonus_is_capped() {
        let scorer = scorer(&[], InMemoryHistoryStore::new());
        let task = TaskRecordBuilder::new("t1").created_minutes_ago(600).build();

        let breakdown = scorer.priority_breakdown(&task, Utc::now()).await;
        assert_eq!(breakdown.value.waiting, 50);
    }

    #[tokio::test]
    async fn test_priority_is_monotone_in_reputation_and_success_rate() {
        let task_for = |user: &str| TaskRecordBuilder::new("t").with_user(user).created_minutes_ago(5).build();

        let scorer = scorer(&[("low", 0.2), ("high", 0.9)], InMemoryHistoryStore::new());
        let low = scorer.calculate_priority(&task_for("low")).await.value;
        let high = scorer.calculate_priority(&task_for("high")).await.value;
        assert!(high > low);

        let mut previous = i64::MIN;
        for completed in 0..=4 {
            let scorer = scorer_with_rate(completed, 4 - completed);
            let priority = scorer.calculate_priority(&task_for("rated")).await.value;
            assert!(priority >= previous);
            previous = priority;
        }
    }

    fn scorer_with_rate(completed: usize, failed: usize) -> PriorityScorer {
        scorer(&[("rated", 0.5)], history_for("rated", completed, failed))
    }

    #[tokio::test]
    async fn test_failing_reputation_counts_as_zero() {
        let mut reputation = MockReputation::new();
        reputation
            .expect_get_score()
            .returning(|_| Err(SchedulerError::Reputation("unavailable".to_string())));
        let scorer = PriorityScorer::new(Arc::new(reputation), Arc::new(history_for("alice", 1, 0)));
        let task = TaskRecordBuilder::new("t1").with_user("alice").build();

        let priority = scorer.calculate_priority(&task).await;
        assert_eq!(priority.value, 100 + 15 + 20);
        assert!(priority.is_degraded());
    }
}
