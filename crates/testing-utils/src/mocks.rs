//! mockall doubles for the collaborator ports.
//!
//! The task source is not mocked here; tests use the in-memory
//! implementation, which already enforces the conditional writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use compute_scheduler_core::{
    ChainOutcome, HistoryRecord, HistoryStore, LedgerHook, NetworkTaskStatus, ReputationStore,
    SchedulerResult, StatusProvider, TaskStatus,
};
use mockall::mock;

mock! {
    pub NetworkStatus {}

    #[async_trait]
    impl StatusProvider for NetworkStatus {
        async fn get_status(&self, external_task_id: &str) -> SchedulerResult<NetworkTaskStatus>;
    }
}

mock! {
    pub History {}

    #[async_trait]
    impl HistoryStore for History {
        async fn find_by_service(
            &self,
            service_id: &str,
            most_recent_first: bool,
        ) -> SchedulerResult<Vec<HistoryRecord>>;
        async fn find_by_user(&self, user_id: &str) -> SchedulerResult<Vec<HistoryRecord>>;
        async fn find_by_status(&self, status: TaskStatus) -> SchedulerResult<Vec<HistoryRecord>>;
        async fn find_by_created_between(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> SchedulerResult<Vec<HistoryRecord>>;
        async fn average_actual_time(&self, service_id: &str) -> SchedulerResult<Option<f64>>;
        async fn save(&self, record: &HistoryRecord) -> SchedulerResult<HistoryRecord>;
    }
}

mock! {
    pub Reputation {}

    #[async_trait]
    impl ReputationStore for Reputation {
        async fn get_score(&self, user_id: &str) -> SchedulerResult<Option<f64>>;
        async fn update(
            &self,
            user_id: &str,
            completed: bool,
            on_time: bool,
            quality_score: f64,
        ) -> SchedulerResult<()>;
    }
}

mock! {
    pub Ledger {}

    #[async_trait]
    impl LedgerHook for Ledger {
        async fn finalize_on_chain(&self, task_id: &str, outcome: &ChainOutcome) -> SchedulerResult<()>;
    }
}
