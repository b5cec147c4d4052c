use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use compute_scheduler_core::{HistoryRecord, HistoryStore, SchedulerResult, TaskStatus};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct HistoryState {
    records: Vec<HistoryRecord>,
    next_id: i64,
}

/// 内存历史记录仓储
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    state: Arc<RwLock<HistoryState>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store. Records keep their ids when set and unique; unset
    /// or repeated ids are replaced with fresh ones above every seeded id.
    pub fn with_records(records: impl IntoIterator<Item = HistoryRecord>) -> Self {
        let records: Vec<HistoryRecord> = records.into_iter().collect();
        let mut state = HistoryState {
            records: Vec::with_capacity(records.len()),
            next_id: records.iter().map(|record| record.id).max().unwrap_or(0).max(0),
        };
        let mut taken = HashSet::new();
        for mut record in records {
            if record.id > 0 && !taken.insert(record.id) {
                record.id = 0;
            }
            state.push(record);
        }
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn all(&self) -> Vec<HistoryRecord> {
        self.state.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    async fn filtered(&self, predicate: impl Fn(&HistoryRecord) -> bool) -> Vec<HistoryRecord> {
        self.state
            .read()
            .await
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }
}

impl HistoryState {
    fn push(&mut self, mut record: HistoryRecord) -> HistoryRecord {
        if record.id <= 0 {
            record.id = self.next_id + 1;
        }
        self.next_id = self.next_id.max(record.id);
        self.records.push(record.clone());
        record
    }
}

/// Newest first; records without a creation time sort last.
fn most_recent_first(a: &HistoryRecord, b: &HistoryRecord) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn find_by_service(
        &self,
        service_id: &str,
        most_recent: bool,
    ) -> SchedulerResult<Vec<HistoryRecord>> {
        let mut records = self.filtered(|record| record.service_id == service_id).await;
        if most_recent {
            records.sort_by(most_recent_first);
        }
        Ok(records)
    }

    async fn find_by_user(&self, user_id: &str) -> SchedulerResult<Vec<HistoryRecord>> {
        Ok(self.filtered(|record| record.user_id == user_id).await)
    }

    async fn find_by_status(&self, status: TaskStatus) -> SchedulerResult<Vec<HistoryRecord>> {
        Ok(self.filtered(|record| record.final_status == status).await)
    }

    async fn find_by_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SchedulerResult<Vec<HistoryRecord>> {
        Ok(self
            .filtered(|record| {
                record
                    .created_at
                    .is_some_and(|created_at| created_at >= start && created_at <= end)
            })
            .await)
    }

    async fn average_actual_time(&self, service_id: &str) -> SchedulerResult<Option<f64>> {
        let durations: Vec<i64> = self
            .filtered(|record| record.service_id == service_id && record.is_completed())
            .await
            .into_iter()
            .filter_map(|record| record.actual_time)
            .collect();

        if durations.is_empty() {
            return Ok(None);
        }
        Ok(Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64))
    }

    async fn save(&self, record: &HistoryRecord) -> SchedulerResult<HistoryRecord> {
        let mut record = record.clone();
        record.id = 0;
        Ok(self.state.write().await.push(record))
    }
}
