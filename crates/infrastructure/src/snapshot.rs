//! Scheduler state snapshots
//!
//! A snapshot is a JSON document holding the task table, the execution
//! history and user reputation scores. The CLI loads one into the in-memory
//! stores, runs a command against them and writes the result back.

use std::collections::HashMap;
use std::path::Path;

use compute_scheduler_core::{HistoryRecord, SchedulerResult, TaskRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::memory::{InMemoryHistoryStore, InMemoryReputationStore, InMemoryTaskSource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    #[serde(default)]
    pub reputations: HashMap<String, f64>,
}

/// The in-memory stores populated from a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotStores {
    pub tasks: InMemoryTaskSource,
    pub history: InMemoryHistoryStore,
    pub reputations: InMemoryReputationStore,
}

impl Snapshot {
    pub async fn load(path: impl AsRef<Path>) -> SchedulerResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        info!(
            "Loaded snapshot {} with {} tasks and {} history records",
            path.display(),
            snapshot.tasks.len(),
            snapshot.history.len()
        );
        Ok(snapshot)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> SchedulerResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub fn into_stores(self) -> SnapshotStores {
        SnapshotStores {
            tasks: InMemoryTaskSource::with_tasks(self.tasks),
            history: InMemoryHistoryStore::with_records(self.history),
            reputations: InMemoryReputationStore::with_scores(self.reputations),
        }
    }

    pub async fn capture(stores: &SnapshotStores) -> Self {
        Self {
            tasks: stores.tasks.all().await,
            history: stores.history.all().await,
            reputations: stores.reputations.scores().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compute_scheduler_core::{TaskSource, TaskStatus};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_snapshot_survives_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut task = TaskRecord::new("task-1", "0x01", "svc", "alice");
        task.status = TaskStatus::Running;
        let snapshot = Snapshot {
            tasks: vec![task],
            history: Vec::new(),
            reputations: HashMap::from([("alice".to_string(), 0.8)]),
        };
        snapshot.save(&path).await.unwrap();

        let loaded = Snapshot::load(&path).await.unwrap();
        let stores = loaded.into_stores();
        let running = stores.tasks.list_by_status(TaskStatus::Running).await.unwrap();
        assert_eq!(running.len(), 1);

        let captured = Snapshot::capture(&stores).await;
        assert_eq!(captured.reputations.get("alice"), Some(&0.8));
    }

    #[tokio::test]
    async fn test_missing_sections_default_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, r#"{"tasks": []}"#).await.unwrap();

        let snapshot = Snapshot::load(&path).await.unwrap();
        assert!(snapshot.history.is_empty());
        assert!(snapshot.reputations.is_empty());
    }
}
