//! Status provider backed by a JSON file
//!
//! The file maps external task ids to network status objects:
//!
//! ```json
//! {
//!   "0xabc": { "state": "ACTIVE" },
//!   "0xdef": { "state": "COMPLETED", "result_location": "ipfs://Qm..." }
//! }
//! ```
//!
//! The file is re-read on every query, so an operator or a test can edit
//! it between sweeps.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use compute_scheduler_core::{NetworkTaskStatus, SchedulerError, SchedulerResult, StatusProvider};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileStatusProvider {
    path: PathBuf,
}

impl FileStatusProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatusProvider for FileStatusProvider {
    async fn get_status(&self, external_task_id: &str) -> SchedulerResult<NetworkTaskStatus> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SchedulerError::StatusQuery {
                external_task_id: external_task_id.to_string(),
                message: format!("cannot read {}: {e}", self.path.display()),
            })?;

        let mut entries: HashMap<String, Value> = serde_json::from_str(&content)
            .map_err(|e| SchedulerError::MalformedStatus(format!("{}: {e}", self.path.display())))?;

        let entry = entries
            .remove(external_task_id)
            .ok_or_else(|| SchedulerError::StatusQuery {
                external_task_id: external_task_id.to_string(),
                message: "task unknown to the network".to_string(),
            })?;

        let status: NetworkTaskStatus = serde_json::from_value(entry)
            .map_err(|e| SchedulerError::MalformedStatus(format!("{external_task_id}: {e}")))?;

        debug!(external_task_id, network.state = %status.state, "Status read from file");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compute_scheduler_core::NetworkState;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn status_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_status_and_result_location() {
        let file = status_file(
            r#"{"0xa": {"state": "active"}, "0xb": {"state": "COMPLETED", "result_location": "ipfs://out"}}"#,
        );
        let provider = FileStatusProvider::new(file.path());

        let a = provider.get_status("0xa").await.unwrap();
        assert_eq!(a.state, NetworkState::Active);

        let b = provider.get_status("0xb").await.unwrap();
        assert_eq!(b.state, NetworkState::Completed);
        assert_eq!(b.result_location.as_deref(), Some("ipfs://out"));
    }

    #[tokio::test]
    async fn test_unknown_state_is_malformed() {
        let file = status_file(r#"{"0xa": {"state": "DONE"}, "0xb": {"state": "ACTIVE"}}"#);
        let provider = FileStatusProvider::new(file.path());

        assert!(matches!(
            provider.get_status("0xa").await,
            Err(SchedulerError::MalformedStatus(_))
        ));
        assert!(provider.get_status("0xb").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_entry_and_missing_file() {
        let file = status_file("{}");
        let provider = FileStatusProvider::new(file.path());
        let err = provider.get_status("0xnone").await.unwrap_err();
        assert!(err.is_transient());

        let provider = FileStatusProvider::new("/nonexistent/status.json");
        assert!(matches!(
            provider.get_status("0xa").await,
            Err(SchedulerError::StatusQuery { .. })
        ));
    }
}
