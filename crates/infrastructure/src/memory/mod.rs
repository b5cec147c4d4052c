//! 内存仓储实现
//!
//! Stores backed by process memory, used by the CLI and by tests. Each store
//! guards its state with a single `RwLock`, so the conditional terminal
//! writes of [`InMemoryTaskSource`] are atomic with respect to each other.

mod history_store;
mod reputation_store;
mod task_source;

pub use history_store::InMemoryHistoryStore;
pub use reputation_store::{InMemoryReputationStore, ReputationUpdate};
pub use task_source::InMemoryTaskSource;
