//! Store and status-provider implementations for the scheduler ports.

pub mod memory;
pub mod snapshot;
pub mod status_file;

pub use memory::{
    InMemoryHistoryStore, InMemoryReputationStore, InMemoryTaskSource, ReputationUpdate,
};
pub use snapshot::{Snapshot, SnapshotStores};
pub use status_file::FileStatusProvider;
