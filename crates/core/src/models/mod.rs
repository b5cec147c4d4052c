pub mod forecast;
pub mod history;
pub mod network_status;
pub mod task;

pub use forecast::{
    LoadLevel, MonitoringStats, PerformanceComparison, ResourceRequirement, SchedulingStrategy,
};
pub use history::HistoryRecord;
pub use network_status::{NetworkState, NetworkTaskStatus};
pub use task::{ChainOutcome, TaskRecord, TaskStatus, TerminalKind};
