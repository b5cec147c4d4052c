pub mod advisory;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod traits;

pub use advisory::Advisory;
pub use config::{
    MonitorConfig, ObservabilityConfig, PredictorConfig, ResourceForecastMode, SchedulerConfig,
};
pub use errors::*;
pub use logging::StructuredLogger;
pub use models::{
    ChainOutcome, HistoryRecord, LoadLevel, MonitoringStats, NetworkState, NetworkTaskStatus,
    PerformanceComparison, ResourceRequirement, SchedulingStrategy, TaskRecord, TaskStatus,
    TerminalKind,
};
pub use traits::{HistoryStore, LedgerHook, NoopLedgerHook, ReputationStore, StatusProvider, TaskSource};

/// 统一的Result类型
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;
