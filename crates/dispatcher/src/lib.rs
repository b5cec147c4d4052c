//! Scheduling advisors and the lifecycle monitor.
//!
//! - [`Predictor`] forecasts completion time and resources from history
//! - [`PriorityScorer`] ranks pending work
//! - [`LoadAdvisor`] derives a concurrency policy from recent throughput
//! - [`TaskMonitor`] advances running tasks to their terminal state
//! - [`MonitorLoop`] re-arms the monitor sweep on a fixed delay

pub mod load_advisor;
pub mod metrics;
pub mod monitor;
pub mod monitor_loop;
pub mod predictor;
pub mod priority;
pub mod timeout_handler;

pub use load_advisor::LoadAdvisor;
pub use metrics::MonitorMetrics;
pub use monitor::{SweepReport, TaskCheck, TaskDiagnostic, TaskMonitor};
pub use monitor_loop::MonitorLoop;
pub use predictor::{weighted_moving_average, Predictor};
pub use priority::{PriorityBreakdown, PriorityScorer};
pub use timeout_handler::TimeoutHandler;
