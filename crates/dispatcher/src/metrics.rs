//! Metrics recorded by the monitor sweep.

use compute_scheduler_core::TerminalKind;
use metrics::{counter, histogram, Counter, Histogram};

pub struct MonitorMetrics {
    sweeps_total: Counter,
    sweep_duration: Histogram,
    status_query_failures_total: Counter,
}

impl MonitorMetrics {
    pub fn new() -> Self {
        Self {
            sweeps_total: counter!("compute_scheduler_sweeps_total"),
            sweep_duration: histogram!("compute_scheduler_sweep_duration_seconds"),
            status_query_failures_total: counter!("compute_scheduler_status_query_failures_total"),
        }
    }

    pub fn record_sweep(&self, duration_seconds: f64) {
        self.sweeps_total.increment(1);
        self.sweep_duration.record(duration_seconds);
    }

    pub fn record_transition(&self, kind: TerminalKind) {
        counter!("compute_scheduler_task_transitions_total", "outcome" => kind.label()).increment(1);
    }

    pub fn record_status_query_failure(&self) {
        self.status_query_failures_total.increment(1);
    }

    pub fn record_side_effect_failure(&self, side_effect: &'static str) {
        counter!("compute_scheduler_side_effect_failures_total", "side_effect" => side_effect)
            .increment(1);
    }
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}
