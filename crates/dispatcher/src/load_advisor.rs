use std::sync::Arc;

use chrono::{Duration, Utc};
use compute_scheduler_core::{
    Advisory, HistoryStore, PerformanceComparison, SchedulingStrategy,
};
use tracing::{info, warn};

use crate::predictor::Predictor;

/// Derives concurrency recommendations from recent execution history.
pub struct LoadAdvisor {
    history_store: Arc<dyn HistoryStore>,
    predictor: Arc<Predictor>,
    window: Duration,
}

impl LoadAdvisor {
    pub fn new(history_store: Arc<dyn HistoryStore>, predictor: Arc<Predictor>) -> Self {
        Self {
            history_store,
            predictor,
            window: Duration::hours(1),
        }
    }

    /// Classify load over the trailing hour.
    ///
    /// Throughput counts completed records only; the average response time
    /// covers every record in the window that has a duration.
    pub async fn get_adaptive_scheduling_strategy(&self) -> Advisory<SchedulingStrategy> {
        let default = self.predictor.config().default_completion_seconds;
        let now = Utc::now();

        let recent = match self
            .history_store
            .find_by_created_between(now - self.window, now)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load recent history: {e}");
                return Advisory::degraded(
                    SchedulingStrategy::unavailable(default),
                    format!("recent history unavailable: {e}"),
                );
            }
        };

        let throughput = recent.iter().filter(|record| record.is_completed()).count() as u64;
        let durations: Vec<i64> = recent.iter().filter_map(|record| record.actual_time).collect();
        let average_response_time = if durations.is_empty() {
            default
        } else {
            let mean = durations.iter().sum::<i64>() as f64 / durations.len() as f64;
            mean.max(0.0) as u64
        };

        let strategy = SchedulingStrategy::for_throughput(throughput, average_response_time);
        info!(
            throughput = strategy.throughput,
            average_response_time_seconds = strategy.average_response_time_seconds,
            max_concurrent_tasks = strategy.max_concurrent_tasks,
            "Adaptive scheduling strategy computed"
        );
        Advisory::ok(strategy)
    }

    /// Compare the weighted prediction for `service_id` with the plain mean
    /// of its completed durations.
    pub async fn compare_with_baseline(&self, service_id: &str) -> Advisory<PerformanceComparison> {
        let default = self.predictor.config().default_completion_seconds;
        let weighted = self.predictor.predict_completion_time(service_id).await;
        let mut diagnostics = weighted.diagnostics;

        let simple = match self.history_store.average_actual_time(service_id).await {
            Ok(average) => average,
            Err(e) => {
                warn!("Failed to compute baseline for service {service_id}: {e}");
                diagnostics.push(format!("baseline unavailable for service {service_id}: {e}"));
                None
            }
        };

        let improvement_percentage = simple
            .filter(|average| *average > 0.0)
            .map(|average| (average - weighted.value as f64) / average * 100.0);

        let comparison = PerformanceComparison {
            weighted_moving_average_seconds: weighted.value,
            simple_moving_average_seconds: simple.map_or(default, |average| average.max(0.0) as u64),
            improvement_percentage,
        };
        Advisory::with_diagnostics(comparison, diagnostics)
    }
}
