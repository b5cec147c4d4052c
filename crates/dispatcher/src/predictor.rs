use std::sync::Arc;

use compute_scheduler_core::{
    Advisory, HistoryRecord, HistoryStore, PredictorConfig, ResourceForecastMode,
    ResourceRequirement, StructuredLogger,
};
use tracing::{debug, warn};

/// 基于历史执行数据的完成时间与资源预测
pub struct Predictor {
    history_store: Arc<dyn HistoryStore>,
    config: PredictorConfig,
}

impl Predictor {
    pub fn new(history_store: Arc<dyn HistoryStore>, config: PredictorConfig) -> Self {
        Self {
            history_store,
            config,
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Predict how long the next task of `service_id` will take, in seconds.
    ///
    /// Uses the most recent completed executions with a positive duration,
    /// weighted so that newer samples count more. Falls back to the
    /// configured default when there is no usable history or the store
    /// cannot be read.
    pub async fn predict_completion_time(&self, service_id: &str) -> Advisory<u64> {
        let default = self.config.default_completion_seconds;

        let history = match self.history_store.find_by_service(service_id, true).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Failed to load history for service {service_id}: {e}");
                return Advisory::degraded(
                    default,
                    format!("history unavailable for service {service_id}: {e}"),
                );
            }
        };

        let samples: Vec<i64> = history
            .iter()
            .filter(|record| record.is_completed())
            .filter_map(HistoryRecord::positive_duration)
            .take(self.config.history_window)
            .collect();

        match weighted_moving_average(&samples, self.config.decay_lambda) {
            Some(predicted) => {
                StructuredLogger::log_prediction_computed(service_id, predicted, samples.len());
                Advisory::ok(predicted)
            }
            None => {
                debug!("No completed history for service {service_id}, using default {default}s");
                Advisory::ok(default)
            }
        }
    }

    /// Forecast the resources a task of `service_id` will need.
    pub async fn predict_resource_requirement(
        &self,
        service_id: &str,
    ) -> Advisory<ResourceRequirement> {
        let history = match self.history_store.find_by_service(service_id, true).await {
            Ok(history) => history,
            Err(e) => {
                warn!("Failed to load history for service {service_id}: {e}");
                return Advisory::degraded(
                    ResourceRequirement::FLOOR,
                    format!("history unavailable for service {service_id}: {e}"),
                );
            }
        };

        let window: Vec<&HistoryRecord> =
            history.iter().take(self.config.history_window).collect();
        if window.is_empty() {
            return Advisory::ok(ResourceRequirement::FLOOR);
        }

        let forecast = match self.config.resource_forecast {
            ResourceForecastMode::Fixed => ResourceRequirement::PLACEHOLDER,
            ResourceForecastMode::HistoricalMax => window
                .iter()
                .filter_map(|record| record.resource_requirement)
                .reduce(ResourceRequirement::max)
                .map(ResourceRequirement::at_least_floor)
                .unwrap_or(ResourceRequirement::PLACEHOLDER),
        };

        debug!(
            service.id = service_id,
            cpu_cores = forecast.cpu_cores,
            memory_mb = forecast.memory_mb,
            storage_gb = forecast.storage_gb,
            "Resource requirement forecast"
        );
        Advisory::ok(forecast)
    }
}

/// Exponentially decayed weighted mean of `samples`, newest first.
///
/// Sample `i` carries weight `e^(-lambda * i)`. The mean is floored to whole
/// seconds. Returns `None` for an empty slice.
pub fn weighted_moving_average(samples: &[i64], lambda: f64) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }

    let (weighted_sum, weight_sum) =
        samples
            .iter()
            .enumerate()
            .fold((0.0_f64, 0.0_f64), |(weighted, total), (i, &sample)| {
                let weight = (-lambda * i as f64).exp();
                (weighted + sample as f64 * weight, total + weight)
            });

    let mean = weighted_sum / weight_sum;
    // absorb float error so identical samples reproduce exactly
    Some((mean + 1e-9).floor().max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_average_of_three_samples() {
        // (100 + 200e^-0.1 + 300e^-0.2) / (1 + e^-0.1 + e^-0.2) = 193.34
        assert_eq!(weighted_moving_average(&[100, 200, 300], 0.1), Some(193));
    }

    #[test]
    fn test_empty_samples() {
        assert_eq!(weighted_moving_average(&[], 0.1), None);
    }

    #[test]
    fn test_identical_samples_return_sample() {
        for d in [1, 7, 100, 299, 3600, 86_399] {
            let samples = vec![d; 20];
            assert_eq!(weighted_moving_average(&samples, 0.1), Some(d as u64));
        }
    }

    #[test]
    fn test_two_samples_favor_newest() {
        let newer_faster = weighted_moving_average(&[100, 200], 0.1).unwrap();
        assert!(newer_faster > 100 && newer_faster < 150);

        let newer_slower = weighted_moving_average(&[200, 100], 0.1).unwrap();
        assert!(newer_slower > 150 && newer_slower < 200);
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(weighted_moving_average(&[42], 0.5), Some(42));
    }
}
