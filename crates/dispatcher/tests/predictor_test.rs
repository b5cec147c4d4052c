#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use compute_scheduler_core::{
        PredictorConfig, ResourceForecastMode, ResourceRequirement, SchedulerError, TaskStatus,
    };
    use compute_scheduler_dispatcher::Predictor;
    use compute_scheduler_infrastructure::InMemoryHistoryStore;
    use compute_scheduler_testing_utils::{HistoryRecordBuilder, MockHistory};

    fn completed(service_id: &str, seconds: i64, minutes_ago: i64) -> compute_scheduler_core::HistoryRecord {
        HistoryRecordBuilder::new()
            .with_service(service_id)
            .with_actual_time(Some(seconds))
            .created_minutes_ago(minutes_ago)
            .build()
    }

    fn predictor(store: InMemoryHistoryStore) -> Predictor {
        Predictor::new(Arc::new(store), PredictorConfig::default())
    }

    #[tokio::test]
    async fn test_prediction_weights_recent_history() {
        let store = InMemoryHistoryStore::with_records([
            completed("svc1", 300, 30),
            completed("svc1", 100, 10),
            completed("svc1", 200, 20),
        ]);

        let prediction = predictor(store).predict_completion_time("svc1").await;
        assert_eq!(prediction.value, 193);
        assert!(!prediction.is_degraded());
    }

    #[tokio::test]
    async fn test_prediction_without_history_uses_default() {
        let prediction = predictor(InMemoryHistoryStore::new())
            .predict_completion_time("unknown")
            .await;
        assert_eq!(prediction.value, 300);
        assert!(!prediction.is_degraded());
    }

    #[tokio::test]
    async fn test_prediction_ignores_failed_and_unusable_records() {
        let store = InMemoryHistoryStore::with_records([
            completed("svc1", 120, 50),
            HistoryRecordBuilder::new()
                .with_status(TaskStatus::Failed)
                .with_actual_time(Some(9000))
                .created_minutes_ago(1)
                .build(),
            HistoryRecordBuilder::new()
                .with_actual_time(Some(0))
                .created_minutes_ago(2)
                .build(),
            HistoryRecordBuilder::new()
                .with_actual_time(None)
                .created_minutes_ago(3)
                .build(),
            completed("svc2", 5000, 4),
        ]);

        let prediction = predictor(store).predict_completion_time("svc1").await;
        assert_eq!(prediction.value, 120);
    }

    #[tokio::test]
    async fn test_prediction_uses_only_the_window() {
        let mut records: Vec<_> = (0..20).map(|i| completed("svc1", 100, i + 1)).collect();
        records.extend((0..5).map(|i| completed("svc1", 10_000, 100 + i)));
        let store = InMemoryHistoryStore::with_records(records);

        let prediction = predictor(store).predict_completion_time("svc1").await;
        assert_eq!(prediction.value, 100);
    }

    #[tokio::test]
    async fn test_prediction_survives_store_failure() {
        let mut history = MockHistory::new();
        history
            .expect_find_by_service()
            .returning(|_, _| Err(SchedulerError::HistoryStore("connection refused".to_string())));

        let predictor = Predictor::new(Arc::new(history), PredictorConfig::default());
        let prediction = predictor.predict_completion_time("svc1").await;

        assert_eq!(prediction.value, 300);
        assert!(prediction.is_degraded());
        assert!(prediction.diagnostics[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_resource_forecast_fixed_mode() {
        let empty = predictor(InMemoryHistoryStore::new())
            .predict_resource_requirement("svc1")
            .await;
        assert_eq!(empty.value, ResourceRequirement::FLOOR);

        let store = InMemoryHistoryStore::with_records([completed("svc1", 60, 1)]);
        let forecast = predictor(store).predict_resource_requirement("svc1").await;
        assert_eq!(
            forecast.value,
            ResourceRequirement {
                cpu_cores: 2,
                memory_mb: 1024,
                storage_gb: 2
            }
        );
    }

    #[tokio::test]
    async fn test_resource_forecast_historical_max() {
        let store = InMemoryHistoryStore::with_records([
            HistoryRecordBuilder::new()
                .with_resources(ResourceRequirement {
                    cpu_cores: 4,
                    memory_mb: 512,
                    storage_gb: 0,
                })
                .build(),
            HistoryRecordBuilder::new()
                .with_resources(ResourceRequirement {
                    cpu_cores: 1,
                    memory_mb: 4096,
                    storage_gb: 0,
                })
                .build(),
        ]);
        let config = PredictorConfig {
            resource_forecast: ResourceForecastMode::HistoricalMax,
            ..PredictorConfig::default()
        };

        let forecast = Predictor::new(Arc::new(store), config)
            .predict_resource_requirement("svc1")
            .await;
        assert_eq!(
            forecast.value,
            ResourceRequirement {
                cpu_cores: 4,
                memory_mb: 4096,
                storage_gb: 1
            }
        );
    }

    #[tokio::test]
    async fn test_resource_forecast_historical_max_without_recorded_resources() {
        let store = InMemoryHistoryStore::with_records([completed("svc1", 60, 1)]);
        let config = PredictorConfig {
            resource_forecast: ResourceForecastMode::HistoricalMax,
            ..PredictorConfig::default()
        };

        let forecast = Predictor::new(Arc::new(store), config)
            .predict_resource_requirement("svc1")
            .await;
        assert_eq!(forecast.value, ResourceRequirement::PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_resource_forecast_survives_store_failure() {
        let mut history = MockHistory::new();
        history
            .expect_find_by_service()
            .returning(|_, _| Err(SchedulerError::HistoryStore("timeout".to_string())));

        let forecast = Predictor::new(Arc::new(history), PredictorConfig::default())
            .predict_resource_requirement("svc1")
            .await;
        assert_eq!(forecast.value, ResourceRequirement::FLOOR);
        assert!(forecast.is_degraded());
    }
}
