//! Scheduler configuration.
//!
//! Load order:
//! 1. Built-in defaults
//! 2. Config file (TOML)
//! 3. Environment overrides, prefix `COMPUTE_SCHEDULER`, sections separated by `__`
//!    (e.g. `COMPUTE_SCHEDULER__MONITOR__TASK_TIMEOUT_SECONDS=1800`)

mod models;

pub use models::{MonitorConfig, ObservabilityConfig, PredictorConfig, ResourceForecastMode};

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "COMPUTE_SCHEDULER";

const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/scheduler.toml",
    "scheduler.toml",
    "/etc/compute-scheduler/config.toml",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub monitor: MonitorConfig,
    pub predictor: PredictorConfig,
    pub observability: ObservabilityConfig,
}

impl SchedulerConfig {
    /// Load configuration from defaults, a config file and the environment.
    ///
    /// An explicitly given file must exist. Without one, the first existing
    /// default path is used, and none at all is fine.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with_prefix(config_path, ENV_PREFIX)
    }

    fn load_with_prefix(config_path: Option<&str>, env_prefix: &str) -> Result<Self> {
        let defaults = ConfigBuilder::try_from(&SchedulerConfig::default())
            .context("failed to build default configuration")?;
        let mut builder = ConfigBuilder::builder().add_source(defaults);

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("config file does not exist: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: SchedulerConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: SchedulerConfig =
            toml::from_str(toml_str).context("failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration to TOML")
    }

    pub fn validate(&self) -> Result<()> {
        self.monitor
            .validate()
            .context("invalid monitor configuration")?;
        self.predictor
            .validate()
            .context("invalid predictor configuration")?;
        self.observability
            .validate()
            .context("invalid observability configuration")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = SchedulerConfig::default();
        assert_eq!(config.monitor.sweep_interval_seconds, 30);
        assert_eq!(config.monitor.task_timeout_seconds, 3600);
        assert_eq!(config.predictor.history_window, 20);
        assert_eq!(config.predictor.decay_lambda, 0.1);
        assert_eq!(config.predictor.default_completion_seconds, 300);
        assert_eq!(config.predictor.resource_forecast, ResourceForecastMode::Fixed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = SchedulerConfig::from_toml(
            r#"
            [monitor]
            task_timeout_seconds = 1800

            [predictor]
            resource_forecast = "historical_max"
            "#,
        )
        .unwrap();

        assert_eq!(config.monitor.task_timeout_seconds, 1800);
        assert_eq!(config.monitor.sweep_interval_seconds, 30);
        assert_eq!(config.monitor.task_timeout_minutes(), 30);
        assert_eq!(
            config.predictor.resource_forecast,
            ResourceForecastMode::HistoricalMax
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(SchedulerConfig::from_toml("[monitor]\nsweep_interval_seconds = 0").is_err());
        assert!(SchedulerConfig::from_toml("[predictor]\ndecay_lambda = -0.5").is_err());
        assert!(SchedulerConfig::from_toml("[predictor]\nhistory_window = 0").is_err());
        assert!(SchedulerConfig::from_toml("[observability]\nlog_format = \"xml\"").is_err());
    }

    #[test]
    fn oversized_task_timeout_is_rejected_and_saturates() {
        assert!(
            SchedulerConfig::from_toml("[monitor]\ntask_timeout_seconds = 10000000000000000")
                .is_err()
        );

        let monitor = MonitorConfig {
            task_timeout_seconds: u64::MAX,
            ..MonitorConfig::default()
        };
        assert!(monitor.validate().is_err());
        assert_eq!(
            monitor.task_timeout(),
            chrono::Duration::seconds(i64::MAX / 1000)
        );

        let largest = MonitorConfig {
            task_timeout_seconds: MonitorConfig::MAX_TASK_TIMEOUT_SECONDS,
            ..MonitorConfig::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let mut config = SchedulerConfig::default();
        config.monitor.max_parallel_checks = 3;
        let parsed = SchedulerConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn load_reads_file_then_environment() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[monitor]\nsweep_interval_seconds = 5\ntask_timeout_seconds = 600").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        std::env::set_var("CS_LOAD_TEST__MONITOR__TASK_TIMEOUT_SECONDS", "900");
        let config = SchedulerConfig::load_with_prefix(Some(&path), "CS_LOAD_TEST").unwrap();
        std::env::remove_var("CS_LOAD_TEST__MONITOR__TASK_TIMEOUT_SECONDS");

        assert_eq!(config.monitor.sweep_interval_seconds, 5);
        assert_eq!(config.monitor.task_timeout_seconds, 900);
        assert_eq!(config.predictor.history_window, 20);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = SchedulerConfig::load(Some("/nonexistent/compute-scheduler.toml")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
