use serde::{Deserialize, Serialize};

/// 任务监控配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 两次巡检之间的间隔（秒），从上一次巡检结束时开始计算
    pub sweep_interval_seconds: u64,
    /// 任务超时阈值（秒），从任务创建时间开始计算
    pub task_timeout_seconds: u64,
    /// 单次状态查询的超时时间（秒）
    pub status_query_timeout_seconds: u64,
    /// 单次巡检中并行检查的最大任务数
    pub max_parallel_checks: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: 30,
            task_timeout_seconds: 3600, // 1小时
            status_query_timeout_seconds: 15,
            max_parallel_checks: 8,
        }
    }
}

impl MonitorConfig {
    /// 可表示的最大任务超时（秒），超出后无法换算为 `chrono::Duration`
    pub const MAX_TASK_TIMEOUT_SECONDS: u64 = i64::MAX as u64 / 1000;

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sweep_interval_seconds == 0 {
            return Err(anyhow::anyhow!("sweep interval must be greater than 0"));
        }
        if self.task_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("task timeout must be greater than 0"));
        }
        if self.task_timeout_seconds > Self::MAX_TASK_TIMEOUT_SECONDS {
            return Err(anyhow::anyhow!(
                "task timeout must not exceed {} seconds",
                Self::MAX_TASK_TIMEOUT_SECONDS
            ));
        }
        if self.status_query_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("status query timeout must be greater than 0"));
        }
        if self.max_parallel_checks == 0 {
            return Err(anyhow::anyhow!("max parallel checks must be greater than 0"));
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_seconds)
    }

    pub fn status_query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.status_query_timeout_seconds)
    }

    pub fn task_timeout(&self) -> chrono::Duration {
        // Saturates for values validate() would reject
        let seconds = self.task_timeout_seconds.min(Self::MAX_TASK_TIMEOUT_SECONDS);
        chrono::Duration::seconds(i64::try_from(seconds).unwrap_or(i64::MAX / 1000))
    }

    pub fn task_timeout_minutes(&self) -> u64 {
        self.task_timeout_seconds / 60
    }
}

/// 资源需求预测方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResourceForecastMode {
    /// 有历史数据时返回固定预测值
    #[default]
    Fixed,
    /// 取窗口内历史记录中各项资源的最大值
    HistoricalMax,
}

/// 完成时间预测配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// 参与预测的最近历史记录条数
    pub history_window: usize,
    /// 指数衰减系数 λ
    pub decay_lambda: f64,
    /// 没有历史数据时的默认完成时间（秒）
    pub default_completion_seconds: u64,
    pub resource_forecast: ResourceForecastMode,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            history_window: 20,
            decay_lambda: 0.1,
            default_completion_seconds: 300, // 5分钟
            resource_forecast: ResourceForecastMode::Fixed,
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history_window == 0 {
            return Err(anyhow::anyhow!("history window must be greater than 0"));
        }
        if !self.decay_lambda.is_finite() || self.decay_lambda <= 0.0 {
            return Err(anyhow::anyhow!(
                "decay lambda must be a positive number, got {}",
                self.decay_lambda
            ));
        }
        Ok(())
    }
}

/// 可观测性配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// "json" 或 "pretty"
    pub log_format: String,
    pub metrics_enabled: bool,
    pub metrics_bind_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_bind_address: "127.0.0.1:9000".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(anyhow::anyhow!(
                "invalid log level: {}, supported: {:?}",
                self.log_level,
                valid_levels
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(anyhow::anyhow!(
                "invalid log format: {}, supported: {:?}",
                self.log_format,
                valid_formats
            ));
        }

        if self.metrics_enabled && self.metrics_bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(anyhow::anyhow!(
                "invalid metrics bind address: {}",
                self.metrics_bind_address
            ));
        }

        Ok(())
    }
}
