use serde::{Deserialize, Serialize};

/// Forecast of the resources a service's tasks will need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub cpu_cores: u32,
    pub memory_mb: u32,
    pub storage_gb: u32,
}

impl ResourceRequirement {
    /// Used when a service has no history at all.
    pub const FLOOR: ResourceRequirement = ResourceRequirement {
        cpu_cores: 1,
        memory_mb: 512,
        storage_gb: 1,
    };

    /// Fixed forecast for services that do have history.
    pub const PLACEHOLDER: ResourceRequirement = ResourceRequirement {
        cpu_cores: 2,
        memory_mb: 1024,
        storage_gb: 2,
    };

    /// Raise every resource to at least the floor value.
    pub fn at_least_floor(self) -> Self {
        self.max(Self::FLOOR)
    }

    pub fn max(self, other: ResourceRequirement) -> Self {
        Self {
            cpu_cores: self.cpu_cores.max(other.cpu_cores),
            memory_mb: self.memory_mb.max(other.memory_mb),
            storage_gb: self.storage_gb.max(other.storage_gb),
        }
    }
}

impl Default for ResourceRequirement {
    fn default() -> Self {
        Self::FLOOR
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LoadLevel {
    #[serde(rename = "LOW_LOAD")]
    LowLoad,
    #[serde(rename = "MEDIUM_LOAD")]
    MediumLoad,
    #[serde(rename = "HIGH_LOAD")]
    HighLoad,
}

impl LoadLevel {
    /// Three-tier step function on completions per hour.
    pub fn classify(throughput: u64) -> Self {
        if throughput < 10 {
            LoadLevel::LowLoad
        } else if throughput < 50 {
            LoadLevel::MediumLoad
        } else {
            LoadLevel::HighLoad
        }
    }

    pub fn max_concurrent_tasks(&self) -> u32 {
        match self {
            LoadLevel::LowLoad => 10,
            LoadLevel::MediumLoad => 20,
            LoadLevel::HighLoad => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadLevel::LowLoad => "LOW_LOAD",
            LoadLevel::MediumLoad => "MEDIUM_LOAD",
            LoadLevel::HighLoad => "HIGH_LOAD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingStrategy {
    /// Completed tasks in the trailing hour.
    pub throughput: u64,
    pub average_response_time_seconds: u64,
    pub recommendation: Option<LoadLevel>,
    pub max_concurrent_tasks: u32,
}

impl SchedulingStrategy {
    pub fn for_throughput(throughput: u64, average_response_time_seconds: u64) -> Self {
        let level = LoadLevel::classify(throughput);
        Self {
            throughput,
            average_response_time_seconds,
            recommendation: Some(level),
            max_concurrent_tasks: level.max_concurrent_tasks(),
        }
    }

    /// Returned when the recent history could not be read.
    pub fn unavailable(default_response_time_seconds: u64) -> Self {
        Self {
            throughput: 0,
            average_response_time_seconds: default_response_time_seconds,
            recommendation: None,
            max_concurrent_tasks: 0,
        }
    }
}

/// Weighted prediction against the plain-mean baseline. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceComparison {
    pub weighted_moving_average_seconds: u64,
    pub simple_moving_average_seconds: u64,
    pub improvement_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringStats {
    pub running_count: usize,
    /// Running tasks already past the timeout threshold, not yet transitioned.
    pub timeout_count: usize,
    pub completed_count: usize,
    pub failed_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_level_boundaries() {
        assert_eq!(LoadLevel::classify(0), LoadLevel::LowLoad);
        assert_eq!(LoadLevel::classify(9), LoadLevel::LowLoad);
        assert_eq!(LoadLevel::classify(10), LoadLevel::MediumLoad);
        assert_eq!(LoadLevel::classify(49), LoadLevel::MediumLoad);
        assert_eq!(LoadLevel::classify(50), LoadLevel::HighLoad);
        assert_eq!(LoadLevel::HighLoad.max_concurrent_tasks(), 30);
    }

    #[test]
    fn resource_max_takes_each_field_independently() {
        let a = ResourceRequirement {
            cpu_cores: 4,
            memory_mb: 256,
            storage_gb: 0,
        };
        let merged = a.at_least_floor();
        assert_eq!(merged.cpu_cores, 4);
        assert_eq!(merged.memory_mb, 512);
        assert_eq!(merged.storage_gb, 1);
    }

    #[test]
    fn recommendation_serializes_with_wire_names() {
        let strategy = SchedulingStrategy::for_throughput(12, 90);
        let json = serde_json::to_value(&strategy).unwrap();
        assert_eq!(json["recommendation"], "MEDIUM_LOAD");
        assert_eq!(json["max_concurrent_tasks"], 20);
    }
}
