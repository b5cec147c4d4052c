use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::task::TerminalKind;
use crate::SchedulerError;

/// Task state as reported by the compute network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NetworkState {
    Unset,
    Active,
    Revealing,
    Completed,
    Failed,
    Timeout,
}

impl NetworkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkState::Unset => "UNSET",
            NetworkState::Active => "ACTIVE",
            NetworkState::Revealing => "REVEALING",
            NetworkState::Completed => "COMPLETED",
            NetworkState::Failed => "FAILED",
            NetworkState::Timeout => "TIMEOUT",
        }
    }

    /// Terminal outcome implied by this state. A timeout reported by the
    /// network counts as a failure; local timeouts are detected separately.
    pub fn terminal_kind(&self) -> Option<TerminalKind> {
        match self {
            NetworkState::Completed => Some(TerminalKind::Completed),
            NetworkState::Failed | NetworkState::Timeout => Some(TerminalKind::Failed),
            NetworkState::Unset | NetworkState::Active | NetworkState::Revealing => None,
        }
    }
}

impl FromStr for NetworkState {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNSET" => Ok(NetworkState::Unset),
            "ACTIVE" => Ok(NetworkState::Active),
            "REVEALING" => Ok(NetworkState::Revealing),
            "COMPLETED" => Ok(NetworkState::Completed),
            "FAILED" => Ok(NetworkState::Failed),
            "TIMEOUT" => Ok(NetworkState::Timeout),
            other => Err(SchedulerError::MalformedStatus(format!(
                "unknown network state: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for NetworkState {
    type Error = SchedulerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NetworkState> for String {
    fn from(state: NetworkState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized status snapshot returned by a [`crate::traits::StatusProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTaskStatus {
    pub state: NetworkState,
    #[serde(default)]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub result_storage: Option<String>,
    #[serde(default)]
    pub result_location: Option<String>,
}

impl NetworkTaskStatus {
    pub fn new(state: NetworkState) -> Self {
        Self {
            state,
            deal_id: None,
            result_storage: None,
            result_location: None,
        }
    }

    pub fn with_result_location(mut self, location: impl Into<String>) -> Self {
        self.result_location = Some(location.into());
        self
    }
}
