//! Best-effort results.
//!
//! The scheduling and monitoring operations never fail their caller. Instead
//! they return an [`Advisory`] whose value is always usable (the documented
//! default when a collaborator was unavailable) together with the diagnostics
//! of every failure that was absorbed while computing it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory<T> {
    pub value: T,
    pub diagnostics: Vec<String>,
}

impl<T> Advisory<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    pub fn degraded(value: T, diagnostic: impl Into<String>) -> Self {
        Self {
            value,
            diagnostics: vec![diagnostic.into()],
        }
    }

    pub fn with_diagnostics(value: T, diagnostics: Vec<String>) -> Self {
        Self { value, diagnostics }
    }

    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Advisory<U> {
        Advisory {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_keeps_value_and_reason() {
        let advisory = Advisory::degraded(300u64, "history store unreachable");
        assert!(advisory.is_degraded());
        assert_eq!(*advisory.value(), 300);
        assert_eq!(advisory.diagnostics, vec!["history store unreachable".to_string()]);
    }

    #[test]
    fn map_carries_diagnostics() {
        let advisory = Advisory::degraded(2u32, "partial").map(|v| v * 10);
        assert_eq!(advisory.value, 20);
        assert_eq!(advisory.diagnostics.len(), 1);
        assert!(!Advisory::ok(1).is_degraded());
    }
}
