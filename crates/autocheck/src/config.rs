//! Options
//!
//! Engine-wide knobs shared by every element built with them.

use std::time::Duration;

use serde::Deserialize;

use crate::CheckError;

/// Validation options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Quiet period before a remote check is sent, in milliseconds
    pub debounce_ms: u64,
    /// Custom validity shown while a remote check is in flight
    pub pending_message: String,
    /// Custom validity after a rejected or failed remote check
    pub fallback_message: String,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            pending_message: "Verifying.....".to_string(),
            fallback_message: "Validation failed".to_string(),
        }
    }
}

impl CheckOptions {
    /// Load options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, CheckError> {
        serde_json::from_str(json).map_err(CheckError::Options)
    }

    pub fn with_debounce(mut self, wait: Duration) -> Self {
        self.debounce_ms = wait.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CheckOptions::default();
        assert_eq!(options.debounce(), Duration::from_millis(500));
        assert_eq!(options.pending_message, "Verifying.....");
        assert_eq!(options.fallback_message, "Validation failed");
    }

    #[test]
    fn test_from_json_partial() {
        let options = CheckOptions::from_json(r#"{"debounce_ms": 50}"#).unwrap();
        assert_eq!(options.debounce(), Duration::from_millis(50));
        assert_eq!(options.pending_message, "Verifying.....");
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            CheckOptions::from_json("{not json"),
            Err(CheckError::Options(_))
        ));
    }

    #[test]
    fn test_with_debounce() {
        let options = CheckOptions::default().with_debounce(Duration::from_millis(20));
        assert_eq!(options.debounce_ms, 20);
    }
}
