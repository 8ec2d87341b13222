//! Per-check verdicts

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The verdict of one executed guardrail check
///
/// Three distinct states: triggered, passed, and execution failed.
/// An execution failure means the check could not evaluate at all and
/// must not be read as either "safe" or "violating".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name of the check that produced this verdict
    pub name: String,

    /// Whether the check classified the text as a violation
    pub triggered: bool,

    /// Whether the check itself errored instead of evaluating cleanly
    pub execution_failed: bool,

    /// Check-specific diagnostic payload (matched entities, scores, ...)
    pub info: Value,
}

impl CheckResult {
    /// Create a verdict from an executed check
    pub fn new(name: impl Into<String>, triggered: bool, info: Value) -> Self {
        Self {
            name: name.into(),
            triggered,
            execution_failed: false,
            info,
        }
    }

    /// Create a clean "passed" verdict
    pub fn passed(name: impl Into<String>) -> Self {
        Self::new(name, false, json!({"status": "passed"}))
    }

    /// Create a triggered verdict
    pub fn triggered(name: impl Into<String>, info: Value) -> Self {
        Self::new(name, true, info)
    }

    /// Create an execution-failure verdict
    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triggered: false,
            execution_failed: true,
            info: json!({"error": reason.into()}),
        }
    }

    /// Whether the check evaluated cleanly and did not trigger
    pub fn is_clean_pass(&self) -> bool {
        !self.triggered && !self.execution_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_verdict() {
        let result = CheckResult::passed("Jailbreak");
        assert!(!result.triggered);
        assert!(!result.execution_failed);
        assert!(result.is_clean_pass());
        assert_eq!(result.info["status"], "passed");
    }

    #[test]
    fn test_triggered_verdict() {
        let result = CheckResult::triggered("NSFW", json!({"confidence": 0.97}));
        assert!(result.triggered);
        assert!(!result.is_clean_pass());
        assert_eq!(result.info["confidence"], 0.97);
    }

    #[test]
    fn test_failed_is_third_state() {
        let result = CheckResult::failed("Moderation", "engine timeout");
        assert!(!result.triggered);
        assert!(result.execution_failed);
        assert!(!result.is_clean_pass());
        assert_eq!(result.info["error"], "engine timeout");
    }

    #[test]
    fn test_serialization() {
        let result = CheckResult::triggered("Contains PII", json!({"entities": ["SSN"]}));
        let json = serde_json::to_string(&result).unwrap();
        let deserialized: CheckResult = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.name, "Contains PII");
        assert!(deserialized.triggered);
    }
}
