//! Error types for guardrail check execution

use serde_json::Value;

/// Result type for check operations
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors that can occur while executing a guardrail check
///
/// An error here means the check could not evaluate cleanly. It is never
/// equivalent to a "triggered" or "passed" verdict; the stage runner
/// records it as `execution_failed` and moves on.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// HTTP request to the validation engine failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Engine returned an error
    #[error("Engine error: {0}")]
    EngineError(String),

    /// Failed to parse engine response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Timeout
    #[error("Check timed out")]
    Timeout,

    /// The engine raised a tripwire signal instead of returning a verdict
    ///
    /// Adapters normalize this into a triggered [`crate::CheckResult`];
    /// it should never escape the check layer.
    #[error("Guardrail tripwire raised by engine")]
    Tripwire {
        /// Diagnostic payload from the engine
        info: Value,
    },
}

impl CheckError {
    /// Create an engine error
    pub fn engine_error<S: Into<String>>(msg: S) -> Self {
        Self::EngineError(msg.into())
    }

    /// Create a parse error
    pub fn parse_error<S: Into<String>>(msg: S) -> Self {
        Self::ParseError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CheckError::engine_error("validator unavailable");
        assert!(matches!(err, CheckError::EngineError(_)));
        assert_eq!(err.to_string(), "Engine error: validator unavailable");
    }

    #[test]
    fn test_tripwire_carries_info() {
        let err = CheckError::Tripwire {
            info: serde_json::json!({"guardrail_name": "Jailbreak"}),
        };
        match err {
            CheckError::Tripwire { info } => {
                assert_eq!(info["guardrail_name"], "Jailbreak");
            }
            _ => panic!("expected tripwire"),
        }
    }
}
