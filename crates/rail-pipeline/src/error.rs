//! Error types for pipeline configuration and orchestration

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while loading or validating a pipeline
///
/// These are all startup-time faults. A running pipeline never errors
/// for guardrail triggers or per-check execution failures; those are
/// carried in the run trace and the result envelope.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Pipeline document could not be read
    #[error("Failed to read pipeline document: {0}")]
    Io(#[from] std::io::Error),

    /// Pipeline document is not valid JSON or has the wrong shape
    #[error("Malformed pipeline document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A configured check name has no registered capability
    #[error("Unknown check '{name}' configured for {stage} stage")]
    UnknownCheck {
        /// Configured check name
        name: String,
        /// Stage label
        stage: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_check_display() {
        let err = PipelineError::UnknownCheck {
            name: "Mystery".to_string(),
            stage: "Input",
        };
        assert_eq!(
            err.to_string(),
            "Unknown check 'Mystery' configured for Input stage"
        );
    }
}
