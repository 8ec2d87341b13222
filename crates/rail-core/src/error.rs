//! Error types shared across the railbank service
//!
//! Crate-level errors (checks, completion, pipeline) wrap or convert
//! into this type at the service boundary.

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, RailError>;

/// Main error type for the railbank service
#[derive(Debug, thiserror::Error)]
pub enum RailError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Settings parsing errors
    #[error("Settings parse error: {0}")]
    SettingsParse(#[from] config::ConfigError),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl RailError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
