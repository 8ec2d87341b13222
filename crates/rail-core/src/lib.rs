//! Railbank Core
//!
//! Shared foundation for the railbank guardrail demo service: error
//! handling, service configuration, and logging setup.

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{load_config, load_config_or_default, ServiceConfig};
pub use error::{RailError, Result};
pub use logging::init_logging;
