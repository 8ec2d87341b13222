//! Railbank Checks
//!
//! Guardrail check capabilities for the railbank service: the
//! [`GuardrailCheck`] trait, per-check verdicts, the name→check
//! registry, and the client for the external validation engine that
//! scores text for the built-in checks.
//!
//! # Example
//!
//! ```
//! use rail_checks::{CheckRegistry, ValidatorEngine, builtin};
//! use std::sync::Arc;
//!
//! let engine = Arc::new(ValidatorEngine::new("http://localhost:9100"));
//! let mut registry = CheckRegistry::new();
//! builtin::register_builtins(&mut registry, engine);
//! assert!(registry.contains("Jailbreak"));
//! ```

pub mod builtin;
pub mod check;
pub mod engine;
pub mod error;
pub mod registry;
pub mod result;

// Re-exports
pub use check::{CheckParams, GuardrailCheck};
pub use engine::{EngineVerdict, ValidatorEngine};
pub use error::{CheckError, Result};
pub use registry::CheckRegistry;
pub use result::CheckResult;
