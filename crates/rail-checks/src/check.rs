//! Guardrail check trait definition

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{CheckResult, Result};

/// Opaque key-value parameters for one configured check
pub type CheckParams = Map<String, Value>;

/// Trait for guardrail check capabilities
///
/// A check is a named predicate over text. Evaluation returns a
/// [`CheckResult`] for both triggered and passed outcomes; an `Err` is
/// reserved for infrastructure faults (the check could not run).
#[async_trait]
pub trait GuardrailCheck: Send + Sync {
    /// Get the name of this check, e.g. "Jailbreak"
    fn name(&self) -> &str;

    /// Evaluate the text with the configured parameters
    async fn evaluate(&self, text: &str, params: &CheckParams) -> Result<CheckResult>;
}
