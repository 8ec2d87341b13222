//! Built-in checks backed by the validation engine
//!
//! Every built-in is the same thin adapter: one named call into the
//! engine with the parameters from the pipeline document. The adapter
//! also normalizes the engine's tripwire signal into a triggered
//! verdict, so exceptions never drive control flow upstream.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::{
    check::{CheckParams, GuardrailCheck},
    engine::ValidatorEngine,
    error::CheckError,
    registry::CheckRegistry,
    CheckResult, Result,
};

/// The canonical built-in checks: (display name, engine validator id)
pub const BUILTIN_CHECKS: &[(&str, &str)] = &[
    ("Jailbreak", "jailbreak"),
    ("Moderation", "moderation"),
    ("Off Topic", "off_topic"),
    ("Contains PII", "contains_pii"),
    ("NSFW", "nsfw"),
    ("Hallucination", "hallucination"),
    ("URL Filter", "url_filter"),
    ("Custom Prompt", "custom_prompt"),
];

/// A named check evaluated by the external validation engine
pub struct EngineCheck {
    name: String,
    validator: String,
    engine: Arc<ValidatorEngine>,
}

impl EngineCheck {
    /// Create an engine-backed check
    ///
    /// # Arguments
    /// * `name` - Display name used in pipeline documents and reporting
    /// * `validator` - Engine-side validator identifier
    pub fn new(
        name: impl Into<String>,
        validator: impl Into<String>,
        engine: Arc<ValidatorEngine>,
    ) -> Self {
        Self {
            name: name.into(),
            validator: validator.into(),
            engine,
        }
    }
}

#[async_trait]
impl GuardrailCheck for EngineCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, text: &str, params: &CheckParams) -> Result<CheckResult> {
        match self.engine.validate(&self.validator, text, params).await {
            Ok(verdict) => Ok(CheckResult::new(&self.name, verdict.triggered, verdict.info)),
            // Tripwire signal is an expected outcome, not a fault
            Err(CheckError::Tripwire { info }) => Ok(CheckResult::triggered(
                &self.name,
                json!({"guardrail_name": self.name, "tripwire": info}),
            )),
            Err(e) => Err(e),
        }
    }
}

/// Register all built-in checks against one engine client
pub fn register_builtins(registry: &mut CheckRegistry, engine: Arc<ValidatorEngine>) {
    for (name, validator) in BUILTIN_CHECKS {
        registry.register(EngineCheck::new(*name, *validator, engine.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_are_unique() {
        let mut names: Vec<_> = BUILTIN_CHECKS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTIN_CHECKS.len());
    }

    #[test]
    fn test_register_builtins() {
        let engine = Arc::new(ValidatorEngine::new("http://localhost:9100"));
        let mut registry = CheckRegistry::new();
        register_builtins(&mut registry, engine);

        assert_eq!(registry.len(), BUILTIN_CHECKS.len());
        assert!(registry.contains("Jailbreak"));
        assert!(registry.contains("Contains PII"));
        assert!(!registry.contains("Unknown"));
    }

    #[test]
    fn test_engine_check_name() {
        let engine = Arc::new(ValidatorEngine::new("http://localhost:9100"));
        let check = EngineCheck::new("Off Topic", "off_topic", engine);
        assert_eq!(check.name(), "Off Topic");
    }
}
