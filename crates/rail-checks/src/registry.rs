//! Runtime registry of named guardrail checks
//!
//! Pipeline documents refer to checks by name; the registry resolves
//! those names to capabilities. Built-ins are registered at startup and
//! callers may register their own custom checks alongside them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::check::GuardrailCheck;

/// Registry mapping check names to capabilities
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: HashMap<String, Arc<dyn GuardrailCheck>>,
}

impl CheckRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Register a check under its own name
    ///
    /// Re-registering a name replaces the previous capability.
    pub fn register<C: GuardrailCheck + 'static>(&mut self, check: C) {
        let name = check.name().to_string();
        if self.checks.insert(name.clone(), Arc::new(check)).is_some() {
            tracing::warn!("Check '{}' re-registered, replacing previous", name);
        }
    }

    /// Look up a check by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn GuardrailCheck>> {
        self.checks.get(name).cloned()
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered check names, unordered
    pub fn names(&self) -> Vec<&str> {
        self.checks.keys().map(String::as_str).collect()
    }

    /// Number of registered checks
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckParams;
    use crate::{CheckResult, Result};
    use async_trait::async_trait;

    struct NamedCheck(&'static str);

    #[async_trait]
    impl GuardrailCheck for NamedCheck {
        fn name(&self) -> &str {
            self.0
        }

        async fn evaluate(&self, _text: &str, _params: &CheckParams) -> Result<CheckResult> {
            Ok(CheckResult::passed(self.0))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = CheckRegistry::new();
        assert!(registry.is_empty());

        registry.register(NamedCheck("Jailbreak"));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Jailbreak").is_some());
        assert!(registry.get("NSFW").is_none());
    }

    #[test]
    fn test_custom_check_registration() {
        let mut registry = CheckRegistry::new();
        registry.register(NamedCheck("My Custom Rule"));
        assert!(registry.contains("My Custom Rule"));
    }

    #[test]
    fn test_re_register_replaces() {
        let mut registry = CheckRegistry::new();
        registry.register(NamedCheck("Moderation"));
        registry.register(NamedCheck("Moderation"));
        assert_eq!(registry.len(), 1);
    }
}
