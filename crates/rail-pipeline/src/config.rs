//! Declarative pipeline configuration
//!
//! A pipeline document maps each stage to an ordered list of named
//! checks with opaque parameters:
//!
//! ```json
//! {
//!   "preflight": { "guardrails": [{ "name": "Contains PII" }, { "name": "Moderation" }] },
//!   "input":     { "guardrails": [{ "name": "Jailbreak", "confidence_threshold": 0.7 }] },
//!   "output":    { "guardrails": [{ "name": "NSFW" }] }
//! }
//! ```
//!
//! The `pre_flight` spelling is accepted as an alias. Missing stages are
//! empty and always pass. Loaded once at startup and immutable after.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use rail_checks::{CheckParams, CheckRegistry};

use crate::error::{PipelineError, Result};

/// The three pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    /// Runs before any processing, against the user prompt
    Preflight,
    /// Runs before model invocation, against the user prompt
    Input,
    /// Runs after model invocation, against the generated completion
    Output,
}

impl StageName {
    /// All stages in execution order
    pub const ALL: [StageName; 3] = [StageName::Preflight, StageName::Input, StageName::Output];

    /// Capitalized label used in reporting, e.g. "Preflight: Contains PII"
    pub fn label(&self) -> &'static str {
        match self {
            StageName::Preflight => "Preflight",
            StageName::Input => "Input",
            StageName::Output => "Output",
        }
    }
}

/// One configured check: a name plus opaque parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Check name resolved through the registry
    pub name: String,

    /// Validator-specific parameters, passed through untouched
    #[serde(flatten)]
    pub parameters: CheckParams,
}

/// Ordered checks for one stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageConfig {
    /// Checks in evaluation order
    #[serde(default)]
    pub guardrails: Vec<CheckSpec>,
}

/// Immutable pipeline definition, loaded once at process start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Preflight stage checks
    #[serde(default, alias = "pre_flight")]
    pub preflight: StageConfig,

    /// Input stage checks
    #[serde(default)]
    pub input: StageConfig,

    /// Output stage checks
    #[serde(default)]
    pub output: StageConfig,
}

impl PipelineConfig {
    /// Load a pipeline document from a JSON file
    ///
    /// A missing or malformed document is fatal; the service must refuse
    /// to serve rather than run with a partial pipeline.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.log_duplicates();
        tracing::info!(
            "Pipeline loaded from {} ({} preflight, {} input, {} output checks)",
            path.as_ref().display(),
            config.preflight.guardrails.len(),
            config.input.guardrails.len(),
            config.output.guardrails.len(),
        );
        Ok(config)
    }

    /// Build a pipeline from an in-memory JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.log_duplicates();
        Ok(config)
    }

    /// The configuration for one stage
    pub fn stage(&self, stage: StageName) -> &StageConfig {
        match stage {
            StageName::Preflight => &self.preflight,
            StageName::Input => &self.input,
            StageName::Output => &self.output,
        }
    }

    /// Configured check names for one stage, in order
    pub fn check_names(&self, stage: StageName) -> Vec<&str> {
        self.stage(stage)
            .guardrails
            .iter()
            .map(|spec| spec.name.as_str())
            .collect()
    }

    /// Verify every configured name resolves in the registry
    pub fn validate(&self, registry: &CheckRegistry) -> Result<()> {
        for stage in StageName::ALL {
            for spec in &self.stage(stage).guardrails {
                if !registry.contains(&spec.name) {
                    return Err(PipelineError::UnknownCheck {
                        name: spec.name.clone(),
                        stage: stage.label(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Warn on duplicate names within a stage
    ///
    /// Duplicates are permitted by the format but make aggregation
    /// ambiguous, so they are a configuration warning rather than an
    /// error.
    fn log_duplicates(&self) {
        for stage in StageName::ALL {
            let names = self.check_names(stage);
            let mut seen = std::collections::HashSet::new();
            for name in names {
                if !seen.insert(name) {
                    tracing::warn!(
                        "Duplicate check '{}' in {} stage; reporting will be ambiguous",
                        name,
                        stage.label()
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_full_document() {
        let config = PipelineConfig::from_value(json!({
            "preflight": { "guardrails": [{ "name": "Contains PII" }, { "name": "Moderation" }] },
            "input": { "guardrails": [{ "name": "Jailbreak", "confidence_threshold": 0.7 }] },
            "output": { "guardrails": [{ "name": "NSFW" }] }
        }))
        .unwrap();

        assert_eq!(
            config.check_names(StageName::Preflight),
            vec!["Contains PII", "Moderation"]
        );
        assert_eq!(config.check_names(StageName::Input), vec!["Jailbreak"]);
        assert_eq!(config.check_names(StageName::Output), vec!["NSFW"]);
    }

    #[test]
    fn test_pre_flight_alias() {
        let config = PipelineConfig::from_value(json!({
            "pre_flight": { "guardrails": [{ "name": "Moderation" }] }
        }))
        .unwrap();

        assert_eq!(config.check_names(StageName::Preflight), vec!["Moderation"]);
    }

    #[test]
    fn test_missing_stages_are_empty() {
        let config = PipelineConfig::from_value(json!({
            "input": { "guardrails": [{ "name": "Jailbreak" }] }
        }))
        .unwrap();

        assert!(config.preflight.guardrails.is_empty());
        assert!(config.output.guardrails.is_empty());
    }

    #[test]
    fn test_parameters_are_opaque() {
        let config = PipelineConfig::from_value(json!({
            "input": { "guardrails": [{ "name": "Off Topic", "topics": ["banking"], "threshold": 0.5 }] }
        }))
        .unwrap();

        let spec = &config.input.guardrails[0];
        assert_eq!(spec.parameters["topics"], json!(["banking"]));
        assert_eq!(spec.parameters["threshold"], 0.5);
    }

    #[test]
    fn test_malformed_document_is_rejected() {
        let result = PipelineConfig::from_value(json!({
            "input": { "guardrails": [{ "no_name_field": true }] }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = PipelineConfig::from_path("does/not/exist.json");
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(StageName::Preflight.label(), "Preflight");
        assert_eq!(StageName::Input.label(), "Input");
        assert_eq!(StageName::Output.label(), "Output");
    }
}
