//! Stage runner
//!
//! Executes the checks configured for one stage against one text
//! artifact, strictly in order and fail-fast: evaluation stops at the
//! first triggered verdict. A check that errors is recorded as an
//! execution failure and the stage continues; an inconclusive check
//! must not end the stage, but it must not count as passed either.

use std::sync::Arc;

use rail_checks::{CheckRegistry, CheckResult};

use crate::config::{StageConfig, StageName};

/// The outcome of running one stage
#[derive(Debug, Clone, Default)]
pub struct StageExecution {
    /// Verdicts for the checks that actually executed, in order
    pub results: Vec<CheckResult>,

    /// Whether the stage stopped early on a triggered check
    pub halted_early: bool,
}

impl StageExecution {
    /// The check that halted the stage, if any
    pub fn triggering_check(&self) -> Option<&CheckResult> {
        if self.halted_early {
            self.results.iter().rev().find(|r| r.triggered)
        } else {
            None
        }
    }
}

/// Runs the configured checks for one stage
pub struct StageRunner {
    registry: Arc<CheckRegistry>,
}

impl StageRunner {
    /// Create a runner over a check registry
    pub fn new(registry: Arc<CheckRegistry>) -> Self {
        Self { registry }
    }

    /// Run all checks for a stage against the given text
    ///
    /// Never errors: triggered verdicts and per-check execution failures
    /// are both expected outcomes carried in the returned execution.
    pub async fn run(&self, stage: StageName, config: &StageConfig, text: &str) -> StageExecution {
        let mut results = Vec::with_capacity(config.guardrails.len());

        for spec in &config.guardrails {
            let Some(check) = self.registry.get(&spec.name) else {
                // Names are validated at startup; a miss here is an
                // execution failure, not a pass.
                tracing::error!("Check '{}' not registered", spec.name);
                results.push(CheckResult::failed(&spec.name, "check not registered"));
                continue;
            };

            match check.evaluate(text, &spec.parameters).await {
                Ok(result) if result.triggered => {
                    tracing::warn!(
                        "Guardrail {} triggered on {} stage",
                        result.name,
                        stage.label()
                    );
                    results.push(result);
                    return StageExecution {
                        results,
                        halted_early: true,
                    };
                }
                Ok(result) => {
                    tracing::debug!("Guardrail {} passed on {} stage", result.name, stage.label());
                    results.push(result);
                }
                Err(e) => {
                    tracing::error!(
                        "Guardrail {} failed to execute on {} stage: {}",
                        spec.name,
                        stage.label(),
                        e
                    );
                    results.push(CheckResult::failed(&spec.name, e.to_string()));
                }
            }
        }

        StageExecution {
            results,
            halted_early: false,
        }
    }
}
