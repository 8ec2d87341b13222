//! Result aggregation and the uniform response envelope
//!
//! The aggregator reconciles executed verdicts against the full
//! configured check list and builds one envelope shape for every
//! terminal state. Two reporting policies apply:
//!
//! - Full-run path (the run reached the output stage): every configured
//!   check is enumerated; unreached checks are synthesized as passed
//!   ("optimistic fill") so consumers can always render a complete
//!   checklist.
//! - Blocked path (preflight/input halt): only the triggering check is
//!   reported and stage lists stay empty — a stage that was never
//!   attempted is "no results available", not "passed".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rail_checks::CheckResult;

use crate::{
    config::{CheckSpec, PipelineConfig, StageName},
    orchestrator::{RunOutcome, RunTrace},
};

/// One check's entry in the envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Check name
    pub name: String,
    /// Whether the check triggered
    pub triggered: bool,
    /// Whether the check errored instead of evaluating
    pub execution_failed: bool,
    /// Diagnostic payload
    pub details: Value,
}

impl CheckReport {
    fn from_result(result: &CheckResult) -> Self {
        Self {
            name: result.name.clone(),
            triggered: result.triggered,
            execution_failed: result.execution_failed,
            details: result.info.clone(),
        }
    }

    fn assumed_passed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            triggered: false,
            execution_failed: false,
            details: serde_json::json!({"status": "passed"}),
        }
    }
}

/// Per-stage check reports plus the triggered/passed name lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardrailReport {
    /// Preflight stage entries
    pub preflight: Vec<CheckReport>,
    /// Input stage entries
    pub input: Vec<CheckReport>,
    /// Output stage entries
    pub output: Vec<CheckReport>,
    /// `"<Stage>: <Name>"` for every triggered check, in stage order
    pub triggered_guardrails: Vec<String>,
    /// `"<Stage>: <Name>"` for every cleanly passed check, in stage order
    pub passed_guardrails: Vec<String>,
}

/// Summary counts for the envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Configured preflight checks reported
    pub total_preflight: usize,
    /// Configured input checks reported
    pub total_input: usize,
    /// Configured output checks reported
    pub total_output: usize,
    /// Number of triggered checks
    pub triggered_count: usize,
    /// Number of cleanly passed checks
    pub passed_count: usize,
    /// Whether zero checks triggered
    pub all_passed: bool,
}

/// Detail about the single triggering check on the blocked path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredDetail {
    /// Check name
    pub name: String,
    /// Stage label
    pub stage: String,
    /// Whether the check errored rather than evaluating
    pub execution_failed: bool,
    /// Diagnostic payload
    pub details: Value,
}

/// The terminal value of one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRunResult {
    /// True iff zero checks triggered and the completion succeeded
    pub success: bool,

    /// Response text; `null` when blocked, suppressed, or failed
    pub response: Option<String>,

    /// Populated only for model invocation faults and the blocked path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whether guardrails ran for this request
    pub guardrail_enabled: bool,

    /// Per-stage verdicts and name lists
    pub guardrail_results: GuardrailReport,

    /// Blocked path only: the check that fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_guardrail: Option<TriggeredDetail>,

    /// Summary counts
    pub summary: RunSummary,

    /// Human-readable status line
    pub message: String,
}

impl PipelineRunResult {
    /// Shortened backward-compatible form: the response text or a fixed
    /// sentinel identifying the fired guardrail
    pub fn compact(&self) -> String {
        if let Some(response) = &self.response {
            return response.clone();
        }
        if let Some(detail) = &self.triggered_guardrail {
            return format!("{} Guardrail Triggered", detail.name);
        }
        if self.summary.triggered_count > 0 {
            return "Guardrail Triggered".to_string();
        }
        match &self.error {
            Some(e) => format!("Error: {}", e),
            None => "No response generated".to_string(),
        }
    }
}

/// Builds the response envelope from an orchestrator trace
pub struct ResultAggregator;

impl ResultAggregator {
    /// Build the envelope for one run
    pub fn build(trace: &RunTrace, config: &PipelineConfig) -> PipelineRunResult {
        match &trace.outcome {
            RunOutcome::ModelFailed { error } => Self::model_failed(trace, config, error),
            _ if !trace.guardrail_enabled => Self::disabled(trace),
            RunOutcome::Blocked { stage, check } => Self::blocked(*stage, check),
            RunOutcome::Completed { .. } | RunOutcome::Suppressed { .. } => {
                Self::full_run(trace, config)
            }
        }
    }

    /// Full-run path: reconcile every stage with optimistic fill
    fn full_run(trace: &RunTrace, config: &PipelineConfig) -> PipelineRunResult {
        let mut report = GuardrailReport::default();

        for stage in StageName::ALL {
            let executed = trace
                .stage(stage)
                .map(|e| e.results.as_slice())
                .unwrap_or(&[]);
            let entries = Self::reconcile(&config.stage(stage).guardrails, executed);

            for entry in &entries {
                let label = format!("{}: {}", stage.label(), entry.name);
                if entry.triggered {
                    report.triggered_guardrails.push(label);
                } else if !entry.execution_failed {
                    report.passed_guardrails.push(label);
                }
                // execution_failed entries appear in the stage list only:
                // inconclusive, neither triggered nor passed
            }

            match stage {
                StageName::Preflight => report.preflight = entries,
                StageName::Input => report.input = entries,
                StageName::Output => report.output = entries,
            }
        }

        let summary = Self::summarize(&report);
        let success = summary.all_passed;
        let response = match &trace.outcome {
            RunOutcome::Completed { response } if success => Some(response.clone()),
            // A suppressed or post-generation-triggered response never
            // reaches the caller, even partially.
            _ => None,
        };
        let message = if success {
            "All guardrails passed successfully.".to_string()
        } else {
            format!("{} guardrail(s) triggered.", summary.triggered_count)
        };

        PipelineRunResult {
            success,
            response,
            error: None,
            guardrail_enabled: true,
            guardrail_results: report,
            triggered_guardrail: None,
            summary,
            message,
        }
    }

    /// Blocked path: report only the triggering check
    fn blocked(stage: StageName, check: &CheckResult) -> PipelineRunResult {
        let label = format!("{}: {}", stage.label(), check.name);

        let report = GuardrailReport {
            triggered_guardrails: vec![label],
            ..GuardrailReport::default()
        };

        PipelineRunResult {
            success: false,
            response: None,
            error: Some("Guardrail Tripwire Triggered".to_string()),
            guardrail_enabled: true,
            guardrail_results: report,
            triggered_guardrail: Some(TriggeredDetail {
                name: check.name.clone(),
                stage: stage.label().to_string(),
                execution_failed: check.execution_failed,
                details: check.info.clone(),
            }),
            summary: RunSummary {
                triggered_count: 1,
                all_passed: false,
                ..RunSummary::default()
            },
            message: format!(
                "Guardrail '{}' detected a violation. The request was blocked to protect \
                 CashPlant Bank's security and compliance standards.",
                check.name
            ),
        }
    }

    /// Model invocation fault: report the error plus whatever stages ran
    fn model_failed(trace: &RunTrace, config: &PipelineConfig, error: &str) -> PipelineRunResult {
        let mut report = GuardrailReport::default();

        // Stages that ran are reported as-is; never-attempted stages
        // stay empty rather than being filled as passed.
        for stage in StageName::ALL {
            let Some(execution) = trace.stage(stage) else {
                continue;
            };
            let entries = Self::reconcile(&config.stage(stage).guardrails, &execution.results);
            for entry in &entries {
                if entry.triggered || entry.execution_failed {
                    continue;
                }
                report
                    .passed_guardrails
                    .push(format!("{}: {}", stage.label(), entry.name));
            }
            match stage {
                StageName::Preflight => report.preflight = entries,
                StageName::Input => report.input = entries,
                StageName::Output => report.output = entries,
            }
        }

        let summary = Self::summarize(&report);

        PipelineRunResult {
            success: false,
            response: None,
            error: Some(error.to_string()),
            guardrail_enabled: trace.guardrail_enabled,
            guardrail_results: report,
            triggered_guardrail: None,
            summary,
            message: format!("Error generating response: {}", error),
        }
    }

    /// Guardrails-disabled path: no stage ever runs
    fn disabled(trace: &RunTrace) -> PipelineRunResult {
        let response = match &trace.outcome {
            RunOutcome::Completed { response } => Some(response.clone()),
            _ => None,
        };

        PipelineRunResult {
            success: response.is_some(),
            response,
            error: None,
            guardrail_enabled: false,
            guardrail_results: GuardrailReport::default(),
            triggered_guardrail: None,
            summary: RunSummary {
                all_passed: true,
                ..RunSummary::default()
            },
            message: "Guardrails disabled - response generated without guardrail protection."
                .to_string(),
        }
    }

    /// Reconcile executed verdicts against the configured list
    ///
    /// Executed checks keep their verdicts by index; configured checks
    /// beyond the executed prefix are synthesized as passed.
    fn reconcile(configured: &[CheckSpec], executed: &[CheckResult]) -> Vec<CheckReport> {
        configured
            .iter()
            .enumerate()
            .map(|(idx, spec)| match executed.get(idx) {
                Some(result) => CheckReport::from_result(result),
                None => CheckReport::assumed_passed(&spec.name),
            })
            .collect()
    }

    fn summarize(report: &GuardrailReport) -> RunSummary {
        let triggered_count = report.triggered_guardrails.len();
        RunSummary {
            total_preflight: report.preflight.len(),
            total_input: report.input.len(),
            total_output: report.output.len(),
            triggered_count,
            passed_count: report.passed_guardrails.len(),
            all_passed: triggered_count == 0,
        }
    }
}
