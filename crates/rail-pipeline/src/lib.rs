//! Railbank Pipeline
//!
//! The guardrail orchestration core: a declarative pipeline definition
//! sequences named checks across three stages (preflight, input,
//! output) around a model completion call. Stage runs are fail-fast,
//! the orchestrator decides whether the model is invoked at all, and
//! the aggregator reduces everything to one uniform result envelope.

pub mod config;
pub mod envelope;
pub mod error;
pub mod orchestrator;
pub mod runner;

// Re-exports
pub use config::{CheckSpec, PipelineConfig, StageConfig, StageName};
pub use envelope::{
    CheckReport, GuardrailReport, PipelineRunResult, ResultAggregator, RunSummary, TriggeredDetail,
};
pub use error::{PipelineError, Result};
pub use orchestrator::{PipelineOrchestrator, RunOutcome, RunTrace, SYSTEM_PROMPT};
pub use runner::{StageExecution, StageRunner};
