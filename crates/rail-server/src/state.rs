//! Shared application state

use std::sync::Arc;

use rail_checks::CheckRegistry;
use rail_pipeline::{PipelineConfig, PipelineOrchestrator};

/// State shared by all request handlers
///
/// Everything here is immutable after startup; requests only read it.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub registry: Arc<CheckRegistry>,
    pub pipeline: Arc<PipelineConfig>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<PipelineOrchestrator>,
        registry: Arc<CheckRegistry>,
        pipeline: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            orchestrator,
            registry,
            pipeline,
        }
    }
}
