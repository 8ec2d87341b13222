//! HTTP request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use rail_checks::{CheckParams, CheckResult};
use rail_pipeline::{ResultAggregator, StageName};

use crate::{
    models::{AskRequest, CheckRequest, CompactResponse},
    state::AppState,
};

/// Health check
pub async fn health() -> &'static str {
    "OK"
}

/// Combined guardrail endpoint
///
/// Runs the full pipeline for one prompt and returns either the full
/// envelope (`detailed=true`, the default) or the compact legacy shape.
pub async fn combined_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let request_id = uuid::Uuid::new_v4();
    tracing::info!(
        %request_id,
        guardrail_enabled = req.guardrail_enabled,
        "Combined guardrail request"
    );

    let trace = state
        .orchestrator
        .run(&req.prompt, req.guardrail_enabled)
        .await;
    let envelope = ResultAggregator::build(&trace, &state.pipeline);

    tracing::info!(
        %request_id,
        success = envelope.success,
        triggered = envelope.summary.triggered_count,
        "Combined guardrail response"
    );

    let body = if req.detailed {
        serde_json::to_value(&envelope)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    } else {
        serde_json::to_value(CompactResponse {
            response: envelope.compact(),
        })
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    };

    Ok(Json(body))
}

/// Evaluate a single named check against a prompt
///
/// Parameters come from the first matching spec in the loaded pipeline
/// document; checks not configured anywhere run with empty parameters.
pub async fn single_check(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResult>, (StatusCode, String)> {
    let check = state
        .registry
        .get(&name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown check '{}'", name)))?;

    let params = configured_params(&state, &name).unwrap_or_default();

    let result = match check.evaluate(&req.prompt, &params).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Check '{}' failed to execute: {}", name, e);
            CheckResult::failed(&name, e.to_string())
        }
    };

    Ok(Json(result))
}

fn configured_params(state: &AppState, name: &str) -> Option<CheckParams> {
    StageName::ALL.iter().find_map(|stage| {
        state
            .pipeline
            .stage(*stage)
            .guardrails
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.parameters.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    use rail_checks::CheckRegistry;
    use rail_llm::{Completion, Message, ModelCompletion};
    use rail_pipeline::{PipelineConfig, PipelineOrchestrator};

    use async_trait::async_trait;

    struct PassingCheck(&'static str);

    #[async_trait]
    impl rail_checks::GuardrailCheck for PassingCheck {
        fn name(&self) -> &str {
            self.0
        }

        async fn evaluate(
            &self,
            _text: &str,
            _params: &CheckParams,
        ) -> rail_checks::Result<CheckResult> {
            Ok(CheckResult::passed(self.0))
        }
    }

    struct StubModel;

    #[async_trait]
    impl ModelCompletion for StubModel {
        async fn complete(
            &self,
            _messages: Vec<Message>,
            _temperature: Option<f32>,
        ) -> rail_llm::Result<Completion> {
            Ok(Completion {
                content: "stub".to_string(),
                model: "stub".to_string(),
                usage: None,
                finish_reason: None,
            })
        }

        fn model(&self) -> &str {
            "stub"
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn state() -> AppState {
        let mut registry = CheckRegistry::new();
        registry.register(PassingCheck("Jailbreak"));
        let registry = Arc::new(registry);

        let pipeline = Arc::new(
            PipelineConfig::from_value(json!({
                "input": { "guardrails": [{ "name": "Jailbreak", "confidence_threshold": 0.7 }] }
            }))
            .unwrap(),
        );

        let orchestrator = Arc::new(
            PipelineOrchestrator::new(pipeline.clone(), registry.clone(), Arc::new(StubModel))
                .unwrap(),
        );

        AppState::new(orchestrator, registry, pipeline)
    }

    #[test]
    fn test_configured_params_lookup() {
        let state = state();
        let params = configured_params(&state, "Jailbreak").unwrap();
        assert_eq!(params["confidence_threshold"], 0.7);
        assert!(configured_params(&state, "NSFW").is_none());
    }

    #[tokio::test]
    async fn test_single_check_unknown_name() {
        let state = state();
        let result = single_check(
            State(state),
            Path("Mystery".to_string()),
            Json(CheckRequest {
                prompt: "hello".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err((StatusCode::NOT_FOUND, _))));
    }

    #[tokio::test]
    async fn test_combined_ask_compact() {
        let state = state();
        let result = combined_ask(
            State(state),
            Json(AskRequest {
                prompt: "what is my balance?".to_string(),
                detailed: false,
                guardrail_enabled: true,
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.0["response"], "stub");
    }

    #[tokio::test]
    async fn test_combined_ask_detailed() {
        let state = state();
        let result = combined_ask(
            State(state),
            Json(AskRequest {
                prompt: "what is my balance?".to_string(),
                detailed: true,
                guardrail_enabled: true,
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.0["success"], true);
        assert_eq!(result.0["guardrail_enabled"], true);
        assert_eq!(result.0["summary"]["all_passed"], true);
    }
}
