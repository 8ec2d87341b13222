//! Request/Response models

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Request body for the combined guardrail endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    /// The user's prompt
    pub prompt: String,

    /// Return the full envelope; `false` gives the compact legacy shape
    #[serde(default = "default_true")]
    pub detailed: bool,

    /// Run the guardrail pipeline; `false` invokes the model directly
    #[serde(default = "default_true")]
    pub guardrail_enabled: bool,
}

/// Compact legacy response shape
#[derive(Debug, Serialize, Deserialize)]
pub struct CompactResponse {
    /// Response text or guardrail sentinel
    pub response: String,
}

/// Request body for the single-check endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Text to evaluate against one named check
    pub prompt: String,
}
