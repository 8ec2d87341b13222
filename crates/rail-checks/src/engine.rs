//! HTTP client for the external validation engine
//!
//! The engine scores text against named validators. It normally returns
//! a verdict body; it may instead answer with HTTP 409 and a tripwire
//! payload naming the fired guardrail. Both forms are surfaced here and
//! normalized into a [`crate::CheckResult`] by the adapters in
//! [`crate::builtin`].

use backoff::{future::retry, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::{
    check::CheckParams,
    error::{CheckError, Result},
};

/// Verdict returned by the validation engine for one evaluation
#[derive(Debug, Clone, Deserialize)]
pub struct EngineVerdict {
    /// Whether the validator classified the text as a violation
    pub triggered: bool,

    /// Validator-specific diagnostic payload
    #[serde(default)]
    pub info: Value,
}

/// Client for the external validation engine
///
/// Safe for concurrent use; holds a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ValidatorEngine {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ValidatorEngine {
    /// Create a new engine client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Evaluate text against a named validator
    ///
    /// # Arguments
    /// * `validator` - Engine-side validator identifier, e.g. "jailbreak"
    /// * `text` - Text artifact to score
    /// * `params` - Opaque validator parameters from the pipeline document
    pub async fn validate(
        &self,
        validator: &str,
        text: &str,
        params: &CheckParams,
    ) -> Result<EngineVerdict> {
        let request = ValidateRequest {
            validator: validator.to_string(),
            text: text.to_string(),
            parameters: Value::Object(params.clone()),
        };

        let operation = || async {
            let response = self
                .client
                .post(format!("{}/validate", self.base_url))
                .header("Content-Type", "application/json")
                .timeout(self.timeout)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        backoff::Error::Permanent(CheckError::Timeout)
                    } else {
                        backoff::Error::Transient {
                            err: CheckError::HttpError(e),
                            retry_after: None,
                        }
                    }
                })?;

            let status = response.status();

            // Tripwire signal: the engine blocked the request itself
            if status == StatusCode::CONFLICT {
                let info = response.json::<Value>().await.unwrap_or(Value::Null);
                return Err(backoff::Error::Permanent(CheckError::Tripwire { info }));
            }

            // Handle rate limiting
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs: Option<u64> = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());

                return Err(backoff::Error::Transient {
                    err: CheckError::engine_error("rate limited"),
                    retry_after: retry_after_secs.map(Duration::from_secs),
                });
            }

            // Handle server errors (retryable)
            if status.is_server_error() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(backoff::Error::Transient {
                    err: CheckError::engine_error(format!("Server error: {}", error_text)),
                    retry_after: None,
                });
            }

            // Handle client errors (not retryable)
            if status.is_client_error() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(backoff::Error::Permanent(CheckError::engine_error(
                    format!("Client error ({}): {}", status, error_text),
                )));
            }

            // Parse successful verdict
            response
                .json::<EngineVerdict>()
                .await
                .map_err(|e| backoff::Error::Permanent(CheckError::parse_error(e.to_string())))
        };

        let backoff_config = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(15)),
            ..Default::default()
        };

        retry(backoff_config, operation).await
    }
}

#[derive(Debug, Serialize)]
struct ValidateRequest {
    validator: String,
    text: String,
    parameters: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = ValidatorEngine::new("http://localhost:9100")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(engine.base_url, "http://localhost:9100");
        assert_eq!(engine.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_verdict_deserialization() {
        let json = r#"{"triggered": true, "info": {"confidence": 0.92}}"#;
        let verdict: EngineVerdict = serde_json::from_str(json).unwrap();
        assert!(verdict.triggered);
        assert_eq!(verdict.info["confidence"], 0.92);
    }

    #[test]
    fn test_verdict_without_info() {
        let json = r#"{"triggered": false}"#;
        let verdict: EngineVerdict = serde_json::from_str(json).unwrap();
        assert!(!verdict.triggered);
        assert!(verdict.info.is_null());
    }
}
