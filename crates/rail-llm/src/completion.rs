//! Model completion trait definition

use async_trait::async_trait;

use crate::{Completion, Message, Result};

/// Trait for model completion capabilities
///
/// Implementations provide a unified interface for different completion
/// services. The orchestrator receives a handle to this trait and never
/// talks to a concrete provider directly.
#[async_trait]
pub trait ModelCompletion: Send + Sync {
    /// Send a conversation and wait for the complete response
    ///
    /// # Arguments
    /// * `messages` - Conversation including system instruction and user prompt
    /// * `temperature` - Sampling temperature, provider default if `None`
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: Option<f32>,
    ) -> Result<Completion>;

    /// Get the model name/identifier
    fn model(&self) -> &str;

    /// Get the provider name
    fn name(&self) -> &str;
}
