//! Railbank LLM
//!
//! Model completion boundary for the railbank service: conversation
//! types, the [`ModelCompletion`] trait, and an OpenAI-compatible client.

pub mod completion;
pub mod error;
pub mod openai;
pub mod types;

// Re-exports
pub use completion::ModelCompletion;
pub use error::{CompletionError, Result};
pub use openai::OpenAIClient;
pub use types::{Completion, Message, MessageRole, TokenUsage};
