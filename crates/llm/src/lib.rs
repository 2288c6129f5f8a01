//! Response generation: turns conversation history into assistant text by
//! calling the external generative-language endpoint.
//!
//! The default implementation maps every transport or HTTP failure to a
//! canned, informative fallback string, so chat degrades instead of
//! erroring while the rest of the application keeps working.

use async_trait::async_trait;
use domain::ChatMessage;
use thiserror::Error;

pub mod fallback;
pub mod gemini;
pub mod persona;

pub use gemini::GeminiGenerator;

#[derive(Debug, Error)]
pub enum GenError {
    /// The caller asked for a reply to an empty conversation.
    #[error("no conversation turn to respond to")]
    EmptyHistory,

    #[error("generation failed: {0}")]
    Other(String),
}

/// Produces the assistant side of a conversation turn.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generates a reply to the latest turn in `history`.
    async fn generate(&self, history: &[ChatMessage]) -> Result<String, GenError>;
}
