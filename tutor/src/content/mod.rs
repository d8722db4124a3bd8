//! Content and classification provider: the black box behind concept extraction, lesson
//! planning, AUTO-mode parameter synthesis, understanding classification, MCQ generation and
//! summaries.
//!
//! Providers return raw text; `parse` turns it into typed values. Steps decide what a
//! failure means: `ProviderError::Unavailable` becomes a recoverable step error, while
//! `Malformed`/`Empty` make the step fall back to a documented placeholder.

mod mock;
mod openai;
pub mod parse;
mod request;

use async_trait::async_trait;

pub use mock::{classification_json, MockProvider};
pub use openai::OpenAiProvider;
pub use request::{ContentKind, ContentRequest};

/// Provider failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Service unreachable, timed out, or returned an error status. Retrying may help.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// Response arrived but could not be used.
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("empty response")]
    Empty,
}

impl ProviderError {
    /// Whether the step should substitute a placeholder rather than fail.
    pub fn is_fallback(&self) -> bool {
        matches!(self, ProviderError::Malformed(_) | ProviderError::Empty)
    }
}

/// Produces structured content for a request, as raw text (usually JSON).
///
/// Calls are synchronous from the step's point of view and may be repeated when a step is
/// re-run; implementations must tolerate duplicate invocation. Timeouts belong here, not in
/// the engine.
///
/// **Interaction**: Shared as `Arc<dyn ContentProvider>` by the steps built in
/// `steps::standard_registry`.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn generate(&self, request: &ContentRequest) -> Result<String, ProviderError>;
}
