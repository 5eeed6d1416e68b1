//! Reasoning client contract
//!
//! The office never talks to a language model directly. It depends on the
//! `ReasoningClient` trait (given a prompt, produce text or fail) and
//! wraps it in a `ReactionService` that owns retries, timeouts and the
//! fallback strings, so callers always get text back.

pub mod prompt;
pub mod retry;
pub mod scripted;
pub mod state;

pub use retry::{ReactionService, RetryPolicy};
pub use scripted::ScriptedClient;
pub use state::NextState;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Reasons a reasoning request can fail
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReasoningError {
    #[error("Reasoning request failed: {0}")]
    Failed(String),

    #[error("Reasoning reply could not be parsed: {0}")]
    Malformed(String),

    #[error("Reasoning request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ReasoningError>,
    },
}

/// Text completion backend
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError>;
}

#[async_trait]
impl<C: ReasoningClient + ?Sized> ReasoningClient for Arc<C> {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        (**self).complete(prompt).await
    }
}

#[async_trait]
impl<C: ReasoningClient + ?Sized> ReasoningClient for Box<C> {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        (**self).complete(prompt).await
    }
}
