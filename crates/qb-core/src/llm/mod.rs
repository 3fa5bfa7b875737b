//! Answer provider client and types
//!
//! Supports OpenAI-compatible APIs (GLM, etc.) and the Claude messages API.

mod client;
mod types;

pub use client::ChatClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Pluggable answer provider seam.
///
/// Takes only the question text and returns the provider's raw free-text
/// reply. Failures surface as errors; a provider must never silently
/// substitute a guessed answer.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn ask(&self, question_text: &str) -> Result<String>;
}
