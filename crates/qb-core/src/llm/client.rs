//! Answer provider HTTP client
//!
//! Supports OpenAI-compatible APIs (GLM, ModelScope, etc.) and the Claude
//! messages API behind the [`AnswerProvider`] seam.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{Error, Result};

use super::types::*;
use super::AnswerProvider;

/// Default base URL for the Zhipu BigModel OpenAI-compatible endpoint
const DEFAULT_OPENAI_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
/// Default base URL for the Claude API
const DEFAULT_CLAUDE_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Chat completion client for the answer provider
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: LlmProvider,
    temperature: f32,
    max_tokens: u64,
    system_prompt: String,
}

impl ChatClient {
    /// Create a new client from provider configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Provider(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = match &config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => match config.provider {
                LlmProvider::OpenAi => DEFAULT_OPENAI_BASE_URL.to_string(),
                LlmProvider::Claude => DEFAULT_CLAUDE_BASE_URL.to_string(),
            },
        };

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url,
            provider: config.provider.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        })
    }

    /// Create with a custom base URL (for testing or custom endpoints)
    pub fn with_base_url(config: &LlmConfig, base_url: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = client_base(base_url.into());
        Ok(client)
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the provider type
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Send one user prompt and return the raw completion text
    async fn complete(&self, user_text: &str) -> Result<String> {
        match self.provider {
            LlmProvider::OpenAi => self.complete_openai(user_text).await,
            LlmProvider::Claude => self.complete_claude(user_text).await,
        }
    }

    async fn complete_openai(&self, user_text: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(url = %url, model = %self.model, "Sending chat completion request");

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(&self.system_prompt),
                ChatMessage::user(user_text),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!("Chat completion API error: {} - {}", status, body);
            return Err(Error::Provider(format!("{}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Provider(format!("Malformed response: {} - {}", e, body)))?;

        info!(
            "Chat completion response: finish_reason={:?}, tokens={}",
            parsed.choices.first().and_then(|c| c.finish_reason.as_deref()),
            parsed.usage.as_ref().map(|u| u.completion_tokens).unwrap_or(0)
        );

        Ok(parsed.text().unwrap_or_default().trim().to_string())
    }

    async fn complete_claude(&self, user_text: &str) -> Result<String> {
        let url = format!("{}/messages", self.base_url);

        debug!(url = %url, model = %self.model, "Sending messages request");

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: Some(self.system_prompt.clone()),
            messages: vec![ChatMessage::user(user_text)],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            warn!("Claude API error: {} - {}", status, body);
            return Err(Error::Provider(format!("{}: {}", status, body)));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Provider(format!("Malformed response: {} - {}", e, body)))?;

        info!(
            "Claude API response: stop_reason={:?}, tokens={}",
            parsed.stop_reason,
            parsed.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(parsed.text().trim().to_string())
    }
}

/// Build the user prompt for one question
fn question_prompt(question_text: &str) -> String {
    format!(
        "题目：\n{}\n\n请直接回答正确的答案和选项，不需要任何解释或其他内容。",
        question_text
    )
}

fn client_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[async_trait]
impl AnswerProvider for ChatClient {
    async fn ask(&self, question_text: &str) -> Result<String> {
        self.complete(&question_prompt(question_text)).await
    }
}
