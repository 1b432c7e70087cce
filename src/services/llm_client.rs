//! Chat-completion client for Slidesmith.
//!
//! Talks to OpenAI-compatible `/chat/completions` endpoints (DeepSeek by default)
//! and maps every failure onto a typed [`LlmError`] so callers can tell a timeout
//! from a refused connection, an HTTP status, or an exhausted account balance.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use zeroize::Zeroizing;

use crate::types::ai::{ChatMessage, LlmProviderConfig, LlmProviderName};
use crate::types::errors::LlmError;
use crate::types::settings::LlmSettings;

/// Outbound text completion. No streaming.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Returns the built-in provider presets.
pub fn available_providers() -> Vec<LlmProviderConfig> {
    vec![
        provider_preset(LlmProviderName::DeepSeek),
        provider_preset(LlmProviderName::OpenAI),
    ]
}

pub fn provider_preset(name: LlmProviderName) -> LlmProviderConfig {
    match name {
        LlmProviderName::DeepSeek => LlmProviderConfig {
            name,
            display_name: "DeepSeek".to_string(),
            api_endpoint: "https://api.deepseek.com/v1/chat/completions".to_string(),
            default_model: "deepseek-chat".to_string(),
        },
        LlmProviderName::OpenAI => LlmProviderConfig {
            name,
            display_name: "OpenAI".to_string(),
            api_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            default_model: "gpt-3.5-turbo".to_string(),
        },
    }
}

/// Maps a non-success HTTP status.
pub fn status_error(code: u16) -> LlmError {
    match code {
        402 => LlmError::InsufficientBalance,
        code => LlmError::HttpStatus(code),
    }
}

/// Maps a transport-level reqwest failure.
pub fn classify(err: &reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else if err.is_connect() {
        LlmError::ConnectionFailed(err.to_string())
    } else {
        LlmError::Other(err.to_string())
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// reqwest-backed client for an OpenAI-compatible endpoint.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Zeroizing<String>,
}

impl ChatCompletionClient {
    /// Builds a client from settings; endpoint and model fall back to the provider preset.
    pub fn new(settings: &LlmSettings, api_key: Zeroizing<String>) -> Result<Self, LlmError> {
        let preset = provider_preset(settings.provider);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone().unwrap_or(preset.api_endpoint),
            model: settings.model.clone().unwrap_or(preset.default_model),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for ChatCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(endpoint = %self.endpoint, model = %self.model, messages = messages.len(), "Sending completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let mapped = classify(&e);
                error!(error = %mapped, "Completion request failed");
                mapped
            })?;

        let status = response.status();
        if !status.is_success() {
            let mapped = status_error(status.as_u16());
            error!(status = status.as_u16(), error = %mapped, "Completion endpoint returned an error status");
            return Err(mapped);
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| classify(&e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Other("the response contained no completion".to_string()))
    }
}

/// Client installed when no API key is configured. Every call fails with
/// [`LlmError::NotConfigured`], so generation serves demo slides.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClient;

#[async_trait]
impl LlmClient for OfflineClient {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured)
    }
}
