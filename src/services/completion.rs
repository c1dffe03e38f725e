//! Provider-agnostic completion types and the `CompletionProvider` seam.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::validator::ValidatedRequest;

pub const NO_RESPONSE_PLACEHOLDER: &str = "No response generated";

pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// One outbound call to the completion API.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub system: Option<String>,
    pub message: String,
}

/// A unit of provider output, keyed by its `type` tag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Option<TokenUsage>,
}

/// Text handed back to the caller, plus what the logger needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl From<ProviderResponse> for Completion {
    fn from(response: ProviderResponse) -> Self {
        Self {
            text: first_text(&response.content),
            usage: response.usage,
        }
    }
}

/// First text block, or the placeholder when the provider sent none.
pub fn first_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            ContentBlock::Other => None,
        })
        .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string())
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Perform exactly one call. Implementations must not retry.
    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, ProviderError>;
}

/// Fixed per-deployment call parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: Some(DEFAULT_TEMPERATURE),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }
}

impl CompletionSettings {
    pub fn request_for(&self, validated: &ValidatedRequest) -> CompletionRequest {
        let instructions = validated.format.instructions();
        let system = match &self.system_prompt {
            Some(prompt) => format!("{prompt}\n\n{instructions}"),
            None => instructions,
        };

        CompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: Some(system),
            message: validated.message.clone(),
        }
    }
}
