use serde_json::Value;

use crate::{
    error::AppError,
    message::{ChatRequest, Depth, FormatOverrides, ResponseFormat, Tone},
};

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const INVALID_FORMAT: &str = "Invalid request format";

/// A request that passed validation, ready to be sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub message: String,
    pub format: FormatConfig,
}

/// Formatting options after merging the caller's overrides with defaults.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    pub format: ResponseFormat,
    pub depth: Depth,
    pub tone: Tone,
}

impl FormatConfig {
    pub fn merged(overrides: Option<&FormatOverrides>) -> Self {
        let defaults = Self::default();
        match overrides {
            Some(o) => Self {
                format: o.format.unwrap_or(defaults.format),
                depth: o.depth.unwrap_or(defaults.depth),
                tone: o.tone.unwrap_or(defaults.tone),
            },
            None => defaults,
        }
    }

    /// Formatting guidance appended to the system instruction.
    pub fn instructions(&self) -> String {
        let format = match self.format {
            ResponseFormat::Markdown => "Format the answer in Markdown.",
            ResponseFormat::Plain => "Answer in plain text without Markdown.",
        };
        let depth = match self.depth {
            Depth::Detailed => "Give a detailed, well structured answer.",
            Depth::Concise => "Keep the answer concise.",
        };
        let tone = match self.tone {
            Tone::Formal => "Use a formal tone.",
            Tone::Informal => "Use a friendly, informal tone.",
        };
        format!("{format} {depth} {tone}")
    }
}

/// Parse the raw body and check it before any outbound call is made.
pub fn parse_and_validate(body: &[u8]) -> Result<ValidatedRequest, AppError> {
    let invalid = || AppError::Validation(INVALID_FORMAT.to_string());

    // Only a JSON object is a request, never an array.
    let value: Value = serde_json::from_slice(body).map_err(|_| invalid())?;
    if !value.is_object() {
        return Err(invalid());
    }

    let request: ChatRequest = serde_json::from_value(value).map_err(|_| invalid())?;
    validate(&request)
}

pub fn validate(request: &ChatRequest) -> Result<ValidatedRequest, AppError> {
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation(MESSAGE_REQUIRED.to_string()))?;

    Ok(ValidatedRequest {
        message: compose_message(message, request.theme.as_deref()),
        format: FormatConfig::merged(request.config.as_ref()),
    })
}

/// Append the theme qualifier, if any, to the query: `"<query> [Theme: <theme>]"`.
pub fn compose_message(query: &str, theme: Option<&str>) -> String {
    let query = query.trim();
    match theme.map(str::trim).filter(|t| !t.is_empty()) {
        Some(theme) => format!("{query} [Theme: {theme}]"),
        None => query.to_string(),
    }
}
