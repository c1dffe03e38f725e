// src/services/exchange_log.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::completion::{Completion, TokenUsage};
use crate::error::AppError;

/// Number of characters of the response kept in the log line.
pub const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct CompletedExchange {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub response_preview: String,
    pub usage: Option<TokenUsage>,
    pub latency_ms: u128,
}

impl CompletedExchange {
    pub fn new(request_id: Uuid, completion: &Completion, latency: Duration) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            response_preview: preview(&completion.text, PREVIEW_CHARS),
            usage: completion.usage,
            latency_ms: latency.as_millis(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FailedExchange {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: &'static str,
    pub message: String,
    /// Debug rendering of the whole error chain.
    pub diagnostics: String,
    pub latency_ms: u128,
}

impl FailedExchange {
    pub fn new(request_id: Uuid, err: &AppError, latency: Duration) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            kind: err.kind(),
            message: err.log_message(),
            diagnostics: format!("{err:?}"),
            latency_ms: latency.as_millis(),
        }
    }
}

/// Append-only sink for per-request outcomes.
pub trait ExchangeLog: Send + Sync {
    fn completed(&self, record: &CompletedExchange);
    fn failed(&self, record: &FailedExchange);
}

/// Writes exchanges as structured `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct TracingExchangeLog {
    include_diagnostics: bool,
}

impl TracingExchangeLog {
    pub fn new(include_diagnostics: bool) -> Self {
        Self { include_diagnostics }
    }

    /// Error chain to emit for `record`, withheld in production.
    pub fn diagnostics_for<'a>(&self, record: &'a FailedExchange) -> Option<&'a str> {
        self.include_diagnostics.then_some(record.diagnostics.as_str())
    }
}

impl ExchangeLog for TracingExchangeLog {
    fn completed(&self, record: &CompletedExchange) {
        info!(
            request_id = %record.request_id,
            timestamp = %record.timestamp.to_rfc3339(),
            latency_ms = record.latency_ms as u64,
            input_tokens = record.usage.map(|u| u.input_tokens),
            output_tokens = record.usage.map(|u| u.output_tokens),
            response = %record.response_preview,
            "chat completion served"
        );
    }

    fn failed(&self, record: &FailedExchange) {
        let diagnostics = self.diagnostics_for(record);

        if record.kind == AppError::VALIDATION {
            warn!(
                request_id = %record.request_id,
                timestamp = %record.timestamp.to_rfc3339(),
                latency_ms = record.latency_ms as u64,
                kind = record.kind,
                message = %record.message,
                "chat request rejected"
            );
        } else {
            error!(
                request_id = %record.request_id,
                timestamp = %record.timestamp.to_rfc3339(),
                latency_ms = record.latency_ms as u64,
                kind = record.kind,
                message = %record.message,
                diagnostics,
                "chat request failed"
            );
        }
    }
}

/// First `limit` characters of `text`, cut on a char boundary.
pub fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
