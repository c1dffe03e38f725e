// src/state.rs
use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::services::anthropic::AnthropicClient;
use crate::services::completion::{CompletionProvider, CompletionSettings};
use crate::services::exchange_log::{ExchangeLog, TracingExchangeLog};

pub type SharedState = Arc<AppState>;

/// Everything here is read-only for the lifetime of the server.
pub struct AppState {
    /// `None` when no API key is configured.
    pub provider: Option<Arc<dyn CompletionProvider>>,
    pub settings: CompletionSettings,
    pub exchange_log: Arc<dyn ExchangeLog>,
}

impl AppState {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            provider,
            settings: CompletionSettings::default(),
            exchange_log: Arc::new(TracingExchangeLog::new(true)),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = match &config.api_key {
            Some(key) => {
                let client = AnthropicClient::new(key, &config.api_base_url, config.request_timeout)?;
                Some(Arc::new(client) as Arc<dyn CompletionProvider>)
            }
            None => None,
        };

        Ok(Self::new(provider)
            .with_settings(config.completion.clone())
            .with_exchange_log(Arc::new(TracingExchangeLog::new(
                !config.environment.is_production(),
            ))))
    }

    pub fn with_settings(mut self, settings: CompletionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_exchange_log(mut self, exchange_log: Arc<dyn ExchangeLog>) -> Self {
        self.exchange_log = exchange_log;
        self
    }
}
