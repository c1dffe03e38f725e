use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use crate::services::{
    anthropic::DEFAULT_BASE_URL,
    completion::{
        CompletionSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
        DEFAULT_TEMPERATURE,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub completion: CompletionSettings,
    pub request_timeout: Duration,
    pub environment: Environment,
}

impl Config {
    /// Read the process environment, after loading `.env` if there is one.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var("ANTHROPIC_API_KEY");
        if api_key.is_none() {
            warn!("ANTHROPIC_API_KEY not set, chat requests will fail until it is configured");
        }

        let temperature = match var("COMPLETION_TEMPERATURE").as_deref() {
            Some("none") => None,
            Some(raw) => Some(parse("COMPLETION_TEMPERATURE", raw)?),
            None => Some(DEFAULT_TEMPERATURE),
        };

        let environment = match var("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        Ok(Self {
            port: try_load(&var, "PORT", "3000")?,
            api_key,
            api_base_url: var("ANTHROPIC_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            completion: CompletionSettings {
                model: var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens: try_load(&var, "COMPLETION_MAX_TOKENS", &DEFAULT_MAX_TOKENS.to_string())?,
                temperature,
                system_prompt: Some(
                    var("COMPLETION_SYSTEM_PROMPT").unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
                ),
            },
            request_timeout: Duration::from_secs(try_load(&var, "COMPLETION_TIMEOUT_SECS", "120")?),
            environment,
        })
    }
}

fn try_load<T: FromStr>(var: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse(key, &raw)
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw:?}"))
}
