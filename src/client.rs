//! Typed client for `POST /api/chat`, used by the search front-end and tests.

use reqwest::Client;
use thiserror::Error;

use crate::message::{ChatRequest, ChatResponse, ErrorResponse};
pub use crate::services::validator::compose_message;

pub const EMPTY_QUERY: &str = "Please enter a search term";
pub const FETCH_FAILED: &str = "Failed to fetch response";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", EMPTY_QUERY)]
    EmptyQuery,

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to fetch response: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: Client,
    endpoint: String,
}

impl ProxyClient {
    /// `base_url` is the proxy origin, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }

    /// Compose `query` and `theme` into one message and send it.
    pub async fn ask(&self, query: &str, theme: Option<&str>) -> Result<String, ClientError> {
        if query.trim().is_empty() {
            return Err(ClientError::EmptyQuery);
        }

        let payload = ChatRequest {
            message: Some(compose_message(query, theme)),
            ..Default::default()
        };
        self.send(&payload).await
    }

    pub async fn send(&self, payload: &ChatRequest) -> Result<String, ClientError> {
        let response = self.http.post(&self.endpoint).json(payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| FETCH_FAILED.to_string());
            return Err(ClientError::Server { status: status.as_u16(), message });
        }

        Ok(response.json::<ChatResponse>().await?.response)
    }
}
