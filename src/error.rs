use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{message::ErrorResponse, services::completion::ProviderError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("API key not configured")]
    Configuration,

    #[error("Failed to process request")]
    Provider(#[from] ProviderError),

    /// The payload is for the log only; clients see a generic message.
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub const VALIDATION: &'static str = "ValidationError";
    pub const CONFIGURATION: &'static str = "ConfigurationError";
    pub const PROVIDER: &'static str = "ProviderError";
    pub const INTERNAL: &'static str = "InternalError";

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => Self::VALIDATION,
            AppError::Configuration => Self::CONFIGURATION,
            AppError::Provider(_) => Self::PROVIDER,
            AppError::Internal(_) => Self::INTERNAL,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration | AppError::Provider(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            AppError::Provider(err) => Some(err.to_string()),
            _ => None,
        }
    }

    /// Message for operators, which may say more than the client body.
    pub fn log_message(&self) -> String {
        match self {
            AppError::Provider(err) => err.to_string(),
            AppError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            details: self.details(),
        };

        (self.status(), Json(body)).into_response()
    }
}
