// src/routes/mod.rs
pub mod chat;

use std::any::Any;

use crate::{error::AppError, state::SharedState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chat::chat_handler;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(|| async { "OK" }))
        .fallback_service(ServeDir::new("public"))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Outer net for panics that escape the handlers' own unwinding guard.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_detail(err.as_ref());

    error!(kind = AppError::INTERNAL, message = %detail, "request handler panicked");
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

pub(crate) fn panic_detail(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}
