//! Stateless proxy between a browser front-end and a chat-completion API.
//!
//! A single route, `POST /api/chat`, validates the body, makes exactly one
//! call to the completion provider and answers with the first text block:
//!
//! ```text
//! Received -> Rejected
//! Received -> Validated -> Completed | Failed
//! ```
//!
//! Nothing survives the exchange. Journal entries, saved content and chat
//! transcripts live in the browser and never reach this service.
//!
//! # Running
//!
//! ```sh
//! ANTHROPIC_API_KEY=sk-... RUST_LOG=info cargo run
//! ```
//!
//! Without `ANTHROPIC_API_KEY` the server still starts, but every chat
//! request answers `500 {"error": "API key not configured"}`.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::http::{Method, header::CONTENT_TYPE};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;

use config::Config;
use state::AppState;

pub async fn start_server() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    info!("Loading configuration...");
    let config = Config::load()?;
    let state = Arc::new(AppState::from_config(&config)?);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = routes::create_router().with_state(state).layer(cors);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(model = %config.completion.model, "Chat proxy running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
