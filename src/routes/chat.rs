use std::{panic::AssertUnwindSafe, time::Instant};

use axum::{Json, body::Bytes, extract::State};
use futures::FutureExt;
use uuid::Uuid;

use super::panic_detail;

use crate::{
    error::AppError,
    message::ChatResponse,
    services::{
        completion::Completion,
        exchange_log::{CompletedExchange, FailedExchange},
        validator::parse_and_validate,
    },
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let started = Instant::now();
    let request_id = Uuid::new_v4();

    let outcome = AssertUnwindSafe(complete_chat(&state, &body))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(AppError::Internal(format!(
                "handler panicked: {}",
                panic_detail(panic.as_ref())
            )))
        });
    let latency = started.elapsed();

    match &outcome {
        Ok(completion) => state
            .exchange_log
            .completed(&CompletedExchange::new(request_id, completion, latency)),
        Err(err) => state
            .exchange_log
            .failed(&FailedExchange::new(request_id, err, latency)),
    }

    outcome.map(|completion| Json(ChatResponse { response: completion.text }))
}

async fn complete_chat(state: &SharedState, body: &[u8]) -> Result<Completion, AppError> {
    // Checked first so that nothing is parsed or sent without a credential.
    let provider = state.provider.as_ref().ok_or(AppError::Configuration)?;

    let validated = parse_and_validate(body)?;
    let request = state.settings.request_for(&validated);

    let response = provider.complete(request).await?;
    Ok(Completion::from(response))
}
