//! Event ingestion route
//!
//! Accepts an object-created notification in either wire shape, runs the
//! pipeline synchronously and answers with the `{statusCode, body}`
//! envelope. The HTTP status mirrors `statusCode`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::event::IngestionEvent;
use crate::pipeline::{InvocationResult, PipelineError};
use crate::state::AppState;

/// Create the events router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(ingest_event))
}

async fn ingest_event(State(state): State<AppState>, body: Bytes) -> Response {
    tracing::debug!(bytes = body.len(), "Received event");

    let result = match IngestionEvent::from_slice(&body) {
        Ok(event) => state.pipeline().handle(&event).await,
        Err(e) => {
            let err = PipelineError::from(e);
            tracing::error!("Rejected event: {}", err);
            InvocationResult::from(&err)
        }
    };

    let status =
        StatusCode::from_u16(result.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(result)).into_response()
}
