//! HTTP handlers for the transport server.

use axum::{
    body::Body,
    extract::{Query, State},
    http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::time::Instant;

use super::session::StreamSession;
use super::ServerState;
use crate::frame::diagnostic_notice;
use crate::producer::{collect_fragments, open_fragments};

/// Query string of both endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub query: String,
}

/// The query is forwarded as-is: missing or undecodable parameters become
/// an empty query rather than a rejection.
fn query_text(params: Option<Query<QueryParams>>) -> String {
    params.map(|Query(p)| p.query).unwrap_or_default()
}

/// Handler for the stream endpoint.
///
/// Headers are fixed before the body starts; the producer is not invoked
/// until the body is first polled.
pub async fn stream_handler(
    State(state): State<ServerState>,
    params: Option<Query<QueryParams>>,
) -> Response {
    let session = StreamSession::new(query_text(params));
    let fragments = open_fragments(state.producer.clone(), session.query.clone());
    let body = Body::from_stream(session.into_frames(fragments));

    (
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
            (CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response()
}

/// Handler for the single-shot reference endpoint.
///
/// Waits for the whole output. Failures are reported in the body; the status
/// is 200 either way.
pub async fn complete_handler(
    State(state): State<ServerState>,
    params: Option<Query<QueryParams>>,
) -> Response {
    let query = query_text(params);
    let started = Instant::now();

    let body = match collect_fragments(state.producer.clone(), query).await {
        Ok(text) => {
            tracing::info!(
                len = text.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Reference completion finished"
            );
            text
        }
        Err(e) => {
            tracing::warn!(code = e.error_code(), error = %e, "Reference completion failed");
            diagnostic_notice(&e)
        }
    };

    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

/// Liveness check.
pub async fn health_handler() -> &'static str {
    "ok"
}
