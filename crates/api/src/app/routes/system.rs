use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{sse::Event as SseEvent, IntoResponse},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::app::services::{self, AppServices};

/// Liveness plus a store round trip; 503 when the store does not answer.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let started = Instant::now();
    let ping = services.ping().await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let (status, db) = match ping {
        Ok(()) => (StatusCode::OK, json!({ "status": "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "status": "error", "detail": e.to_string() }),
            )
        }
    };

    (
        status,
        Json(json!({
            "ok": status == StatusCode::OK,
            "db": db,
            "uptimeSeconds": services.uptime().as_secs(),
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "durationMs": duration_ms,
        })),
    )
        .into_response()
}

pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Sse<impl tokio_stream::Stream<Item = Result<SseEvent, std::convert::Infallible>>> {
    services::change_stream(services)
}
