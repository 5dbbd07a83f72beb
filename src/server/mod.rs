//! HTTP upload service.
//!
//! Endpoints:
//!   GET  /           → upload page
//!   POST /calculate  → multipart `pred_file` upload → metrics report (JSON)
//!   GET  /health     → liveness probe + expected image shape
//!
//! Every request is scored in isolation; a malformed upload produces an error
//! response and never takes the service down.

mod html;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::evaluate::Evaluator;

use html::UPLOAD_HTML;

/// Multipart field carrying the prediction file.
pub const UPLOAD_FIELD: &str = "pred_file";

type AppState = Arc<Evaluator>;

/// Build the service router around a shared evaluator.
pub fn router(evaluator: Arc<Evaluator>) -> Router {
    let body_limit = evaluator.config().max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/calculate", post(calculate))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(evaluator)
}

/// Listen on the configured address until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(evaluator: Arc<Evaluator>) -> std::io::Result<()> {
    let addr = evaluator.config().bind;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "fits-metrics listening");

    axum::serve(listener, router(evaluator))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(UPLOAD_HTML)
}

async fn health(State(evaluator): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "ground_truth_shape": evaluator.ground_truth_shape(),
    }))
}

// POST /calculate
async fn calculate(State(evaluator): State<AppState>, mut multipart: Multipart) -> Response {
    let (filename, contents) = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(&Error::NoFileSelected),
        Err(err) => {
            warn!(error = %err, "malformed multipart request");
            return (err.status(), Json(json!({"error": err.body_text()}))).into_response();
        }
    };

    info!(filename = %filename, bytes = contents.len(), "received upload");

    let scored =
        tokio::task::spawn_blocking(move || evaluator.evaluate_upload(&filename, &contents)).await;

    match scored {
        Ok(Ok(report)) => Json(report).into_response(),
        Ok(Err(err)) => error_response(&err),
        Err(err) => {
            error!(error = %err, "scoring task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "scoring task failed"})),
            )
                .into_response()
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Pull the prediction file out of the form, skipping any other fields.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<(String, Bytes)>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let contents = field.bytes().await?;
        return Ok(Some((filename, contents)));
    }

    Ok(None)
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NoFileSelected | Error::InvalidFileType { .. } | Error::InvalidFilename { .. } => {
            StatusCode::BAD_REQUEST
        }
        Error::ShapeMismatch { .. }
        | Error::EmptyArray
        | Error::FitsFormat { .. }
        | Error::FitsNoData
        | Error::FitsRead { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::InvalidParameter { .. } | Error::GroundTruth { .. } | Error::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &Error) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        error!(error = %err, "upload failed");
    } else {
        warn!(error = %err, "upload rejected");
    }

    (status, Json(json!({"error": err.to_string()}))).into_response()
}
