// rest/mod.rs — Public REST API server.
//
// Axum HTTP server bridging the validation layer, the sticker pipeline, and
// the automation webhook.
//
// Endpoints:
//   GET  /api/v1/health
//   GET  /api/v1/templates
//   POST /api/v1/stickers
//   POST /api/v1/stickers/batch
//   GET  /t/{token}                 (scan landing)
//   POST /t/{token}/notify
//   POST /api/v1/incidents/{id}/ack

pub mod routes;

use anyhow::Result;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::sticker::StickerError;
use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/templates", get(routes::templates::list_templates))
        .route("/api/v1/stickers", post(routes::stickers::create_sticker))
        .route("/api/v1/stickers/batch", post(routes::stickers::create_batch))
        .route("/t/{token}", get(routes::incidents::scan_landing))
        .route("/t/{token}/notify", post(routes::incidents::notify))
        .route("/api/v1/incidents/{id}/ack", post(routes::incidents::acknowledge))
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(ctx)
}

// ─── Error mapping ───────────────────────────────────────────────────────────

/// JSON error envelope with the right status code per failure kind.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiError {
    /// 422 with the sanitized value echoed so clients can show what was
    /// actually checked.
    pub fn validation(field: &str, sanitized: impl Into<Value>, message: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: json!({
                "error": "validation_failed",
                "field": field,
                "sanitized": sanitized.into(),
                "message": message,
            }),
        }
    }

    pub fn forbidden(message: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            body: json!({ "error": "forbidden", "message": message }),
        }
    }
}

impl From<StickerError> for ApiError {
    fn from(e: StickerError) -> Self {
        let (status, retryable) = match &e {
            StickerError::TemplateNotFound(_) => (StatusCode::NOT_FOUND, false),
            StickerError::Encoding(_) => (StatusCode::UNPROCESSABLE_ENTITY, false),
            // terminal for this attempt; the client may submit again
            _ => (StatusCode::INTERNAL_SERVER_ERROR, true),
        };
        Self {
            status,
            body: json!({
                "error": "generation_failed",
                "message": e.to_string(),
                "retryable": retryable,
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
