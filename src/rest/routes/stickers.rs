//! Sticker generation endpoints.
//!
//! Generation success and persistence success are reported independently:
//! `saved: false` is a warning, never a reason to withhold the artifact.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::notify::StickerRecord;
use crate::sticker::{archive, StickerRequest};
use crate::validate;
use crate::AppContext;

use super::super::ApiError;

const DEFAULT_TEMPLATE: &str = "modern";

#[derive(Debug, Deserialize)]
pub struct StickerBody {
    pub plate: String,
    #[serde(default)]
    pub template: Option<String>,
    /// Explicit QR payload; defaults to the scan URL of the plate token.
    #[serde(default)]
    pub payload: Option<String>,
}

pub async fn create_sticker(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<StickerBody>,
) -> Result<Json<Value>, ApiError> {
    let checked = validate::check_plate(&body.plate);
    if !checked.is_valid {
        return Err(ApiError::validation(
            "plate",
            checked.value,
            "license plate must be 2-15 characters after sanitization",
        ));
    }

    let template = body.template.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
    let req = StickerRequest {
        plate: checked.value.clone(),
        payload: body.payload,
        template: template.clone(),
        qr: None,
    };
    let artifact = ctx.pipeline.generate(&req).await.map_err(ApiError::from)?;

    let token = validate::sanitize_token(&checked.value);
    let saved = ctx
        .webhook
        .persist_sticker(&StickerRecord::new(token, checked.value, template))
        .await;

    Ok(Json(json!({
        "filename": artifact.filename,
        "png_base64": BASE64.encode(&artifact.png),
        "width": artifact.width,
        "height": artifact.height,
        "saved": saved,
    })))
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub plates: Vec<String>,
    #[serde(default)]
    pub template: Option<String>,
    /// Also return a tar.gz of the successful artifacts.
    #[serde(default)]
    pub archive: bool,
}

pub async fn create_batch(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<BatchBody>,
) -> Result<Json<Value>, ApiError> {
    let template = body.template.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
    let report = ctx
        .pipeline
        .generate_batch(&body.plates, &template)
        .await
        .map_err(ApiError::from)?;

    let items: Vec<Value> = report
        .items
        .iter()
        .map(|item| match &item.outcome {
            Ok(artifact) => json!({
                "plate": item.plate,
                "ok": true,
                "filename": artifact.filename,
                "png_base64": BASE64.encode(&artifact.png),
            }),
            Err(e) => json!({
                "plate": item.plate,
                "ok": false,
                "error": e.to_string(),
            }),
        })
        .collect();

    let archive_base64 = if body.archive {
        let bytes = archive::write_tar_gz(report.artifacts()).map_err(|e| {
            ApiError::from(crate::sticker::StickerError::PngEncode(e.to_string()))
        })?;
        Some(BASE64.encode(bytes))
    } else {
        None
    };

    Ok(Json(json!({
        "total": report.total,
        "completed": report.completed,
        "succeeded": report.succeeded(),
        "failed": report.failed(),
        "items": items,
        "archive_base64": archive_base64,
    })))
}
