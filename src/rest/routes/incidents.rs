//! Incident reporting: scan landing, blocked-party notify, driver ack.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::validate;
use crate::AppContext;

use super::super::ApiError;

/// What a scanner sees when they hit a sticker's `/t/{token}` URL.
pub async fn scan_landing(
    State(ctx): State<Arc<AppContext>>,
    Path(token): Path<String>,
) -> Json<Value> {
    let checked = validate::check_token(&token);
    Json(json!({
        "token": checked.value,
        "valid": checked.is_valid,
        "notify_path": checked
            .is_valid
            .then(|| format!("/t/{}/notify", checked.value)),
        "template_mode": ctx.config.template_mode,
    }))
}

#[derive(Debug, Deserialize)]
pub struct NotifyBody {
    /// Accepted as number or string; coerced by the validation layer.
    pub rage_level: Value,
}

pub async fn notify(
    State(ctx): State<Arc<AppContext>>,
    Path(token): Path<String>,
    Json(body): Json<NotifyBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if ctx.config.template_mode {
        return Err(ApiError::forbidden("incident reporting is disabled in template mode"));
    }

    let checked = validate::check_token(&token);
    if !checked.is_valid {
        return Err(ApiError::validation(
            "token",
            checked.value,
            "token must be 6-50 alphanumeric characters",
        ));
    }

    let rage = validate::sanitize_number_value(&body.rage_level);
    if !validate::validate_rage(rage) {
        return Err(ApiError::validation(
            "rage_level",
            rage,
            "rage level must be between 0 and 10",
        ));
    }

    let incident_id = Uuid::new_v4().to_string();
    let delivery = ctx
        .webhook
        .notify_incident(&checked.value, rage, &incident_id)
        .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "incident_id": incident_id,
            "rage_level": rage,
            "delivery": delivery,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AckBody {
    pub eta_minutes: Value,
}

pub async fn acknowledge(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<AckBody>,
) -> Result<Json<Value>, ApiError> {
    if ctx.config.template_mode {
        return Err(ApiError::forbidden("incident reporting is disabled in template mode"));
    }

    if !validate::validate_incident_id(&id) {
        return Err(ApiError::validation(
            "incident_id",
            id,
            "incident id must be a UUID v4",
        ));
    }

    let eta = validate::sanitize_number_value(&body.eta_minutes);
    if !validate::validate_eta(eta) {
        return Err(ApiError::validation(
            "eta_minutes",
            eta,
            "ETA must be between 0 and 1440 minutes",
        ));
    }

    let delivery = ctx.webhook.acknowledge(&id, eta).await;
    Ok(Json(json!({
        "incident_id": id,
        "eta_minutes": eta,
        "delivery": delivery,
    })))
}
