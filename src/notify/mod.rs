//! Outbound delivery — the WhatsApp automation webhook and the
//! fire-and-forget sticker persistence hook.
//!
//! Delivery semantics (templates, fallback channels, read receipts) are
//! owned entirely by the automation platform; this module only speaks
//! HTTP/JSON to it and reports a tagged outcome. Persistence failures are
//! demoted to warnings — a generated sticker stays downloadable even when
//! recording it fails.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::retry::{retry_delivery, RetryConfig};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Tagged result of a webhook delivery.
///
/// The automation platform answers with loosely-typed JSON; its fields are
/// validated here at the boundary — nothing downstream reads them
/// optimistically.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Delivered {
        http_status: u16,
        message_id: Option<String>,
    },
    Failed {
        reason: String,
    },
}

impl WebhookOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, WebhookOutcome::Delivered { .. })
    }
}

/// Record POSTed to the backend after a successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct StickerRecord {
    pub token: String,
    pub plate: String,
    pub template: String,
    pub created_at: String,
}

impl StickerRecord {
    pub fn new(token: impl Into<String>, plate: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            plate: plate.into(),
            template: template.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    webhook_url: Option<String>,
    api_endpoint: Option<String>,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl WebhookClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url: config.webhook_url.clone(),
            api_endpoint: config.api_endpoint.clone(),
            api_key: config.api_key.clone(),
            retry: RetryConfig::default(),
        }
    }

    /// Override the retry policy (tests use [`RetryConfig::instant`]).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Forward a blocked-party notification: `(token, rage_level)` plus the
    /// incident id minted for the acknowledge flow.
    pub async fn notify_incident(
        &self,
        token: &str,
        rage_level: u32,
        incident_id: &str,
    ) -> WebhookOutcome {
        self.deliver(json!({
            "event": "incident.notify",
            "token": token,
            "rage_level": rage_level,
            "incident_id": incident_id,
            "ts": Utc::now().to_rfc3339(),
        }))
        .await
    }

    /// Forward a driver acknowledgement: `(incident_id, eta_minutes)`.
    pub async fn acknowledge(&self, incident_id: &str, eta_minutes: u32) -> WebhookOutcome {
        self.deliver(json!({
            "event": "incident.ack",
            "incident_id": incident_id,
            "eta_minutes": eta_minutes,
            "ts": Utc::now().to_rfc3339(),
        }))
        .await
    }

    async fn deliver(&self, body: Value) -> WebhookOutcome {
        let Some(url) = &self.webhook_url else {
            return WebhookOutcome::Failed {
                reason: "webhook_url not configured".to_string(),
            };
        };

        let result = retry_delivery(&self.retry, || {
            let request = self.http.post(url).json(&body);
            async move {
                let resp = request.send().await.map_err(|e| e.to_string())?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(format!("webhook returned {status}"));
                }
                let parsed = resp.json::<Value>().await.unwrap_or(Value::Null);
                Ok((status.as_u16(), parsed))
            }
        })
        .await;

        match result {
            Ok((http_status, parsed)) => {
                if parsed.get("success").and_then(Value::as_bool) == Some(false) {
                    let reason = parsed
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("webhook reported failure")
                        .to_string();
                    return WebhookOutcome::Failed { reason };
                }
                let message_id = parsed
                    .get("message_id")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                WebhookOutcome::Delivered {
                    http_status,
                    message_id,
                }
            }
            Err(reason) => WebhookOutcome::Failed { reason },
        }
    }

    /// Record a generated sticker with the backend. Fire-and-forget: returns
    /// whether the record stuck, never errors, single attempt.
    pub async fn persist_sticker(&self, record: &StickerRecord) -> bool {
        let Some(endpoint) = &self.api_endpoint else {
            debug!("no api_endpoint configured — sticker not recorded");
            return false;
        };
        let url = format!("{}/stickers", endpoint.trim_end_matches('/'));
        let mut request = self.http.post(&url).json(record);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        match request.send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(token = %record.token, status = %resp.status(), "sticker persistence rejected");
                false
            }
            Err(e) => {
                warn!(token = %record.token, error = %e, "sticker persistence unreachable");
                false
            }
        }
    }
}
