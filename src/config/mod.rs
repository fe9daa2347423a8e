use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 4400;
const DEFAULT_BASE_URL: &str = "https://blockmywheels.app";
const DEFAULT_FILE_PREFIX: &str = "sticker";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── AppConfig ───────────────────────────────────────────────────────────────

/// Daemon configuration (`config.toml`, flags, and env overrides).
///
/// Read once at startup, wrapped in an `Arc`, and injected through
/// [`crate::AppContext`]. Nothing mutates it after that.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// REST API port.
    pub port: u16,
    /// Bind address for the REST server (use `0.0.0.0` for LAN access).
    pub bind_address: String,
    /// Public origin used to derive `/t/{token}` scan URLs.
    pub base_url: String,
    /// WhatsApp automation webhook endpoint. None = deliveries are reported
    /// as failed without any outbound call.
    pub webhook_url: Option<String>,
    /// Backend endpoint for the fire-and-forget sticker persistence hook.
    /// None = generated stickers are never recorded (`saved: false`).
    pub api_endpoint: Option<String>,
    /// Bearer credential sent with persistence calls.
    pub api_key: Option<String>,
    /// Template mode: sticker generation only, incident routes disabled.
    pub template_mode: bool,
    /// Explicit TTF path for sticker text. None = probe `BMWD_FONT_PATH`
    /// then well-known system font locations.
    pub font_path: Option<PathBuf>,
    /// Filename prefix for generated artifacts.
    pub file_prefix: String,
    /// Text drawn on a sticker when no plate is supplied. None = the
    /// `base_url` host.
    pub website_label: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: default_bind_address(),
            base_url: DEFAULT_BASE_URL.to_string(),
            webhook_url: None,
            api_endpoint: None,
            api_key: None,
            template_mode: false,
            font_path: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            website_label: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (when given), then apply flag overrides.
    ///
    /// A missing file is not an error — defaults apply. A file that exists
    /// but fails to parse is logged and ignored rather than aborting startup.
    pub fn load(path: Option<&Path>, port: Option<u16>, bind_address: Option<String>) -> Self {
        let mut config = match path {
            Some(p) => Self::from_file(p),
            None => Self::default(),
        };
        if let Some(p) = port {
            config.port = p;
        }
        if let Some(b) = bind_address {
            config.bind_address = b;
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config
    }

    fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<AppConfig>(&raw) {
                Ok(config) => {
                    info!(path = %path.display(), "config loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "config parse failed, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// The human-readable fallback label drawn when a sticker has no plate
    /// text: explicit `website_label`, else `base_url` without its scheme.
    pub fn website_text(&self) -> String {
        match &self.website_label {
            Some(label) => label.clone(),
            None => self
                .base_url
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .to_string(),
        }
    }
}
