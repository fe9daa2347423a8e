//! Sticker/QR generation pipeline.
//!
//! Given a payload and a named template, renders a QR module grid, composites
//! it with the template's background/border/text layout, and returns a
//! PNG-encoded artifact. Rendering is deterministic — no randomness and no
//! shared state participate, so identical inputs yield byte-identical PNGs.

pub mod archive;
pub mod batch;
pub mod compose;
pub mod font;
pub mod qr;
pub mod template;

use std::time::Duration;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::validate;
use font::FontStore;
use qr::QrOptions;

/// Watchdog on the pipeline's only suspension point — re-decoding the QR PNG.
pub const QR_DECODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Allocation guard: the native analog of failing to acquire a canvas context.
pub(crate) const MAX_SURFACE_EDGE: u32 = 8192;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Terminal failures of a single generation attempt. None of these are
/// retried automatically — the caller may invoke generation again.
#[derive(Debug, thiserror::Error)]
pub enum StickerError {
    #[error("unknown sticker template: {0:?}")]
    TemplateNotFound(String),
    #[error("QR encoding failed: {0}")]
    Encoding(#[from] qrcode::types::QrError),
    #[error("render surface unavailable ({width}x{height})")]
    SurfaceUnavailable { width: u32, height: u32 },
    #[error("no usable font: set font_path in config.toml or BMWD_FONT_PATH")]
    FontUnavailable,
    #[error("QR image decode timed out after {0:?}")]
    QrImageTimeout(Duration),
    #[error("QR image decode failed: {0}")]
    QrImageDecode(String),
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),
}

// ─── Artifact ────────────────────────────────────────────────────────────────

/// A generated sticker: PNG bytes plus the download filename. Owned by the
/// caller, never cached — every generation re-renders from scratch.
#[derive(Debug, Clone)]
pub struct StickerArtifact {
    pub filename: String,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// One generation request. `plate` must already be sanitized — validation is
/// the single gate and values are not re-sanitized downstream.
#[derive(Debug, Clone, Default)]
pub struct StickerRequest {
    /// Human-readable text drawn on the sticker (may be empty).
    pub plate: String,
    /// Explicit QR payload. None = derive the scan URL from the plate token.
    pub payload: Option<String>,
    /// Template registry key.
    pub template: String,
    /// QR option overrides; size is always forced to the template's QR size.
    pub qr: Option<QrOptions>,
}

// ─── Pure helpers ────────────────────────────────────────────────────────────

/// Join the configured origin with the fixed `/t/{token}` path.
pub fn scan_url(base_url: &str, token: &str) -> String {
    format!("{}/t/{}", base_url.trim_end_matches('/'), token)
}

/// Download filename: `<prefix>-<plate-slug>-<token>.png`, with the plate's
/// interior whitespace slugged to `-` so the name is shell-safe.
pub fn artifact_filename(prefix: &str, plate: &str, token: &str) -> String {
    let slug: String = plate.split_whitespace().collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        format!("{prefix}-{token}.png")
    } else {
        format!("{prefix}-{slug}-{token}.png")
    }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// The sticker generation pipeline. Holds only read-only state (resolved
/// font, origin, labels); each generation allocates its own surfaces, so
/// concurrent calls need no synchronization.
pub struct StickerPipeline {
    fonts: FontStore,
    base_url: String,
    file_prefix: String,
    website_text: String,
}

impl StickerPipeline {
    pub fn new(config: &AppConfig) -> Self {
        let fonts = FontStore::resolve(config.font_path.as_deref());
        match fonts.source() {
            Some(path) => info!(font = %path.display(), "sticker pipeline ready"),
            None => info!("sticker pipeline ready (no font — text rendering disabled)"),
        }
        Self {
            fonts,
            base_url: config.base_url.clone(),
            file_prefix: config.file_prefix.clone(),
            website_text: config.website_text(),
        }
    }

    pub fn scan_url(&self, token: &str) -> String {
        scan_url(&self.base_url, token)
    }

    /// True when a font resolved and text-bearing stickers can render.
    pub fn font_available(&self) -> bool {
        self.fonts.available()
    }

    /// Generate one sticker.
    ///
    /// Template lookup happens before any rendering work; an unknown name
    /// fails without touching a surface. The QR payload defaults to the scan
    /// URL of the plate-derived token (the plate *is* the token in this
    /// flow).
    pub async fn generate(&self, req: &StickerRequest) -> Result<StickerArtifact, StickerError> {
        let template = template::get(&req.template)?;
        let font = self.fonts.get()?;

        let token = validate::sanitize_token(&req.plate);
        let payload = match &req.payload {
            Some(p) => p.clone(),
            None => self.scan_url(&token),
        };

        let mut qr_opts = req.qr.clone().unwrap_or_default();
        qr_opts.size = template.qr_size;

        debug!(template = template.name, payload_len = payload.len(), "generating sticker");
        let canvas =
            compose::generate_sticker(&payload, &req.plate, template, font, &qr_opts, &self.website_text)
                .await?;

        let png = qr::encode_png(&canvas)?;
        Ok(StickerArtifact {
            filename: artifact_filename(&self.file_prefix, &req.plate, &token),
            png,
            width: canvas.width(),
            height: canvas.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_url_joins_origin_and_token() {
        assert_eq!(
            scan_url("https://blockmywheels.app", "ABC123"),
            "https://blockmywheels.app/t/ABC123"
        );
        // trailing slash never doubles
        assert_eq!(scan_url("https://x.test/", "T0KEN1"), "https://x.test/t/T0KEN1");
    }

    #[test]
    fn filenames_slug_whitespace() {
        assert_eq!(
            artifact_filename("sticker", "W 1234 XY", "W1234XY"),
            "sticker-W-1234-XY-W1234XY.png"
        );
        assert_eq!(artifact_filename("sticker", "", "ABC123"), "sticker-ABC123.png");
    }
}
