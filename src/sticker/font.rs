//! Font resolution for sticker text.
//!
//! Resolution order: explicit config path, `BMWD_FONT_PATH`, then a fixed
//! list of well-known system font locations. The pipeline keeps running
//! without a font — generation then fails per call with
//! [`StickerError::FontUnavailable`] instead of failing startup.

use std::path::{Path, PathBuf};

use rusttype::Font;
use tracing::{debug, warn};

use super::StickerError;

const WELL_KNOWN: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub struct FontStore {
    font: Option<Font<'static>>,
    source: Option<PathBuf>,
}

impl FontStore {
    /// Probe candidates in order and keep the first TTF that parses.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        for candidate in Self::candidates(explicit) {
            match Self::load(&candidate) {
                Some(font) => {
                    debug!(path = %candidate.display(), "font loaded");
                    return Self {
                        font: Some(font),
                        source: Some(candidate),
                    };
                }
                None => continue,
            }
        }
        warn!("no usable font found — sticker text rendering unavailable");
        Self {
            font: None,
            source: None,
        }
    }

    fn candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(p) = explicit {
            candidates.push(p.to_path_buf());
        }
        if let Ok(env_path) = std::env::var("BMWD_FONT_PATH") {
            if !env_path.is_empty() {
                candidates.push(PathBuf::from(env_path));
            }
        }
        candidates.extend(WELL_KNOWN.iter().map(PathBuf::from));
        candidates
    }

    fn load(path: &Path) -> Option<Font<'static>> {
        let data = std::fs::read(path).ok()?;
        Font::try_from_vec(data)
    }

    pub fn get(&self) -> Result<&Font<'static>, StickerError> {
        self.font.as_ref().ok_or(StickerError::FontUnavailable)
    }

    pub fn available(&self) -> bool {
        self.font.is_some()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
