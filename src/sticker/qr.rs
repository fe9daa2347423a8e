// SPDX-License-Identifier: MIT
//! QR module-grid rendering.
//!
//! The payload is encoded into a 2D module grid and painted onto an RGBA
//! surface with integer cell geometry: `cell = floor((size - 2*padding) /
//! modules)`, clamped to 1. The rendered edge is `cell * modules +
//! 2*padding` and may differ slightly from the requested size — composing
//! code tolerates the difference rather than correcting it here.

use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};

use super::{StickerError, MAX_SURFACE_EDGE};

pub const DEFAULT_QR_SIZE: u32 = 200;
pub const DEFAULT_QR_PADDING: u32 = 10;

/// Rendering options. Defaults: 200 px, 10 px quiet padding, black on white,
/// medium error correction.
#[derive(Debug, Clone)]
pub struct QrOptions {
    pub size: u32,
    pub padding: u32,
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
    pub ec_level: EcLevel,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_QR_SIZE,
            padding: DEFAULT_QR_PADDING,
            foreground: Rgba([0, 0, 0, 255]),
            background: Rgba([255, 255, 255, 255]),
            ec_level: EcLevel::M,
        }
    }
}

/// Render `payload` as a QR bitmap.
///
/// Fails with [`StickerError::Encoding`] when the payload exceeds the
/// capacity of the chosen error-correction level, and with
/// [`StickerError::SurfaceUnavailable`] when the computed surface is
/// degenerate or over the allocation guard. Output is deterministic for a
/// given payload and options.
pub fn render(payload: &str, opts: &QrOptions) -> Result<RgbaImage, StickerError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), opts.ec_level)?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let inner = opts.size.saturating_sub(opts.padding * 2);
    let cell = (inner / modules).max(1);
    let edge = cell * modules + opts.padding * 2;
    if edge == 0 || edge > MAX_SURFACE_EDGE {
        return Err(StickerError::SurfaceUnavailable {
            width: edge,
            height: edge,
        });
    }

    let mut img = RgbaImage::from_pixel(edge, edge, opts.background);
    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let col = i as u32 % modules;
        let row = i as u32 / modules;
        let x0 = opts.padding + col * cell;
        let y0 = opts.padding + row * cell;
        for dy in 0..cell {
            for dx in 0..cell {
                img.put_pixel(x0 + dx, y0 + dy, opts.foreground);
            }
        }
    }
    Ok(img)
}

/// Render straight to PNG bytes — the artifact handle handed to compositing.
pub fn render_png(payload: &str, opts: &QrOptions) -> Result<Vec<u8>, StickerError> {
    encode_png(&render(payload, opts)?)
}

/// PNG-encode an RGBA surface.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, StickerError> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| StickerError::PngEncode(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Parse a `#RRGGBB` hex color.
pub fn parse_hex_color(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 {
        return None;
    }
    let b = hex::decode(s).ok()?;
    Some(Rgba([b[0], b[1], b[2], 255]))
}

/// Parse an error-correction level name (`L`, `M`, `Q`, `H`).
pub fn parse_ec_level(s: &str) -> Option<EcLevel> {
    match s.trim().to_ascii_uppercase().as_str() {
        "L" => Some(EcLevel::L),
        "M" => Some(EcLevel::M),
        "Q" => Some(EcLevel::Q),
        "H" => Some(EcLevel::H),
        _ => None,
    }
}
