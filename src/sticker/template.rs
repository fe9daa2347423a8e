//! The sticker template registry.
//!
//! Templates are static layout data: canvas geometry, QR placement, border,
//! background, and the text areas (title, instructions, plate, website
//! fallback). They are selected by name from the fixed registry — lookup of
//! an unknown name is an explicit [`StickerError::TemplateNotFound`], never
//! a silent default.

use std::collections::HashMap;

use image::Rgba;
use once_cell::sync::Lazy;

use super::StickerError;

/// Style metadata for one text region: horizontal center, top of the line
/// box, glyph size, and fill color. Carries no text content — the compositor
/// decides what (if anything) is painted there.
#[derive(Debug, Clone)]
pub struct TextArea {
    pub cx: u32,
    pub y: u32,
    pub font_px: f32,
    pub color: Rgba<u8>,
}

#[derive(Debug, Clone)]
pub struct StickerTemplate {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub background: Rgba<u8>,
    pub border_color: Rgba<u8>,
    pub border_width: u32,
    pub qr_x: u32,
    pub qr_y: u32,
    pub qr_size: u32,
    pub title: Option<TextArea>,
    pub instructions: Option<TextArea>,
    pub plate: TextArea,
    pub website: TextArea,
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

static REGISTRY: Lazy<HashMap<&'static str, StickerTemplate>> = Lazy::new(|| {
    let templates = [
        StickerTemplate {
            name: "modern",
            width: 400,
            height: 600,
            background: rgb(255, 255, 255),
            border_color: rgb(29, 78, 216),
            border_width: 8,
            qr_x: 90,
            qr_y: 170,
            qr_size: 220,
            title: Some(TextArea { cx: 200, y: 40, font_px: 34.0, color: rgb(29, 78, 216) }),
            instructions: Some(TextArea { cx: 200, y: 92, font_px: 18.0, color: rgb(71, 85, 105) }),
            plate: TextArea { cx: 200, y: 430, font_px: 44.0, color: rgb(15, 23, 42) },
            website: TextArea { cx: 200, y: 445, font_px: 24.0, color: rgb(71, 85, 105) },
        },
        StickerTemplate {
            name: "classic",
            width: 420,
            height: 594,
            background: rgb(253, 246, 227),
            border_color: rgb(120, 53, 15),
            border_width: 6,
            qr_x: 90,
            qr_y: 160,
            qr_size: 240,
            title: Some(TextArea { cx: 210, y: 44, font_px: 32.0, color: rgb(120, 53, 15) }),
            instructions: Some(TextArea { cx: 210, y: 96, font_px: 16.0, color: rgb(146, 64, 14) }),
            plate: TextArea { cx: 210, y: 440, font_px: 46.0, color: rgb(69, 26, 3) },
            website: TextArea { cx: 210, y: 455, font_px: 22.0, color: rgb(146, 64, 14) },
        },
        StickerTemplate {
            name: "bright",
            width: 400,
            height: 500,
            background: rgb(250, 204, 21),
            border_color: rgb(17, 24, 39),
            border_width: 10,
            qr_x: 100,
            qr_y: 140,
            qr_size: 200,
            title: Some(TextArea { cx: 200, y: 36, font_px: 30.0, color: rgb(17, 24, 39) }),
            instructions: Some(TextArea { cx: 200, y: 84, font_px: 16.0, color: rgb(31, 41, 55) }),
            plate: TextArea { cx: 200, y: 380, font_px: 42.0, color: rgb(17, 24, 39) },
            website: TextArea { cx: 200, y: 392, font_px: 22.0, color: rgb(31, 41, 55) },
        },
        StickerTemplate {
            name: "eco",
            width: 380,
            height: 540,
            background: rgb(236, 253, 245),
            border_color: rgb(6, 95, 70),
            border_width: 4,
            qr_x: 90,
            qr_y: 150,
            qr_size: 200,
            title: Some(TextArea { cx: 190, y: 40, font_px: 28.0, color: rgb(6, 95, 70) }),
            instructions: Some(TextArea { cx: 190, y: 86, font_px: 15.0, color: rgb(4, 120, 87) }),
            plate: TextArea { cx: 190, y: 400, font_px: 40.0, color: rgb(6, 78, 59) },
            website: TextArea { cx: 190, y: 412, font_px: 20.0, color: rgb(4, 120, 87) },
        },
        StickerTemplate {
            name: "minimal",
            width: 360,
            height: 480,
            background: rgb(255, 255, 255),
            border_color: rgb(17, 17, 17),
            border_width: 0,
            qr_x: 60,
            qr_y: 80,
            qr_size: 240,
            title: None,
            instructions: None,
            plate: TextArea { cx: 180, y: 370, font_px: 38.0, color: rgb(17, 17, 17) },
            website: TextArea { cx: 180, y: 382, font_px: 20.0, color: rgb(107, 114, 128) },
        },
    ];
    templates.into_iter().map(|t| (t.name, t)).collect()
});

/// Look a template up by name. Unknown names fail fast, before any
/// rendering work begins.
pub fn get(name: &str) -> Result<&'static StickerTemplate, StickerError> {
    REGISTRY
        .get(name)
        .ok_or_else(|| StickerError::TemplateNotFound(name.to_string()))
}

/// Registry keys, sorted for stable listings.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        for name in ["modern", "classic", "bright", "eco", "minimal"] {
            assert_eq!(get(name).unwrap().name, name);
        }
        assert_eq!(names().len(), 5);
    }

    #[test]
    fn unknown_name_is_an_explicit_error() {
        match get("nonexistent") {
            Err(StickerError::TemplateNotFound(n)) => assert_eq!(n, "nonexistent"),
            other => panic!("expected TemplateNotFound, got {other:?}"),
        }
    }

    /// The QR region must fully contain the QR at its configured size, and
    /// every text area must sit inside the canvas.
    #[test]
    fn registry_geometry_is_sound() {
        for name in names() {
            let t = get(name).unwrap();
            assert!(t.qr_x + t.qr_size <= t.width, "{name}: QR overflows right edge");
            assert!(t.qr_y + t.qr_size <= t.height, "{name}: QR overflows bottom edge");
            assert!(t.border_width * 2 < t.width.min(t.height), "{name}: border swallows canvas");
            // QR region must clear the border frame
            assert!(t.qr_x >= t.border_width && t.qr_y >= t.border_width, "{name}: QR under border");

            let areas = [Some(&t.plate), Some(&t.website), t.title.as_ref(), t.instructions.as_ref()];
            for area in areas.into_iter().flatten() {
                assert!(area.cx < t.width, "{name}: text area center off-canvas");
                assert!(
                    area.y as f32 + area.font_px <= t.height as f32,
                    "{name}: text area extends past bottom"
                );
            }
        }
    }
}
