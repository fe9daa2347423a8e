//! Template compositing.
//!
//! Draw order is part of the contract: background, border, then exactly one
//! text element (the plate when present, else the website fallback — never
//! both), and the QR image last so nothing can paint over it. The QR PNG
//! re-decode is the pipeline's single suspension point and runs under
//! [`super::QR_DECODE_TIMEOUT`].

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use tokio::time::timeout;

use super::qr::{self, QrOptions};
use super::template::{StickerTemplate, TextArea};
use super::{StickerError, MAX_SURFACE_EDGE, QR_DECODE_TIMEOUT};

/// Composite one sticker onto a fresh canvas.
pub async fn generate_sticker(
    payload: &str,
    display_plate: &str,
    template: &StickerTemplate,
    font: &Font<'static>,
    qr_opts: &QrOptions,
    website_text: &str,
) -> Result<RgbaImage, StickerError> {
    let qr_png = qr::render_png(payload, qr_opts)?;

    if template.width == 0
        || template.height == 0
        || template.width > MAX_SURFACE_EDGE
        || template.height > MAX_SURFACE_EDGE
    {
        return Err(StickerError::SurfaceUnavailable {
            width: template.width,
            height: template.height,
        });
    }
    let mut canvas = RgbaImage::from_pixel(template.width, template.height, template.background);

    if template.border_width > 0 {
        draw_border(&mut canvas, template.border_color, template.border_width);
    }

    // Exactly one text element: plate text wins, website string is the
    // fallback for blank plates.
    let plate_text = display_plate.trim();
    if !plate_text.is_empty() {
        draw_text_centered(&mut canvas, font, &template.plate, plate_text);
    } else {
        draw_text_centered(&mut canvas, font, &template.website, website_text);
    }

    let decoded = decode_qr_image(qr_png).await?;
    let qr_img = if decoded.width() != template.qr_size || decoded.height() != template.qr_size {
        // integer cell rounding made the rendered edge differ — fit it to the
        // template's QR region without resampling artifacts
        imageops::resize(&decoded, template.qr_size, template.qr_size, FilterType::Nearest)
    } else {
        decoded
    };
    imageops::overlay(&mut canvas, &qr_img, template.qr_x as i64, template.qr_y as i64);

    Ok(canvas)
}

/// Re-decode the QR PNG on the blocking pool, bounded by the watchdog.
async fn decode_qr_image(png: Vec<u8>) -> Result<RgbaImage, StickerError> {
    let decode = tokio::task::spawn_blocking(move || image::load_from_memory(&png));
    match timeout(QR_DECODE_TIMEOUT, decode).await {
        Err(_) => Err(StickerError::QrImageTimeout(QR_DECODE_TIMEOUT)),
        Ok(Err(join_err)) => Err(StickerError::QrImageDecode(join_err.to_string())),
        Ok(Ok(Err(img_err))) => Err(StickerError::QrImageDecode(img_err.to_string())),
        Ok(Ok(Ok(img))) => Ok(img.to_rgba8()),
    }
}

fn draw_border(canvas: &mut RgbaImage, color: Rgba<u8>, width: u32) {
    let (w, h) = (canvas.width(), canvas.height());
    let bw = width.min(w / 2).min(h / 2);
    for y in 0..h {
        for x in 0..w {
            if x < bw || x >= w - bw || y < bw || y >= h - bw {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

fn draw_text_centered(canvas: &mut RgbaImage, font: &Font<'static>, area: &TextArea, text: &str) {
    let width = text_width(font, area.font_px, text);
    let x = (area.cx as f32 - width / 2.0).round() as i32;
    draw_text(canvas, font, area.font_px, x, area.y as i32, area.color, text);
}

fn text_width(font: &Font<'static>, px: f32, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let mut width: f32 = 0.0;
    for glyph in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            width = width.max(bb.max.x as f32);
        }
    }
    width
}

fn draw_text(
    canvas: &mut RgbaImage,
    font: &Font<'static>,
    px: f32,
    x: i32,
    y: i32,
    color: Rgba<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let baseline = y as f32 + v_metrics.ascent;

    for glyph in font.layout(text, scale, point(x as f32, baseline)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px_x = gx as i32 + bb.min.x;
                let px_y = gy as i32 + bb.min.y;
                if px_x < 0 || px_y < 0 {
                    return;
                }
                let (px_x, px_y) = (px_x as u32, px_y as u32);
                if px_x >= canvas.width() || px_y >= canvas.height() {
                    return;
                }
                let alpha = coverage.clamp(0.0, 1.0);
                if alpha <= 0.0 {
                    return;
                }
                let dst = canvas.get_pixel_mut(px_x, px_y);
                let inv = 1.0 - alpha;
                for c in 0..3 {
                    dst.0[c] = (color.0[c] as f32 * alpha + dst.0[c] as f32 * inv) as u8;
                }
                dst.0[3] = 255;
            });
        }
    }
}
