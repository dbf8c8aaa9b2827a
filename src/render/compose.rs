//! Card composition — backdrop, bubble, shadow, avatar, author, quote text.
//!
//! DESIGN
//! ======
//! Geometry is fixed design constants; only the quote's font size and line
//! breaks depend on content. Draw order: backdrop, shadow silhouette,
//! bubble, avatar (or placeholder disc), author label, quote block. The
//! bubble and shadow are filled from a rounded-rect distance field so the
//! bubble edge is anti-aliased and the shadow edge is feathered wide.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut};

use crate::config::{CardBackground, CardConfig};
use crate::render::{fonts, layout};

// Bubble geometry, from the card's 512x512 reference design.
const BUBBLE_INSET: u32 = 20;
const BUBBLE_RADIUS: f32 = 40.0;
const BUBBLE_FILL: Rgba<u8> = Rgba([255, 255, 255, 240]);

const PHOTO_BACKDROP: Rgba<u8> = Rgba([38, 50, 66, 255]);

const SHADOW_OFFSET_X: i64 = 4;
const SHADOW_OFFSET_Y: i64 = 7;
const SHADOW_FILL: Rgba<u8> = Rgba([0, 0, 0, 90]);
const SHADOW_FEATHER: f32 = 9.0;
const EDGE_FEATHER: f32 = 1.0;

/// Padding between the bubble edge and its contents.
const CONTENT_PAD: u32 = 24;

pub(crate) const AVATAR_DIAMETER: u32 = 72;
const PLACEHOLDER_FILL: Rgba<u8> = Rgba([96, 125, 139, 255]);

const AUTHOR_SIZE: f32 = 28.0;
const AUTHOR_GAP: u32 = 16;
const AUTHOR_COLOR: Rgba<u8> = Rgba([38, 38, 38, 255]);

const TEXT_COLOR: Rgba<u8> = Rgba([16, 16, 16, 255]);
const TEXT_TOP_GAP: u32 = 18;

/// Candidate quote sizes, largest first.
const QUOTE_SIZES: [f32; 7] = [44.0, 38.0, 32.0, 28.0, 24.0, 20.0, 16.0];

// =============================================================================
// COMPOSE
// =============================================================================

/// Render the full card raster. `avatar` is an already-cropped circular
/// cutout; `None` draws the placeholder disc instead.
#[must_use]
pub fn compose(config: &CardConfig, author: &str, text: &str, avatar: Option<RgbaImage>) -> RgbaImage {
    let width = config.width;
    let height = config.height;

    let backdrop = match config.background {
        CardBackground::Sticker => Rgba([0, 0, 0, 0]),
        CardBackground::Photo => PHOTO_BACKDROP,
    };
    let mut canvas = RgbaImage::from_pixel(width, height, backdrop);

    let bubble_w = width.saturating_sub(2 * BUBBLE_INSET);
    let bubble_h = height.saturating_sub(2 * BUBBLE_INSET);

    fill_rounded_rect(
        &mut canvas,
        i64::from(BUBBLE_INSET) + SHADOW_OFFSET_X,
        i64::from(BUBBLE_INSET) + SHADOW_OFFSET_Y,
        bubble_w,
        bubble_h,
        BUBBLE_RADIUS,
        SHADOW_FILL,
        SHADOW_FEATHER,
    );
    fill_rounded_rect(
        &mut canvas,
        i64::from(BUBBLE_INSET),
        i64::from(BUBBLE_INSET),
        bubble_w,
        bubble_h,
        BUBBLE_RADIUS,
        BUBBLE_FILL,
        EDGE_FEATHER,
    );

    // Avatar row.
    let avatar_x = BUBBLE_INSET + CONTENT_PAD;
    let avatar_y = BUBBLE_INSET + CONTENT_PAD;
    match avatar {
        Some(cutout) => overlay(&mut canvas, &cutout, avatar_x, avatar_y),
        None => {
            let radius = AVATAR_DIAMETER / 2;
            #[allow(clippy::cast_possible_wrap)]
            draw_filled_circle_mut(
                &mut canvas,
                ((avatar_x + radius) as i32, (avatar_y + radius) as i32),
                radius as i32,
                PLACEHOLDER_FILL,
            );
        }
    }

    if !author.is_empty() {
        let author_scale = PxScale::from(AUTHOR_SIZE);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let label_height = fonts::SANS_BOLD.as_scaled(author_scale).height().ceil() as u32;
        let label_x = avatar_x + AVATAR_DIAMETER + AUTHOR_GAP;
        let label_y = avatar_y + AVATAR_DIAMETER.saturating_sub(label_height) / 2;
        #[allow(clippy::cast_possible_wrap)]
        draw_text_mut(
            &mut canvas,
            AUTHOR_COLOR,
            label_x as i32,
            label_y as i32,
            author_scale,
            &*fonts::SANS_BOLD,
            author,
        );
    }

    // Quote block in the space left under the avatar row.
    let text_x = BUBBLE_INSET + CONTENT_PAD;
    let text_y = avatar_y + AVATAR_DIAMETER + TEXT_TOP_GAP;
    let text_w = width.saturating_sub(2 * (BUBBLE_INSET + CONTENT_PAD));
    let text_h = height
        .saturating_sub(BUBBLE_INSET + CONTENT_PAD)
        .saturating_sub(text_y);

    let fitted = layout::fit(text, &fonts::SANS, text_w, text_h, &QUOTE_SIZES);
    let mut line_y = text_y;
    for line in &fitted.lines {
        #[allow(clippy::cast_possible_wrap)]
        draw_text_mut(
            &mut canvas,
            TEXT_COLOR,
            text_x as i32,
            line_y as i32,
            fitted.scale,
            &*fonts::SANS,
            line,
        );
        line_y += fitted.line_height + layout::INTER_LINE_GAP;
    }

    canvas
}

// =============================================================================
// RASTER HELPERS
// =============================================================================

/// Fill a rounded rectangle by coverage from its signed distance field.
/// `feather` is the width of the edge falloff: 1px gives an anti-aliased
/// hard edge, wider values a soft shadow silhouette.
fn fill_rounded_rect(
    img: &mut RgbaImage,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    radius: f32,
    color: Rgba<u8>,
    feather: f32,
) {
    if w == 0 || h == 0 {
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let (half_w, half_h) = (w as f32 / 2.0, h as f32 / 2.0);
    #[allow(clippy::cast_precision_loss)]
    let (center_x, center_y) = (x as f32 + half_w, y as f32 + half_h);
    let radius = radius.min(half_w).min(half_h);

    let pad = feather.ceil() as i64 + 1;
    let x_lo = (x - pad).max(0);
    let y_lo = (y - pad).max(0);
    let x_hi = (x + i64::from(w) + pad).min(i64::from(img.width()));
    let y_hi = (y + i64::from(h) + pad).min(i64::from(img.height()));

    for py in y_lo..y_hi {
        for px in x_lo..x_hi {
            #[allow(clippy::cast_precision_loss)]
            let qx = (px as f32 + 0.5 - center_x).abs() - (half_w - radius);
            #[allow(clippy::cast_precision_loss)]
            let qy = (py as f32 + 0.5 - center_y).abs() - (half_h - radius);
            let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
            let distance = outside + qx.max(qy).min(0.0) - radius;

            let coverage = (0.5 - distance / feather).clamp(0.0, 1.0);
            if coverage > 0.0 {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                blend_pixel(img.get_pixel_mut(px as u32, py as u32), color, coverage);
            }
        }
    }
}

/// Paste `top` onto the canvas at (ox, oy) with source-over blending.
fn overlay(canvas: &mut RgbaImage, top: &RgbaImage, ox: u32, oy: u32) {
    for (tx, ty, pixel) in top.enumerate_pixels() {
        let cx = ox + tx;
        let cy = oy + ty;
        if cx < canvas.width() && cy < canvas.height() {
            blend_pixel(canvas.get_pixel_mut(cx, cy), *pixel, 1.0);
        }
    }
}

/// Source-over blend of `src` (scaled by `coverage`) onto `dst`.
fn blend_pixel(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let src_a = (f32::from(src.0[3]) / 255.0) * coverage;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = f32::from(dst.0[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    for channel in 0..3 {
        let s = f32::from(src.0[channel]);
        let d = f32::from(dst.0[channel]);
        dst.0[channel] = ((s * src_a + d * dst_a * (1.0 - src_a)) / out_a).round() as u8;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        dst.0[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
#[path = "compose_test.rs"]
mod tests;
