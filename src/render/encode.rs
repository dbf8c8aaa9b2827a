//! Size-bounded raster encoding.
//!
//! DESIGN
//! ======
//! With no byte ceiling the raster is written as lossless PNG. Under a
//! ceiling only lossy JPEG is attempted (a lossless encode cannot bound
//! its output size), walking the quality ladder top down and stopping at
//! the first rung that fits. If even the floor rung is over budget, the
//! smallest output produced is returned anyway: delivery beats rejection.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};
use tracing::warn;

/// Quality used when the caller hands over an empty ladder.
const FLOOR_QUALITY: u8 = 50;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFormat {
    Png,
    Jpeg,
}

impl CardFormat {
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Encoder output: the bytes, their container, and the JPEG quality used
/// (`None` on the lossless path).
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub format: CardFormat,
    pub quality: Option<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("image encoding failed: {0}")]
    Codec(#[from] image::ImageError),
}

// =============================================================================
// ENCODE
// =============================================================================

/// Serialize `pixels`, keeping the output within `byte_ceiling` when one is
/// given. Never fails solely because of size: an exhausted ladder returns
/// its smallest output.
///
/// # Errors
///
/// Returns `Codec` only for actual encoder failures.
pub fn encode(pixels: &RgbaImage, byte_ceiling: Option<usize>, ladder: &[u8]) -> Result<Encoded, EncodeError> {
    let Some(ceiling) = byte_ceiling else {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes).write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgba8,
        )?;
        return Ok(Encoded { bytes, format: CardFormat::Png, quality: None });
    };

    // JPEG carries no alpha channel; flatten onto white first.
    let rgb = flatten_onto_white(pixels);
    let ladder = if ladder.is_empty() { &[FLOOR_QUALITY][..] } else { ladder };

    let mut smallest: Option<(u8, Vec<u8>)> = None;
    for &quality in ladder {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )?;

        if bytes.len() <= ceiling {
            return Ok(Encoded { bytes, format: CardFormat::Jpeg, quality: Some(quality) });
        }
        let replace = smallest.as_ref().is_none_or(|(_, best)| bytes.len() < best.len());
        if replace {
            smallest = Some((quality, bytes));
        }
    }

    let (quality, bytes) = smallest.expect("ladder has at least one rung");
    warn!(
        ceiling,
        size = bytes.len(),
        quality,
        "quality ladder exhausted; returning smallest output over budget"
    );
    Ok(Encoded { bytes, format: CardFormat::Jpeg, quality: Some(quality) })
}

fn flatten_onto_white(pixels: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(pixels.width(), pixels.height());
    for (src, dst) in pixels.pixels().zip(out.pixels_mut()) {
        let alpha = f32::from(src.0[3]) / 255.0;
        let inverse = 1.0 - alpha;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let blend = |channel: u8| (f32::from(channel) * alpha + 255.0 * inverse) as u8;
        *dst = Rgb([blend(src.0[0]), blend(src.0[1]), blend(src.0[2])]);
    }
    out
}

#[cfg(test)]
#[path = "encode_test.rs"]
mod tests;
