//! Card rendering pipeline: layout, avatar compositing, bounded encoding.
//!
//! ARCHITECTURE
//! ============
//! `render_card` is the synchronous, CPU-bound entry point — the card
//! service calls it on a blocking worker. It crops the avatar (falling back
//! to the placeholder on any decode problem), composes the raster, and
//! encodes it under the configured byte ceiling.

pub mod avatar;
pub mod compose;
pub mod encode;
mod fonts;
pub mod layout;

use image::RgbaImage;
use tracing::{info, warn};

use crate::config::CardConfig;
pub use encode::CardFormat;

// =============================================================================
// TYPES
// =============================================================================

/// A finished card. Owned entirely by the caller; the renderer keeps no
/// reference to it.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub pixels: RgbaImage,
    pub encoded: Vec<u8>,
    pub format: CardFormat,
    /// JPEG quality the encoder settled on; `None` on the lossless path.
    pub quality: Option<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Encode(#[from] encode::EncodeError),
    #[error("render worker failed: {0}")]
    Worker(String),
}

// =============================================================================
// RENDER
// =============================================================================

/// Compose and encode one card.
///
/// Avatar bytes that fail to decode degrade to the placeholder disc; they
/// never fail the card.
///
/// # Errors
///
/// Returns `Encode` if the raster cannot be serialized.
pub fn render_card(
    config: &CardConfig,
    author: &str,
    text: &str,
    avatar_bytes: Option<&[u8]>,
) -> Result<RenderedCard, RenderError> {
    let cutout = avatar_bytes.and_then(|bytes| match avatar::circular_crop(bytes, compose::AVATAR_DIAMETER) {
        Ok(img) => Some(img),
        Err(e) => {
            warn!(error = %e, "avatar unusable, falling back to placeholder");
            None
        }
    });

    let pixels = compose::compose(config, author, text, cutout);
    let encoded = encode::encode(&pixels, config.byte_ceiling, &config.quality_ladder)?;

    info!(
        width = pixels.width(),
        height = pixels.height(),
        bytes = encoded.bytes.len(),
        format = encoded.format.mime(),
        quality = encoded.quality,
        "card rendered"
    );

    Ok(RenderedCard {
        pixels,
        encoded: encoded.bytes,
        format: encoded.format,
        quality: encoded.quality,
    })
}
