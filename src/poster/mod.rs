//! Poster image handling.
//!
//! A poster entity carries either a static image reference or the original
//! animated-image payload. Classification of raw bytes goes through the
//! `image` crate so that animated GIFs keep their frame data for export;
//! resolving bytes to an actual texture is the renderer's problem.

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat};
use std::io::Cursor;

pub const DEFAULT_POSTER_IMAGE: &str = "examples/cat2.png";

#[derive(Debug, thiserror::Error)]
pub enum PosterError {
    #[error("unrecognized image data")]
    UnknownFormat,
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// The image currently bound to a poster. Animated payloads keep the encoded
/// source data, because a static snapshot would lose the animation on export.
#[derive(Debug, Clone, PartialEq)]
pub enum PosterImage {
    /// Reference to a static image (path, URL, or data URI).
    Static(String),
    /// Original encoded bytes of an animated image, kept verbatim.
    Animated { data: String },
}

impl PosterImage {
    pub fn is_animated(&self) -> bool {
        matches!(self, PosterImage::Animated { .. })
    }

    /// The exported `image` field value for this poster.
    pub fn export_payload(&self) -> &str {
        match self {
            PosterImage::Static(reference) => reference,
            PosterImage::Animated { data } => data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PosterState {
    pub image: PosterImage,
    /// Set each tick for animated images so the renderer re-uploads the
    /// current frame.
    pub needs_frame_update: bool,
}

impl PosterState {
    pub fn with_default_image() -> Self {
        Self {
            image: PosterImage::Static(DEFAULT_POSTER_IMAGE.to_string()),
            needs_frame_update: false,
        }
    }

    pub fn new(image: PosterImage) -> Self {
        Self {
            image,
            needs_frame_update: false,
        }
    }
}

/// What a blob of image bytes turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageClass {
    Static,
    AnimatedGif { frames: usize },
}

/// Classify raw image bytes. A GIF with more than one frame is animated;
/// everything else the `image` crate recognizes is treated as static.
pub fn classify_image(bytes: &[u8]) -> Result<ImageClass, PosterError> {
    let format = image::guess_format(bytes).map_err(|_| PosterError::UnknownFormat)?;
    if format != ImageFormat::Gif {
        return Ok(ImageClass::Static);
    }
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let frames = decoder.into_frames().count();
    if frames > 1 {
        Ok(ImageClass::AnimatedGif { frames })
    } else {
        Ok(ImageClass::Static)
    }
}

/// Build the poster image for newly supplied bytes, keeping the encoded
/// `reference` payload when the bytes are animated.
pub fn image_from_bytes(bytes: &[u8], reference: &str) -> Result<PosterImage, PosterError> {
    match classify_image(bytes)? {
        ImageClass::AnimatedGif { .. } => Ok(PosterImage::Animated {
            data: reference.to_string(),
        }),
        ImageClass::Static => Ok(PosterImage::Static(reference.to_string())),
    }
}
