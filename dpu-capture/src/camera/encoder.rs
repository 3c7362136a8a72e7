//! Frame-to-JPEG encoding

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;

use super::{CameraError, RasterFrame};
use crate::photo::EncodedImage;

/// JPEG quality used for captured photos
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Turns a raw frame into an encoded photo
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &RasterFrame) -> Result<EncodedImage, CameraError>;
}

/// Baseline JPEG encoder
#[derive(Debug, Clone, Copy)]
pub struct JpegFrameEncoder {
    quality: u8,
}

impl JpegFrameEncoder {
    /// Quality is clamped to 1-100
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, frame: &RasterFrame) -> Result<EncodedImage, CameraError> {
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
        encoder
            .encode(&frame.pixels, frame.width, frame.height, ColorType::Rgb8)
            .map_err(|e| CameraError::Encode(e.to_string()))?;

        tracing::debug!(
            width = frame.width,
            height = frame.height,
            jpeg_bytes = bytes.len(),
            "Encoded frame"
        );

        Ok(EncodedImage::from_jpeg_bytes(&bytes))
    }
}
