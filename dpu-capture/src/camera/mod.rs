//! Camera session management
//!
//! The wizard never talks to a camera device directly. A [`CameraPlatform`]
//! grants [`CameraStream`]s, a [`CameraSession`] owns at most one of them and
//! releases it on every exit path, and a [`FrameEncoder`] turns the current
//! frame into an [`EncodedImage`](crate::photo::EncodedImage).

mod directory;
mod encoder;
mod session;

pub use directory::DirectoryCamera;
pub use encoder::{FrameEncoder, JpegFrameEncoder, DEFAULT_JPEG_QUALITY};
pub use session::CameraSession;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera acquisition and capture errors
///
/// Display strings are shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("Camera access was denied. Please allow camera access in your browser settings.")]
    PermissionDenied,

    #[error("No camera found. Please ensure a camera is connected and enabled.")]
    DeviceNotFound,

    #[error("An error occurred while accessing the camera: {0}")]
    Other(String),

    /// Capture attempted without an open stream
    #[error("Camera stream is not active")]
    NotActive,

    #[error("Failed to encode captured frame: {0}")]
    Encode(String),
}

/// Which way the requested camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera
    #[default]
    Environment,
    /// Front camera
    User,
}

/// Constraints passed to [`CameraPlatform::request_stream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamConstraints {
    pub facing: FacingMode,
}

impl StreamConstraints {
    pub fn rear() -> Self {
        Self {
            facing: FacingMode::Environment,
        }
    }
}

/// Uncompressed RGB8 frame read from a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB8, `width * height * 3` bytes
    pub pixels: Vec<u8>,
}

impl RasterFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::Other(format!(
                "empty frame ({}x{})",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(CameraError::Other(format!(
                "frame buffer holds {} bytes, expected {} for {}x{} RGB",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Source of camera streams
#[async_trait]
pub trait CameraPlatform: Send + Sync {
    /// Platform name for logging
    fn name(&self) -> &'static str;

    /// Ask the platform for a live stream
    ///
    /// Resolves once access is granted or denied.
    async fn request_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// Live stream granted by a [`CameraPlatform`]
pub trait CameraStream: Send + Sync {
    /// Human-readable device label
    fn label(&self) -> &str;

    /// Most recent frame; nothing is buffered
    fn current_frame(&mut self) -> Result<RasterFrame, CameraError>;

    /// Release every device track held by this stream
    fn stop_all_tracks(&mut self);

    /// False once the tracks have been stopped
    fn is_live(&self) -> bool;
}
