//! Camera session lifecycle
//!
//! A session owns at most one live stream. The stream is released by
//! [`CameraSession::close`] and, failing that, by `Drop`, so a device handle
//! never outlives the session that acquired it.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::{CameraError, CameraPlatform, CameraStream, FrameEncoder, StreamConstraints};
use crate::photo::EncodedImage;

pub struct CameraSession {
    platform: Arc<dyn CameraPlatform>,
    encoder: Arc<dyn FrameEncoder>,
    constraints: StreamConstraints,
    stream: Option<Box<dyn CameraStream>>,
}

impl CameraSession {
    /// New, not yet opened session requesting the rear camera
    pub fn new(platform: Arc<dyn CameraPlatform>, encoder: Arc<dyn FrameEncoder>) -> Self {
        Self {
            platform,
            encoder,
            constraints: StreamConstraints::rear(),
            stream: None,
        }
    }

    /// Acquire the stream
    ///
    /// No-op when the session is already active.
    pub async fn open(&mut self) -> Result<(), CameraError> {
        if self.stream.is_some() {
            debug!("Camera session already active");
            return Ok(());
        }

        debug!(
            platform = self.platform.name(),
            facing = ?self.constraints.facing,
            "Requesting camera stream"
        );

        match self.platform.request_stream(&self.constraints).await {
            Ok(stream) => {
                info!(
                    platform = self.platform.name(),
                    device = stream.label(),
                    "Camera stream acquired"
                );
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                error!(platform = self.platform.name(), error = %e, "Camera acquisition failed");
                Err(e)
            }
        }
    }

    /// Freeze the current frame into an encoded photo
    pub fn capture_frame(&mut self) -> Result<EncodedImage, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::NotActive)?;
        let frame = stream.current_frame()?;
        self.encoder.encode(&frame)
    }

    /// Release the stream; safe to call any number of times
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
            info!(device = stream.label(), "Camera stream released");
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Raw stream handle for rendering the live feed
    pub fn stream(&self) -> Option<&dyn CameraStream> {
        self.stream.as_deref()
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.close();
    }
}
