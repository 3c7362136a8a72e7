//! Still-frame camera backed by a directory of images
//!
//! Serves JPEG/PNG files in name order, cycling, one file per frame read.
//! Used on kiosks and test rigs that have no platform camera API.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{CameraError, CameraPlatform, CameraStream, RasterFrame, StreamConstraints};

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub struct DirectoryCamera {
    root: PathBuf,
}

impl DirectoryCamera {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl CameraPlatform for DirectoryCamera {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn request_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        debug!(
            root = %self.root.display(),
            facing = ?constraints.facing,
            "Still-frame source has a single view; facing constraint accepted as-is"
        );

        let root = self.root.clone();
        let frames = tokio::task::spawn_blocking(move || list_frames(&root))
            .await
            .map_err(|e| CameraError::Other(e.to_string()))??;

        info!(
            root = %self.root.display(),
            frames = frames.len(),
            "Still-frame camera opened"
        );

        Ok(Box::new(DirectoryStream {
            label: self.root.display().to_string(),
            frames,
            next: 0,
            live: true,
        }))
    }
}

struct DirectoryStream {
    label: String,
    frames: Vec<PathBuf>,
    next: usize,
    live: bool,
}

impl CameraStream for DirectoryStream {
    fn label(&self) -> &str {
        &self.label
    }

    fn current_frame(&mut self) -> Result<RasterFrame, CameraError> {
        if !self.live {
            return Err(CameraError::NotActive);
        }

        let path = &self.frames[self.next % self.frames.len()];
        self.next = self.next.wrapping_add(1);

        let decoded = image::open(path)
            .map_err(|e| CameraError::Other(format!("{}: {}", path.display(), e)))?
            .to_rgb8();
        let (width, height) = decoded.dimensions();

        RasterFrame::new(width, height, decoded.into_raw())
    }

    fn stop_all_tracks(&mut self) {
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

fn list_frames(root: &Path) -> Result<Vec<PathBuf>, CameraError> {
    let entries = std::fs::read_dir(root).map_err(map_io_error)?;

    let mut frames = Vec::new();
    for entry in entries {
        let path = entry.map_err(map_io_error)?.path();
        if path.is_file() && is_frame_file(&path) {
            frames.push(path);
        }
    }
    frames.sort();

    if frames.is_empty() {
        return Err(CameraError::DeviceNotFound);
    }
    Ok(frames)
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

fn map_io_error(err: io::Error) -> CameraError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => CameraError::PermissionDenied,
        io::ErrorKind::NotFound => CameraError::DeviceNotFound,
        _ => CameraError::Other(err.to_string()),
    }
}
