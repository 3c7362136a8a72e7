//! In-memory camera platform with open/stop counters

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dpu_capture::camera::{
    CameraError, CameraPlatform, CameraStream, RasterFrame, StreamConstraints,
};

pub struct FakeCamera {
    failure: Option<CameraError>,
    opens: AtomicUsize,
    stops: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            failure: None,
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Every stream request fails with `error`
    pub fn failing(error: CameraError) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(error),
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Stream requests made so far
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Streams released so far
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraPlatform for FakeCamera {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn request_stream(
        &self,
        _constraints: &StreamConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(Box::new(FakeStream {
            stops: Arc::clone(&self.stops),
            live: true,
            shade: 0,
        }))
    }
}

struct FakeStream {
    stops: Arc<AtomicUsize>,
    live: bool,
    shade: u8,
}

impl CameraStream for FakeStream {
    fn label(&self) -> &str {
        "fake rear camera"
    }

    fn current_frame(&mut self) -> Result<RasterFrame, CameraError> {
        if !self.live {
            return Err(CameraError::NotActive);
        }
        // Distinct frames so kept photos can be told apart
        self.shade = self.shade.wrapping_add(40);
        RasterFrame::new(4, 4, vec![self.shade; 4 * 4 * 3])
    }

    fn stop_all_tracks(&mut self) {
        if self.live {
            self.live = false;
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}
