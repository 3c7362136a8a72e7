//! Test Helper Utilities
//!
//! Shared utilities for testing dpu-capture

#![allow(dead_code)]

pub mod fake_camera;
pub mod mock_backend;

pub use fake_camera::FakeCamera;
pub use mock_backend::{MockBackend, RecordedRequest};

use std::sync::Arc;

use dpu_capture::camera::JpegFrameEncoder;
use dpu_capture::kiosk::KioskSession;
use dpu_capture::outlets::OutletCatalogue;
use dpu_capture::submitter::ReportSubmitter;
use dpu_capture::wizard::Wizard;
use dpu_common::events::EventBus;

/// Kiosk over the default outlet catalogue and `camera`
pub fn create_kiosk(camera: Arc<FakeCamera>, event_bus: Option<EventBus>) -> KioskSession {
    let mut wizard = Wizard::new(Arc::new(OutletCatalogue::default()));
    if let Some(bus) = event_bus {
        wizard = wizard.with_event_bus(bus);
    }
    KioskSession::new(wizard, camera, Arc::new(JpegFrameEncoder::default()))
}

/// Drive a kiosk from the outlet picker to CONFIRMATION
pub async fn fill_report(kiosk: &mut KioskSession, outlet_code: &str, pseudo_count: usize) {
    kiosk.select_outlet(outlet_code).unwrap();
    kiosk.advance().await.unwrap();
    for _ in 0..pseudo_count {
        kiosk.capture().await.unwrap();
        kiosk.keep_preview().await.unwrap();
    }
    kiosk.advance().await.unwrap();
    kiosk.capture().await.unwrap();
    kiosk.keep_preview().await.unwrap();
}

/// Submit the way the HTTP route does: begin, send, then apply the outcome
pub async fn submit_report(kiosk: &mut KioskSession, submitter: &dyn ReportSubmitter) {
    let (session_id, request) = kiosk.begin_submission().unwrap();
    let outcome = submitter.submit(&request).await;
    kiosk.finish_submission(session_id, outcome).unwrap();
}
