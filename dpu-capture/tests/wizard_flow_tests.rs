//! End-to-end wizard cycles through the kiosk controller

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use dpu_capture::camera::CameraError;
use dpu_capture::submitter::{HttpReportSubmitter, REPORT_CONTENT_TYPE};
use dpu_capture::wizard::{config_help, WizardError, SOFT_FAILURE_MESSAGE};
use dpu_common::config::ENDPOINT_PLACEHOLDER;
use dpu_common::events::{EventBus, WizardEvent};
use dpu_common::WizardStep;
use helpers::{create_kiosk, fill_report, submit_report, FakeCamera, MockBackend};

fn submitter(url: &str) -> HttpReportSubmitter {
    HttpReportSubmitter::new(Some(url.to_string()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_full_cycle_submits_report() {
    let backend = MockBackend::start(StatusCode::OK, r#"{"success":true}"#).await;
    let camera = FakeCamera::working();
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();
    let mut kiosk = create_kiosk(camera.clone(), Some(bus));

    kiosk.select_outlet("OUT03").unwrap();
    kiosk.advance().await.unwrap();
    assert_eq!(kiosk.wizard().step(), WizardStep::PseudoCapture);
    assert!(kiosk.camera_active());

    for _ in 0..2 {
        kiosk.capture().await.unwrap();
        assert!(kiosk.wizard().pending_preview().is_some());
        kiosk.keep_preview().await.unwrap();
    }
    assert_eq!(kiosk.wizard().pseudo_images().len(), 2);
    assert_ne!(
        kiosk.wizard().pseudo_images()[0],
        kiosk.wizard().pseudo_images()[1]
    );

    // Each capture step gets its own stream
    kiosk.advance().await.unwrap();
    assert_eq!(kiosk.wizard().step(), WizardStep::FridgeCapture);
    assert_eq!(camera.opens(), 2);
    assert_eq!(camera.stops(), 1);

    kiosk.capture().await.unwrap();
    kiosk.keep_preview().await.unwrap();
    assert_eq!(kiosk.wizard().step(), WizardStep::Confirmation);
    assert!(!kiosk.camera_active());
    assert_eq!(camera.stops(), 2);

    submit_report(&mut kiosk, &submitter(&backend.url)).await;
    assert_eq!(kiosk.wizard().step(), WizardStep::Success);
    assert!(kiosk.wizard().last_error().is_none());

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].content_type.as_deref(), Some(REPORT_CONTENT_TYPE));
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["outletCode"], "OUT03");
    assert_eq!(body["pseudoImages"].as_array().unwrap().len(), 2);
    assert!(body["fridgeImage"].is_string());

    let mut completed = false;
    while let Ok(event) = rx.try_recv() {
        if let WizardEvent::SubmissionCompleted { pseudo_count, .. } = event {
            assert_eq!(pseudo_count, 2);
            completed = true;
        }
    }
    assert!(completed);

    let old_session = kiosk.wizard().session_id();
    kiosk.reset();
    assert_eq!(kiosk.wizard().step(), WizardStep::SelectOutlet);
    assert!(kiosk.wizard().outlet_code().is_none());
    assert!(kiosk.wizard().pseudo_images().is_empty());
    assert_ne!(kiosk.wizard().session_id(), old_session);
}

#[tokio::test]
async fn test_unconfigured_backend_shows_setup_help() {
    let backend = MockBackend::start(StatusCode::OK, r#"{"success":true}"#).await;
    let mut kiosk = create_kiosk(FakeCamera::working(), None);
    fill_report(&mut kiosk, "OUT01", 1).await;

    let placeholder = submitter(ENDPOINT_PLACEHOLDER);
    submit_report(&mut kiosk, &placeholder).await;

    assert_eq!(kiosk.wizard().step(), WizardStep::Error);
    let message = kiosk.wizard().last_error().unwrap();
    assert!(message.contains("Backend is not configured"));
    assert!(config_help(message).is_some());
    assert!(kiosk.snapshot().config_help.is_some());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_backend_failure_uses_generic_message() {
    let backend = MockBackend::start(
        StatusCode::OK,
        r#"{"success":false,"message":"Sheet locked"}"#,
    )
    .await;
    let mut kiosk = create_kiosk(FakeCamera::working(), None);
    fill_report(&mut kiosk, "OUT02", 1).await;

    submit_report(&mut kiosk, &submitter(&backend.url)).await;

    assert_eq!(kiosk.wizard().step(), WizardStep::Error);
    assert_eq!(kiosk.wizard().last_error(), Some(SOFT_FAILURE_MESSAGE));
    assert!(kiosk.snapshot().config_help.is_none());
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_camera_denied_moves_to_error() {
    let camera = FakeCamera::failing(CameraError::PermissionDenied);
    let mut kiosk = create_kiosk(camera.clone(), None);

    kiosk.select_outlet("OUT05").unwrap();
    kiosk.advance().await.unwrap();

    assert_eq!(kiosk.wizard().step(), WizardStep::Error);
    assert_eq!(
        kiosk.wizard().last_error(),
        Some(CameraError::PermissionDenied.to_string().as_str())
    );
    assert!(!kiosk.camera_active());
    assert_eq!(camera.opens(), 1);

    // Error step offers only reset
    let err = kiosk.capture().await.unwrap_err();
    assert!(matches!(err, WizardError::NotAllowed { .. }));

    kiosk.reset();
    assert_eq!(kiosk.wizard().step(), WizardStep::SelectOutlet);
    assert!(kiosk.wizard().last_error().is_none());
}

#[tokio::test]
async fn test_missing_camera_message() {
    let mut kiosk = create_kiosk(FakeCamera::failing(CameraError::DeviceNotFound), None);
    kiosk.select_outlet("OUT05").unwrap();
    kiosk.advance().await.unwrap();

    let message = kiosk.wizard().last_error().unwrap();
    assert!(message.starts_with("No camera found"));
}

#[tokio::test]
async fn test_retake_and_remove_before_confirmation() {
    let camera = FakeCamera::working();
    let mut kiosk = create_kiosk(camera.clone(), None);
    kiosk.select_outlet("OUT07").unwrap();
    kiosk.advance().await.unwrap();

    kiosk.capture().await.unwrap();
    kiosk.retake_preview();
    assert!(kiosk.wizard().pending_preview().is_none());
    assert!(kiosk.wizard().pseudo_images().is_empty());
    assert!(!kiosk.wizard().can_advance());

    for _ in 0..3 {
        kiosk.capture().await.unwrap();
        kiosk.keep_preview().await.unwrap();
    }
    let kept = kiosk.wizard().pseudo_images().to_vec();
    kiosk.remove_pseudo_image(1).unwrap();
    assert_eq!(kiosk.wizard().pseudo_images(), &[kept[0].clone(), kept[2].clone()]);

    // Out of range is ignored
    kiosk.remove_pseudo_image(10).unwrap();
    assert_eq!(kiosk.wizard().pseudo_images().len(), 2);

    // The stream survives the whole step
    assert_eq!(camera.opens(), 1);
    assert_eq!(camera.stops(), 0);
}

#[tokio::test]
async fn test_reset_mid_capture_releases_camera() {
    let camera = FakeCamera::working();
    let mut kiosk = create_kiosk(camera.clone(), None);
    kiosk.select_outlet("OUT01").unwrap();
    kiosk.advance().await.unwrap();
    assert!(kiosk.camera_active());

    kiosk.reset();
    assert!(!kiosk.camera_active());
    assert_eq!(camera.stops(), 1);
}

#[tokio::test]
async fn test_outcome_after_reset_is_discarded() {
    let mut kiosk = create_kiosk(FakeCamera::working(), None);
    fill_report(&mut kiosk, "OUT09", 1).await;

    let (session_id, _request) = kiosk.begin_submission().unwrap();
    assert_eq!(kiosk.wizard().step(), WizardStep::Submitting);
    kiosk.reset();

    let err = kiosk
        .finish_submission(
            session_id,
            Ok(dpu_capture::submitter::SubmissionResult::succeeded(None)),
        )
        .unwrap_err();
    assert_eq!(err, WizardError::StaleSubmission);
    assert_eq!(kiosk.wizard().step(), WizardStep::SelectOutlet);
}
