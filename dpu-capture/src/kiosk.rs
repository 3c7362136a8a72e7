//! Kiosk controller
//!
//! Owns one [`Wizard`] and keeps the camera in step with it: a capture step
//! holds exactly one [`CaptureView`], every other step holds none. Views are
//! dropped (and the device released) before a new one is opened.

use std::sync::Arc;

use dpu_common::WizardStep;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::camera::{CameraError, CameraPlatform, CameraSession, FrameEncoder};
use crate::photo::EncodedImage;
use crate::submitter::{ReportRequest, SubmissionResult, SubmitError};
use crate::wizard::{config_help, StepTransition, Wizard, WizardError};

/// Live camera bound to one capture step
pub struct CaptureView {
    step: WizardStep,
    session: CameraSession,
}

impl CaptureView {
    /// Open the camera for `step`
    ///
    /// On failure the half-built session is dropped, releasing anything it holds.
    pub async fn open(
        step: WizardStep,
        platform: Arc<dyn CameraPlatform>,
        encoder: Arc<dyn FrameEncoder>,
    ) -> Result<Self, CameraError> {
        let mut session = CameraSession::new(platform, encoder);
        session.open().await?;
        Ok(Self { step, session })
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn session(&self) -> &CameraSession {
        &self.session
    }

    pub fn capture(&mut self) -> Result<EncodedImage, CameraError> {
        self.session.capture_frame()
    }
}

/// Serializable view of the kiosk for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub session_id: Uuid,
    pub step: WizardStep,
    /// Empty until an outlet is picked
    pub outlet_code: String,
    pub pseudo_images: Vec<EncodedImage>,
    pub fridge_image: Option<EncodedImage>,
    pub pending_preview: Option<EncodedImage>,
    pub error: Option<String>,
    /// Setup instructions when `error` is a configuration problem
    pub config_help: Option<&'static str>,
    pub can_advance: bool,
    pub camera_active: bool,
    pub camera_device: Option<String>,
    pub last_transition: Option<StepTransition>,
}

pub struct KioskSession {
    wizard: Wizard,
    view: Option<CaptureView>,
    platform: Arc<dyn CameraPlatform>,
    encoder: Arc<dyn FrameEncoder>,
}

impl KioskSession {
    pub fn new(
        wizard: Wizard,
        platform: Arc<dyn CameraPlatform>,
        encoder: Arc<dyn FrameEncoder>,
    ) -> Self {
        Self {
            wizard,
            view: None,
            platform,
            encoder,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn camera_active(&self) -> bool {
        self.view
            .as_ref()
            .map(|v| v.session().is_active())
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let error = self.wizard.last_error().map(str::to_string);
        WizardSnapshot {
            session_id: self.wizard.session_id(),
            step: self.wizard.step(),
            outlet_code: self.wizard.outlet_code().unwrap_or_default().to_string(),
            pseudo_images: self.wizard.pseudo_images().to_vec(),
            fridge_image: self.wizard.fridge_image().cloned(),
            pending_preview: self.wizard.pending_preview().cloned(),
            config_help: error.as_deref().and_then(config_help),
            error,
            can_advance: self.wizard.can_advance(),
            camera_active: self.camera_active(),
            camera_device: self
                .view
                .as_ref()
                .and_then(|v| v.session().stream())
                .map(|s| s.label().to_string()),
            last_transition: self.wizard.last_transition().cloned(),
        }
    }

    pub fn select_outlet(&mut self, code: &str) -> Result<(), WizardError> {
        self.wizard.select_outlet(code)
    }

    pub async fn advance(&mut self) -> Result<(), WizardError> {
        self.wizard.advance()?;
        self.sync_camera().await;
        Ok(())
    }

    /// Capture the current frame into the wizard's preview
    ///
    /// Camera failures are not returned: they move the wizard to ERROR.
    pub async fn capture(&mut self) -> Result<(), WizardError> {
        let step = self.wizard.step();
        if !step.is_capture() {
            return Err(WizardError::NotAllowed {
                action: "capture",
                step,
            });
        }

        self.sync_camera().await;
        let Some(view) = self.view.as_mut() else {
            // Opening failed and the wizard is already on ERROR
            return Ok(());
        };

        match view.capture() {
            Ok(image) => self.wizard.on_frame_captured(image),
            Err(e) => {
                self.wizard.report_camera_error(&e)?;
                self.view = None;
                Ok(())
            }
        }
    }

    pub async fn keep_preview(&mut self) -> Result<(), WizardError> {
        self.wizard.keep_preview()?;
        self.sync_camera().await;
        Ok(())
    }

    pub fn retake_preview(&mut self) {
        self.wizard.retake_preview();
    }

    pub fn remove_pseudo_image(&mut self, index: usize) -> Result<(), WizardError> {
        self.wizard.remove_pseudo_image(index)
    }

    /// Start a submission; returns the session id to hand back to
    /// [`KioskSession::finish_submission`]
    pub fn begin_submission(&mut self) -> Result<(Uuid, ReportRequest), WizardError> {
        let session_id = self.wizard.session_id();
        let request = self.wizard.begin_submission()?;
        Ok((session_id, request))
    }

    pub fn finish_submission(
        &mut self,
        session_id: Uuid,
        outcome: Result<SubmissionResult, SubmitError>,
    ) -> Result<(), WizardError> {
        self.wizard.finish_submission(session_id, outcome)
    }

    pub fn reset(&mut self) {
        self.view = None;
        self.wizard.reset();
    }

    /// Open or release the camera to match the current step
    async fn sync_camera(&mut self) {
        let step = self.wizard.step();

        if !step.is_capture() {
            if self.view.take().is_some() {
                debug!(step = %step, "Capture view closed");
            }
            return;
        }

        if matches!(&self.view, Some(view) if view.step() == step) {
            return;
        }

        // Release the previous view before opening the device again
        self.view = None;

        match CaptureView::open(step, Arc::clone(&self.platform), Arc::clone(&self.encoder)).await
        {
            Ok(view) => {
                debug!(step = %step, "Capture view opened");
                self.view = Some(view);
            }
            Err(e) => {
                if let Err(rejected) = self.wizard.report_camera_error(&e) {
                    warn!(error = %e, rejected = %rejected, "Camera failure outside a capture step");
                }
            }
        }
    }
}
