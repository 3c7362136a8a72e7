//! Capture wizard state machine
//!
//! SELECT_OUTLET →(advance) PSEUDO_CAPTURE →(advance) FRIDGE_CAPTURE
//! →(keep_preview) CONFIRMATION →(submit) SUBMITTING → SUCCESS | ERROR
//!
//! Capture steps route camera failures to ERROR. `reset` returns to
//! SELECT_OUTLET from anywhere. The wizard performs no I/O; submission is
//! split into [`Wizard::begin_submission`] and [`Wizard::finish_submission`]
//! so the owner decides where the network call runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dpu_common::events::{EventBus, PhotoKind, WizardEvent};
use dpu_common::WizardStep;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::WizardError;
use super::messages::SOFT_FAILURE_MESSAGE;
use crate::camera::CameraError;
use crate::outlets::OutletCatalogue;
use crate::photo::EncodedImage;
use crate::submitter::{ReportRequest, SubmissionResult, SubmitError};

/// Record of one step change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTransition {
    pub session_id: Uuid,
    pub old_step: WizardStep,
    pub new_step: WizardStep,
    pub transitioned_at: DateTime<Utc>,
}

/// In-memory state of one capture cycle
pub struct Wizard {
    session_id: Uuid,
    catalogue: Arc<OutletCatalogue>,
    step: WizardStep,
    outlet_code: Option<String>,
    pseudo_images: Vec<EncodedImage>,
    fridge_image: Option<EncodedImage>,
    pending_preview: Option<EncodedImage>,
    last_error: Option<String>,
    last_transition: Option<StepTransition>,
    event_bus: Option<EventBus>,
}

impl Wizard {
    pub fn new(catalogue: Arc<OutletCatalogue>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            catalogue,
            step: WizardStep::SelectOutlet,
            outlet_code: None,
            pseudo_images: Vec::new(),
            fridge_image: None,
            pending_preview: None,
            last_error: None,
            last_transition: None,
            event_bus: None,
        }
    }

    /// Broadcast step changes and outcomes on `bus`
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn catalogue(&self) -> &OutletCatalogue {
        &self.catalogue
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn outlet_code(&self) -> Option<&str> {
        self.outlet_code.as_deref()
    }

    pub fn pseudo_images(&self) -> &[EncodedImage] {
        &self.pseudo_images
    }

    pub fn fridge_image(&self) -> Option<&EncodedImage> {
        self.fridge_image.as_ref()
    }

    pub fn pending_preview(&self) -> Option<&EncodedImage> {
        self.pending_preview.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_transition(&self) -> Option<&StepTransition> {
        self.last_transition.as_ref()
    }

    /// Whether [`Wizard::advance`] would be accepted right now
    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::SelectOutlet => self.outlet_code.is_some(),
            WizardStep::PseudoCapture => !self.pseudo_images.is_empty(),
            _ => false,
        }
    }

    /// Pick the outlet; only while on the outlet picker
    pub fn select_outlet(&mut self, code: &str) -> Result<(), WizardError> {
        self.require_step("select_outlet", &[WizardStep::SelectOutlet])?;

        let code = code.trim();
        if !self.catalogue.contains(code) {
            warn!(session_id = %self.session_id, code = %code, "Rejected unknown outlet code");
            return Err(WizardError::UnknownOutlet(code.to_string()));
        }

        self.outlet_code = Some(code.to_string());
        info!(session_id = %self.session_id, outlet_code = %code, "Outlet selected");
        Ok(())
    }

    pub fn advance(&mut self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::SelectOutlet => {
                if self.outlet_code.is_none() {
                    return Err(WizardError::OutletNotSelected);
                }
                self.transition_to(WizardStep::PseudoCapture);
                Ok(())
            }
            WizardStep::PseudoCapture => {
                if self.pseudo_images.is_empty() {
                    return Err(WizardError::NoPseudoImages);
                }
                self.transition_to(WizardStep::FridgeCapture);
                Ok(())
            }
            step => Err(WizardError::NotAllowed {
                action: "advance",
                step,
            }),
        }
    }

    /// Hold a freshly captured frame for the keep/retake decision
    ///
    /// A newer capture replaces an undecided one.
    pub fn on_frame_captured(&mut self, image: EncodedImage) -> Result<(), WizardError> {
        self.require_step(
            "capture",
            &[WizardStep::PseudoCapture, WizardStep::FridgeCapture],
        )?;

        debug!(session_id = %self.session_id, step = %self.step, "Frame captured for preview");
        self.pending_preview = Some(image);
        Ok(())
    }

    /// Accept the pending preview
    ///
    /// Pseudo photos accumulate in place; the fridge photo moves the wizard
    /// on to confirmation.
    pub fn keep_preview(&mut self) -> Result<(), WizardError> {
        self.require_step(
            "keep_preview",
            &[WizardStep::PseudoCapture, WizardStep::FridgeCapture],
        )?;
        let image = self
            .pending_preview
            .take()
            .ok_or(WizardError::NoPendingPreview)?;

        if self.step == WizardStep::PseudoCapture {
            self.pseudo_images.push(image);
            info!(
                session_id = %self.session_id,
                count = self.pseudo_images.len(),
                "Pseudo record photo kept"
            );
            self.emit_photo_kept(PhotoKind::Pseudo, self.pseudo_images.len());
        } else {
            self.fridge_image = Some(image);
            info!(session_id = %self.session_id, "Fridge record photo kept");
            self.emit_photo_kept(PhotoKind::Fridge, 1);
            self.transition_to(WizardStep::Confirmation);
        }
        Ok(())
    }

    /// Discard the pending preview, if any
    pub fn retake_preview(&mut self) {
        if self.pending_preview.take().is_some() {
            debug!(session_id = %self.session_id, "Preview discarded");
        }
    }

    /// Remove a kept pseudo photo
    ///
    /// Out-of-range indices are ignored. Past the pseudo step the last photo
    /// stays, so a report can always reach submission.
    pub fn remove_pseudo_image(&mut self, index: usize) -> Result<(), WizardError> {
        if !self.step.is_pre_confirmation() {
            return Err(WizardError::NotAllowed {
                action: "remove_pseudo_image",
                step: self.step,
            });
        }

        if index >= self.pseudo_images.len() {
            warn!(
                session_id = %self.session_id,
                index,
                count = self.pseudo_images.len(),
                "Ignoring removal of nonexistent pseudo photo"
            );
            return Ok(());
        }

        if self.step != WizardStep::PseudoCapture && self.pseudo_images.len() == 1 {
            warn!(
                session_id = %self.session_id,
                step = %self.step,
                "Refusing to remove the only pseudo photo"
            );
            return Err(WizardError::LastPseudoImage);
        }

        self.pseudo_images.remove(index);
        info!(
            session_id = %self.session_id,
            index,
            remaining = self.pseudo_images.len(),
            "Pseudo record photo removed"
        );
        Ok(())
    }

    /// Move to SUBMITTING and hand out the report to send
    pub fn begin_submission(&mut self) -> Result<ReportRequest, WizardError> {
        self.require_step("submit", &[WizardStep::Confirmation])?;

        let outlet_code = self
            .outlet_code
            .clone()
            .ok_or(WizardError::OutletNotSelected)?;
        if self.pseudo_images.is_empty() {
            return Err(WizardError::NoPseudoImages);
        }
        let fridge_image = self
            .fridge_image
            .clone()
            .ok_or(WizardError::NoFridgeImage)?;

        let request = ReportRequest {
            outlet_code,
            pseudo_images: self.pseudo_images.clone(),
            fridge_image: Some(fridge_image),
        };
        self.transition_to(WizardStep::Submitting);
        Ok(request)
    }

    /// Apply the outcome of the submission started by `begin_submission`
    ///
    /// `session_id` must be the id the wizard had when the submission began;
    /// outcomes that outlive a reset are rejected.
    pub fn finish_submission(
        &mut self,
        session_id: Uuid,
        outcome: Result<SubmissionResult, SubmitError>,
    ) -> Result<(), WizardError> {
        if session_id != self.session_id {
            warn!(
                stale_session = %session_id,
                session_id = %self.session_id,
                "Discarding submission outcome from an earlier session"
            );
            return Err(WizardError::StaleSubmission);
        }
        self.require_step("finish_submission", &[WizardStep::Submitting])?;

        match outcome {
            Ok(result) if result.success => {
                let outlet_code = self.outlet_code.clone().unwrap_or_default();
                info!(
                    session_id = %self.session_id,
                    outlet_code = %outlet_code,
                    "Report submitted"
                );
                self.emit(WizardEvent::SubmissionCompleted {
                    session_id: self.session_id,
                    outlet_code,
                    pseudo_count: self.pseudo_images.len(),
                    timestamp: Utc::now(),
                });
                self.transition_to(WizardStep::Success);
            }
            Ok(result) => {
                warn!(
                    session_id = %self.session_id,
                    message = result.message.as_deref().unwrap_or("Unknown error from backend"),
                    "Backend reported submission failure"
                );
                self.fail_submission(SOFT_FAILURE_MESSAGE.to_string());
            }
            Err(e) => {
                if let SubmitError::Network(detail) = &e {
                    warn!(session_id = %self.session_id, detail = %detail, "Submission transport failure");
                }
                self.fail_submission(e.to_string());
            }
        }
        Ok(())
    }

    /// Route a camera failure to the error step
    pub fn report_camera_error(&mut self, error: &CameraError) -> Result<(), WizardError> {
        self.require_step(
            "report_camera_error",
            &[WizardStep::PseudoCapture, WizardStep::FridgeCapture],
        )?;

        let message = error.to_string();
        self.emit(WizardEvent::CameraFailed {
            session_id: self.session_id,
            message: message.clone(),
            timestamp: Utc::now(),
        });
        self.last_error = Some(message);
        self.transition_to(WizardStep::Error);
        Ok(())
    }

    /// Clear everything and start a new cycle
    pub fn reset(&mut self) {
        self.outlet_code = None;
        self.pseudo_images.clear();
        self.fridge_image = None;
        self.pending_preview = None;
        self.last_error = None;
        self.transition_to(WizardStep::SelectOutlet);
        self.session_id = Uuid::new_v4();
        info!(session_id = %self.session_id, "Wizard reset");
    }

    fn fail_submission(&mut self, message: String) {
        self.emit(WizardEvent::SubmissionFailed {
            session_id: self.session_id,
            message: message.clone(),
            timestamp: Utc::now(),
        });
        self.last_error = Some(message);
        self.transition_to(WizardStep::Error);
    }

    fn require_step(
        &self,
        action: &'static str,
        allowed: &[WizardStep],
    ) -> Result<(), WizardError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(WizardError::NotAllowed {
                action,
                step: self.step,
            })
        }
    }

    /// Single entry point for step changes; drops any pending preview
    fn transition_to(&mut self, new_step: WizardStep) {
        let transition = StepTransition {
            session_id: self.session_id,
            old_step: self.step,
            new_step,
            transitioned_at: Utc::now(),
        };
        self.step = new_step;
        self.pending_preview = None;

        info!(
            session_id = %self.session_id,
            old_step = %transition.old_step,
            new_step = %transition.new_step,
            "Wizard step changed"
        );
        self.emit(WizardEvent::StepChanged {
            session_id: transition.session_id,
            old_step: transition.old_step,
            new_step: transition.new_step,
            timestamp: transition.transitioned_at,
        });

        self.last_transition = Some(transition);
    }

    fn emit_photo_kept(&self, kind: PhotoKind, count: usize) {
        self.emit(WizardEvent::PhotoKept {
            session_id: self.session_id,
            kind,
            count,
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, event: WizardEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}
