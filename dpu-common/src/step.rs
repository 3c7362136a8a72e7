//! Wizard step definition
//!
//! The capture wizard moves through seven steps:
//! SELECT_OUTLET → PSEUDO_CAPTURE → FRIDGE_CAPTURE → CONFIRMATION → SUBMITTING → SUCCESS | ERROR

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current step of the capture wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    /// Outlet code picker
    #[default]
    SelectOutlet,
    /// Capturing one or more pseudo record photos
    PseudoCapture,
    /// Capturing the single fridge record photo
    FridgeCapture,
    /// Reviewing the photos before submission
    Confirmation,
    /// Report submission in flight
    Submitting,
    /// Report accepted by the backend
    Success,
    /// Camera or submission failure
    Error,
}

impl WizardStep {
    /// Steps that keep a live camera view
    pub fn is_capture(&self) -> bool {
        matches!(self, WizardStep::PseudoCapture | WizardStep::FridgeCapture)
    }

    /// Steps that only leave through `reset`
    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStep::Success | WizardStep::Error)
    }

    /// Steps before the photos are locked in for review
    pub fn is_pre_confirmation(&self) -> bool {
        matches!(
            self,
            WizardStep::SelectOutlet | WizardStep::PseudoCapture | WizardStep::FridgeCapture
        )
    }

    /// Wire/log label
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::SelectOutlet => "SELECT_OUTLET",
            WizardStep::PseudoCapture => "PSEUDO_CAPTURE",
            WizardStep::FridgeCapture => "FRIDGE_CAPTURE",
            WizardStep::Confirmation => "CONFIRMATION",
            WizardStep::Submitting => "SUBMITTING",
            WizardStep::Success => "SUCCESS",
            WizardStep::Error => "ERROR",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
