//! Rejected wizard operations
//!
//! A rejection leaves the wizard untouched; it is the equivalent of a
//! disabled button, not a failure of the session.

use dpu_common::WizardStep;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("'{action}' is not available in step {step}")]
    NotAllowed {
        action: &'static str,
        step: WizardStep,
    },

    #[error("Unknown outlet code: {0}")]
    UnknownOutlet(String),

    #[error("Select an outlet before continuing")]
    OutletNotSelected,

    #[error("Take at least one pseudo record photo before continuing")]
    NoPseudoImages,

    /// The report needs at least one pseudo photo once capture has moved on
    #[error("The last pseudo record photo can only be removed while taking pseudo photos")]
    LastPseudoImage,

    #[error("The fridge record photo is missing")]
    NoFridgeImage,

    #[error("No photo is waiting for review")]
    NoPendingPreview,

    /// Submission outcome arrived after the wizard was reset
    #[error("Submission result belongs to an earlier session")]
    StaleSubmission,
}
