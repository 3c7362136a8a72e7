//! Capture wizard
//!
//! Step state machine plus the messages shown on its error step.

mod error;
mod messages;
mod state;

pub use error::WizardError;
pub use messages::{config_help, CONFIG_HELP, SOFT_FAILURE_MESSAGE};
pub use state::{StepTransition, Wizard};
