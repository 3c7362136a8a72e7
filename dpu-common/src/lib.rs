//! # DPU Common Library
//!
//! Shared code for the Daily Photo Upload capture service:
//! - Common error type
//! - Configuration loading (TOML + environment)
//! - Wizard step definition
//! - Wizard events and the broadcast bus

pub mod config;
pub mod error;
pub mod events;
pub mod step;

pub use error::{Error, Result};
pub use step::WizardStep;
