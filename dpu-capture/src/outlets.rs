//! Outlet catalogue
//!
//! The fixed set of outlet codes a user may pick from.

use dpu_common::config::{default_outlet_codes, CaptureConfig};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutletCatalogue {
    codes: Vec<String>,
}

impl OutletCatalogue {
    /// Codes are trimmed; blanks and duplicates are dropped, order kept.
    /// An empty result falls back to the default catalogue.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim();
            if !code.is_empty() && !unique.iter().any(|c| c == code) {
                unique.push(code.to_string());
            }
        }

        if unique.is_empty() {
            tracing::warn!("Outlet catalogue is empty, using defaults");
            unique = default_outlet_codes();
        }

        Self { codes: unique }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(&config.outlet_codes)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for OutletCatalogue {
    fn default() -> Self {
        Self::new(default_outlet_codes())
    }
}
