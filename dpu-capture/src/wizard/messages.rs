//! User-facing messages for the error step

use crate::submitter::NOT_CONFIGURED_MARKER;

/// Stored when the backend answered but reported failure
pub const SOFT_FAILURE_MESSAGE: &str =
    "Failed to submit the report. The server responded with an error.";

/// Remediation shown next to a not-configured error
pub const CONFIG_HELP: &str = "It looks like the reporting backend is not set up:\n\
     1. Deploy the reporting web app.\n\
     2. Copy its deployed URL.\n\
     3. Set `endpoint_url` in the capture service's config.toml, or export DPU_ENDPOINT_URL.\n\
     4. Restart the capture service.";

/// Remediation text when `message` describes a configuration problem
pub fn config_help(message: &str) -> Option<&'static str> {
    message.contains(NOT_CONFIGURED_MARKER).then_some(CONFIG_HELP)
}
