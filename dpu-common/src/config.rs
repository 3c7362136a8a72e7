//! Configuration loading and resolution
//!
//! Values are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Endpoint value shipped in templates; treated as "not configured"
pub const ENDPOINT_PLACEHOLDER: &str = "PASTE_YOUR_GOOGLE_APPS_SCRIPT_URL_HERE";

/// Default listen address of the capture service
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5740";

/// Default timeout for the report submission request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Outlet codes offered when none are configured
pub const DEFAULT_OUTLET_CODES: &[&str] = &[
    "OUT01", "OUT02", "OUT03", "OUT04", "OUT05", "OUT06", "OUT07", "OUT08", "OUT09", "OUT10",
];

pub const ENV_CONFIG_PATH: &str = "DPU_CONFIG";
pub const ENV_ENDPOINT_URL: &str = "DPU_ENDPOINT_URL";
pub const ENV_CAMERA_SOURCE: &str = "DPU_CAMERA_SOURCE";
pub const ENV_BIND_ADDRESS: &str = "DPU_BIND_ADDRESS";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// On-disk configuration file
///
/// Every field is optional so partial files deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Reporting web app URL
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Submission timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Allowed outlet codes
    #[serde(default)]
    pub outlet_codes: Option<Vec<String>>,
    /// Directory of still frames used as the camera
    #[serde(default)]
    pub camera_source: Option<PathBuf>,
    /// HTTP listen address
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub endpoint_url: Option<String>,
    pub camera_source: Option<PathBuf>,
    pub bind_address: Option<String>,
}

/// Fully resolved configuration for the capture service
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// `None` when no source provided an endpoint
    pub endpoint_url: Option<String>,
    pub request_timeout: Duration,
    pub outlet_codes: Vec<String>,
    pub camera_source: PathBuf,
    pub bind_address: String,
    pub log_level: String,
}

impl CaptureConfig {
    /// True when the endpoint is set and is not the template placeholder
    pub fn has_configured_endpoint(&self) -> bool {
        self.endpoint_url
            .as_deref()
            .map(is_configured_endpoint)
            .unwrap_or(false)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            outlet_codes: default_outlet_codes(),
            camera_source: default_camera_source(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            log_level: default_log_level(),
        }
    }
}

/// Endpoint is usable: non-blank and not the placeholder
pub fn is_configured_endpoint(url: &str) -> bool {
    let trimmed = url.trim();
    !trimmed.is_empty() && !trimmed.contains(ENDPOINT_PLACEHOLDER)
}

pub fn default_outlet_codes() -> Vec<String> {
    DEFAULT_OUTLET_CODES.iter().map(|c| c.to_string()).collect()
}

/// `<data_local_dir>/dpu/frames`, or `./frames` when the platform has none
pub fn default_camera_source() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("dpu").join("frames"))
        .unwrap_or_else(|| PathBuf::from("./frames"))
}

/// `<config_dir>/dpu/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dpu").join("config.toml"))
}

/// Load a TOML config file
///
/// A missing file is not an error: a warning is logged and defaults are used.
/// A file that exists but does not parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolves [`CaptureConfig`] from CLI, environment, TOML and defaults
pub struct ConfigResolver {
    overrides: CliOverrides,
    config_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(overrides: CliOverrides) -> Self {
        Self {
            overrides,
            config_path: None,
        }
    }

    /// Use an explicit TOML file instead of `DPU_CONFIG` / the platform default
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    fn toml_path(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(|| env_value(ENV_CONFIG_PATH).map(PathBuf::from))
            .or_else(default_config_path)
    }

    pub fn resolve(&self) -> Result<CaptureConfig> {
        let toml = match self.toml_path() {
            Some(path) => load_toml_config(&path)?,
            None => TomlConfig::default(),
        };

        let endpoint_url = self
            .overrides
            .endpoint_url
            .clone()
            .or_else(|| env_value(ENV_ENDPOINT_URL))
            .or(toml.endpoint_url);

        let camera_source = self
            .overrides
            .camera_source
            .clone()
            .or_else(|| env_value(ENV_CAMERA_SOURCE).map(PathBuf::from))
            .or(toml.camera_source)
            .unwrap_or_else(default_camera_source);

        let bind_address = self
            .overrides
            .bind_address
            .clone()
            .or_else(|| env_value(ENV_BIND_ADDRESS))
            .or(toml.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let outlet_codes = match toml.outlet_codes {
            Some(codes) if !codes.is_empty() => codes,
            _ => default_outlet_codes(),
        };

        let timeout_secs = toml
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let config = CaptureConfig {
            endpoint_url,
            request_timeout: Duration::from_secs(timeout_secs),
            outlet_codes,
            camera_source,
            bind_address,
            log_level: toml.logging.level,
        };

        if !config.has_configured_endpoint() {
            warn!(
                "Report endpoint is not configured; submissions will fail until {} or endpoint_url is set",
                ENV_ENDPOINT_URL
            );
        }
        debug!(?config, "Configuration resolved");

        Ok(config)
    }
}

/// Non-empty environment variable value
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
