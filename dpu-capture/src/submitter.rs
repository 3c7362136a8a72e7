//! Report submission
//!
//! One POST per report, no retries. The wire format is fixed by the reporting
//! web app:
//!
//! ```text
//! POST <endpoint>
//! Content-Type: text/plain;charset=utf-8
//!
//! {"outletCode": "...", "pseudoImages": ["<base64>", ...], "fridgeImage": "<base64>"|null}
//! ```
//!
//! The `text/plain` content type keeps the request "simple" for the hosting
//! platform; the body is still JSON.
//!
//! Outcomes:
//! - endpoint missing/placeholder → [`SubmitError::NotConfigured`], nothing sent
//! - non-2xx status, or a body without a truthy `success` → soft failure
//!   (`Ok(SubmissionResult { success: false, .. })`)
//! - transport failure or unreadable body → [`SubmitError::Network`]

use std::time::Duration;

use async_trait::async_trait;
use dpu_common::config::{is_configured_endpoint, CaptureConfig};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::photo::EncodedImage;

/// Content type expected by the reporting web app
pub const REPORT_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Substring identifying a not-configured failure in a stored error message
pub const NOT_CONFIGURED_MARKER: &str = "Backend is not configured";

/// Submission errors (hard failures)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// No usable endpoint; no request was attempted
    #[error("Backend is not configured. Please set the endpoint URL.")]
    NotConfigured,

    /// Transport failure; the detail is for logs, not for users
    #[error("Failed to send data to the server. Check your network connection and the endpoint URL.")]
    Network(String),
}

/// Application-level outcome of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmissionResult {
    pub fn succeeded(message: Option<String>) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failed(message: Option<String>) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// Everything the backend needs for one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub outlet_code: String,
    pub pseudo_images: Vec<EncodedImage>,
    pub fridge_image: Option<EncodedImage>,
}

/// JSON body as sent on the wire
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload<'a> {
    pub outlet_code: &'a str,
    pub pseudo_images: Vec<&'a str>,
    pub fridge_image: Option<&'a str>,
}

impl<'a> ReportPayload<'a> {
    /// Build the payload, stripping data-URL prefixes
    pub fn from_request(request: &'a ReportRequest) -> Self {
        Self {
            outlet_code: &request.outlet_code,
            pseudo_images: request
                .pseudo_images
                .iter()
                .map(EncodedImage::base64_payload)
                .collect(),
            fridge_image: request.fridge_image.as_ref().map(EncodedImage::base64_payload),
        }
    }
}

/// Sends a report to the backend
#[async_trait]
pub trait ReportSubmitter: Send + Sync {
    async fn submit(&self, request: &ReportRequest) -> Result<SubmissionResult, SubmitError>;
}

/// Submitter for the HTTP reporting web app
pub struct HttpReportSubmitter {
    http_client: Client,
    endpoint: Option<String>,
}

impl HttpReportSubmitter {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self, SubmitError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn from_config(config: &CaptureConfig) -> Result<Self, SubmitError> {
        Self::new(config.endpoint_url.clone(), config.request_timeout)
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint
            .as_deref()
            .map(is_configured_endpoint)
            .unwrap_or(false)
    }
}

#[async_trait]
impl ReportSubmitter for HttpReportSubmitter {
    async fn submit(&self, request: &ReportRequest) -> Result<SubmissionResult, SubmitError> {
        let endpoint = match self.endpoint.as_deref() {
            Some(url) if is_configured_endpoint(url) => url,
            _ => {
                error!("Report endpoint is not configured; set endpoint_url or DPU_ENDPOINT_URL");
                return Err(SubmitError::NotConfigured);
            }
        };

        let body = serde_json::to_string(&ReportPayload::from_request(request))
            .map_err(|e| SubmitError::Network(format!("Failed to encode report: {}", e)))?;

        info!(
            outlet_code = %request.outlet_code,
            pseudo_count = request.pseudo_images.len(),
            has_fridge_image = request.fridge_image.is_some(),
            "Submitting report"
        );
        debug!(endpoint = %endpoint, body_bytes = body.len(), "POST report");

        let response = self
            .http_client
            .post(endpoint)
            .header(CONTENT_TYPE, REPORT_CONTENT_TYPE)
            .header(CACHE_CONTROL, "no-cache")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Report request failed");
                SubmitError::Network(e.to_string())
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(status = %status, error = %e, "Failed to read report response");
            SubmitError::Network(e.to_string())
        })?;
        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let message = parsed
                .ok()
                .as_ref()
                .and_then(response_message)
                .or_else(|| Some(format!("HTTP {}", status)));
            warn!(status = %status, message = ?message, "Backend rejected report");
            return Ok(SubmissionResult::failed(message));
        }

        let value = parsed.map_err(|e| {
            error!(status = %status, error = %e, "Malformed report response");
            SubmitError::Network(format!("Malformed response: {}", e))
        })?;
        let message = response_message(&value);

        if !is_truthy(value.get("success")) {
            warn!(
                message = message.as_deref().unwrap_or("Unknown error from backend"),
                "Submission failed"
            );
            return Ok(SubmissionResult::failed(message));
        }

        info!(message = ?message, "Submission successful");
        Ok(SubmissionResult::succeeded(message))
    }
}

fn response_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Loose truthiness of the backend's `success` field
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
