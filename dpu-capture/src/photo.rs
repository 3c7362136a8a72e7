//! Encoded photo payload
//!
//! Captured frames travel through the wizard as base64 JPEG data URLs
//! (`data:image/jpeg;base64,...`). The submitter strips the prefix before
//! putting the payload on the wire.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// MIME type of every captured photo
pub const JPEG_MIME: &str = "image/jpeg";

/// Base64 image carried as a data URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage {
    data_url: String,
}

impl EncodedImage {
    /// Wrap compressed JPEG bytes
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self {
            data_url: format!("data:{};base64,{}", JPEG_MIME, STANDARD.encode(bytes)),
        }
    }

    /// Wrap an existing data URL (or bare base64 string) without validation
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }

    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    /// MIME type from the data URL header, if there is one
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.data_url.strip_prefix("data:")?;
        let (header, _) = header.split_once(',')?;
        Some(header.split(';').next().unwrap_or(header))
    }

    /// Raw base64 payload with any `data:...,` prefix removed
    pub fn base64_payload(&self) -> &str {
        match self.data_url.split_once(',') {
            Some((_, payload)) => payload,
            None => &self.data_url,
        }
    }

    /// Decoded image bytes
    pub fn decode_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.base64_payload())
    }
}
