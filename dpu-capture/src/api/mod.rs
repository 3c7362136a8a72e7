//! HTTP API handlers for dpu-capture

pub mod health;
pub mod sse;
pub mod wizard;

pub use health::health_routes;
pub use sse::wizard_event_stream;
pub use wizard::wizard_routes;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
