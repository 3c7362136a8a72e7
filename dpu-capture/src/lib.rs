//! dpu-capture library interface
//!
//! Guided photo-capture wizard for outlet compliance reports: the wizard
//! state machine, the camera session it drives, the report submitter and
//! the HTTP surface the kiosk front end talks to.

pub mod api;
pub mod camera;
pub mod error;
pub mod kiosk;
pub mod outlets;
pub mod photo;
pub mod submitter;
pub mod wizard;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use dpu_common::events::EventBus;
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;

use crate::camera::{CameraPlatform, FrameEncoder};
use crate::kiosk::KioskSession;
use crate::outlets::OutletCatalogue;
use crate::submitter::ReportSubmitter;
use crate::wizard::Wizard;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The single wizard session this kiosk runs
    pub kiosk: Arc<Mutex<KioskSession>>,
    pub submitter: Arc<dyn ReportSubmitter>,
    pub catalogue: Arc<OutletCatalogue>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    pub backend_configured: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        catalogue: OutletCatalogue,
        camera: Arc<dyn CameraPlatform>,
        encoder: Arc<dyn FrameEncoder>,
        submitter: Arc<dyn ReportSubmitter>,
        event_bus: EventBus,
    ) -> Self {
        let catalogue = Arc::new(catalogue);
        let wizard = Wizard::new(Arc::clone(&catalogue)).with_event_bus(event_bus.clone());
        let kiosk = KioskSession::new(wizard, camera, encoder);

        Self {
            kiosk: Arc::new(Mutex::new(kiosk)),
            submitter,
            catalogue,
            event_bus,
            backend_configured: true,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Record whether the reporting endpoint is set, for health reporting
    pub fn with_backend_configured(mut self, configured: bool) -> Self {
        self.backend_configured = configured;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::wizard_routes())
        .route("/wizard/events", get(api::wizard_event_stream))
        .merge(api::health_routes())
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
