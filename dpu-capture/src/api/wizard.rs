//! Wizard API handlers
//!
//! Every mutating route answers with the full [`WizardSnapshot`] so the
//! presentation layer can redraw from a single response.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use dpu_common::WizardStep;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiResult;
use crate::kiosk::{KioskSession, WizardSnapshot};
use crate::AppState;

/// GET /outlets response
#[derive(Debug, Serialize)]
pub struct OutletsResponse {
    pub codes: Vec<String>,
}

/// POST /wizard/outlet request
#[derive(Debug, Deserialize)]
pub struct SelectOutletRequest {
    pub code: String,
}

/// GET /outlets
pub async fn list_outlets(State(state): State<AppState>) -> Json<OutletsResponse> {
    Json(OutletsResponse {
        codes: state.catalogue.codes().to_vec(),
    })
}

/// GET /wizard
pub async fn get_wizard(State(state): State<AppState>) -> Json<WizardSnapshot> {
    let kiosk = state.kiosk.lock().await;
    Json(kiosk.snapshot())
}

/// POST /wizard/outlet
pub async fn select_outlet(
    State(state): State<AppState>,
    Json(request): Json<SelectOutletRequest>,
) -> ApiResult<Json<WizardSnapshot>> {
    let mut kiosk = state.kiosk.lock().await;
    kiosk.select_outlet(&request.code)?;
    Ok(Json(kiosk.snapshot()))
}

/// POST /wizard/advance
pub async fn advance(State(state): State<AppState>) -> ApiResult<Json<WizardSnapshot>> {
    let mut kiosk = state.kiosk.lock().await;
    kiosk.advance().await?;
    record_error(&state, wizard_error(&kiosk)).await;
    Ok(Json(kiosk.snapshot()))
}

/// POST /wizard/capture
pub async fn capture(State(state): State<AppState>) -> ApiResult<Json<WizardSnapshot>> {
    let mut kiosk = state.kiosk.lock().await;
    kiosk.capture().await?;
    record_error(&state, wizard_error(&kiosk)).await;
    Ok(Json(kiosk.snapshot()))
}

/// POST /wizard/preview/keep
pub async fn keep_preview(State(state): State<AppState>) -> ApiResult<Json<WizardSnapshot>> {
    let mut kiosk = state.kiosk.lock().await;
    kiosk.keep_preview().await?;
    Ok(Json(kiosk.snapshot()))
}

/// POST /wizard/preview/retake
pub async fn retake_preview(State(state): State<AppState>) -> Json<WizardSnapshot> {
    let mut kiosk = state.kiosk.lock().await;
    kiosk.retake_preview();
    Json(kiosk.snapshot())
}

/// DELETE /wizard/pseudo/:index
pub async fn remove_pseudo_image(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<WizardSnapshot>> {
    let mut kiosk = state.kiosk.lock().await;
    kiosk.remove_pseudo_image(index)?;
    Ok(Json(kiosk.snapshot()))
}

/// POST /wizard/submit
///
/// The kiosk lock is released while the report is in flight; status polls
/// observe SUBMITTING until the outcome is applied.
pub async fn submit(State(state): State<AppState>) -> ApiResult<Json<WizardSnapshot>> {
    let (session_id, request) = {
        let mut kiosk = state.kiosk.lock().await;
        kiosk.begin_submission()?
    };

    info!(
        session_id = %session_id,
        outlet_code = %request.outlet_code,
        pseudo_count = request.pseudo_images.len(),
        "Submitting report"
    );

    let outcome = state.submitter.submit(&request).await;

    let mut kiosk = state.kiosk.lock().await;
    kiosk.finish_submission(session_id, outcome)?;
    record_error(&state, wizard_error(&kiosk)).await;
    Ok(Json(kiosk.snapshot()))
}

/// POST /wizard/reset
pub async fn reset(State(state): State<AppState>) -> Json<WizardSnapshot> {
    let mut kiosk = state.kiosk.lock().await;
    kiosk.reset();
    Json(kiosk.snapshot())
}

/// Message to surface on `/health` when the wizard sits on ERROR
fn wizard_error(kiosk: &KioskSession) -> Option<String> {
    let wizard = kiosk.wizard();
    if wizard.step() == WizardStep::Error {
        wizard.last_error().map(str::to_string)
    } else {
        None
    }
}

/// Keep the health endpoint's diagnostic in sync with the wizard
async fn record_error(state: &AppState, message: Option<String>) {
    if let Some(message) = message {
        *state.last_error.write().await = Some(message);
    }
}

/// Build wizard routes
pub fn wizard_routes() -> Router<AppState> {
    Router::new()
        .route("/outlets", get(list_outlets))
        .route("/wizard", get(get_wizard))
        .route("/wizard/outlet", post(select_outlet))
        .route("/wizard/advance", post(advance))
        .route("/wizard/capture", post(capture))
        .route("/wizard/preview/keep", post(keep_preview))
        .route("/wizard/preview/retake", post(retake_preview))
        .route("/wizard/pseudo/:index", delete(remove_pseudo_image))
        .route("/wizard/submit", post(submit))
        .route("/wizard/reset", post(reset))
}
