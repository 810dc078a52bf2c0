use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pickup-points", get(get_pickup_points))
        .route("/tracking", get(missing_tracking_number))
        .route("/tracking/", get(missing_tracking_number))
        .route("/tracking/{tracking_number}", get(get_tracking))
}

/// GET /store/packeta/pickup-points
pub async fn get_pickup_points(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let pickup_points = state
        .fulfillment
        .get_pickup_points()
        .await
        .map_err(|e| AppError::upstream("Error fetching pickup points", e))?;

    Ok(Json(json!({ "pickup_points": pickup_points })))
}

/// GET /store/packeta/tracking/{tracking_number}
pub async fn get_tracking(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<Value>, AppError> {
    let tracking_number = tracking_number.trim();
    if tracking_number.is_empty() {
        return Err(missing_tracking_number().await);
    }

    let tracking = state
        .fulfillment
        .track_shipment(tracking_number)
        .await
        .map_err(|e| AppError::upstream("Error fetching tracking info", e))?;

    Ok(Json(json!({ "tracking": tracking })))
}

async fn missing_tracking_number() -> AppError {
    AppError::BadRequest("Tracking number is required".to_string())
}
