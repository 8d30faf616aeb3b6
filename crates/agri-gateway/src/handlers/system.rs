//! Banner and health.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Agricultural ML API",
        "version": agri_core::version(),
        "endpoints": {
            "/predict-crop": "POST - Crop recommendation",
            "/predict-fertilizer": "POST - Fertilizer recommendation",
            "/predict-disease": "POST - Disease detection",
            "/predict-yield": "POST - Yield prediction",
            "/health": "GET - Health check"
        }
    }))
}

/// Always 200; availability is reported per capability.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "models": state.registry.capability_status(),
    }))
}
