//! Dashboard handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::Gate;
use crate::services::{load_dashboard, Dashboard};
use crate::AppState;

pub async fn get_dashboard(
    State(state): State<AppState>,
    Gate(gate): Gate,
) -> AppResult<Json<Dashboard>> {
    let dashboard = load_dashboard(&state.ledger_service(), &gate).await?;
    Ok(Json(dashboard))
}
