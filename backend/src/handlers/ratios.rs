//! HTTP handlers for feed ratios and the feed-cost calculator

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{FeedCostBreakdown, FeedInputs, Ingredient};

use crate::error::AppResult;
use crate::middleware::Gate;
use crate::services::{RatioService, RatioSettings};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveRatiosRequest {
    pub percentages: BTreeMap<Ingredient, i64>,
}

pub async fn get_ratios(State(state): State<AppState>) -> AppResult<Json<RatioSettings>> {
    let service = RatioService::new(state.settings.clone());
    Ok(Json(service.load().await?))
}

pub async fn save_ratios(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Json(body): Json<SaveRatiosRequest>,
) -> AppResult<Json<RatioSettings>> {
    let service = RatioService::new(state.settings.clone());
    Ok(Json(service.save(&gate, body.percentages).await?))
}

pub async fn reset_ratios(
    State(state): State<AppState>,
    Gate(gate): Gate,
) -> AppResult<Json<RatioSettings>> {
    let service = RatioService::new(state.settings.clone());
    Ok(Json(service.reset(&gate).await?))
}

/// Feed cost per egg and per tray with the current ratios
pub async fn calculate_feed(
    State(state): State<AppState>,
    Json(inputs): Json<FeedInputs>,
) -> AppResult<Json<FeedCostBreakdown>> {
    let service = RatioService::new(state.settings.clone());
    Ok(Json(service.calculate(&inputs).await?))
}
