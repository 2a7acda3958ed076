//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::{BearerToken, Gate};
use crate::services::{Capabilities, GateState};
use crate::store::SignedIn;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub state: GateState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub capabilities: Capabilities,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<SignedIn>> {
    body.validate()?;
    let signed_in = state
        .identity
        .sign_in_with_password(&body.email, &body.password)
        .await?;
    Ok(Json(signed_in))
}

/// Logout endpoint handler. Succeeds for unknown or missing tokens.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> AppResult<StatusCode> {
    if let Some(token) = token {
        state.identity.sign_out(&token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Current session and what it may do
pub async fn current_session(Gate(gate): Gate) -> Json<SessionResponse> {
    let session = gate.session();
    Json(SessionResponse {
        state: gate.state(),
        user_id: session.map(|s| s.user_id),
        email: session.map(|s| s.email.clone()),
        capabilities: Capabilities::for_gate(&gate),
    })
}
