//! Request authentication
//!
//! Every request resolves its own [`AdminGate`] from the bearer token before
//! the handler runs. Anonymous callers are allowed through with an
//! unauthorized gate; handlers that mutate check the gate themselves.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::services::AdminGate;
use crate::AppState;

/// Bearer token from the Authorization header, if any
#[derive(Clone, Debug)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    fn from_parts(parts: &Parts) -> Self {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self(token)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// Admin gate resolved for the current request
#[derive(Clone, Debug)]
pub struct Gate(pub AdminGate);

#[axum::async_trait]
impl FromRequestParts<AppState> for Gate {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_parts(parts);
        let mut gate = AdminGate::new();
        gate.resolve(
            state.identity.as_ref(),
            state.ledger.as_ref(),
            token.as_deref(),
        )
        .await;
        Ok(Gate(gate))
    }
}
