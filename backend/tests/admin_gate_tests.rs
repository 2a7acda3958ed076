//! Admin gate resolution and capability projection

mod common;

use async_trait::async_trait;
use common::{Harness, ADMIN_EMAIL, USER_EMAIL};
use farm_inventory_backend::{
    error::{AppError, AppResult},
    services::{AdminGate, Capabilities, GateState, Notice, VIEW_ONLY_NOTICE},
    store::{IdentityProvider, SessionEvent, SignedIn, StoreOp},
    Config,
};
use shared::Session;
use tokio::sync::broadcast;

/// Identity provider whose every call fails
struct UnreachableIdentity {
    events: broadcast::Sender<SessionEvent>,
}

impl UnreachableIdentity {
    fn new() -> Self {
        let (events, _) = broadcast::channel(1);
        Self { events }
    }
}

#[async_trait]
impl IdentityProvider for UnreachableIdentity {
    async fn get_session(&self, _token: &str) -> AppResult<Option<Session>> {
        Err(AppError::Storage("identity provider unreachable".to_string()))
    }

    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> AppResult<SignedIn> {
        Err(AppError::Storage("identity provider unreachable".to_string()))
    }

    async fn sign_out(&self, _token: &str) -> AppResult<()> {
        Err(AppError::Storage("identity provider unreachable".to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[tokio::test]
async fn test_gate_starts_unresolved() {
    let gate = AdminGate::new();
    assert_eq!(gate.state(), GateState::Unresolved);
    assert!(gate.require_authorized().is_err());
}

#[tokio::test]
async fn test_no_token_is_unauthorized() {
    let h = Harness::new().await;
    let gate = h.gate(None).await;
    assert_eq!(gate.state(), GateState::Unauthorized);
    assert!(gate.session().is_none());
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let h = Harness::new().await;
    let gate = h.gate(Some("not-a-jwt")).await;
    assert_eq!(gate.state(), GateState::Unauthorized);
}

#[tokio::test]
async fn test_signed_in_non_admin_is_unauthorized() {
    let h = Harness::new().await;
    let token = h.token(USER_EMAIL).await;
    let gate = h.gate(Some(&token)).await;

    assert_eq!(gate.state(), GateState::Unauthorized);
    assert_eq!(gate.session().map(|s| s.email.as_str()), Some(USER_EMAIL));
    assert!(matches!(
        gate.require_authorized(),
        Err(AppError::InsufficientPermissions)
    ));
}

#[tokio::test]
async fn test_admin_is_authorized() {
    let h = Harness::new().await;
    let gate = h.admin_gate().await;
    assert_eq!(gate.state(), GateState::Authorized);
    assert!(gate.require_authorized().is_ok());
}

#[tokio::test]
async fn test_admin_lookup_failure_fails_closed() {
    let h = Harness::new().await;
    let token = h.token(ADMIN_EMAIL).await;
    h.fail_on(StoreOp::IsAdmin).await;

    let gate = h.gate(Some(&token)).await;
    assert_eq!(gate.state(), GateState::Unauthorized);
}

#[tokio::test]
async fn test_session_lookup_failure_fails_closed() {
    let h = Harness::new().await;
    let identity = UnreachableIdentity::new();

    let mut gate = AdminGate::new();
    let state = gate
        .resolve(&identity, h.state.ledger.as_ref(), Some("any-token"))
        .await;
    assert_eq!(state, GateState::Unauthorized);
}

#[tokio::test]
async fn test_expired_session_is_unauthorized() {
    let mut config = Config::default();
    config.jwt.session_expiry = -5;
    let h = Harness::with_config(config).await;

    let token = h.token(ADMIN_EMAIL).await;
    let gate = h.gate(Some(&token)).await;
    assert_eq!(gate.state(), GateState::Unauthorized);
}

#[tokio::test]
async fn test_resolution_is_read_once() {
    let h = Harness::new().await;
    let token = h.token(ADMIN_EMAIL).await;
    let mut gate = h.gate(Some(&token)).await;
    assert_eq!(gate.state(), GateState::Authorized);

    // A later lookup failure does not change an already resolved gate
    h.fail_on(StoreOp::IsAdmin).await;
    let again = gate
        .resolve(
            h.state.identity.as_ref(),
            h.state.ledger.as_ref(),
            Some(&token),
        )
        .await;
    assert_eq!(again, GateState::Authorized);

    // Nor does a different token
    let mut anonymous = h.gate(None).await;
    let again = anonymous
        .resolve(
            h.state.identity.as_ref(),
            h.state.ledger.as_ref(),
            Some(&token),
        )
        .await;
    assert_eq!(again, GateState::Unauthorized);
}

#[tokio::test]
async fn test_capabilities_for_authorized_gate() {
    let h = Harness::new().await;
    let caps = Capabilities::for_gate(&h.admin_gate().await);
    assert!(caps.can_add_entry);
    assert!(caps.can_manage_subcategories);
    assert!(caps.notices.is_empty());
}

#[tokio::test]
async fn test_view_only_notice_attached_once() {
    let h = Harness::new().await;
    let gate = h.anonymous_gate().await;

    let mut caps = Capabilities::default();
    caps.apply_gate(&gate);
    caps.apply_gate(&gate);

    assert!(!caps.can_add_entry);
    assert!(!caps.can_manage_subcategories);
    assert_eq!(caps.notices, vec![Notice::ViewOnly]);
    assert_eq!(caps.notices[0].text(), VIEW_ONLY_NOTICE);
}
