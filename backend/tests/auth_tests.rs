//! Password sign-in, session lookup and sign-out

mod common;

use common::{Harness, ADMIN_EMAIL, PASSWORD};
use farm_inventory_backend::{
    error::AppError,
    services::AuthService,
    store::{IdentityProvider, SessionEvent},
    Config,
};
use proptest::prelude::*;

#[tokio::test]
async fn test_sign_in_issues_session() {
    let h = Harness::new().await;
    let signed_in = h
        .state
        .identity
        .sign_in_with_password(ADMIN_EMAIL, PASSWORD)
        .await
        .unwrap();
    assert_eq!(signed_in.token_type, "Bearer");

    let session = h
        .state
        .identity
        .get_session(&signed_in.access_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.user_id, signed_in.user_id);
    assert_eq!(session.email, ADMIN_EMAIL);
}

#[tokio::test]
async fn test_email_match_ignores_case() {
    let h = Harness::new().await;
    let result = h
        .state
        .identity
        .sign_in_with_password(" ADMIN@farm.test ", PASSWORD)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_bad_credentials_rejected() {
    let h = Harness::new().await;

    let wrong_password = h
        .state
        .identity
        .sign_in_with_password(ADMIN_EMAIL, "wrong")
        .await
        .unwrap_err();
    assert!(matches!(wrong_password, AppError::InvalidCredentials));

    let unknown = h
        .state
        .identity
        .sign_in_with_password("nobody@farm.test", PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(unknown, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_sign_out_ends_session_and_is_idempotent() {
    let h = Harness::new().await;
    let token = h.token(ADMIN_EMAIL).await;

    h.state.identity.sign_out(&token).await.unwrap();
    assert!(h.state.identity.get_session(&token).await.unwrap().is_none());

    h.state.identity.sign_out(&token).await.unwrap();
    h.state.identity.sign_out("garbage").await.unwrap();
}

#[tokio::test]
async fn test_session_events_are_broadcast() {
    let h = Harness::new().await;
    let mut events = h.state.identity.subscribe();

    let signed_in = h
        .state
        .identity
        .sign_in_with_password(ADMIN_EMAIL, PASSWORD)
        .await
        .unwrap();
    h.state.identity.sign_out(&signed_in.access_token).await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::SignedIn {
            user_id: signed_in.user_id
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::SignedOut {
            user_id: signed_in.user_id
        }
    );
}

#[tokio::test]
async fn test_token_from_other_secret_is_ignored() {
    let h = Harness::new().await;
    let token = h.token(ADMIN_EMAIL).await;

    let mut config = Config::default();
    config.jwt.secret = "another-secret".to_string();
    let other = AuthService::new(h.store.clone(), &config);

    assert!(other.get_session(&token).await.unwrap().is_none());
    assert!(matches!(other.validate_token(&token), Err(AppError::InvalidToken)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Arbitrary strings never resolve to a session
    #[test]
    fn prop_arbitrary_tokens_have_no_session(token in "[A-Za-z0-9._-]{0,64}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let session = rt.block_on(async {
            let h = Harness::new().await;
            h.state.identity.get_session(&token).await
        });
        prop_assert!(matches!(session, Ok(None)));
    }
}
