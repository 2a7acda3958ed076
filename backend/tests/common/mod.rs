//! Shared fixtures for backend integration tests

#![allow(dead_code)]

use std::sync::Arc;

use farm_inventory_backend::{
    services::AdminGate,
    store::{IdentityProvider, LedgerStore, MemoryStore, StoreOp},
    AppState, Config,
};
use shared::{Item, DEFAULT_SUBCATEGORY_MINIMUM};

pub const ADMIN_EMAIL: &str = "admin@farm.test";
pub const USER_EMAIL: &str = "viewer@farm.test";
pub const PASSWORD: &str = "correct horse";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::seeded(DEFAULT_SUBCATEGORY_MINIMUM).await);

        // Minimum bcrypt cost keeps the suite fast
        let password_hash = bcrypt::hash(PASSWORD, 4).unwrap();
        let admin = store.add_account(ADMIN_EMAIL, &password_hash).await;
        store.grant_admin(admin.id).await;
        store.add_account(USER_EMAIL, &password_hash).await;

        let state = AppState::new(store.clone(), config).unwrap();
        Self { store, state }
    }

    pub async fn token(&self, email: &str) -> String {
        self.state
            .identity
            .sign_in_with_password(email, PASSWORD)
            .await
            .unwrap()
            .access_token
    }

    pub async fn gate(&self, token: Option<&str>) -> AdminGate {
        let mut gate = AdminGate::new();
        gate.resolve(
            self.state.identity.as_ref(),
            self.state.ledger.as_ref(),
            token,
        )
        .await;
        gate
    }

    pub async fn admin_gate(&self) -> AdminGate {
        let token = self.token(ADMIN_EMAIL).await;
        self.gate(Some(&token)).await
    }

    pub async fn anonymous_gate(&self) -> AdminGate {
        self.gate(None).await
    }

    pub async fn item(&self, name: &str) -> Item {
        self.state
            .ledger
            .get_item_by_name(name)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn fail_on(&self, op: StoreOp) {
        self.store.fail_on(op).await;
    }

    pub async fn recover(&self, op: StoreOp) {
        self.store.recover(op).await;
    }
}

pub fn form(opening: &str, received: &str, dispatched: &str, lost: &str) -> shared::EntryForm {
    shared::EntryForm {
        opening: opening.to_string(),
        received: received.to_string(),
        dispatched: dispatched.to_string(),
        lost: lost.to_string(),
        ..Default::default()
    }
}
