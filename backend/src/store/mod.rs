//! External collaborators: identity, the row store and settings
//!
//! The ledger core talks to persistence and identity only through these
//! traits. [`PgStore`] backs them with PostgreSQL; [`MemoryStore`] keeps
//! everything in process for demo runs and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{Entry, Item, LedgerTarget, NewEntry, NewSubcategory, Session, Subcategory};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryStore, StoreOp};
pub use postgres::PgStore;

/// A provisioned login
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Token handed back after a successful sign-in
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: Uuid,
}

/// Fired whenever a session starts or ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: Uuid },
    SignedOut { user_id: Uuid },
}

/// Identity and session provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current session for a token, `None` when absent, invalid or expired
    async fn get_session(&self, token: &str) -> AppResult<Option<Session>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<SignedIn>;

    /// End the session behind `token`. Unknown tokens are ignored.
    async fn sign_out(&self, token: &str) -> AppResult<()>;

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Row store for items, subcategories, entries and the admin allow-list
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_item_by_name(&self, name: &str) -> AppResult<Option<Item>>;

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>>;

    async fn list_items(&self) -> AppResult<Vec<Item>>;

    async fn get_subcategory(&self, id: Uuid) -> AppResult<Option<Subcategory>>;

    /// Subcategories under an item, oldest first
    async fn list_subcategories(&self, item_id: Uuid) -> AppResult<Vec<Subcategory>>;

    async fn insert_subcategory(&self, new: NewSubcategory) -> AppResult<Subcategory>;

    /// Remove the subcategory row only. Returns whether a row was removed.
    async fn delete_subcategory(&self, id: Uuid) -> AppResult<bool>;

    /// Entries of one ledger, ordered by `created_at` ascending
    async fn list_entries(&self, target: LedgerTarget) -> AppResult<Vec<Entry>>;

    /// Every entry across all ledgers, ordered by `created_at` ascending
    async fn list_all_entries(&self) -> AppResult<Vec<Entry>>;

    async fn find_entry_by_idempotency_key(
        &self,
        target: LedgerTarget,
        key: Uuid,
    ) -> AppResult<Option<Entry>>;

    async fn insert_entry(&self, new: NewEntry) -> AppResult<Entry>;

    /// Set the stock snapshot of an item or subcategory
    async fn update_stock(&self, target: LedgerTarget, stock: i64) -> AppResult<()>;

    /// Remove every entry of one ledger, returning how many were removed
    async fn delete_entries(&self, target: LedgerTarget) -> AppResult<u64>;

    async fn is_admin(&self, user_id: Uuid) -> AppResult<bool>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> AppResult<()>;
}

/// Accounts and live sessions
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    async fn insert_session(&self, session: &Session) -> AppResult<()>;

    async fn find_session(&self, id: Uuid) -> AppResult<Option<Session>>;

    async fn delete_session(&self, id: Uuid) -> AppResult<()>;
}

/// Small JSON documents persisted under fixed keys
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_setting(&self, key: &str) -> AppResult<Option<serde_json::Value>>;

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> AppResult<()>;

    async fn delete_setting(&self, key: &str) -> AppResult<()>;
}
