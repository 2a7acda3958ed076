//! In-process store for demo runs and tests
//!
//! Holds every collection behind one `RwLock`. Individual operations can be
//! made to fail with [`MemoryStore::fail_on`], which is how the
//! partial-write paths of the entry workflow get exercised.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    Entry, Item, LedgerTarget, NewEntry, NewSubcategory, Session, Subcategory, ITEM_NAMES,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Account, AccountStore, LedgerStore, SettingsStore};
use crate::error::{AppError, AppResult};

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListEntries,
    InsertEntry,
    UpdateStock,
    DeleteEntries,
    InsertSubcategory,
    DeleteSubcategory,
    IsAdmin,
    PutSetting,
}

#[derive(Default)]
struct MemoryData {
    items: Vec<Item>,
    subcategories: Vec<Subcategory>,
    entries: Vec<Entry>,
    admins: HashSet<Uuid>,
    accounts: Vec<Account>,
    sessions: HashMap<Uuid, Session>,
    settings: HashMap<String, serde_json::Value>,
    failing: HashSet<StoreOp>,
}

impl MemoryData {
    fn check(&self, op: StoreOp) -> AppResult<()> {
        if self.failing.contains(&op) {
            return Err(AppError::Storage(format!("{:?} is unavailable", op)));
        }
        Ok(())
    }
}

/// In-memory implementation of every store trait
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store provisioned with the standard items at zero stock
    pub async fn seeded(minimum: i64) -> Self {
        let store = Self::new();
        for name in ITEM_NAMES {
            store.add_item(name, 0, minimum).await;
        }
        store
    }

    pub async fn add_item(&self, name: &str, stock: i64, minimum: i64) -> Item {
        let item = Item {
            id: Uuid::new_v4(),
            name: name.to_string(),
            stock,
            minimum,
        };
        self.data.write().await.items.push(item.clone());
        item
    }

    pub async fn add_account(&self, email: &str, password_hash: &str) -> Account {
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.data.write().await.accounts.push(account.clone());
        account
    }

    pub async fn grant_admin(&self, user_id: Uuid) {
        self.data.write().await.admins.insert(user_id);
    }

    /// Append an entry with an explicit timestamp, keeping time order
    pub async fn insert_entry_at(&self, new: NewEntry, created_at: DateTime<Utc>) -> Entry {
        let entry = Entry {
            id: Uuid::new_v4(),
            item_id: new.item_id,
            subcategory_id: new.subcategory_id,
            opening: new.quantities.opening,
            received: new.quantities.received,
            dispatched: new.quantities.dispatched,
            lost: new.quantities.lost,
            remarks: new.remarks,
            idempotency_key: new.idempotency_key,
            created_at,
        };
        let mut data = self.data.write().await;
        data.entries.push(entry.clone());
        data.entries.sort_by_key(|e| e.created_at);
        entry
    }

    /// Make every later call of `op` fail until [`MemoryStore::recover`]
    pub async fn fail_on(&self, op: StoreOp) {
        self.data.write().await.failing.insert(op);
    }

    pub async fn recover(&self, op: StoreOp) {
        self.data.write().await.failing.remove(&op);
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_item_by_name(&self, name: &str) -> AppResult<Option<Item>> {
        let data = self.data.read().await;
        Ok(data.items.iter().find(|i| i.name == name).cloned())
    }

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>> {
        let data = self.data.read().await;
        Ok(data.items.iter().find(|i| i.id == id).cloned())
    }

    async fn list_items(&self) -> AppResult<Vec<Item>> {
        Ok(self.data.read().await.items.clone())
    }

    async fn get_subcategory(&self, id: Uuid) -> AppResult<Option<Subcategory>> {
        let data = self.data.read().await;
        Ok(data.subcategories.iter().find(|s| s.id == id).cloned())
    }

    async fn list_subcategories(&self, item_id: Uuid) -> AppResult<Vec<Subcategory>> {
        let data = self.data.read().await;
        let mut subs: Vec<Subcategory> = data
            .subcategories
            .iter()
            .filter(|s| s.item_id == item_id)
            .cloned()
            .collect();
        subs.sort_by_key(|s| s.created_at);
        Ok(subs)
    }

    async fn insert_subcategory(&self, new: NewSubcategory) -> AppResult<Subcategory> {
        let mut data = self.data.write().await;
        data.check(StoreOp::InsertSubcategory)?;
        let sub = Subcategory {
            id: Uuid::new_v4(),
            item_id: new.item_id,
            category: new.category,
            name: new.name,
            stock: 0,
            minimum: new.minimum,
            created_at: Utc::now(),
        };
        data.subcategories.push(sub.clone());
        Ok(sub)
    }

    async fn delete_subcategory(&self, id: Uuid) -> AppResult<bool> {
        let mut data = self.data.write().await;
        data.check(StoreOp::DeleteSubcategory)?;
        let before = data.subcategories.len();
        data.subcategories.retain(|s| s.id != id);
        Ok(data.subcategories.len() != before)
    }

    async fn list_entries(&self, target: LedgerTarget) -> AppResult<Vec<Entry>> {
        let data = self.data.read().await;
        data.check(StoreOp::ListEntries)?;
        Ok(data
            .entries
            .iter()
            .filter(|e| e.belongs_to(target))
            .cloned()
            .collect())
    }

    async fn list_all_entries(&self) -> AppResult<Vec<Entry>> {
        Ok(self.data.read().await.entries.clone())
    }

    async fn find_entry_by_idempotency_key(
        &self,
        target: LedgerTarget,
        key: Uuid,
    ) -> AppResult<Option<Entry>> {
        let data = self.data.read().await;
        Ok(data
            .entries
            .iter()
            .find(|e| e.belongs_to(target) && e.idempotency_key == Some(key))
            .cloned())
    }

    async fn insert_entry(&self, new: NewEntry) -> AppResult<Entry> {
        self.data.read().await.check(StoreOp::InsertEntry)?;
        Ok(self.insert_entry_at(new, Utc::now()).await)
    }

    async fn update_stock(&self, target: LedgerTarget, stock: i64) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.check(StoreOp::UpdateStock)?;
        let slot = match target {
            LedgerTarget::Item(id) => data.items.iter_mut().find(|i| i.id == id).map(|i| &mut i.stock),
            LedgerTarget::Subcategory(id) => data
                .subcategories
                .iter_mut()
                .find(|s| s.id == id)
                .map(|s| &mut s.stock),
        };
        match slot {
            Some(current) => {
                *current = stock;
                Ok(())
            }
            None => Err(AppError::NotFound(target.resource().to_string())),
        }
    }

    async fn delete_entries(&self, target: LedgerTarget) -> AppResult<u64> {
        let mut data = self.data.write().await;
        data.check(StoreOp::DeleteEntries)?;
        let before = data.entries.len();
        data.entries.retain(|e| !e.belongs_to(target));
        Ok((before - data.entries.len()) as u64)
    }

    async fn is_admin(&self, user_id: Uuid) -> AppResult<bool> {
        let data = self.data.read().await;
        data.check(StoreOp::IsAdmin)?;
        Ok(data.admins.contains(&user_id))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let data = self.data.read().await;
        Ok(data
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_session(&self, session: &Session) -> AppResult<()> {
        self.data
            .write()
            .await
            .sessions
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn find_session(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.data.read().await.sessions.get(&id).cloned())
    }

    async fn delete_session(&self, id: Uuid) -> AppResult<()> {
        self.data.write().await.sessions.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get_setting(&self, key: &str) -> AppResult<Option<serde_json::Value>> {
        Ok(self.data.read().await.settings.get(key).cloned())
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.check(StoreOp::PutSetting)?;
        data.settings.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete_setting(&self, key: &str) -> AppResult<()> {
        self.data.write().await.settings.remove(key);
        Ok(())
    }
}
