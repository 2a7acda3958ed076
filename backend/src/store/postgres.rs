//! PostgreSQL implementation of the store traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    Category, Entry, Item, LedgerTarget, NewEntry, NewSubcategory, Session, Subcategory,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{Account, AccountStore, LedgerStore, SettingsStore};
use crate::error::{AppError, AppResult};

/// Store backed by a sqlx connection pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    stock: i64,
    minimum: i64,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            stock: row.stock,
            minimum: row.minimum,
        }
    }
}

#[derive(Debug, FromRow)]
struct SubcategoryRow {
    id: Uuid,
    item_id: Uuid,
    category: Option<String>,
    name: String,
    stock: i64,
    minimum: i64,
    created_at: DateTime<Utc>,
}

impl SubcategoryRow {
    /// Rows written before the category column existed fall back to the name prefix
    fn into_subcategory(self) -> Option<Subcategory> {
        let category = self
            .category
            .as_deref()
            .and_then(|c| c.parse::<Category>().ok())
            .or_else(|| Category::from_name_prefix(&self.name));

        let Some(category) = category else {
            tracing::warn!(id = %self.id, name = %self.name, "Skipping unclassifiable subcategory");
            return None;
        };

        Some(Subcategory {
            id: self.id,
            item_id: self.item_id,
            category,
            name: self.name,
            stock: self.stock,
            minimum: self.minimum,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EntryRow {
    id: Uuid,
    item_id: Uuid,
    subcategory_id: Option<Uuid>,
    opening: i64,
    received: i64,
    dispatched: i64,
    lost: i64,
    remarks: Option<String>,
    idempotency_key: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Entry {
            id: row.id,
            item_id: row.item_id,
            subcategory_id: row.subcategory_id,
            opening: row.opening,
            received: row.received,
            dispatched: row.dispatched,
            lost: row.lost,
            remarks: row.remarks,
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    email: String,
    expires_at: DateTime<Utc>,
}

const ENTRY_COLUMNS: &str = "id, item_id, subcategory_id, opening, received, dispatched, lost, remarks, idempotency_key, created_at";

/// Ledger filter for one target: item entries carry no subcategory
fn entry_filter(target: LedgerTarget) -> &'static str {
    match target {
        LedgerTarget::Item(_) => "item_id = $1 AND subcategory_id IS NULL",
        LedgerTarget::Subcategory(_) => "subcategory_id = $1",
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn get_item_by_name(&self, name: &str) -> AppResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, stock, minimum FROM items WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Item::from))
    }

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, stock, minimum FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Item::from))
    }

    async fn list_items(&self) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, stock, minimum FROM items ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn get_subcategory(&self, id: Uuid) -> AppResult<Option<Subcategory>> {
        let row = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            SELECT id, item_id, category, name, stock, minimum, created_at
            FROM subcategories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.and_then(SubcategoryRow::into_subcategory))
    }

    async fn list_subcategories(&self, item_id: Uuid) -> AppResult<Vec<Subcategory>> {
        let rows = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            SELECT id, item_id, category, name, stock, minimum, created_at
            FROM subcategories
            WHERE item_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(SubcategoryRow::into_subcategory)
            .collect())
    }

    async fn insert_subcategory(&self, new: NewSubcategory) -> AppResult<Subcategory> {
        let row = sqlx::query_as::<_, SubcategoryRow>(
            r#"
            INSERT INTO subcategories (item_id, category, name, stock, minimum)
            VALUES ($1, $2, $3, 0, $4)
            RETURNING id, item_id, category, name, stock, minimum, created_at
            "#,
        )
        .bind(new.item_id)
        .bind(new.category.tag())
        .bind(&new.name)
        .bind(new.minimum)
        .fetch_one(&self.db)
        .await?;

        row.into_subcategory()
            .ok_or_else(|| AppError::Internal("Inserted subcategory has no category".to_string()))
    }

    async fn delete_subcategory(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_entries(&self, target: LedgerTarget) -> AppResult<Vec<Entry>> {
        let sql = format!(
            "SELECT {} FROM entries WHERE {} ORDER BY created_at ASC",
            ENTRY_COLUMNS,
            entry_filter(target)
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(target.id())
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Entry::from).collect())
    }

    async fn list_all_entries(&self) -> AppResult<Vec<Entry>> {
        let sql = format!("SELECT {} FROM entries ORDER BY created_at ASC", ENTRY_COLUMNS);
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Entry::from).collect())
    }

    async fn find_entry_by_idempotency_key(
        &self,
        target: LedgerTarget,
        key: Uuid,
    ) -> AppResult<Option<Entry>> {
        let sql = format!(
            "SELECT {} FROM entries WHERE {} AND idempotency_key = $2",
            ENTRY_COLUMNS,
            entry_filter(target)
        );
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(target.id())
            .bind(key)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Entry::from))
    }

    async fn insert_entry(&self, new: NewEntry) -> AppResult<Entry> {
        let sql = format!(
            r#"
            INSERT INTO entries (item_id, subcategory_id, opening, received, dispatched, lost, remarks, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(new.item_id)
            .bind(new.subcategory_id)
            .bind(new.quantities.opening)
            .bind(new.quantities.received)
            .bind(new.quantities.dispatched)
            .bind(new.quantities.lost)
            .bind(&new.remarks)
            .bind(new.idempotency_key)
            .fetch_one(&self.db)
            .await?;

        Ok(row.into())
    }

    async fn update_stock(&self, target: LedgerTarget, stock: i64) -> AppResult<()> {
        let sql = match target {
            LedgerTarget::Item(_) => "UPDATE items SET stock = $2 WHERE id = $1",
            LedgerTarget::Subcategory(_) => "UPDATE subcategories SET stock = $2 WHERE id = $1",
        };
        let result = sqlx::query(sql)
            .bind(target.id())
            .bind(stock)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(target.resource().to_string()));
        }
        Ok(())
    }

    async fn delete_entries(&self, target: LedgerTarget) -> AppResult<u64> {
        let sql = format!("DELETE FROM entries WHERE {}", entry_filter(target));
        let result = sqlx::query(&sql)
            .bind(target.id())
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn is_admin(&self, user_id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM admins WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, email, password_hash FROM accounts WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| Account {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
        }))
    }

    async fn insert_session(&self, session: &Session) -> AppResult<()> {
        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn find_session(&self, id: Uuid) -> AppResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT s.id, s.user_id, a.email, s.expires_at
            FROM sessions s
            JOIN accounts a ON a.id = s.user_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| Session {
            id: r.id,
            user_id: r.user_id,
            email: r.email,
            expires_at: r.expires_at,
        }))
    }

    async fn delete_session(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn get_setting(&self, key: &str) -> AppResult<Option<serde_json::Value>> {
        let value = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;

        Ok(value)
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn delete_setting(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
