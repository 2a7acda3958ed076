//! Read side of an item or subcategory ledger, plus stock reconciliation

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;
use shared::{
    aggregate_today, history_rows, is_low_stock, local_date, reconciled_stock, Category,
    DailyMovement, HistoryRow, Item, LedgerTarget,
};
use uuid::Uuid;

use super::admin_gate::AdminGate;
use crate::error::{AppError, AppResult};
use crate::store::LedgerStore;

/// Ledger service shared by items and subcategories
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    tz: Tz,
}

/// Current stock row of a ledger target
#[derive(Debug, Clone, Serialize)]
pub struct TargetSnapshot {
    pub target: LedgerTarget,
    /// Parent item, which every entry row references
    pub item_id: Uuid,
    pub name: String,
    pub display_name: String,
    pub category: Option<Category>,
    pub stock: i64,
    pub minimum: i64,
}

impl TargetSnapshot {
    fn subcategory_id(&self) -> Option<Uuid> {
        match self.target {
            LedgerTarget::Item(_) => None,
            LedgerTarget::Subcategory(id) => Some(id),
        }
    }
}

/// Everything a ledger screen shows
#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    pub target: LedgerTarget,
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub stock: i64,
    pub minimum: i64,
    pub low_stock: bool,
    pub today: DailyMovement,
    pub history: Vec<HistoryRow>,
}

/// Outcome of a reconciliation
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Reconciliation {
    pub target: LedgerTarget,
    pub before: i64,
    pub after: i64,
    pub changed: bool,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>, tz: Tz) -> Self {
        Self { store, tz }
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Look up an item by its name key
    pub async fn item_by_name(&self, name: &str) -> AppResult<Item> {
        self.store
            .get_item_by_name(&name.to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item '{}'", name)))
    }

    /// Current stock row of a target, `NotFound` if it does not exist
    pub async fn snapshot(&self, target: LedgerTarget) -> AppResult<TargetSnapshot> {
        match target {
            LedgerTarget::Item(id) => {
                let item = self
                    .store
                    .get_item(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(target.resource().to_string()))?;
                Ok(TargetSnapshot {
                    target,
                    item_id: item.id,
                    display_name: item.display_name(),
                    name: item.name,
                    category: None,
                    stock: item.stock,
                    minimum: item.minimum,
                })
            }
            LedgerTarget::Subcategory(id) => {
                let sub = self
                    .store
                    .get_subcategory(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(target.resource().to_string()))?;
                Ok(TargetSnapshot {
                    target,
                    item_id: sub.item_id,
                    display_name: sub.display_name().to_string(),
                    name: sub.name.clone(),
                    category: Some(sub.category),
                    stock: sub.stock,
                    minimum: sub.minimum,
                })
            }
        }
    }

    /// Re-read a target and its entries
    pub async fn view(&self, target: LedgerTarget) -> AppResult<LedgerView> {
        let snapshot = self.snapshot(target).await?;
        let entries = self.store.list_entries(target).await?;
        let today = local_date(Utc::now(), &self.tz);

        Ok(LedgerView {
            target,
            low_stock: is_low_stock(snapshot.stock, snapshot.minimum),
            today: aggregate_today(&entries, today, &self.tz),
            history: history_rows(&entries, snapshot.minimum, &self.tz),
            name: snapshot.name,
            display_name: snapshot.display_name,
            category: snapshot.category,
            stock: snapshot.stock,
            minimum: snapshot.minimum,
        })
    }

    /// Set stock to the ending of the latest entry when they disagree
    pub async fn reconcile(&self, gate: &AdminGate, target: LedgerTarget) -> AppResult<Reconciliation> {
        gate.require_authorized()?;

        let snapshot = self.snapshot(target).await?;
        let entries = self.store.list_entries(target).await?;
        let before = snapshot.stock;

        let after = match reconciled_stock(&entries) {
            Some(expected) if expected != before => {
                self.store.update_stock(target, expected).await?;
                tracing::info!(
                    ledger = ?target,
                    before,
                    after = expected,
                    "Reconciled stock from latest entry"
                );
                expected
            }
            _ => before,
        };

        Ok(Reconciliation {
            target,
            before,
            after,
            changed: after != before,
        })
    }

    pub(crate) fn entry_parent(snapshot: &TargetSnapshot) -> (Uuid, Option<Uuid>) {
        (snapshot.item_id, snapshot.subcategory_id())
    }
}
