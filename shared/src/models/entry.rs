//! Stock-movement entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LedgerTarget;
use crate::ledger::{compute_ending, parse_quantity};

/// One recorded stock movement. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub id: Uuid,
    pub item_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub opening: i64,
    pub received: i64,
    pub dispatched: i64,
    pub lost: i64,
    pub remarks: Option<String>,
    /// Client-supplied key used to deduplicate re-submissions
    pub idempotency_key: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Derived ending stock. Never stored.
    pub fn ending(&self) -> i64 {
        compute_ending(self.opening, self.received, self.dispatched, self.lost)
    }

    /// Whether this entry belongs to the given ledger
    pub fn belongs_to(&self, target: LedgerTarget) -> bool {
        match target {
            LedgerTarget::Item(id) => self.subcategory_id.is_none() && self.item_id == id,
            LedgerTarget::Subcategory(id) => self.subcategory_id == Some(id),
        }
    }
}

/// Entry to be appended by the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewEntry {
    pub item_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub quantities: Quantities,
    pub remarks: Option<String>,
    pub idempotency_key: Option<Uuid>,
}

/// The four movement fields of an entry
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quantities {
    pub opening: i64,
    pub received: i64,
    pub dispatched: i64,
    pub lost: i64,
}

impl Quantities {
    pub fn ending(&self) -> i64 {
        compute_ending(self.opening, self.received, self.dispatched, self.lost)
    }
}

/// Raw entry form as typed by the actor.
///
/// Numeric fields arrive as text and are coerced with [`parse_quantity`];
/// absent fields count as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub opening: String,
    #[serde(default)]
    pub received: String,
    #[serde(default)]
    pub dispatched: String,
    #[serde(default)]
    pub lost: String,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

impl EntryForm {
    pub fn quantities(&self) -> Quantities {
        Quantities {
            opening: parse_quantity(&self.opening),
            received: parse_quantity(&self.received),
            dispatched: parse_quantity(&self.dispatched),
            lost: parse_quantity(&self.lost),
        }
    }

    /// Remarks with blank text treated as absent
    pub fn remarks(&self) -> Option<String> {
        self.remarks
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}
