//! Entry form controller
//!
//! Drives one submission through `Idle -> Validating -> Submitting ->
//! {Success, Failed} -> Idle`. A submission makes two sequential writes with
//! no transaction: the entry append, then the stock snapshot update. If the
//! second write fails the entry stays and stock is stale until the form is
//! re-submitted with the same idempotency key or the ledger is reconciled.

use serde::Serialize;
use shared::{reconciled_stock, EntryForm, LedgerTarget, NewEntry};

use super::admin_gate::AdminGate;
use super::ledger::{LedgerService, LedgerView};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

/// Per-request controller for one ledger's entry form
pub struct EntryFormController<'a> {
    ledger: &'a LedgerService,
    gate: &'a AdminGate,
    state: FormState,
    last_outcome: Option<FormState>,
}

impl<'a> EntryFormController<'a> {
    /// The gate must already be resolved
    pub fn new(ledger: &'a LedgerService, gate: &'a AdminGate) -> Self {
        Self {
            ledger,
            gate,
            state: FormState::Idle,
            last_outcome: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// `Success` or `Failed` of the most recent submission
    pub fn last_outcome(&self) -> Option<FormState> {
        self.last_outcome
    }

    /// Submit the form for `target`. Clears the form once both writes land.
    ///
    /// A failed refresh after the writes still counts as `Success`; the error
    /// is returned but the form is cleared so a retry does not append twice.
    pub async fn submit(&mut self, target: LedgerTarget, form: &mut EntryForm) -> AppResult<LedgerView> {
        self.state = FormState::Validating;
        let written = self.write(target, form).await;

        let outcome = if written.is_ok() {
            *form = EntryForm::default();
            FormState::Success
        } else {
            FormState::Failed
        };
        self.state = outcome;
        self.last_outcome = Some(outcome);
        self.state = FormState::Idle;
        written?;

        self.ledger.view(target).await.map_err(|e| {
            tracing::warn!(ledger = ?target, "Entry saved but ledger refresh failed: {}", e);
            e
        })
    }

    async fn write(&mut self, target: LedgerTarget, form: &EntryForm) -> AppResult<()> {
        self.gate.require_authorized()?;

        let quantities = form.quantities();
        let remarks = form.remarks();
        let snapshot = self.ledger.snapshot(target).await?;
        let (item_id, subcategory_id) = LedgerService::entry_parent(&snapshot);

        self.state = FormState::Submitting;
        let store = self.ledger.store();

        let existing = match form.idempotency_key {
            Some(key) => store
                .find_entry_by_idempotency_key(target, key)
                .await
                .map_err(|e| AppError::WriteFailed(e.to_string()))?,
            None => None,
        };

        let (entry_id, stock) = match existing {
            Some(entry) => {
                tracing::info!(entry_id = %entry.id, "Re-submission matched an existing entry, skipping append");
                // Later entries may exist, so stock follows the newest one
                let stock = store
                    .list_entries(target)
                    .await
                    .map(|entries| reconciled_stock(&entries).unwrap_or_else(|| entry.ending()))
                    .map_err(|e| AppError::StockUpdateFailed {
                        entry_id: entry.id,
                        message: e.to_string(),
                    })?;
                (entry.id, stock)
            }
            None => {
                let new = NewEntry {
                    item_id,
                    subcategory_id,
                    quantities,
                    remarks,
                    idempotency_key: form.idempotency_key,
                };
                let entry = store
                    .insert_entry(new)
                    .await
                    .map_err(|e| AppError::WriteFailed(e.to_string()))?;
                tracing::info!(entry_id = %entry.id, ledger = ?target, "Entry appended");
                (entry.id, entry.ending())
            }
        };

        store
            .update_stock(target, stock)
            .await
            .map_err(|e| AppError::StockUpdateFailed {
                entry_id,
                message: e.to_string(),
            })?;
        tracing::info!(ledger = ?target, stock, "Stock updated");

        Ok(())
    }
}
