//! HTTP handlers for item ledgers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use shared::{is_low_stock, EntryForm, LedgerTarget};

use crate::error::AppResult;
use crate::middleware::Gate;
use crate::services::{Capabilities, EntryFormController, LedgerView, Reconciliation};
use crate::AppState;

#[derive(Serialize)]
pub struct ItemSummary {
    pub name: String,
    pub label: String,
    pub stock: i64,
    pub minimum: i64,
    pub low_stock: bool,
}

#[derive(Serialize)]
pub struct ItemScreen {
    #[serde(flatten)]
    pub ledger: LedgerView,
    pub capabilities: Capabilities,
}

/// List all items with their stock snapshot
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<ItemSummary>>> {
    let items = state.ledger.list_items().await?;
    let summaries = items
        .into_iter()
        .map(|item| ItemSummary {
            label: item.display_name(),
            low_stock: is_low_stock(item.stock, item.minimum),
            name: item.name,
            stock: item.stock,
            minimum: item.minimum,
        })
        .collect();
    Ok(Json(summaries))
}

/// Item ledger screen
pub async fn get_item(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(name): Path<String>,
) -> AppResult<Json<ItemScreen>> {
    let service = state.ledger_service();
    let item = service.item_by_name(&name).await?;
    let ledger = service.view(LedgerTarget::Item(item.id)).await?;
    Ok(Json(ItemScreen {
        ledger,
        capabilities: Capabilities::for_gate(&gate),
    }))
}

/// Append an entry to an item ledger
pub async fn add_item_entry(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(name): Path<String>,
    Json(mut form): Json<EntryForm>,
) -> AppResult<Json<LedgerView>> {
    gate.require_authorized()?;
    let service = state.ledger_service();
    let item = service.item_by_name(&name).await?;

    let mut controller = EntryFormController::new(&service, &gate);
    let view = controller
        .submit(LedgerTarget::Item(item.id), &mut form)
        .await?;
    Ok(Json(view))
}

/// Repair an item's stock from its latest entry
pub async fn reconcile_item(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(name): Path<String>,
) -> AppResult<Json<Reconciliation>> {
    gate.require_authorized()?;
    let service = state.ledger_service();
    let item = service.item_by_name(&name).await?;
    let outcome = service.reconcile(&gate, LedgerTarget::Item(item.id)).await?;
    Ok(Json(outcome))
}
