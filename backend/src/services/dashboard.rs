//! Dashboard summary across all items

use chrono::Utc;
use serde::Serialize;
use shared::{
    aggregate_today, is_low_stock, item_label, local_date, roll_up_total_stock, DailyMovement,
    ITEM_NAMES,
};

use super::admin_gate::{AdminGate, Capabilities};
use super::ledger::LedgerService;
use crate::error::AppResult;

/// One bar of the stock chart
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StockPoint {
    pub name: String,
    pub label: String,
    pub stock: i64,
    pub minimum: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_stock: i64,
    pub today: DailyMovement,
    /// Items in fixed display order
    pub stock_by_item: Vec<StockPoint>,
    pub low_stock: Vec<StockPoint>,
    pub capabilities: Capabilities,
}

pub async fn load_dashboard(ledger: &LedgerService, gate: &AdminGate) -> AppResult<Dashboard> {
    let store = ledger.store();
    let items = store.list_items().await?;
    let entries = store.list_all_entries().await?;

    let tz = ledger.tz();
    let today = local_date(Utc::now(), &tz);

    let stock_by_item: Vec<StockPoint> = ITEM_NAMES
        .iter()
        .filter_map(|name| items.iter().find(|i| i.name == *name))
        .map(|item| StockPoint {
            name: item.name.clone(),
            label: item_label(&item.name),
            stock: item.stock,
            minimum: item.minimum,
        })
        .collect();

    let low_stock = stock_by_item
        .iter()
        .filter(|p| is_low_stock(p.stock, p.minimum))
        .cloned()
        .collect();

    Ok(Dashboard {
        total_stock: roll_up_total_stock(&items),
        today: aggregate_today(&entries, today, &tz),
        stock_by_item,
        low_stock,
        capabilities: Capabilities::for_gate(gate),
    })
}
