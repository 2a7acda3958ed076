//! Dashboard roll-up

mod common;

use chrono::{Duration, Utc};
use common::{form, Harness};
use farm_inventory_backend::services::{load_dashboard, EntryFormController, Notice};
use shared::{LedgerTarget, NewEntry, Quantities};

#[tokio::test]
async fn test_fresh_dashboard() {
    let h = Harness::new().await;
    let gate = h.anonymous_gate().await;

    let dashboard = load_dashboard(&h.state.ledger_service(), &gate).await.unwrap();

    assert_eq!(dashboard.total_stock, 0);
    assert_eq!(dashboard.today.received, 0);
    let labels: Vec<&str> = dashboard.stock_by_item.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Maize", "Bran", "Premix", "Oil Cakes", "Limestone", "Medicine"]);
    // Zero stock against a minimum of 50
    assert_eq!(dashboard.low_stock.len(), 6);
    assert_eq!(dashboard.capabilities.notices, vec![Notice::ViewOnly]);
}

#[tokio::test]
async fn test_dashboard_rolls_up_snapshots_and_today() {
    let h = Harness::new().await;
    let gate = h.admin_gate().await;
    let ledger = h.state.ledger_service();
    let maize = h.item("maize").await;
    let bran = h.item("bran").await;

    h.store
        .insert_entry_at(
            NewEntry {
                item_id: bran.id,
                subcategory_id: None,
                quantities: Quantities {
                    opening: 0,
                    received: 1000,
                    dispatched: 0,
                    lost: 0,
                },
                remarks: None,
                idempotency_key: None,
            },
            Utc::now() - Duration::days(2),
        )
        .await;

    let mut controller = EntryFormController::new(&ledger, &gate);
    controller
        .submit(LedgerTarget::Item(maize.id), &mut form("100", "20", "30", "5"))
        .await
        .unwrap();
    controller
        .submit(LedgerTarget::Item(bran.id), &mut form("0", "10", "0", "0"))
        .await
        .unwrap();

    let dashboard = load_dashboard(&ledger, &gate).await.unwrap();

    assert_eq!(dashboard.total_stock, 95);
    assert_eq!(dashboard.today.received, 30);
    assert_eq!(dashboard.today.dispatched, 30);
    assert_eq!(dashboard.today.lost, 5);

    let maize_point = &dashboard.stock_by_item[0];
    assert_eq!((maize_point.name.as_str(), maize_point.stock), ("maize", 85));
    assert!(dashboard.low_stock.iter().all(|p| p.name != "maize"));
    assert!(dashboard.low_stock.iter().any(|p| p.name == "bran"));
    assert!(dashboard.capabilities.can_add_entry);
}

#[tokio::test]
async fn test_stock_equal_to_minimum_is_low() {
    let h = Harness::new().await;
    let gate = h.admin_gate().await;
    let ledger = h.state.ledger_service();
    let limestone = h.item("limestone").await;

    let mut controller = EntryFormController::new(&ledger, &gate);
    controller
        .submit(LedgerTarget::Item(limestone.id), &mut form("50", "0", "0", "0"))
        .await
        .unwrap();

    let dashboard = load_dashboard(&ledger, &gate).await.unwrap();
    assert!(dashboard.low_stock.iter().any(|p| p.name == "limestone"));
}
