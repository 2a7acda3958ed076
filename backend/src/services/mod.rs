//! Business logic services for the farm inventory ledger

pub mod admin_gate;
pub mod auth;
pub mod dashboard;
pub mod entry_form;
pub mod ledger;
pub mod ratios;
pub mod subcategory;

pub use admin_gate::{AdminGate, Capabilities, GateState, Notice, VIEW_ONLY_NOTICE};
pub use auth::AuthService;
pub use dashboard::{load_dashboard, Dashboard, StockPoint};
pub use entry_form::{EntryFormController, FormState};
pub use ledger::{LedgerService, LedgerView, Reconciliation, TargetSnapshot};
pub use ratios::{RatioService, RatioSettings};
pub use subcategory::{
    CategoryCount, CreateSubcategoryInput, SubcategoryCard, SubcategoryDirectory, SubcategoryScreen,
};
