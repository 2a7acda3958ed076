//! Shared types and pure computations for the farm inventory ledger
//!
//! This crate holds everything that must compute identically on the server
//! and in the browser (via WASM): the stock ledger formulas, feed-cost math
//! and input validation.

pub mod feed;
pub mod ledger;
pub mod models;
pub mod validation;

pub use feed::*;
pub use ledger::*;
pub use models::*;
pub use validation::*;
