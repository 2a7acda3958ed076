//! Domain models for the farm inventory ledger

mod entry;
mod item;
mod ratio;
mod session;

pub use entry::*;
pub use item::*;
pub use ratio::*;
pub use session::*;
