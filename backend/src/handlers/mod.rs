//! HTTP request handlers

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod items;
pub mod ratios;
pub mod subcategories;

pub use auth::*;
pub use dashboard::*;
pub use health::*;
pub use items::*;
pub use ratios::*;
pub use subcategories::*;
