//! Farm inventory ledger service
//!
//! Stock ledgers for feed items and medicine sub-categories, gated by an
//! admin allow-list, plus the feed-ratio cost calculator.

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono_tz::Tz;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::{AuthService, LedgerService, SubcategoryDirectory};
use store::{AccountStore, IdentityProvider, LedgerStore, SettingsStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<Config>,
    pub tz: Tz,
}

impl AppState {
    /// State over one store that backs every trait, with password sign-in
    pub fn new<S>(store: Arc<S>, config: Config) -> AppResult<Self>
    where
        S: LedgerStore + AccountStore + SettingsStore + 'static,
    {
        let tz = config
            .ledger
            .tz()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        let accounts: Arc<dyn AccountStore> = store.clone();
        let identity = Arc::new(AuthService::new(accounts, &config));

        Ok(Self {
            ledger: store.clone(),
            settings: store,
            identity,
            config: Arc::new(config),
            tz,
        })
    }

    pub fn ledger_service(&self) -> LedgerService {
        LedgerService::new(self.ledger.clone(), self.tz)
    }

    pub fn subcategory_directory(&self) -> SubcategoryDirectory {
        SubcategoryDirectory::new(self.ledger.clone(), self.ledger_service())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farm Inventory Ledger API v1"
}
