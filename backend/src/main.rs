//! Farm inventory ledger server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use bcrypt::{hash, DEFAULT_COST};

use farm_inventory_backend::{
    config::{Config, StorageKind},
    create_app,
    store::{MemoryStore, PgStore, SessionEvent},
    AppState,
};
use shared::DEFAULT_SUBCATEGORY_MINIMUM;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "farm_inventory_server=debug,farm_inventory_backend=debug,tower_http=debug,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Farm Inventory Server");
    tracing::info!("Environment: {}", config.environment);

    let state = match config.storage {
        StorageKind::Postgres => {
            let url = config
                .database
                .url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("database.url is not set"))?;

            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&url)
                .await?;
            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            AppState::new(Arc::new(PgStore::new(db_pool)), config.clone())?
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let store = MemoryStore::seeded(DEFAULT_SUBCATEGORY_MINIMUM).await;
            if let Some(demo) = &config.demo {
                let password_hash = hash(&demo.admin_password, DEFAULT_COST)?;
                let account = store.add_account(&demo.admin_email, &password_hash).await;
                store.grant_admin(account.id).await;
                tracing::info!("Provisioned demo admin {}", demo.admin_email);
            }
            AppState::new(Arc::new(store), config.clone())?
        }
    };

    let mut events = state.identity.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SignedIn { user_id }) => {
                    tracing::info!(%user_id, "Session started")
                }
                Ok(SessionEvent::SignedOut { user_id }) => {
                    tracing::info!(%user_id, "Session ended")
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session event listener lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
