//! Route definitions for the farm inventory API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes())
        .route("/dashboard", get(handlers::get_dashboard))
        .nest("/items", item_routes())
        .nest("/categories", category_routes())
        .nest("/subcategories", subcategory_routes())
        .nest("/ratios", ratio_routes())
        .route("/feed/calculate", post(handlers::calculate_feed))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/session", get(handlers::current_session))
}

/// Item ledgers, addressed by name key
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items))
        .route("/:name", get(handlers::get_item))
        .route("/:name/entries", post(handlers::add_item_entry))
        .route("/:name/reconcile", post(handlers::reconcile_item))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories))
        .route(
            "/:category/subcategories",
            get(handlers::list_subcategories).post(handlers::create_subcategory),
        )
}

fn subcategory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:id",
            get(handlers::get_subcategory).delete(handlers::delete_subcategory),
        )
        .route("/:id/entries", post(handlers::add_subcategory_entry))
        .route("/:id/reconcile", post(handlers::reconcile_subcategory))
}

fn ratio_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::get_ratios)
            .put(handlers::save_ratios)
            .delete(handlers::reset_ratios),
    )
}
