//! HTTP handlers for medicine categories and sub-categories

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{Category, EntryForm, LedgerTarget};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::Gate;
use crate::services::{
    Capabilities, CategoryCount, CreateSubcategoryInput, EntryFormController, LedgerView,
    Reconciliation, SubcategoryCard, SubcategoryScreen,
};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubcategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "Minimum cannot be negative"))]
    pub minimum: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize)]
pub struct CategoryScreen {
    pub category: Category,
    pub label: &'static str,
    pub subcategories: Vec<SubcategoryCard>,
    pub capabilities: Capabilities,
}

fn parse_category(raw: &str) -> AppResult<Category> {
    raw.parse::<Category>()
        .map_err(|_| AppError::NotFound(format!("Category '{}'", raw)))
}

/// Sub-category counts for every category
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryCount>>> {
    let counts = state.subcategory_directory().category_counts().await?;
    Ok(Json(counts))
}

/// Sub-categories of one category
pub async fn list_subcategories(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(category): Path<String>,
) -> AppResult<Json<CategoryScreen>> {
    let category = parse_category(&category)?;
    let subcategories = state.subcategory_directory().list(category).await?;
    Ok(Json(CategoryScreen {
        category,
        label: category.label(),
        subcategories,
        capabilities: Capabilities::for_gate(&gate),
    }))
}

pub async fn create_subcategory(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(category): Path<String>,
    Json(body): Json<CreateSubcategoryRequest>,
) -> AppResult<(StatusCode, Json<SubcategoryCard>)> {
    gate.require_authorized()?;
    let category = parse_category(&category)?;
    body.validate()?;

    let card = state
        .subcategory_directory()
        .create(
            &gate,
            category,
            CreateSubcategoryInput {
                name: body.name,
                minimum: body.minimum,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// Sub-category ledger screen
pub async fn get_subcategory(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubcategoryScreen>> {
    let screen = state.subcategory_directory().screen(&gate, id).await?;
    Ok(Json(screen))
}

/// Delete a sub-category. Requires `?confirm=true`.
pub async fn delete_subcategory(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    state
        .subcategory_directory()
        .delete(&gate, id, query.confirm)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append an entry to a sub-category ledger
pub async fn add_subcategory_entry(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(id): Path<Uuid>,
    Json(mut form): Json<EntryForm>,
) -> AppResult<Json<LedgerView>> {
    let service = state.ledger_service();
    let mut controller = EntryFormController::new(&service, &gate);
    let view = controller
        .submit(LedgerTarget::Subcategory(id), &mut form)
        .await?;
    Ok(Json(view))
}

pub async fn reconcile_subcategory(
    State(state): State<AppState>,
    Gate(gate): Gate,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reconciliation>> {
    let outcome = state
        .ledger_service()
        .reconcile(&gate, LedgerTarget::Subcategory(id))
        .await?;
    Ok(Json(outcome))
}
