//! Medicine sub-categories: listing, creation and deletion

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    is_low_stock, validate_minimum, validate_subcategory_name, Category, Item, LedgerTarget,
    NewSubcategory, Subcategory, DEFAULT_SUBCATEGORY_MINIMUM, MEDICINE_ITEM,
};
use uuid::Uuid;

use super::admin_gate::{AdminGate, Capabilities};
use super::ledger::{LedgerService, LedgerView};
use crate::error::{AppError, AppResult};
use crate::store::LedgerStore;

/// Sub-category directory under the medicine item
#[derive(Clone)]
pub struct SubcategoryDirectory {
    store: Arc<dyn LedgerStore>,
    ledger: LedgerService,
}

/// One card on a category screen
#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryCard {
    pub id: Uuid,
    pub category: Category,
    pub name: String,
    pub display_name: String,
    pub stock: i64,
    pub minimum: i64,
    pub low_stock: bool,
}

impl From<&Subcategory> for SubcategoryCard {
    fn from(sub: &Subcategory) -> Self {
        Self {
            id: sub.id,
            category: sub.category,
            name: sub.name.clone(),
            display_name: sub.display_name().to_string(),
            stock: sub.stock,
            minimum: sub.minimum,
            low_stock: is_low_stock(sub.stock, sub.minimum),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub label: &'static str,
    pub count: usize,
}

/// Input for creating a sub-category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubcategoryInput {
    pub name: String,
    pub minimum: Option<i64>,
}

/// Sub-category detail screen
#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryScreen {
    pub category_label: &'static str,
    #[serde(flatten)]
    pub ledger: LedgerView,
    pub capabilities: Capabilities,
}

impl SubcategoryDirectory {
    pub fn new(store: Arc<dyn LedgerStore>, ledger: LedgerService) -> Self {
        Self { store, ledger }
    }

    async fn medicine(&self) -> AppResult<Item> {
        self.store
            .get_item_by_name(MEDICINE_ITEM)
            .await?
            .ok_or_else(|| AppError::NotFound("Item 'medicine'".to_string()))
    }

    /// Sub-categories of one category, oldest first
    pub async fn list(&self, category: Category) -> AppResult<Vec<SubcategoryCard>> {
        let medicine = self.medicine().await?;
        let subs = self.store.list_subcategories(medicine.id).await?;

        Ok(subs
            .iter()
            .filter(|s| s.category == category)
            .map(SubcategoryCard::from)
            .collect())
    }

    /// Number of sub-categories in each category
    pub async fn category_counts(&self) -> AppResult<Vec<CategoryCount>> {
        let medicine = self.medicine().await?;
        let subs = self.store.list_subcategories(medicine.id).await?;

        Ok(Category::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category,
                label: category.label(),
                count: subs.iter().filter(|s| s.category == category).count(),
            })
            .collect())
    }

    pub async fn create(
        &self,
        gate: &AdminGate,
        category: Category,
        input: CreateSubcategoryInput,
    ) -> AppResult<SubcategoryCard> {
        gate.require_authorized()?;

        let short_name = input.name.trim();
        validate_subcategory_name(short_name).map_err(|m| AppError::validation("name", m))?;
        let minimum = input.minimum.unwrap_or(DEFAULT_SUBCATEGORY_MINIMUM);
        validate_minimum(minimum).map_err(|m| AppError::validation("minimum", m))?;

        let medicine = self.medicine().await?;
        let sub = self
            .store
            .insert_subcategory(NewSubcategory {
                item_id: medicine.id,
                category,
                name: Subcategory::compose_name(category, short_name),
                minimum,
            })
            .await?;

        tracing::info!(id = %sub.id, name = %sub.name, "Subcategory created");
        Ok(SubcategoryCard::from(&sub))
    }

    /// Delete a sub-category and its entries. Requires explicit confirmation.
    pub async fn delete(&self, gate: &AdminGate, id: Uuid, confirmed: bool) -> AppResult<()> {
        gate.require_authorized()?;

        if !confirmed {
            return Err(AppError::validation("confirm", "Confirmation required"));
        }

        if self.store.get_subcategory(id).await?.is_none() {
            return Err(AppError::NotFound("Subcategory".to_string()));
        }

        let removed = self
            .store
            .delete_entries(LedgerTarget::Subcategory(id))
            .await?;
        if !self.store.delete_subcategory(id).await? {
            return Err(AppError::NotFound("Subcategory".to_string()));
        }

        tracing::info!(id = %id, entries = removed, "Subcategory deleted");
        Ok(())
    }

    /// Detail screen for one sub-category
    pub async fn screen(&self, gate: &AdminGate, id: Uuid) -> AppResult<SubcategoryScreen> {
        let ledger = self.ledger.view(LedgerTarget::Subcategory(id)).await?;
        let category = ledger
            .category
            .ok_or_else(|| AppError::Internal("Subcategory has no category".to_string()))?;

        Ok(SubcategoryScreen {
            category_label: category.label(),
            ledger,
            capabilities: Capabilities::for_gate(gate),
        })
    }
}
