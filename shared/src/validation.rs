//! Validation utilities for the farm inventory ledger

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::Ingredient;

// ============================================================================
// Ratio Table Validations
// ============================================================================

/// Reasons a ratio edit is rejected
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RatioError {
    #[error("{ingredient} percentage must be between 0 and 100, got {value}")]
    OutOfRange { ingredient: Ingredient, value: i64 },

    #[error("Percentages must add up to 100%. Current total: {total}%")]
    TotalMismatch { total: i64 },
}

impl RatioError {
    /// Amount the total exceeds (positive) or falls short of (negative) 100
    pub fn overage(&self) -> Option<i64> {
        match self {
            RatioError::TotalMismatch { total } => Some(total - 100),
            RatioError::OutOfRange { .. } => None,
        }
    }
}

/// Validate that ingredient percentages are whole numbers 0-100 summing to 100.
///
/// Ingredients absent from the map count as 0.
pub fn validate_ratio_percentages(percentages: &BTreeMap<Ingredient, i64>) -> Result<(), RatioError> {
    for ingredient in Ingredient::ALL {
        let value = percentages.get(&ingredient).copied().unwrap_or(0);
        if !(0..=100).contains(&value) {
            return Err(RatioError::OutOfRange { ingredient, value });
        }
    }
    let total: i64 = Ingredient::ALL
        .iter()
        .map(|i| percentages.get(i).copied().unwrap_or(0))
        .sum();
    if total != 100 {
        return Err(RatioError::TotalMismatch { total });
    }
    Ok(())
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate a subcategory short name (before the category prefix is added)
pub fn validate_subcategory_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Subcategory name is required");
    }
    if name.len() > 100 {
        return Err("Subcategory name must be at most 100 characters");
    }
    Ok(())
}

/// Validate a low-stock threshold
pub fn validate_minimum(minimum: i64) -> Result<(), &'static str> {
    if minimum < 0 {
        return Err("Minimum stock cannot be negative");
    }
    Ok(())
}
