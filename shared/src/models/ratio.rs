//! Feed ingredient ratio table

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settings key the ratio override is stored under
pub const RATIO_OVERRIDE_KEY: &str = "egg_ratios";

/// Feed ingredients, in breakdown display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ingredient {
    Maize,
    #[serde(rename = "Oil Cakes")]
    OilCakes,
    Bran,
    Premix,
    Limestone,
}

impl Ingredient {
    pub const ALL: [Ingredient; 5] = [
        Ingredient::Maize,
        Ingredient::OilCakes,
        Ingredient::Bran,
        Ingredient::Premix,
        Ingredient::Limestone,
    ];

    /// Key used in the persisted override document
    pub fn name(&self) -> &'static str {
        match self {
            Ingredient::Maize => "Maize",
            Ingredient::OilCakes => "Oil Cakes",
            Ingredient::Bran => "Bran",
            Ingredient::Premix => "Premix",
            Ingredient::Limestone => "Limestone",
        }
    }

    /// Fraction used when no override exists for this ingredient
    pub fn default_share(&self) -> Decimal {
        match self {
            Ingredient::Maize => Decimal::new(70, 2),
            Ingredient::OilCakes => Decimal::new(20, 2),
            Ingredient::Bran => Decimal::new(5, 2),
            Ingredient::Premix => Decimal::new(3, 2),
            Ingredient::Limestone => Decimal::new(2, 2),
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ingredient → fractional share of total feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioTable(BTreeMap<Ingredient, Decimal>);

impl Default for RatioTable {
    fn default() -> Self {
        Self(Ingredient::ALL.into_iter().map(|i| (i, i.default_share())).collect())
    }
}

impl RatioTable {
    /// Build a table from a persisted override document.
    ///
    /// Any key that is missing or not a JSON number falls back to its
    /// default alone; a document that is not an object yields the defaults.
    pub fn from_overrides(doc: &serde_json::Value) -> Self {
        let mut table = Self::default();
        let Some(obj) = doc.as_object() else {
            return table;
        };
        for ingredient in Ingredient::ALL {
            let share = obj
                .get(ingredient.name())
                .and_then(|v| match v {
                    serde_json::Value::Number(n) => parse_json_decimal(&n.to_string()),
                    _ => None,
                });
            if let Some(share) = share {
                table.0.insert(ingredient, share);
            }
        }
        table
    }

    /// Table from whole percentages (already validated)
    pub fn from_percentages(percentages: &BTreeMap<Ingredient, i64>) -> Self {
        Self(
            Ingredient::ALL
                .into_iter()
                .map(|i| {
                    let pct = percentages.get(&i).copied().unwrap_or(0);
                    (i, Decimal::new(pct, 2))
                })
                .collect(),
        )
    }

    /// Persisted form: JSON object of ingredient name → fraction
    pub fn to_overrides(&self) -> serde_json::Value {
        let obj = self
            .0
            .iter()
            .map(|(i, share)| {
                let number = share
                    .to_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null);
                (i.name().to_string(), number)
            })
            .collect();
        serde_json::Value::Object(obj)
    }

    pub fn share(&self, ingredient: Ingredient) -> Decimal {
        self.0.get(&ingredient).copied().unwrap_or(Decimal::ZERO)
    }

    /// Shares as rounded whole percentages, for the ratio editor
    pub fn percentages(&self) -> BTreeMap<Ingredient, i64> {
        self.0
            .iter()
            .map(|(i, share)| {
                let pct = (*share * Decimal::ONE_HUNDRED).round().to_i64().unwrap_or(0);
                (*i, pct)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ingredient, Decimal)> + '_ {
        self.0.iter().map(|(i, s)| (*i, *s))
    }
}

fn parse_json_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
