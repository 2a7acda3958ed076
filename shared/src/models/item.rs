//! Tracked commodities and medicine sub-categories

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Item names in dashboard display order
pub const ITEM_NAMES: [&str; 6] = ["maize", "bran", "premix", "oilcakes", "limestone", "medicine"];

/// Name of the item that owns sub-categories
pub const MEDICINE_ITEM: &str = "medicine";

/// Minimum applied to a new subcategory when none is given
pub const DEFAULT_SUBCATEGORY_MINIMUM: i64 = 50;

/// A tracked commodity (maize, bran, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    /// Unique lowercase key, e.g. "oilcakes"
    pub name: String,
    /// Authoritative running total, tracks the last entry's ending
    pub stock: i64,
    /// Low-stock threshold
    pub minimum: i64,
}

impl Item {
    /// Human label used on cards and chart axes
    pub fn display_name(&self) -> String {
        item_label(&self.name)
    }
}

/// Chart label for an item key
pub fn item_label(name: &str) -> String {
    match name {
        "oilcakes" => "Oil Cakes".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// A named grouping under a parent item, one level deeper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subcategory {
    pub id: Uuid,
    pub item_id: Uuid,
    pub category: Category,
    /// Stored as "<category>-<short name>"
    pub name: String,
    pub stock: i64,
    pub minimum: i64,
    pub created_at: DateTime<Utc>,
}

impl Subcategory {
    /// Stored name for a new subcategory
    pub fn compose_name(category: Category, short_name: &str) -> String {
        format!("{}-{}", category.tag(), short_name)
    }

    /// Name without its category prefix
    pub fn display_name(&self) -> &str {
        let prefix_len = self.category.tag().len() + 1;
        match self.name.get(..prefix_len) {
            Some(prefix) if prefix.eq_ignore_ascii_case(&format!("{}-", self.category.tag())) => {
                &self.name[prefix_len..]
            }
            _ => &self.name,
        }
    }
}

/// Subcategory to be created by the store, with `stock = 0`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSubcategory {
    pub item_id: Uuid,
    pub category: Category,
    pub name: String,
    pub minimum: i64,
}

/// Medicine categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Vitamins,
    Vaccine,
    Medicine,
    AntiStress,
    AntiParasite,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Vitamins,
        Category::Vaccine,
        Category::Medicine,
        Category::AntiStress,
        Category::AntiParasite,
    ];

    /// Tag used in URLs and as the stored name prefix
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Vitamins => "vitamins",
            Category::Vaccine => "vaccine",
            Category::Medicine => "medicine",
            Category::AntiStress => "anti-stress",
            Category::AntiParasite => "anti-parasite",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Vitamins => "Vitamins",
            Category::Vaccine => "Vaccine",
            Category::Medicine => "Medicine",
            Category::AntiStress => "Anti-Stress",
            Category::AntiParasite => "Anti-Parasite",
        }
    }

    /// Classify a stored name by case-insensitive prefix.
    ///
    /// Used only for rows that predate the explicit category column. The
    /// longest tag wins so "anti-stress-x" never matches a shorter tag.
    pub fn from_name_prefix(name: &str) -> Option<Category> {
        let lower = name.to_lowercase();
        let mut candidates = Category::ALL;
        candidates.sort_by_key(|c| std::cmp::Reverse(c.tag().len()));
        candidates.into_iter().find(|c| lower.starts_with(c.tag()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// The unit a ledger is kept for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LedgerTarget {
    Item(Uuid),
    Subcategory(Uuid),
}

impl LedgerTarget {
    pub fn id(&self) -> Uuid {
        match self {
            LedgerTarget::Item(id) | LedgerTarget::Subcategory(id) => *id,
        }
    }

    /// Resource name used in not-found messages
    pub fn resource(&self) -> &'static str {
        match self {
            LedgerTarget::Item(_) => "Item",
            LedgerTarget::Subcategory(_) => "Subcategory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subcategory(category: Category, name: &str) -> Subcategory {
        Subcategory {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            category,
            name: name.to_string(),
            stock: 0,
            minimum: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_compose_and_strip_name() {
        let name = Subcategory::compose_name(Category::Vitamins, "B12");
        assert_eq!(name, "vitamins-B12");
        assert_eq!(subcategory(Category::Vitamins, &name).display_name(), "B12");
    }

    #[test]
    fn test_display_name_keeps_hyphenated_short_names() {
        let sub = subcategory(Category::AntiStress, "Anti-Stress-electro-lytes");
        assert_eq!(sub.display_name(), "electro-lytes");
    }

    #[test]
    fn test_prefix_classification_prefers_longest_tag() {
        assert_eq!(Category::from_name_prefix("Vitamins-B12"), Some(Category::Vitamins));
        assert_eq!(Category::from_name_prefix("anti-parasite-ivermectin"), Some(Category::AntiParasite));
        assert_eq!(Category::from_name_prefix("medicine-amoxil"), Some(Category::Medicine));
        assert_eq!(Category::from_name_prefix("feed-x"), None);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("anti-stress".parse::<Category>(), Ok(Category::AntiStress));
        assert_eq!("VACCINE".parse::<Category>(), Ok(Category::Vaccine));
        assert!("minerals".parse::<Category>().is_err());
    }

    #[test]
    fn test_item_labels() {
        assert_eq!(item_label("oilcakes"), "Oil Cakes");
        assert_eq!(item_label("maize"), "Maize");
        assert_eq!(item_label(""), "");
    }
}
