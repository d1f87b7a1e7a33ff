//! Menu Item Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Menu section a dish is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuCategory {
    Signatures,
    Vegetarian,
    Sides,
    Drinks,
    Combos,
    Extras,
}

impl MenuCategory {
    pub const ALL: [MenuCategory; 6] = [
        MenuCategory::Signatures,
        MenuCategory::Vegetarian,
        MenuCategory::Sides,
        MenuCategory::Drinks,
        MenuCategory::Combos,
        MenuCategory::Extras,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signatures => "signatures",
            Self::Vegetarian => "vegetarian",
            Self::Sides => "sides",
            Self::Drinks => "drinks",
            Self::Combos => "combos",
            Self::Extras => "extras",
        }
    }
}

impl fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown menu category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for MenuCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Category filter accepted by menu listings
///
/// `dessert` is offered by the menu page but no item is ever stored under it,
/// so it parses to a filter that matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(MenuCategory),
    Dessert,
}

impl CategoryFilter {
    pub fn matches(&self, category: MenuCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => *c == category,
            Self::Dessert => false,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "dessert" | "desserts" => Ok(Self::Dessert),
            _ => s.parse().map(Self::Only),
        }
    }
}

/// Menu item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: MenuCategory,
    pub is_vegetarian: bool,
    pub is_spicy: bool,
    pub is_gluten_free: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: MenuCategory,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_spicy: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<MenuCategory>,
    pub is_vegetarian: Option<bool>,
    pub is_spicy: Option<bool>,
    pub is_gluten_free: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "signatures".parse::<MenuCategory>(),
            Ok(MenuCategory::Signatures)
        );
        assert_eq!(" Drinks ".parse::<MenuCategory>(), Ok(MenuCategory::Drinks));
        assert!("dessert".parse::<MenuCategory>().is_err());
        assert!("pizza".parse::<MenuCategory>().is_err());
    }

    #[test]
    fn test_category_serde_rejects_unknown() {
        let c: MenuCategory = serde_json::from_str("\"combos\"").unwrap();
        assert_eq!(c, MenuCategory::Combos);
        assert!(serde_json::from_str::<MenuCategory>("\"dessert\"").is_err());
    }

    #[test]
    fn test_filter_dessert_matches_nothing() {
        let filter: CategoryFilter = "dessert".parse().unwrap();
        assert_eq!(filter, CategoryFilter::Dessert);
        assert!(MenuCategory::ALL.iter().all(|c| !filter.matches(*c)));
    }

    #[test]
    fn test_filter_all_and_single() {
        let all: CategoryFilter = "all".parse().unwrap();
        assert!(MenuCategory::ALL.iter().all(|c| all.matches(*c)));

        let sides: CategoryFilter = "sides".parse().unwrap();
        assert!(sides.matches(MenuCategory::Sides));
        assert!(!sides.matches(MenuCategory::Drinks));

        assert!("soup".parse::<CategoryFilter>().is_err());
    }
}
