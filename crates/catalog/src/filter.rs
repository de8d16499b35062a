//! Catalog filter: free-text search plus category selection.
//!
//! Pure functions of their inputs. Output order always follows input order.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use boutique_core::{CategoryId, DomainError, ValueObject};

use crate::product::Product;

/// Category selector for the storefront grid.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    /// Sentinel: every category.
    #[default]
    All,
    /// Products filed under this category or under one of its subcategories.
    Only(CategoryId),
}

impl ValueObject for CategoryFilter {}

impl CategoryFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => product.category.belongs_to(*id),
        }
    }
}

impl core::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(id) => core::fmt::Display::fmt(id, f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("todos") {
            return Ok(CategoryFilter::All);
        }
        Ok(CategoryFilter::Only(s.parse()?))
    }
}

impl From<CategoryId> for CategoryFilter {
    fn from(value: CategoryId) -> Self {
        CategoryFilter::Only(value)
    }
}

/// Search text + category selection, as held by the storefront view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub text: String,
    pub category: CategoryFilter,
}

impl ValueObject for ProductQuery {}

impl ProductQuery {
    pub fn new(text: impl Into<String>, category: CategoryFilter) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        name_matches(&product.name, &self.text.to_lowercase()) && self.category.matches(product)
    }

    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        filter(products, &self.text, self.category)
    }
}

fn name_matches(name: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || name.to_lowercase().contains(needle_lower)
}

/// Products whose name contains `query` (case-insensitive) and that fall under
/// `category`. An empty query matches every name.
pub fn filter(products: &[Product], query: &str, category: CategoryFilter) -> Vec<Product> {
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| name_matches(&p.name, &needle) && category.matches(p))
        .cloned()
        .collect()
}
