//! Seam to the external catalog service.
//!
//! Retrieval itself (HTTP, retries) lives outside this crate; implementations
//! of [`CatalogSource`] hand over already-decoded products and categories or
//! report the catalog as unavailable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::product::{Category, Product};

/// The external catalog could not supply data.
///
/// Reported unchanged to the caller, which shows it with a retry affordance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog unavailable: could not load {resource}: {reason}")]
    Unavailable {
        resource: &'static str,
        reason: String,
    },
}

impl CatalogError {
    pub fn products(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            resource: "products",
            reason: reason.into(),
        }
    }

    pub fn categories(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            resource: "categories",
            reason: reason.into(),
        }
    }
}

/// Supplier of products and categories, refreshable on demand.
pub trait CatalogSource {
    fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;

    fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError>;
}

/// Fixture-backed source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSource {
    products: Vec<Product>,
    categories: Vec<Category>,
    outage: Option<String>,
}

impl InMemoryCatalogSource {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products,
            categories,
            outage: None,
        }
    }

    /// Make every fetch fail with `reason` until [`Self::restore`] is called.
    pub fn fail_with(&mut self, reason: impl Into<String>) {
        self.outage = Some(reason.into());
    }

    pub fn restore(&mut self) {
        self.outage = None;
    }

    pub fn products_mut(&mut self) -> &mut Vec<Product> {
        &mut self.products
    }
}

impl CatalogSource for InMemoryCatalogSource {
    fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        match &self.outage {
            Some(reason) => Err(CatalogError::products(reason.clone())),
            None => Ok(self.products.clone()),
        }
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        match &self.outage {
            Some(reason) => Err(CatalogError::categories(reason.clone())),
            None => Ok(self.categories.clone()),
        }
    }
}

/// Wire shape of a catalog document: `{ "products": [...], "categories": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFeed {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Source backed by a JSON catalog document (e.g. a cached API response).
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    document: String,
}

impl JsonCatalogSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }

    fn feed(&self) -> Result<CatalogFeed, serde_json::Error> {
        serde_json::from_str(&self.document)
    }
}

impl CatalogSource for JsonCatalogSource {
    fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.feed()
            .map(|feed| feed.products)
            .map_err(|e| CatalogError::products(e.to_string()))
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.feed()
            .map(|feed| feed.categories)
            .map_err(|e| CatalogError::categories(e.to_string()))
    }
}
