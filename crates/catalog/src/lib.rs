//! Catalog domain module.
//!
//! Products, categories, the catalog filter used by the storefront grid, the
//! seam to the external catalog service, and admin-side product management.
//! Everything here is deterministic domain logic (no IO, no HTTP).

pub mod admin;
pub mod catalog;
pub mod filter;
pub mod product;
pub mod source;

pub use admin::{ProductAdmin, ProductForm};
pub use catalog::Catalog;
pub use filter::{CategoryFilter, ProductQuery, filter};
pub use product::{Category, CategoryRef, PLACEHOLDER_IMAGE_URL, Product};
pub use source::{CatalogError, CatalogFeed, CatalogSource, InMemoryCatalogSource, JsonCatalogSource};
