//! `boutique-storefront`: one shopping session wired together.
//!
//! Holds the catalog snapshot, the shopper's search/category selection and
//! cart, and moves the cart in and out of the session store at explicit
//! boundaries. Single-threaded and synchronous: each call runs to completion.

pub mod config;
pub mod storefront;

pub use config::{ConfigError, StorefrontConfig};
pub use storefront::Storefront;
