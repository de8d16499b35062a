use anyhow::Context;
use chrono::Utc;

use boutique_cart::{Adjustment, Cart, CartError, CartTotals, CheckoutSummary, Receipt};
use boutique_catalog::{
    Catalog, CatalogError, CatalogSource, Category, CategoryFilter, Product, ProductQuery,
};
use boutique_core::ProductId;
use boutique_session::{CartStore, KeyValueStore};

use crate::config::StorefrontConfig;

/// One shopper's session: catalog snapshot, filter state and cart.
#[derive(Debug, Clone)]
pub struct Storefront {
    config: StorefrontConfig,
    catalog: Catalog,
    catalog_loaded: bool,
    query: ProductQuery,
    cart: Cart,
    last_error: Option<CatalogError>,
}

impl Storefront {
    pub fn new(config: StorefrontConfig) -> Self {
        Self {
            config,
            catalog: Catalog::default(),
            catalog_loaded: false,
            query: ProductQuery::default(),
            cart: Cart::default(),
            last_error: None,
        }
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────

    /// Reload the catalog and re-check the cart against it.
    ///
    /// On failure the previous catalog stays in place and the error is kept
    /// for display until the next successful refresh.
    pub fn refresh(&mut self, source: &dyn CatalogSource) -> Result<Vec<Adjustment>, CatalogError> {
        let catalog = match Catalog::load(source) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(error = %err, "catalog refresh failed");
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        self.catalog = catalog;
        self.catalog_loaded = true;
        self.last_error = None;

        let adjustments = self.cart.reconcile(&self.catalog);
        tracing::info!(
            products = self.catalog.products().len(),
            categories = self.catalog.categories().len(),
            cart_adjustments = adjustments.len(),
            "catalog refreshed"
        );
        Ok(adjustments)
    }

    pub fn last_error(&self) -> Option<&CatalogError> {
        self.last_error.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn categories(&self) -> &[Category] {
        self.catalog.categories()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Search & category selection
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.query.text = text.into();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.query.category = category;
    }

    pub fn query(&self) -> &ProductQuery {
        &self.query
    }

    pub fn visible_products(&self) -> Vec<Product> {
        self.catalog.filter(&self.query)
    }

    pub fn is_low_stock(&self, product: &Product) -> bool {
        product.is_low_stock(self.config.low_stock_threshold)
    }

    pub fn image_url(&self, product: &Product) -> String {
        product.image_url(&self.config.api_url)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cart
    // ─────────────────────────────────────────────────────────────────────

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    /// Add one unit of a listed product. Ids not in the catalog are ignored.
    pub fn add_to_cart(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let Some(product) = self.catalog.product(product_id) else {
            tracing::debug!(%product_id, "add ignored: product not listed");
            return Ok(());
        };
        self.cart.add(product).inspect_err(log_rejection)
    }

    pub fn increase(&mut self, product_id: ProductId) -> Result<(), CartError> {
        self.cart.increase(product_id).inspect_err(log_rejection)
    }

    pub fn decrease(&mut self, product_id: ProductId) {
        self.cart.decrease(product_id);
    }

    pub fn remove(&mut self, product_id: ProductId) {
        self.cart.remove(product_id);
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────

    pub fn begin_checkout(&self) -> Option<CheckoutSummary> {
        CheckoutSummary::begin(&self.cart)
    }

    pub fn confirm_checkout(&mut self, summary: CheckoutSummary) -> Receipt {
        let receipt = summary.confirm(&mut self.cart, Utc::now());
        tracing::info!(
            count = receipt.count,
            total = %receipt.total,
            "checkout confirmed"
        );
        receipt
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session boundaries
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the cart with the one saved in `store` (empty if none).
    ///
    /// When a catalog is already loaded the restored cart is reconciled
    /// against it right away and the resulting adjustments are returned.
    pub fn restore_cart<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> anyhow::Result<Vec<Adjustment>> {
        let mut cart = CartStore::load(store).context("failed to restore cart from session")?;
        let adjustments = if self.catalog_loaded {
            cart.reconcile(&self.catalog)
        } else {
            Vec::new()
        };
        tracing::info!(
            lines = cart.lines().len(),
            cart_adjustments = adjustments.len(),
            "cart restored"
        );
        self.cart = cart;
        Ok(adjustments)
    }

    pub fn persist_cart<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> anyhow::Result<()> {
        CartStore::save(store, &self.cart).context("failed to persist cart to session")?;
        tracing::debug!(lines = self.cart.lines().len(), "cart persisted");
        Ok(())
    }
}

fn log_rejection(err: &CartError) {
    tracing::info!(error = %err, "cart change rejected");
}
