//! Catalog snapshot held by a storefront session.

use boutique_core::{CategoryId, ProductId, find_by_id};

use crate::filter::ProductQuery;
use crate::product::{Category, Product};
use crate::source::{CatalogError, CatalogSource};

/// What the storefront can currently sell: active, in-stock products and
/// active categories, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a snapshot, dropping inactive and out-of-stock products and
    /// inactive categories.
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        let products: Vec<Product> = products.into_iter().filter(Product::is_purchasable).collect();
        let categories: Vec<Category> = categories.into_iter().filter(|c| c.active).collect();
        Self {
            products,
            categories,
        }
    }

    /// Fetch products and categories from `source`.
    ///
    /// Any failure is returned unchanged; no partial catalog is produced.
    pub fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        let products = source.fetch_products()?;
        let categories = source.fetch_categories()?;
        let fetched = products.len();
        let catalog = Self::new(products, categories);
        tracing::debug!(
            fetched,
            listed = catalog.products.len(),
            categories = catalog.categories.len(),
            "catalog snapshot built"
        );
        Ok(catalog)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        find_by_id(&self.products, &id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        find_by_id(&self.categories, &id)
    }

    pub fn filter(&self, query: &ProductQuery) -> Vec<Product> {
        query.apply(&self.products)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::CategoryFilter;
    use crate::product::CategoryRef;
    use crate::source::InMemoryCatalogSource;
    use boutique_core::Money;

    fn product(id: u64, name: &str, stock: u32, active: bool) -> Product {
        let mut p = Product::new(
            ProductId::new(id),
            name,
            CategoryRef::new(CategoryId::new(1)),
            Money::from_major(100),
            stock,
        );
        p.active = active;
        p
    }

    #[test]
    fn load_keeps_only_purchasable_products_in_order() {
        let mut inactive_category = Category::new(CategoryId::new(2), "Archivo");
        inactive_category.active = false;
        let source = InMemoryCatalogSource::new(
            vec![
                product(1, "Camisa", 3, true),
                product(2, "Agotado", 0, true),
                product(3, "Oculto", 9, false),
                product(4, "Vestido", 1, true),
            ],
            vec![Category::new(CategoryId::new(1), "Camisas"), inactive_category],
        );

        let catalog = Catalog::load(&source).unwrap();
        let ids: Vec<u64> = catalog.products().iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(catalog.categories().len(), 1);
        assert!(catalog.product(ProductId::new(2)).is_none());
        assert!(catalog.category(CategoryId::new(1)).is_some());
    }

    #[test]
    fn load_propagates_source_failure() {
        let mut source = InMemoryCatalogSource::default();
        source.fail_with("timeout");
        let err = Catalog::load(&source).unwrap_err();
        assert_eq!(err, CatalogError::products("timeout"));
    }

    #[test]
    fn filter_uses_snapshot() {
        let catalog = Catalog::new(
            vec![product(1, "Camisa Formal", 2, true), product(2, "Vestido", 2, true)],
            Vec::new(),
        );
        let out = catalog.filter(&ProductQuery::new("vest", CategoryFilter::All));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, ProductId::new(2));
    }
}
