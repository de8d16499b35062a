//! Admin-side product management over an in-memory product list.

use serde::{Deserialize, Serialize};

use boutique_core::{CategoryId, DomainError, DomainResult, Money, ProductId, find_by_id};

use crate::product::{Category, CategoryRef, Product};

/// Product form as typed into the admin screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    /// Category id, as selected in the form.
    pub category: String,
    pub price: String,
    pub stock: String,
    pub size: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidProduct {
    name: String,
    category: CategoryId,
    price: Money,
    stock: u32,
    size: String,
}

impl ProductForm {
    fn validate(&self) -> DomainResult<ValidProduct> {
        let required = [
            ("name", &self.name),
            ("category", &self.category),
            ("price", &self.price),
            ("stock", &self.stock),
            ("size", &self.size),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(DomainError::validation(format!("{field} is required")));
        }

        let stock = self
            .stock
            .trim()
            .parse::<u32>()
            .map_err(|_| DomainError::validation("stock must be a non-negative integer"))?;

        Ok(ValidProduct {
            name: self.name.trim().to_string(),
            category: self.category.parse()?,
            price: Money::parse(&self.price)?,
            stock,
            size: self.size.trim().to_string(),
        })
    }
}

/// Ordered product list with id allocation, as managed from the admin screen.
#[derive(Debug, Clone)]
pub struct ProductAdmin {
    products: Vec<Product>,
    categories: Vec<Category>,
    /// `None` once the id after `u64::MAX` would be needed.
    next_id: Option<u64>,
}

impl Default for ProductAdmin {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl ProductAdmin {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        let next_id = match products.iter().map(|p| p.id.get()).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        Self {
            products,
            categories,
            next_id,
        }
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        find_by_id(&self.products, &id)
    }

    pub fn create(&mut self, form: &ProductForm) -> DomainResult<Product> {
        let valid = form.validate()?;
        let category = self.category_ref(valid.category)?;

        let id = self
            .next_id
            .ok_or_else(|| DomainError::validation("product id space exhausted"))?;
        self.next_id = id.checked_add(1);
        let id = ProductId::new(id);

        let mut product = Product::new(id, valid.name, category, valid.price, valid.stock);
        product.size = Some(valid.size);
        self.products.push(product.clone());
        Ok(product)
    }

    /// Replace the form-editable fields; image, description and status are kept.
    pub fn update(&mut self, id: ProductId, form: &ProductForm) -> DomainResult<Product> {
        let valid = form.validate()?;
        let category = self.category_ref(valid.category)?;

        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found("product", id))?;
        product.name = valid.name;
        product.category = category;
        product.price = valid.price;
        product.stock = valid.stock;
        product.size = Some(valid.size);
        Ok(product.clone())
    }

    /// Returns whether a product was removed.
    pub fn delete(&mut self, id: ProductId) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        before != self.products.len()
    }

    fn category_ref(&self, id: CategoryId) -> DomainResult<CategoryRef> {
        find_by_id(&self.categories, &id)
            .map(|c| CategoryRef {
                id: c.id,
                parent: c.parent,
            })
            .ok_or_else(|| DomainError::validation(format!("unknown category {id}")))
    }
}
