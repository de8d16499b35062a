use serde::{Deserialize, Deserializer, Serialize};

use boutique_core::{CategoryId, Entity, Money, ProductId};

/// Image shown when a product has none.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1546069901-ba9599a7e63c?w=400&h=500&fit=crop";

const UPLOADS_PREFIX: &str = "/uploads/productos/";

fn default_active() -> bool {
    true
}

/// Stock as sent by the catalog feed: a number, a numeric string or null.
fn lenient_stock<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    fn from_f64(value: f64) -> u32 {
        if value.is_finite() && value > 0.0 {
            value.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    }

    let stock = match Option::<Raw>::deserialize(deserializer)? {
        None => 0,
        Some(Raw::Integer(n)) => u32::try_from(n.max(0)).unwrap_or(u32::MAX),
        Some(Raw::Float(v)) => from_f64(v),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().map_or(0, from_f64),
    };
    Ok(stock)
}

/// Category (or subcategory when `parent` is set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Grouping category; only used for display filtering.
    #[serde(default)]
    pub parent: Option<CategoryId>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            parent: None,
            active: true,
        }
    }

    pub fn with_parent(mut self, parent: CategoryId) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// The category a product is filed under, plus its parent grouping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    #[serde(default)]
    pub parent: Option<CategoryId>,
}

impl CategoryRef {
    pub fn new(id: CategoryId) -> Self {
        Self { id, parent: None }
    }

    /// True when either the category itself or its parent is `id`.
    pub fn belongs_to(&self, id: CategoryId) -> bool {
        self.id == id || self.parent == Some(id)
    }
}

/// A purchasable product, as supplied by the catalog source.
///
/// Immutable from the cart's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: CategoryRef,
    pub price: Money,
    /// Units available. Missing, null, negative or non-numeric in the feed
    /// means none.
    #[serde(default, deserialize_with = "lenient_stock")]
    pub stock: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        category: CategoryRef,
        price: Money,
        stock: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            category,
            price,
            stock,
            size: None,
            image: None,
            active: true,
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Listed in the storefront: active and with stock left.
    pub fn is_purchasable(&self) -> bool {
        self.active && self.is_in_stock()
    }

    /// "Last units" badge.
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock <= threshold
    }

    /// Resolve the image to an absolute URL against the catalog service.
    ///
    /// Absolute URLs pass through; upload paths (with or without the
    /// `/uploads/productos/` prefix) are rebased onto `api_base`.
    pub fn image_url(&self, api_base: &str) -> String {
        let image = match self.image.as_deref().map(str::trim) {
            Some(image) if !image.is_empty() => image,
            _ => return PLACEHOLDER_IMAGE_URL.to_string(),
        };
        if image.starts_with("http") {
            return image.to_string();
        }
        let filename = image.strip_prefix(UPLOADS_PREFIX).unwrap_or(image);
        format!("{}{}{}", api_base.trim_end_matches('/'), UPLOADS_PREFIX, filename)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shirt() -> Product {
        Product::new(
            ProductId::new(1),
            "Camisa Formal",
            CategoryRef::new(CategoryId::new(10)),
            Money::from_major(120),
            15,
        )
    }

    #[test]
    fn image_url_uses_placeholder_when_missing() {
        let mut p = shirt();
        assert_eq!(p.image_url("http://localhost:3000"), PLACEHOLDER_IMAGE_URL);
        p.image = Some("  ".into());
        assert_eq!(p.image_url("http://localhost:3000"), PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn image_url_keeps_absolute_urls() {
        let mut p = shirt();
        p.image = Some("https://cdn.example.com/a.jpg".into());
        assert_eq!(p.image_url("http://localhost:3000"), "https://cdn.example.com/a.jpg");
    }

    #[test]
    fn image_url_rebases_upload_paths() {
        let mut p = shirt();
        p.image = Some("/uploads/productos/camisa.png".into());
        assert_eq!(
            p.image_url("http://localhost:3000/"),
            "http://localhost:3000/uploads/productos/camisa.png"
        );
        p.image = Some("camisa.png".into());
        assert_eq!(
            p.image_url("http://localhost:3000"),
            "http://localhost:3000/uploads/productos/camisa.png"
        );
    }

    #[test]
    fn low_stock_threshold_is_inclusive() {
        let mut p = shirt();
        p.stock = 5;
        assert!(p.is_low_stock(5));
        p.stock = 6;
        assert!(!p.is_low_stock(5));
    }

    #[test]
    fn feed_defaults_missing_stock_to_zero() {
        let json = r#"{
            "id": 3,
            "name": "Vestido Casual",
            "category": { "id": 4, "parent": 1 },
            "price": "250.00"
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.stock, 0);
        assert!(p.active);
        assert!(!p.is_purchasable());
        assert!(p.category.belongs_to(CategoryId::new(1)));
        assert!(p.category.belongs_to(CategoryId::new(4)));
        assert!(!p.category.belongs_to(CategoryId::new(2)));
    }
}
