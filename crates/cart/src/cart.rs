use serde::{Deserialize, Serialize};
use thiserror::Error;

use boutique_catalog::{Catalog, Product};
use boutique_core::{Aggregate, AggregateRoot, CartId, Money, ProductId, ValueObject};

/// Reportable cart condition, surfaced to the caller for user notification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The requested quantity increase would exceed available stock.
    #[error("out of stock: product {product_id} has only {stock} units available")]
    OutOfStock { product_id: ProductId, stock: u32 },
}

impl CartError {
    fn out_of_stock(product: &Product) -> Self {
        Self::OutOfStock {
            product_id: product.id,
            stock: product.stock,
        }
    }
}

/// One product-quantity pair within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product as of the last stock check.
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    pub fn subtotal(&self) -> Money {
        self.product.price.times(self.quantity)
    }

    pub fn is_at_stock_limit(&self) -> bool {
        self.quantity >= self.product.stock
    }
}

/// Derived cart figures.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub count: u32,
    pub total: Money,
}

impl ValueObject for CartTotals {}

/// Change made to a line while reconciling against a refreshed catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    /// Stock dropped below the quantity in the cart.
    Clamped { product_id: ProductId, from: u32, to: u32 },
    /// The product is no longer sold.
    Removed { product_id: ProductId },
}

/// Command: operations a session can request on its cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    Add(Product),
    Increase(ProductId),
    Decrease(ProductId),
    Remove(ProductId),
    Clear,
}

/// Event: what a command did to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    LineAdded { product: Product },
    QuantityIncreased { product_id: ProductId },
    QuantityDecreased { product_id: ProductId },
    LineRemoved { product_id: ProductId },
    /// Product snapshot and quantity replaced after a fresh stock check.
    LineRefreshed { product: Product, quantity: u32 },
    Cleared,
}

/// Aggregate root: Cart.
///
/// # Invariants
/// - every line satisfies `0 < quantity <= product.stock`
/// - no two lines share a product id
/// - lines keep the order in which products were first added
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CartSnapshot")]
pub struct Cart {
    id: CartId,
    lines: Vec<CartLine>,
    version: u64,
}

/// Persisted form of a cart; normalized back into the invariants on load.
#[derive(Deserialize)]
struct CartSnapshot {
    id: CartId,
    #[serde(default)]
    lines: Vec<CartLine>,
    #[serde(default)]
    version: u64,
}

impl From<CartSnapshot> for Cart {
    fn from(snapshot: CartSnapshot) -> Self {
        let mut lines: Vec<CartLine> = Vec::with_capacity(snapshot.lines.len());
        for line in snapshot.lines {
            match lines.iter_mut().find(|l| l.product.id == line.product.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(existing.product.stock);
                }
                None => {
                    let quantity = line.quantity.min(line.product.stock);
                    if quantity > 0 {
                        lines.push(CartLine {
                            product: line.product,
                            quantity,
                        });
                    }
                }
            }
        }
        Self {
            id: snapshot.id,
            lines,
            version: snapshot.version,
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(CartId::new())
    }
}

impl Cart {
    pub fn new(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            version: 0,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    /// Quantity of `product_id` in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, |l| l.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`, creating the line if needed.
    pub fn add(&mut self, product: &Product) -> Result<(), CartError> {
        self.execute(&CartCommand::Add(product.clone())).map(drop)
    }

    /// One more unit of a product already in the cart. Unknown ids are a no-op.
    pub fn increase(&mut self, product_id: ProductId) -> Result<(), CartError> {
        self.execute(&CartCommand::Increase(product_id)).map(drop)
    }

    /// One unit less; the line goes away when it reaches zero. Unknown ids are a no-op.
    pub fn decrease(&mut self, product_id: ProductId) {
        self.apply_infallible(CartCommand::Decrease(product_id));
    }

    pub fn remove(&mut self, product_id: ProductId) {
        self.apply_infallible(CartCommand::Remove(product_id));
    }

    pub fn clear(&mut self) {
        self.apply_infallible(CartCommand::Clear);
    }

    /// Σ price × quantity over all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Σ quantity over all lines.
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            count: self.count(),
            total: self.total(),
        }
    }

    /// Re-check every line against a freshly loaded catalog.
    ///
    /// Product snapshots are replaced, quantities above the new stock are
    /// clamped, and lines for products no longer listed are dropped.
    pub fn reconcile(&mut self, catalog: &Catalog) -> Vec<Adjustment> {
        let mut events = Vec::new();
        let mut adjustments = Vec::new();

        for line in &self.lines {
            let product_id = line.product.id;
            match catalog.product(product_id).filter(|p| p.is_in_stock()) {
                None => {
                    events.push(CartEvent::LineRemoved { product_id });
                    adjustments.push(Adjustment::Removed { product_id });
                }
                Some(fresh) => {
                    let quantity = line.quantity.min(fresh.stock);
                    if quantity < line.quantity {
                        adjustments.push(Adjustment::Clamped {
                            product_id,
                            from: line.quantity,
                            to: quantity,
                        });
                    }
                    if *fresh != line.product || quantity != line.quantity {
                        events.push(CartEvent::LineRefreshed {
                            product: fresh.clone(),
                            quantity,
                        });
                    }
                }
            }
        }

        for event in &events {
            self.apply(event);
        }
        adjustments
    }

    fn apply_infallible(&mut self, command: CartCommand) {
        // Decrease, Remove and Clear never fail.
        if let Ok(events) = self.handle(&command) {
            for event in &events {
                self.apply(event);
            }
        }
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product.id == product_id)
    }

    fn handle_add(&self, product: &Product) -> Result<Vec<CartEvent>, CartError> {
        let Some(line) = self.line(product.id) else {
            if !product.is_in_stock() {
                return Err(CartError::out_of_stock(product));
            }
            return Ok(vec![CartEvent::LineAdded {
                product: product.clone(),
            }]);
        };

        if line.quantity >= product.stock {
            return Err(CartError::out_of_stock(product));
        }

        if line.product == *product {
            Ok(vec![CartEvent::QuantityIncreased {
                product_id: product.id,
            }])
        } else {
            Ok(vec![CartEvent::LineRefreshed {
                product: product.clone(),
                quantity: line.quantity + 1,
            }])
        }
    }

    fn handle_increase(&self, product_id: ProductId) -> Result<Vec<CartEvent>, CartError> {
        let Some(line) = self.line(product_id) else {
            return Ok(Vec::new());
        };
        if line.is_at_stock_limit() {
            return Err(CartError::out_of_stock(&line.product));
        }
        Ok(vec![CartEvent::QuantityIncreased { product_id }])
    }

    fn handle_decrease(&self, product_id: ProductId) -> Vec<CartEvent> {
        match self.line(product_id) {
            None => Vec::new(),
            Some(line) if line.quantity <= 1 => vec![CartEvent::LineRemoved { product_id }],
            Some(_) => vec![CartEvent::QuantityDecreased { product_id }],
        }
    }

    fn handle_remove(&self, product_id: ProductId) -> Vec<CartEvent> {
        if self.line(product_id).is_some() {
            vec![CartEvent::LineRemoved { product_id }]
        } else {
            Vec::new()
        }
    }

    fn handle_clear(&self) -> Vec<CartEvent> {
        if self.lines.is_empty() {
            Vec::new()
        } else {
            vec![CartEvent::Cleared]
        }
    }
}

impl AggregateRoot for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = CartError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::LineAdded { product } => {
                self.lines.push(CartLine {
                    product: product.clone(),
                    quantity: 1,
                });
            }
            CartEvent::QuantityIncreased { product_id } => {
                if let Some(line) = self.line_mut(*product_id) {
                    line.quantity += 1;
                }
            }
            CartEvent::QuantityDecreased { product_id } => {
                if let Some(line) = self.line_mut(*product_id) {
                    line.quantity = line.quantity.saturating_sub(1);
                }
            }
            CartEvent::LineRemoved { product_id } => {
                self.lines.retain(|l| l.product.id != *product_id);
            }
            CartEvent::LineRefreshed { product, quantity } => {
                if let Some(line) = self.line_mut(product.id) {
                    line.product = product.clone();
                    line.quantity = *quantity;
                }
            }
            CartEvent::Cleared => {
                self.lines.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::Add(product) => self.handle_add(product),
            CartCommand::Increase(id) => self.handle_increase(*id),
            CartCommand::Decrease(id) => Ok(self.handle_decrease(*id)),
            CartCommand::Remove(id) => Ok(self.handle_remove(*id)),
            CartCommand::Clear => Ok(self.handle_clear()),
        }
    }
}
