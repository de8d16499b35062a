//! Checkout: freeze what is being paid for, then empty the cart on confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use boutique_core::{Money, ProductId};

use crate::cart::{Cart, CartLine};

/// A cart line as presented for payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub subtotal: Money,
}

impl From<&CartLine> for CheckoutLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            name: line.product.name.clone(),
            unit_price: line.product.price,
            quantity: line.quantity,
            subtotal: line.subtotal(),
        }
    }
}

/// Amount due for a non-empty cart, shown while the customer pays.
///
/// Dropping the summary cancels the checkout; the cart is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub lines: Vec<CheckoutLine>,
    pub count: u32,
    pub total: Money,
}

/// Proof of a confirmed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub lines: Vec<CheckoutLine>,
    pub count: u32,
    pub total: Money,
    pub placed_at: DateTime<Utc>,
}

impl CheckoutSummary {
    /// `None` when the cart is empty: there is nothing to pay for.
    pub fn begin(cart: &Cart) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }
        let totals = cart.totals();
        Some(Self {
            lines: cart.lines().iter().map(CheckoutLine::from).collect(),
            count: totals.count,
            total: totals.total,
        })
    }

    /// Payment confirmed: clear the cart and hand back a receipt.
    pub fn confirm(self, cart: &mut Cart, placed_at: DateTime<Utc>) -> Receipt {
        cart.clear();
        Receipt {
            lines: self.lines,
            count: self.count,
            total: self.total,
            placed_at,
        }
    }
}
