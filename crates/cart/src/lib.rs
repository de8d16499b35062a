//! Cart Ledger domain module.
//!
//! The cart owns the stock invariant: every line holds `0 < quantity <= stock`
//! and no product appears on two lines. Mutations go through
//! `handle`/`apply`; a rejected command leaves the cart untouched.

pub mod cart;
pub mod checkout;

pub use cart::{Adjustment, Cart, CartCommand, CartError, CartEvent, CartLine, CartTotals};
pub use checkout::{CheckoutLine, CheckoutSummary, Receipt};
