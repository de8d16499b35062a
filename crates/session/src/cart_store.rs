//! Cart load/save at session boundaries.

use boutique_cart::Cart;

use crate::store::{KeyValueStore, StoreError, load_json, save_json};

pub struct CartStore;

impl CartStore {
    pub const KEY: &'static str = "cart";

    /// The saved cart, or a fresh empty one when nothing was saved.
    ///
    /// Saved lines are re-normalized on decode (quantities clamped to the
    /// stored stock, duplicates merged).
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Cart, StoreError> {
        let cart = load_json::<Cart, _>(store, Self::KEY)?;
        Ok(cart.unwrap_or_default())
    }

    pub fn save<S: KeyValueStore + ?Sized>(store: &mut S, cart: &Cart) -> Result<(), StoreError> {
        save_json(store, Self::KEY, cart)
    }

    pub fn discard<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
        store.remove(Self::KEY)
    }
}
