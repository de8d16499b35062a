//! Session persistence at explicit boundaries.
//!
//! A session keeps its cart and its signed-in user in a simple key-value
//! store (the browser-storage analogue). Nothing here runs implicitly: callers
//! load at session start and save when they choose to.

pub mod cart_store;
pub mod store;
pub mod users;

pub use cart_store::CartStore;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, load_json, save_json};
pub use users::{AuthError, Registration, Role, User, UserForm, UserRegistry};
