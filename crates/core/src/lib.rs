//! `boutique-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no rendering, no storage).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::{Entity, find_by_id};
pub use error::{DomainError, DomainResult};
pub use id::{CartId, CategoryId, ProductId, UserId};
pub use money::Money;
pub use value_object::ValueObject;
