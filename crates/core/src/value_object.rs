//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity: two instances with the same attribute
/// values are interchangeable (`Money`, `CategoryFilter`, a cart total).
/// To "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
