//! Records with identity: products, categories, users.

/// Something looked up by id rather than compared by value.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// First entity in `items` with the given id (linear scan).
pub fn find_by_id<'a, E: Entity>(items: &'a [E], id: &E::Id) -> Option<&'a E> {
    items.iter().find(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Row(u8, &'static str);

    impl Entity for Row {
        type Id = u8;

        fn id(&self) -> &u8 {
            &self.0
        }
    }

    #[test]
    fn find_by_id_returns_first_match() {
        let rows = [Row(1, "a"), Row(2, "b"), Row(2, "c")];
        assert_eq!(find_by_id(&rows, &2).map(|r| r.1), Some("b"));
        assert!(find_by_id(&rows, &9).is_none());
    }
}
