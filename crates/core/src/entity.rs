//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Index of the entity with `id` in `entities`, if present.
pub fn position_of<E: Entity>(entities: &[E], id: &E::Id) -> Option<usize> {
    entities.iter().position(|e| e.id() == id)
}
