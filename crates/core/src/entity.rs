//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Ledger transactions are entities: they keep their identity while their status
/// moves from pending to a terminal state, but they carry no version of their own.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
