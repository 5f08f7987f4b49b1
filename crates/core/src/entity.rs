//! Rows with a stable identity (categories, ledger movements).

/// Something identified by its row id rather than by its attribute values.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Two values are the same entity when their ids match, whatever their
    /// other fields say.
    fn same_entity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
