//! Marker trait for records addressed by a typed id.

pub trait Entity {
    /// The id newtype this record is keyed by.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
