//! Identity of stored records.

/// A record addressed by a typed id (users, organizations, tasks, audit rows).
///
/// Storage adapters key their tables by `Entity::Id`.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
