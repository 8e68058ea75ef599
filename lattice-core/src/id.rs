//! Arena identifiers for entity graph nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable identifier for a node in the entity graph arena.
///
/// Parent links store an `EntityId` rather than a live reference, which keeps
/// the graph acyclic-safe and serializable even when relationships form
/// diamonds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(usize);

impl EntityId {
    /// Create an id from an arena index
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Get the arena index backing this id
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for EntityId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<EntityId> for usize {
    fn from(id: EntityId) -> Self {
        id.0
    }
}
