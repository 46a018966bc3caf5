//! Story instance identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one story instance, so independent instances can coexist and
/// be told apart in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(pub Uuid);

impl StoryId {
    /// Create a new random story ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a story ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a nil story ID.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for StoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
