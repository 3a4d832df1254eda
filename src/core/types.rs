//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for entities, assigned by the authoritative server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Team identifier
///
/// Two teams exist per match plus the implicit neutral "nobody",
/// modeled as `Option<Team>` on sector ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team(pub u8);

impl Team {
    pub fn new(id: u8) -> Self {
        Self(id)
    }
}
