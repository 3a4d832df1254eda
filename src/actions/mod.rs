//! Committed action definitions
//!
//! The turn loop accumulates these over a tick and submits them as one
//! turn. They are wire payloads toward the transport, not engine state.

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;
use crate::map::Direction;

/// What a unit committed to this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Place a territorial marker on the adjacent tile
    Build(Direction),
    /// Step onto the adjacent tile
    Move(Direction),
}

/// One unit's committed action, queued for submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub unit: EntityId,
    pub kind: ActionKind,
}
