//! Tagged entity model
//!
//! The wire protocol describes every board object as an "entity"; what it
//! can do is a property of its kind, not a runtime capability query. A
//! unit acts; a marker only stands and counts toward sector control.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Team, Tick};
use crate::map::Location;

/// An agent-controllable unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    pub id: EntityId,
    pub team: Team,
    pub location: Location,
    /// First tick at which the unit may act again
    pub cooldown_until: Tick,
}

impl UnitState {
    /// Whether the unit may act this tick
    pub fn can_act(&self, now: Tick) -> bool {
        now >= self.cooldown_until
    }
}

/// A territorial marker; never acts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerState {
    pub id: EntityId,
    pub team: Team,
    pub location: Location,
}

/// Any board object known to the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Unit(UnitState),
    Marker(MarkerState),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Unit(u) => u.id,
            Entity::Marker(m) => m.id,
        }
    }

    pub fn team(&self) -> Team {
        match self {
            Entity::Unit(u) => u.team,
            Entity::Marker(m) => m.team,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Entity::Unit(u) => u.location,
            Entity::Marker(m) => m.location,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Entity::Unit(_))
    }

    pub fn as_unit(&self) -> Option<&UnitState> {
        match self {
            Entity::Unit(u) => Some(u),
            Entity::Marker(_) => None,
        }
    }
}
