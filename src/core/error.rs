use thiserror::Error;

use crate::core::types::EntityId;
use crate::map::{Direction, Location};

#[derive(Error, Debug)]
pub enum AgentError {
    /// A tile query landed outside the map. Recovered locally by the
    /// caller (the scan skips the direction); never fatal to a unit's turn.
    #[error("location out of bounds: {0:?}")]
    OutOfBounds(Location),

    /// An action was requested without a prior successful permission check.
    /// This is a logic defect in the caller and is surfaced, not swallowed.
    #[error("{action} not permitted for unit {unit:?} toward {direction:?}")]
    NotPermitted {
        unit: EntityId,
        action: &'static str,
        direction: Direction,
    },

    /// The engine rejected the accumulated turn actions (e.g., stale snapshot).
    /// Fatal for the tick; the turn loop does not retry.
    #[error("turn submission rejected: {0}")]
    TurnRejected(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
