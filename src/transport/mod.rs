//! Boundary to the authoritative game engine
//!
//! Everything past this seam is someone else's state machine. The agent
//! only needs four things from it: the start signal, a snapshot per
//! turn, whose turn it is, and a way to submit the accumulated actions.

pub mod scripted;

use serde::{Deserialize, Serialize};

use crate::actions::QueuedAction;
use crate::core::error::Result;
use crate::core::types::{Team, Tick};
use crate::entity::Entity;
use crate::map::GameMap;

/// Full game state as of the start of a tick
///
/// Snapshots replace the local view wholesale; nothing is patched
/// incrementally. Entity order is stable within a tick but carries no
/// guarantee across ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: Tick,
    pub map: GameMap,
    pub entities: Vec<Entity>,
}

/// Blocking synchronization with the authoritative engine
///
/// All waits are bounded only by the engine's cadence; there are no
/// timeouts at this layer.
pub trait Transport {
    /// Block until the game starts; returns the team this agent plays
    fn wait_for_start(&mut self) -> Result<Team>;

    fn is_game_over(&self) -> bool;

    /// Block until the next turn's snapshot is available
    fn wait_till_next_turn(&mut self) -> Result<Snapshot>;

    fn is_my_turn(&self) -> bool;

    /// Submit the tick's accumulated actions as a single turn
    ///
    /// Fails with `TurnRejected` when the engine refuses the batch
    /// (e.g., a stale snapshot made an action invalid).
    fn submit_turn(&mut self, actions: Vec<QueuedAction>) -> Result<()>;
}
