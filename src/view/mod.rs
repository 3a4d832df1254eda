//! LocalView - the agent-owned snapshot cache
//!
//! The server is the source of truth; this is the agent's working copy for
//! one tick. It is refreshed wholesale from each snapshot and then mutated
//! only by the build/move requests made during the same decision pass, so
//! a unit processed later in the pass observes the claims of units
//! processed earlier. It may legitimately diverge from the server between
//! synchronizations.

use ahash::AHashMap;

use crate::actions::{ActionKind, QueuedAction};
use crate::core::config::AgentConfig;
use crate::core::error::{AgentError, Result};
use crate::core::types::{EntityId, Team, Tick};
use crate::decision::DecisionContext;
use crate::entity::{Entity, MarkerState, UnitState};
use crate::map::{Direction, GameMap, Location, SectorControl, Terrain};
use crate::transport::Snapshot;

/// Speculative markers placed this tick get ids from a reserved range so
/// they can never collide with server-assigned ids; the next snapshot
/// replaces them with the real thing.
const SPECULATIVE_ID_BASE: u32 = 0x8000_0000;

pub struct LocalView {
    map: GameMap,
    my_team: Team,
    tick: Tick,
    entities: AHashMap<EntityId, Entity>,
    /// Snapshot iteration order; order-stable within a tick
    order: Vec<EntityId>,
    occupied: AHashMap<Location, EntityId>,
    queued: Vec<QueuedAction>,
    next_speculative_id: u32,
    config: AgentConfig,
}

impl LocalView {
    pub fn new(my_team: Team, config: AgentConfig) -> Self {
        Self {
            map: GameMap::new(0, 0, config.sector_size.max(1)),
            my_team,
            tick: 0,
            entities: AHashMap::new(),
            order: Vec::new(),
            occupied: AHashMap::new(),
            queued: Vec::new(),
            next_speculative_id: SPECULATIVE_ID_BASE,
            config,
        }
    }

    /// Replace the cached state with a fresh snapshot
    ///
    /// Discards speculative entities and any unsubmitted queued actions.
    pub fn refresh(&mut self, snapshot: &Snapshot) {
        self.map = snapshot.map.clone();
        self.tick = snapshot.tick;
        self.entities.clear();
        self.order.clear();
        self.occupied.clear();
        self.queued.clear();
        self.next_speculative_id = SPECULATIVE_ID_BASE;
        for entity in &snapshot.entities {
            self.entities.insert(entity.id(), *entity);
            self.order.push(entity.id());
            self.occupied.insert(entity.location(), entity.id());
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn my_team(&self) -> Team {
        self.my_team
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    /// Ids of the agent's units, in snapshot order
    ///
    /// A finite sequence produced once per call over the fixed snapshot;
    /// non-unit owned entities are excluded here, not at the call sites.
    pub fn owned_units(&self) -> Vec<EntityId> {
        self.order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|e| e.team() == self.my_team && e.is_unit())
            .map(|e| e.id())
            .collect()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn unit(&self, id: EntityId) -> Option<&UnitState> {
        self.entities.get(&id).and_then(Entity::as_unit)
    }

    pub fn is_occupied(&self, location: Location) -> bool {
        self.occupied.contains_key(&location)
    }

    /// Control status of a tile from a viewer team's perspective
    pub fn sector_control(&self, viewer: Team, location: Location) -> Result<SectorControl> {
        self.map.control_from(viewer, location)
    }

    /// Whether a unit may build toward `direction` this tick
    ///
    /// Necessary but not sufficient: the build itself can still be
    /// refused (see [`LocalView::build`]).
    pub fn can_build(&self, id: EntityId, direction: Direction) -> bool {
        // Same preconditions as movement: actor ready, target on-map and free
        self.can_move(id, direction)
    }

    pub fn can_move(&self, id: EntityId, direction: Direction) -> bool {
        let Some(unit) = self.unit(id) else {
            return false;
        };
        if !unit.can_act(self.tick) {
            return false;
        }
        let target = unit.location.offset(direction);
        self.map.contains(target) && !self.is_occupied(target)
    }

    /// Request a build; `Ok(true)` queues it and applies it speculatively
    ///
    /// Fails with `NotPermitted` when called without a prior passing
    /// permission check. Returns `Ok(false)` when the build is permitted
    /// but the engine refuses it (unclaimable footing); callers treat
    /// that as a recoverable miss.
    pub fn build(&mut self, id: EntityId, direction: Direction) -> Result<bool> {
        let unit = match self.unit(id) {
            Some(u) if u.can_act(self.tick) => *u,
            _ => {
                return Err(AgentError::NotPermitted {
                    unit: id,
                    action: "build",
                    direction,
                })
            }
        };
        let target = unit.location.offset(direction);
        if !self.map.contains(target) || self.is_occupied(target) {
            return Err(AgentError::NotPermitted {
                unit: id,
                action: "build",
                direction,
            });
        }
        if self.map.terrain_at(target)? == Terrain::Dirt {
            // Permitted but the footing cannot hold a marker
            return Ok(false);
        }

        self.queued.push(QueuedAction {
            unit: id,
            kind: ActionKind::Build(direction),
        });
        let marker_id = EntityId(self.next_speculative_id);
        self.next_speculative_id += 1;
        self.entities.insert(
            marker_id,
            Entity::Marker(MarkerState {
                id: marker_id,
                team: unit.team,
                location: target,
            }),
        );
        self.order.push(marker_id);
        self.occupied.insert(target, marker_id);
        if let Some(Entity::Unit(u)) = self.entities.get_mut(&id) {
            u.cooldown_until = self.tick + self.config.build_cooldown;
        }
        Ok(true)
    }

    /// Request a move; `Ok(true)` queues it and applies it speculatively
    pub fn move_unit(&mut self, id: EntityId, direction: Direction) -> Result<bool> {
        let unit = match self.unit(id) {
            Some(u) if u.can_act(self.tick) => *u,
            _ => {
                return Err(AgentError::NotPermitted {
                    unit: id,
                    action: "move",
                    direction,
                })
            }
        };
        let target = unit.location.offset(direction);
        if !self.map.contains(target) || self.is_occupied(target) {
            return Err(AgentError::NotPermitted {
                unit: id,
                action: "move",
                direction,
            });
        }

        self.queued.push(QueuedAction {
            unit: id,
            kind: ActionKind::Move(direction),
        });
        self.occupied.remove(&unit.location);
        self.occupied.insert(target, id);
        if let Some(Entity::Unit(u)) = self.entities.get_mut(&id) {
            u.location = target;
            u.cooldown_until = self.tick + self.config.move_cooldown;
        }
        Ok(true)
    }

    /// Entities within `range` tiles of a unit, excluding the unit itself
    ///
    /// Sorted by squared distance, then location (y, x), then id: a
    /// deterministic total order, so "nearest" never depends on hash or
    /// snapshot ordering.
    pub fn nearby_entities(&self, id: EntityId, range: i32) -> Vec<Entity> {
        let Some(unit) = self.unit(id) else {
            return Vec::new();
        };
        let origin = unit.location;
        let range_squared = (range as i64) * (range as i64);
        let mut found: Vec<Entity> = self
            .order
            .iter()
            .filter_map(|eid| self.entities.get(eid))
            .filter(|e| e.id() != id && origin.distance_squared(e.location()) <= range_squared)
            .copied()
            .collect();
        found.sort_by_key(|e| {
            (
                origin.distance_squared(e.location()),
                e.location().y,
                e.location().x,
                e.id(),
            )
        });
        found
    }

    /// Take this tick's committed actions for submission
    pub fn drain_actions(&mut self) -> Vec<QueuedAction> {
        std::mem::take(&mut self.queued)
    }

    pub fn queued_actions(&self) -> &[QueuedAction] {
        &self.queued
    }
}

impl DecisionContext for LocalView {
    fn sector_control(&self, viewer: Team, location: Location) -> Result<SectorControl> {
        LocalView::sector_control(self, viewer, location)
    }

    fn can_build(&self, unit: EntityId, direction: Direction) -> bool {
        LocalView::can_build(self, unit, direction)
    }

    fn build(&mut self, unit: EntityId, direction: Direction) -> Result<bool> {
        LocalView::build(self, unit, direction)
    }

    fn can_move(&self, unit: EntityId, direction: Direction) -> bool {
        LocalView::can_move(self, unit, direction)
    }

    fn move_unit(&mut self, unit: EntityId, direction: Direction) -> Result<bool> {
        LocalView::move_unit(self, unit, direction)
    }

    fn nearby_entities(&self, unit: EntityId, range: i32) -> Vec<Entity> {
        LocalView::nearby_entities(self, unit, range)
    }
}
