//! In-process authoritative engine for offline play and tests
//!
//! Enforces the same rules the real server would: actions are validated
//! against the authoritative state (not the agent's local view), and a
//! single bad action rejects the whole turn. Sector control is
//! recomputed from marker positions after every accepted turn.

use ahash::AHashMap;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actions::{ActionKind, QueuedAction};
use crate::core::config::AgentConfig;
use crate::core::error::{AgentError, Result};
use crate::core::types::{EntityId, Team, Tick};
use crate::entity::{Entity, MarkerState, UnitState};
use crate::map::{GameMap, Location, Terrain};
use crate::transport::{Snapshot, Transport};

/// Fraction of tiles generated as unclaimable dirt
const DIRT_DENSITY: f64 = 0.08;

pub struct ScriptedEngine {
    map: GameMap,
    entities: Vec<Entity>,
    tick: Tick,
    tick_limit: Tick,
    my_team: Team,
    next_id: u32,
    config: AgentConfig,
}

impl ScriptedEngine {
    /// Build an engine over a handcrafted state
    pub fn with_state(
        map: GameMap,
        entities: Vec<Entity>,
        my_team: Team,
        tick_limit: Tick,
        config: AgentConfig,
    ) -> Self {
        let next_id = entities
            .iter()
            .map(|e| e.id().0)
            .max()
            .map_or(1, |id| id + 1);
        Self {
            map,
            entities,
            tick: 0,
            tick_limit,
            my_team,
            next_id,
            config,
        }
    }

    /// Generate a deterministic random skirmish: scattered dirt, the
    /// agent's units, and a handful of rival markers to advance on.
    pub fn generate(
        seed: u64,
        width: i32,
        height: i32,
        unit_count: usize,
        tick_limit: Tick,
        config: &AgentConfig,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let my_team = Team(0);
        let rival_team = Team(1);

        let mut map = GameMap::new(width, height, config.sector_size);
        for x in 0..width {
            for y in 0..height {
                if rng.gen_bool(DIRT_DENSITY) {
                    map.set_terrain(Location::new(x, y), Terrain::Dirt);
                }
            }
        }

        let mut engine = Self::with_state(map, Vec::new(), my_team, tick_limit, config.clone());
        for _ in 0..unit_count {
            if let Some(location) = engine.random_free_grass(&mut rng) {
                let id = engine.allocate_id();
                engine.entities.push(Entity::Unit(UnitState {
                    id,
                    team: my_team,
                    location,
                    cooldown_until: 0,
                }));
            }
        }
        let marker_count = unit_count / 2 + 1;
        for _ in 0..marker_count {
            if let Some(location) = engine.random_free_grass(&mut rng) {
                let id = engine.allocate_id();
                engine.entities.push(Entity::Marker(MarkerState {
                    id,
                    team: rival_team,
                    location,
                }));
            }
        }
        engine.recompute_sectors();
        engine
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn marker_count(&self, team: Team) -> usize {
        self.entities
            .iter()
            .filter(|e| !e.is_unit() && e.team() == team)
            .count()
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn random_free_grass(&self, rng: &mut ChaCha8Rng) -> Option<Location> {
        let occupied = self.occupancy();
        // Bounded retry; a map drowning in dirt just places fewer pieces
        for _ in 0..(self.map.width * self.map.height * 4) {
            let location = Location::new(
                rng.gen_range(0..self.map.width),
                rng.gen_range(0..self.map.height),
            );
            let grass = matches!(self.map.terrain_at(location), Ok(Terrain::Grass));
            if grass && !occupied.contains_key(&location) {
                return Some(location);
            }
        }
        None
    }

    fn occupancy(&self) -> AHashMap<Location, EntityId> {
        self.entities
            .iter()
            .map(|e| (e.location(), e.id()))
            .collect()
    }

    fn recompute_sectors(&mut self) {
        let markers: Vec<(Team, Location)> = self
            .entities
            .iter()
            .filter(|e| !e.is_unit())
            .map(|e| (e.team(), e.location()))
            .collect();
        self.map.assign_sector_control(markers.into_iter());
    }

    /// Validate one action against a staged copy of the state and apply
    /// it there. The caller commits the staged state only once the whole
    /// batch passed.
    fn apply_staged(
        map: &GameMap,
        config: &AgentConfig,
        tick: Tick,
        my_team: Team,
        entities: &mut Vec<Entity>,
        next_id: &mut u32,
        action: &QueuedAction,
    ) -> Result<()> {
        let reject = |reason: &str| AgentError::TurnRejected(format!("{reason}: {action:?}"));

        let occupied: AHashMap<Location, EntityId> = entities
            .iter()
            .map(|e| (e.location(), e.id()))
            .collect();
        let index = entities
            .iter()
            .position(|e| e.id() == action.unit)
            .ok_or_else(|| reject("unknown unit"))?;
        let unit = match entities[index] {
            Entity::Unit(u) => u,
            Entity::Marker(_) => return Err(reject("not a unit")),
        };
        if unit.team != my_team {
            return Err(reject("not your unit"));
        }
        if !unit.can_act(tick) {
            return Err(reject("unit on cooldown"));
        }

        let (direction, cooldown) = match action.kind {
            ActionKind::Build(d) => (d, config.build_cooldown),
            ActionKind::Move(d) => (d, config.move_cooldown),
        };
        let target = unit.location.offset(direction);
        if !map.contains(target) || occupied.contains_key(&target) {
            return Err(reject("target blocked"));
        }

        match action.kind {
            ActionKind::Build(_) => {
                if map.terrain_at(target)? == Terrain::Dirt {
                    return Err(reject("unclaimable footing"));
                }
                let marker_id = EntityId(*next_id);
                *next_id += 1;
                entities.push(Entity::Marker(MarkerState {
                    id: marker_id,
                    team: unit.team,
                    location: target,
                }));
            }
            ActionKind::Move(_) => {
                if let Entity::Unit(u) = &mut entities[index] {
                    u.location = target;
                }
            }
        }
        if let Entity::Unit(u) = &mut entities[index] {
            u.cooldown_until = tick + cooldown;
        }
        Ok(())
    }
}

impl Transport for ScriptedEngine {
    fn wait_for_start(&mut self) -> Result<Team> {
        Ok(self.my_team)
    }

    fn is_game_over(&self) -> bool {
        self.tick >= self.tick_limit
    }

    fn wait_till_next_turn(&mut self) -> Result<Snapshot> {
        self.tick += 1;
        Ok(Snapshot {
            tick: self.tick,
            map: self.map.clone(),
            entities: self.entities.clone(),
        })
    }

    fn is_my_turn(&self) -> bool {
        // The rival side is static scenery in offline skirmishes
        true
    }

    fn submit_turn(&mut self, actions: Vec<QueuedAction>) -> Result<()> {
        // Stage the whole batch first; a rejection leaves no trace.
        let mut staged = self.entities.clone();
        let mut staged_next_id = self.next_id;
        for action in &actions {
            Self::apply_staged(
                &self.map,
                &self.config,
                self.tick,
                self.my_team,
                &mut staged,
                &mut staged_next_id,
                action,
            )?;
        }
        self.entities = staged;
        self.next_id = staged_next_id;
        self.recompute_sectors();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Direction;

    fn lone_unit_engine() -> ScriptedEngine {
        let map = GameMap::new(5, 5, 2);
        let entities = vec![Entity::Unit(UnitState {
            id: EntityId(1),
            team: Team(0),
            location: Location::new(2, 2),
            cooldown_until: 0,
        })];
        ScriptedEngine::with_state(map, entities, Team(0), 10, AgentConfig::default())
    }

    #[test]
    fn test_accepted_build_places_marker_and_claims_sector() {
        let mut engine = lone_unit_engine();
        let snapshot = engine.wait_till_next_turn().unwrap();
        assert_eq!(snapshot.tick, 1);

        engine
            .submit_turn(vec![QueuedAction {
                unit: EntityId(1),
                kind: ActionKind::Build(Direction::North),
            }])
            .unwrap();

        assert_eq!(engine.marker_count(Team(0)), 1);
        let owner = engine.map().sector_owner(Location::new(2, 3)).unwrap();
        assert_eq!(owner, Some(Team(0)));
    }

    #[test]
    fn test_stale_action_rejects_the_turn() {
        let mut engine = lone_unit_engine();
        engine.wait_till_next_turn().unwrap();

        // West of (2,2) is fine; issuing it twice makes the second stale
        let action = QueuedAction {
            unit: EntityId(1),
            kind: ActionKind::Build(Direction::West),
        };
        engine.submit_turn(vec![action]).unwrap();
        let err = engine.submit_turn(vec![action]).unwrap_err();
        assert!(matches!(err, AgentError::TurnRejected(_)));
    }

    #[test]
    fn test_rejected_turn_leaves_no_trace() {
        let mut engine = lone_unit_engine();
        engine.wait_till_next_turn().unwrap();

        let good = QueuedAction {
            unit: EntityId(1),
            kind: ActionKind::Build(Direction::North),
        };
        let bad = QueuedAction {
            unit: EntityId(99),
            kind: ActionKind::Build(Direction::East),
        };
        let err = engine.submit_turn(vec![good, bad]).unwrap_err();
        assert!(matches!(err, AgentError::TurnRejected(_)));

        // The accepted prefix must not have been applied
        assert_eq!(engine.marker_count(Team(0)), 0);
        let owner = engine.map().sector_owner(Location::new(2, 3)).unwrap();
        assert_eq!(owner, None);

        // Cooldown untouched either: the same build still goes through
        engine.submit_turn(vec![good]).unwrap();
        assert_eq!(engine.marker_count(Team(0)), 1);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = AgentConfig::default();
        let a = ScriptedEngine::generate(42, 16, 16, 4, 20, &config);
        let b = ScriptedEngine::generate(42, 16, 16, 4, 20, &config);
        assert_eq!(a.entities(), b.entities());
    }
}
