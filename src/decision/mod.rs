//! Per-unit action resolution - the heart of the agent
//!
//! Each eligible unit gets exactly one pass per tick:
//! 1. Expansion scan: walk the cardinal directions in fixed order and
//!    build on the first neutral, permitted, accepting tile (first-fit,
//!    not best-fit).
//! 2. Advance: if no build landed, step toward the nearest rival marker
//!    within interaction range.
//!
//! The pass is pure per-tick: it holds no memory across ticks, and it
//! issues at most one mutation request through its context.

use crate::actions::ActionKind;
use crate::core::config::AgentConfig;
use crate::core::error::{AgentError, Result};
use crate::core::types::{EntityId, Team, Tick};
use crate::entity::{Entity, UnitState};
use crate::map::{Direction, Location, SectorControl};

/// The view surface the decision pass runs against
///
/// `LocalView` is the production implementation; tests substitute
/// instrumented doubles to count queries and script failures.
pub trait DecisionContext {
    /// Control status of a tile from a viewer team's perspective;
    /// `OutOfBounds` off the map.
    fn sector_control(&self, viewer: Team, location: Location) -> Result<SectorControl>;

    /// Permission check for a build. Necessary but not sufficient.
    fn can_build(&self, unit: EntityId, direction: Direction) -> bool;

    /// Attempt a permitted build. `Ok(false)` is a recoverable engine
    /// refusal; `NotPermitted` means the permission check was skipped.
    fn build(&mut self, unit: EntityId, direction: Direction) -> Result<bool>;

    fn can_move(&self, unit: EntityId, direction: Direction) -> bool;

    fn move_unit(&mut self, unit: EntityId, direction: Direction) -> Result<bool>;

    /// Entities within `range` tiles of the unit, nearest first under a
    /// deterministic total order.
    fn nearby_entities(&self, unit: EntityId, range: i32) -> Vec<Entity>;
}

/// Resolve one unit's action for this tick
///
/// Returns the committed action, or `None` when the unit sat the tick
/// out. A unit that cannot act exits before any context query.
pub fn decide(
    unit: &UnitState,
    ctx: &mut dyn DecisionContext,
    now: Tick,
    config: &AgentConfig,
) -> Result<Option<ActionKind>> {
    if !unit.can_act(now) {
        // Not our tick; don't waste queries on it
        return Ok(None);
    }

    if let Some(direction) = expansion_scan(unit, ctx)? {
        return Ok(Some(ActionKind::Build(direction)));
    }

    advance_toward_rival_marker(unit, ctx, config)
}

/// Primary phase: first-fit build scan over the cardinal directions
///
/// Ally, enemy, and unclaimable tiles are skipped, as are off-map
/// queries. A neutral tile is claimed if the unit both may build there
/// and the build takes; a refused build continues the scan rather than
/// aborting the unit's turn.
fn expansion_scan(unit: &UnitState, ctx: &mut dyn DecisionContext) -> Result<Option<Direction>> {
    for direction in Direction::CARDINALS {
        let target = unit.location.offset(direction);
        let control = match ctx.sector_control(unit.team, target) {
            Ok(control) => control,
            Err(AgentError::OutOfBounds(_)) => continue,
            Err(other) => return Err(other),
        };
        match control {
            SectorControl::Ally | SectorControl::Enemy | SectorControl::NoSector => continue,
            SectorControl::Neutral => {
                if !ctx.can_build(unit.id, direction) {
                    continue;
                }
                if ctx.build(unit.id, direction)? {
                    return Ok(Some(direction));
                }
                // Permitted build refused by the engine; keep scanning
            }
        }
    }
    Ok(None)
}

/// Secondary phase: step toward the nearest rival marker in range
///
/// "Nearest" is total-ordered by squared distance, then location (y, x),
/// then id, so equally distant candidates resolve the same way on every
/// tick. No candidate in range, or a blocked step, means no action.
fn advance_toward_rival_marker(
    unit: &UnitState,
    ctx: &mut dyn DecisionContext,
    config: &AgentConfig,
) -> Result<Option<ActionKind>> {
    let nearby = ctx.nearby_entities(unit.id, config.interaction_range);
    let goal = nearby.iter().find_map(|entity| match entity {
        Entity::Marker(marker) if marker.team != unit.team => Some(marker.location),
        _ => None,
    });
    let Some(goal) = goal else {
        return Ok(None);
    };
    let Some(direction) = unit.location.direction_to(goal) else {
        return Ok(None);
    };
    if !ctx.can_move(unit.id, direction) {
        return Ok(None);
    }
    if ctx.move_unit(unit.id, direction)? {
        Ok(Some(ActionKind::Move(direction)))
    } else {
        Ok(None)
    }
}
