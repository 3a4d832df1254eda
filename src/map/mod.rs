//! Grid geometry and sector control
//!
//! The map is a rectangle of tiles. Tiles bucket into axis-aligned
//! sectors; territorial control is tracked per sector. Every control
//! query is answered from a unit's perspective, so the same sector reads
//! as ally-controlled to one team and enemy-controlled to the other.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{AgentError, Result};
use crate::core::types::Team;

/// One of the four cardinal directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Fixed iteration order for direction scans
    ///
    /// Every unit on every tick walks directions in exactly this order;
    /// agent behavior is deterministic because of it.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn dx(self) -> i32 {
        match self {
            Direction::East => 1,
            Direction::West => -1,
            Direction::North | Direction::South => 0,
        }
    }

    pub fn dy(self) -> i32 {
        match self {
            Direction::North => 1,
            Direction::South => -1,
            Direction::East | Direction::West => 0,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Integer tile coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent tile in the given direction
    pub fn offset(self, direction: Direction) -> Location {
        Location {
            x: self.x + direction.dx(),
            y: self.y + direction.dy(),
        }
    }

    pub fn distance_squared(self, other: Location) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Closest cardinal direction toward `other`
    ///
    /// The dominant axis wins; an exact diagonal resolves to the vertical
    /// axis so the answer is a total function of the delta. Returns `None`
    /// when the locations coincide.
    pub fn direction_to(self, other: Location) -> Option<Direction> {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() > dy.abs() {
            Some(if dx > 0 { Direction::East } else { Direction::West })
        } else {
            Some(if dy > 0 { Direction::North } else { Direction::South })
        }
    }
}

/// Control status of a tile as seen from one unit's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectorControl {
    /// The viewer's team controls the sector
    Ally,
    /// A rival team controls the sector
    Enemy,
    /// Nobody controls the sector; eligible for a build
    Neutral,
    /// On the map but outside the claimable area
    NoSector,
}

/// Terrain of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    /// Claimable ground; markers can stand here
    Grass,
    /// Unclaimable ground; passable but never part of a sector
    Dirt,
}

/// The full game map: bounds, terrain, and per-sector ownership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    pub sector_size: i32,
    sectors_w: i32,
    terrain: Vec<Terrain>,
    owners: Vec<Option<Team>>,
}

impl GameMap {
    /// Create an all-grass, unowned map
    pub fn new(width: i32, height: i32, sector_size: i32) -> Self {
        let sectors_w = (width + sector_size - 1) / sector_size;
        let sectors_h = (height + sector_size - 1) / sector_size;
        Self {
            width,
            height,
            sector_size,
            sectors_w,
            terrain: vec![Terrain::Grass; (width * height).max(0) as usize],
            owners: vec![None; (sectors_w * sectors_h).max(0) as usize],
        }
    }

    pub fn contains(&self, location: Location) -> bool {
        location.x >= 0 && location.x < self.width && location.y >= 0 && location.y < self.height
    }

    fn tile_index(&self, location: Location) -> usize {
        (location.y * self.width + location.x) as usize
    }

    /// Terrain at a location; `OutOfBounds` off the map
    pub fn terrain_at(&self, location: Location) -> Result<Terrain> {
        if !self.contains(location) {
            return Err(AgentError::OutOfBounds(location));
        }
        Ok(self.terrain[self.tile_index(location)])
    }

    pub fn set_terrain(&mut self, location: Location, terrain: Terrain) {
        if self.contains(location) {
            let idx = self.tile_index(location);
            self.terrain[idx] = terrain;
        }
    }

    /// Index of the sector containing an on-map location
    fn sector_index(&self, location: Location) -> usize {
        let sx = location.x / self.sector_size;
        let sy = location.y / self.sector_size;
        (sy * self.sectors_w + sx) as usize
    }

    /// Owner of the sector containing a location; `OutOfBounds` off the map
    pub fn sector_owner(&self, location: Location) -> Result<Option<Team>> {
        if !self.contains(location) {
            return Err(AgentError::OutOfBounds(location));
        }
        Ok(self.owners[self.sector_index(location)])
    }

    pub fn set_sector_owner(&mut self, location: Location, owner: Option<Team>) {
        if self.contains(location) {
            let idx = self.sector_index(location);
            self.owners[idx] = owner;
        }
    }

    /// Control status of a tile from a viewer team's perspective
    ///
    /// Off-map queries fail with `OutOfBounds` (callers skip the
    /// direction). On-map dirt is unclaimable and reads as `NoSector`.
    pub fn control_from(&self, viewer: Team, location: Location) -> Result<SectorControl> {
        if !self.contains(location) {
            return Err(AgentError::OutOfBounds(location));
        }
        if self.terrain[self.tile_index(location)] == Terrain::Dirt {
            return Ok(SectorControl::NoSector);
        }
        match self.owners[self.sector_index(location)] {
            None => Ok(SectorControl::Neutral),
            Some(team) if team == viewer => Ok(SectorControl::Ally),
            Some(_) => Ok(SectorControl::Enemy),
        }
    }

    /// Recompute ownership of every sector from marker positions
    ///
    /// A sector belongs to the team with a strict majority of markers
    /// inside it; a tie (including zero markers) leaves it unowned.
    pub fn assign_sector_control(&mut self, markers: impl Iterator<Item = (Team, Location)>) {
        let mut counts: AHashMap<(usize, Team), u32> = AHashMap::new();
        for (team, location) in markers {
            if self.contains(location) {
                *counts.entry((self.sector_index(location), team)).or_insert(0) += 1;
            }
        }

        for owner in self.owners.iter_mut() {
            *owner = None;
        }
        let mut best: AHashMap<usize, (Team, u32, bool)> = AHashMap::new();
        for (&(sector, team), &count) in &counts {
            match best.get_mut(&sector) {
                None => {
                    best.insert(sector, (team, count, false));
                }
                Some(entry) => {
                    if count > entry.1 {
                        *entry = (team, count, false);
                    } else if count == entry.1 {
                        entry.2 = true;
                    }
                }
            }
        }
        for (sector, (team, _, tied)) in best {
            if !tied {
                self.owners[sector] = Some(team);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_order_is_fixed() {
        assert_eq!(
            Direction::CARDINALS,
            [
                Direction::North,
                Direction::East,
                Direction::South,
                Direction::West
            ]
        );
    }

    #[test]
    fn test_offset_and_opposite() {
        let origin = Location::new(3, 3);
        assert_eq!(origin.offset(Direction::North), Location::new(3, 4));
        assert_eq!(origin.offset(Direction::South), Location::new(3, 2));
        assert_eq!(origin.offset(Direction::East), Location::new(4, 3));
        assert_eq!(origin.offset(Direction::West), Location::new(2, 3));
        for direction in Direction::CARDINALS {
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn test_direction_to_dominant_axis() {
        let origin = Location::new(0, 0);
        assert_eq!(
            origin.direction_to(Location::new(5, 2)),
            Some(Direction::East)
        );
        assert_eq!(
            origin.direction_to(Location::new(-5, 2)),
            Some(Direction::West)
        );
        assert_eq!(
            origin.direction_to(Location::new(1, -4)),
            Some(Direction::South)
        );
        // Exact diagonal resolves to the vertical axis
        assert_eq!(
            origin.direction_to(Location::new(3, 3)),
            Some(Direction::North)
        );
        assert_eq!(origin.direction_to(origin), None);
    }

    #[test]
    fn test_control_from_perspectives() {
        let mut map = GameMap::new(4, 4, 2);
        map.set_sector_owner(Location::new(0, 0), Some(Team(0)));
        map.set_sector_owner(Location::new(2, 2), Some(Team(1)));

        // Same sector, two perspectives
        assert_eq!(
            map.control_from(Team(0), Location::new(1, 1)).unwrap(),
            SectorControl::Ally
        );
        assert_eq!(
            map.control_from(Team(1), Location::new(1, 1)).unwrap(),
            SectorControl::Enemy
        );
        assert_eq!(
            map.control_from(Team(0), Location::new(2, 0)).unwrap(),
            SectorControl::Neutral
        );
    }

    #[test]
    fn test_control_from_dirt_is_no_sector() {
        let mut map = GameMap::new(4, 4, 2);
        map.set_terrain(Location::new(1, 1), Terrain::Dirt);
        assert_eq!(
            map.control_from(Team(0), Location::new(1, 1)).unwrap(),
            SectorControl::NoSector
        );
    }

    #[test]
    fn test_control_from_off_map_is_bounds_error() {
        let map = GameMap::new(4, 4, 2);
        assert!(map.control_from(Team(0), Location::new(-1, 0)).is_err());
        assert!(map.control_from(Team(0), Location::new(0, 4)).is_err());
    }

    #[test]
    fn test_assign_sector_control_majority() {
        let mut map = GameMap::new(4, 4, 2);
        let markers = vec![
            (Team(0), Location::new(0, 0)),
            (Team(0), Location::new(1, 0)),
            (Team(1), Location::new(0, 1)),
            (Team(1), Location::new(2, 2)),
        ];
        map.assign_sector_control(markers.into_iter());

        // Sector (0,0): two Team(0) markers vs one Team(1)
        assert_eq!(map.sector_owner(Location::new(0, 0)).unwrap(), Some(Team(0)));
        // Sector (2,2): single Team(1) marker
        assert_eq!(map.sector_owner(Location::new(3, 3)).unwrap(), Some(Team(1)));
        // Untouched sector stays unowned
        assert_eq!(map.sector_owner(Location::new(2, 0)).unwrap(), None);
    }

    #[test]
    fn test_assign_sector_control_tie_is_unowned() {
        let mut map = GameMap::new(2, 2, 2);
        let markers = vec![
            (Team(0), Location::new(0, 0)),
            (Team(1), Location::new(1, 1)),
        ];
        map.assign_sector_control(markers.into_iter());
        assert_eq!(map.sector_owner(Location::new(0, 0)).unwrap(), None);
    }
}
