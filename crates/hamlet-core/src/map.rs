//! Tile map and the world view synergy rules query.
//!
//! [`TileMap`] owns tiles and the set of tiles the village has claimed.
//! [`VillageView`] combines the map with the building arena to answer
//! [`WorldQuery`]; it precomputes the town hall road network once, so
//! build a fresh view per tick rather than keeping one around.

use std::collections::{HashMap, HashSet, VecDeque};

use hamlet_logic::world::{HexCoord, TerrainType, Tile, WorldQuery};
use hecs::World;

use crate::components::{Building, BuildingRole};

/// Tiles by coordinate plus the claimed (owned) coordinates
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    tiles: HashMap<HexCoord, Tile>,
    /// Claim order is kept so saves and iteration are stable.
    owned: Vec<HexCoord>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hexagonal map of `radius` around the origin, terrain chosen per coordinate.
    pub fn hexagon(radius: i32, mut terrain: impl FnMut(HexCoord) -> TerrainType) -> Self {
        let mut map = Self::new();
        for x in -radius..=radius {
            for y in -radius..=radius {
                let coord = HexCoord::new(x, y);
                if HexCoord::ZERO.distance_to(coord) <= radius {
                    map.insert_tile(Tile::new(coord, terrain(coord)));
                }
            }
        }
        map
    }

    /// Insert or replace a tile. Returns the previous tile, if any.
    pub fn insert_tile(&mut self, tile: Tile) -> Option<Tile> {
        self.tiles.insert(tile.coord, tile)
    }

    pub fn tile(&self, coord: HexCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn tile_mut(&mut self, coord: HexCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Build or remove a road. False if there is no tile at `coord`.
    pub fn set_road(&mut self, coord: HexCoord, has_road: bool) -> bool {
        match self.tiles.get_mut(&coord) {
            Some(tile) => {
                tile.has_road = has_road;
                true
            }
            None => false,
        }
    }

    pub fn has_road(&self, coord: HexCoord) -> bool {
        self.tile(coord).is_some_and(|t| t.has_road)
    }

    /// Claim a tile for the village, up to `limit` owned tiles.
    pub fn claim(&mut self, coord: HexCoord, limit: u32) -> bool {
        if !self.tiles.contains_key(&coord) || self.is_owned(coord) {
            return false;
        }
        if self.owned.len() as u32 >= limit {
            return false;
        }
        self.owned.push(coord);
        true
    }

    pub fn release(&mut self, coord: HexCoord) -> bool {
        let before = self.owned.len();
        self.owned.retain(|&c| c != coord);
        self.owned.len() != before
    }

    pub fn is_owned(&self, coord: HexCoord) -> bool {
        self.owned.contains(&coord)
    }

    pub fn owned_coords(&self) -> &[HexCoord] {
        &self.owned
    }

    pub fn owned_count(&self) -> u32 {
        self.owned.len() as u32
    }

    pub fn owned_tiles(&self) -> Vec<&Tile> {
        self.owned.iter().filter_map(|c| self.tiles.get(c)).collect()
    }
}

/// Read-only [`WorldQuery`] over a tile map and the building arena
pub struct VillageView<'a> {
    map: &'a TileMap,
    buildings_by_kind: HashMap<String, Vec<HexCoord>>,
    /// Road tiles reachable from a road next to a town hall
    hall_network: HashSet<HexCoord>,
}

impl<'a> VillageView<'a> {
    pub fn new(map: &'a TileMap, world: &World) -> Self {
        let mut buildings_by_kind: HashMap<String, Vec<HexCoord>> = HashMap::new();
        let mut halls = Vec::new();
        for (_, building) in world.query::<&Building>().iter() {
            buildings_by_kind
                .entry(building.kind_id.clone())
                .or_default()
                .push(building.coord);
            if matches!(building.role, BuildingRole::TownHall) {
                halls.push(building.coord);
            }
        }
        let hall_network = road_network(map, &halls);
        Self {
            map,
            buildings_by_kind,
            hall_network,
        }
    }
}

/// Breadth-first search over road tiles, seeded by roads adjacent to any hall.
fn road_network(map: &TileMap, halls: &[HexCoord]) -> HashSet<HexCoord> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    for hall in halls {
        for neighbor in hall.all_neighbors() {
            if map.has_road(neighbor) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        for neighbor in current.all_neighbors() {
            if map.has_road(neighbor) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    visited
}

impl WorldQuery for VillageView<'_> {
    fn is_adjacent_to_road(&self, coord: HexCoord) -> bool {
        coord.all_neighbors().iter().any(|&n| self.map.has_road(n))
    }

    fn is_connected_to_town_hall(&self, coord: HexCoord) -> bool {
        coord
            .all_neighbors()
            .iter()
            .any(|n| self.hall_network.contains(n))
    }

    fn count_adjacent_tiles_with_tag(&self, coord: HexCoord, tag: &str) -> u32 {
        coord
            .all_neighbors()
            .iter()
            .filter(|&&n| self.map.tile(n).is_some_and(|t| t.has_tag(tag)))
            .count() as u32
    }

    fn count_buildings_within_radius(&self, coord: HexCoord, kind_id: &str, radius: u32) -> u32 {
        let Some(coords) = self.buildings_by_kind.get(kind_id) else {
            return 0;
        };
        coords
            .iter()
            .filter(|&&c| (1..=radius).contains(&coord.distance_to(c).unsigned_abs()))
            .count() as u32
    }

    fn owned_tiles(&self) -> Vec<&Tile> {
        self.map.owned_tiles()
    }
}
