//! World-facing types and the spatial query capability rules consume.
//!
//! The rules never look at the map directly. Anything that can answer
//! [`WorldQuery`] (the engine's tile map, a test fixture) can drive them.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate.
pub type HexCoord = hexx::Hex;

/// Terrain type of a tile. Its lowercase name doubles as a tile tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    Grassland,
    Forest,
    Hills,
    Mountain,
    Marsh,
    Water,
}

impl TerrainType {
    pub fn tag(self) -> &'static str {
        match self {
            TerrainType::Grassland => "grassland",
            TerrainType::Forest => "forest",
            TerrainType::Hills => "hills",
            TerrainType::Mountain => "mountain",
            TerrainType::Marsh => "marsh",
            TerrainType::Water => "water",
        }
    }
}

/// A map tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub terrain: TerrainType,
    /// Extra tags beyond the terrain tag (e.g. `"river"`, `"rocks"`).
    pub tags: Vec<String>,
    pub has_road: bool,
}

impl Tile {
    pub fn new(coord: HexCoord, terrain: TerrainType) -> Self {
        Self {
            coord,
            terrain,
            tags: Vec::new(),
            has_road: false,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_road(mut self) -> Self {
        self.has_road = true;
        self
    }

    /// True if the terrain tag or any extra tag equals `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.terrain.tag() == tag || self.tags.iter().any(|t| t == tag)
    }
}

/// Spatial questions the synergy rules ask about a coordinate.
pub trait WorldQuery {
    fn is_adjacent_to_road(&self, coord: HexCoord) -> bool;
    fn is_connected_to_town_hall(&self, coord: HexCoord) -> bool;
    fn count_adjacent_tiles_with_tag(&self, coord: HexCoord, tag: &str) -> u32;
    /// Buildings of `kind_id` at distance `1..=radius` from `coord`.
    fn count_buildings_within_radius(&self, coord: HexCoord, kind_id: &str, radius: u32) -> u32;
    fn owned_tiles(&self) -> Vec<&Tile>;
}
