//! District bonus - terrain composition of the village's owned tiles.
//!
//! A building kind may prefer a terrain (lumber camps like forest). The
//! more of the owned land has that terrain, the larger the bonus.

use serde::{Deserialize, Serialize};

use crate::world::{TerrainType, Tile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistrictConfig {
    /// Bonus when every owned tile matches the preferred terrain.
    pub max_bonus: f32,
    /// Matching tiles required before any bonus applies.
    pub min_matching_tiles: u32,
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self {
            max_bonus: 0.25,
            min_matching_tiles: 3,
        }
    }
}

/// Share of `tiles` whose terrain is `terrain` (0.0 for no tiles).
pub fn terrain_share(terrain: TerrainType, tiles: &[&Tile]) -> f32 {
    if tiles.is_empty() {
        return 0.0;
    }
    let matching = tiles.iter().filter(|t| t.terrain == terrain).count();
    matching as f32 / tiles.len() as f32
}

/// Bonus fraction for a building kind preferring `preferred`.
pub fn district_bonus(preferred: Option<TerrainType>, owned: &[&Tile], config: &DistrictConfig) -> f32 {
    let Some(terrain) = preferred else {
        return 0.0;
    };
    let matching = owned.iter().filter(|t| t.terrain == terrain).count() as u32;
    if matching == 0 || matching < config.min_matching_tiles {
        return 0.0;
    }
    config.max_bonus * terrain_share(terrain, owned)
}
