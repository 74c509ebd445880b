//! Level-indexed capacity tables.
//!
//! Warehouse level drives storage capacity; town hall level drives how many
//! buildings may be active at once and how many tiles the village may own.
//! Levels outside the table are clamped to the nearest bound.

pub const MIN_WAREHOUSE_LEVEL: u32 = 1;
pub const MAX_WAREHOUSE_LEVEL: u32 = 7;
pub const MIN_TOWN_HALL_LEVEL: u32 = 1;
pub const MAX_TOWN_HALL_LEVEL: u32 = 10;

const WAREHOUSE_CAPACITY: [u32; 7] = [200, 450, 800, 1400, 2300, 3600, 5400];
const ACTIVE_SLOTS: [u32; 10] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 12];
const TILE_CAPACITY: [u32; 10] = [37, 61, 91, 127, 169, 217, 271, 331, 397, 469];

pub fn clamp_warehouse_level(level: u32) -> u32 {
    level.clamp(MIN_WAREHOUSE_LEVEL, MAX_WAREHOUSE_LEVEL)
}

pub fn clamp_town_hall_level(level: u32) -> u32 {
    level.clamp(MIN_TOWN_HALL_LEVEL, MAX_TOWN_HALL_LEVEL)
}

/// Total units the warehouse can hold at `level`.
pub fn warehouse_capacity(level: u32) -> u32 {
    WAREHOUSE_CAPACITY[(clamp_warehouse_level(level) - 1) as usize]
}

/// Number of buildings that may be active at once for a town hall `level`.
pub fn active_slots(level: u32) -> u32 {
    ACTIVE_SLOTS[(clamp_town_hall_level(level) - 1) as usize]
}

/// Number of tiles the village may own for a town hall `level`.
pub fn tile_capacity(level: u32) -> u32 {
    TILE_CAPACITY[(clamp_town_hall_level(level) - 1) as usize]
}
