//! Game constants - resource ids, tool slots, tile tags, building kind ids.
//!
//! Ids are grouped in ranges so new entries can be added without
//! renumbering: raw materials 1–19, processed goods 20–39, tools 40–59,
//! tool slots 60–79.

pub mod resources {
    use crate::resource::ResourceId;

    // Raw materials
    pub const WOOD: ResourceId = ResourceId(1);
    pub const STONE: ResourceId = ResourceId(2);
    pub const FIBER: ResourceId = ResourceId(3);
    pub const CLAY: ResourceId = ResourceId(4);
    pub const ORE: ResourceId = ResourceId(5);
    pub const GRAIN: ResourceId = ResourceId(6);
    // Processed goods
    pub const PLANKS: ResourceId = ResourceId(20);
    pub const ROPE: ResourceId = ResourceId(21);
    pub const BRICKS: ResourceId = ResourceId(22);
    pub const INGOTS: ResourceId = ResourceId(23);
    pub const FLOUR: ResourceId = ResourceId(24);
    // Tools
    pub const TOOL_STONE_AXE: ResourceId = ResourceId(40);
    pub const TOOL_IRON_AXE: ResourceId = ResourceId(41);
    pub const TOOL_BRONZE_SAW: ResourceId = ResourceId(42);
    pub const TOOL_STEEL_SAW: ResourceId = ResourceId(43);
    pub const TOOL_BONE_SPINDLE: ResourceId = ResourceId(44);
    pub const TOOL_IRON_SPINDLE: ResourceId = ResourceId(45);
    pub const TOOL_IRON_HAMMER: ResourceId = ResourceId(46);
    pub const TOOL_MILLSTONE: ResourceId = ResourceId(47);
    /// Named tool resource with no catalog entry (display falls back to the id).
    pub const TOOL_CHISEL: ResourceId = ResourceId(48);
    // Tool slots
    pub const SLOT_AXE: ResourceId = ResourceId(60);
    pub const SLOT_SAW: ResourceId = ResourceId(61);
    pub const SLOT_SPINDLE: ResourceId = ResourceId(62);
    pub const SLOT_HAMMER: ResourceId = ResourceId(63);
    pub const SLOT_GRINDER: ResourceId = ResourceId(64);
}

/// Tile tags used by `AdjacentTileTag` rules. Terrain names are tags too.
pub mod tags {
    pub const FOREST: &str = "forest";
    pub const HILLS: &str = "hills";
    pub const WATER: &str = "water";
    pub const RIVER: &str = "river";
    pub const ROCKS: &str = "rocks";
    pub const FERTILE: &str = "fertile";
}

/// Building kind ids of the bundled catalog.
pub mod kinds {
    pub const TOWN_HALL: &str = "town_hall";
    pub const WAREHOUSE: &str = "warehouse";
    pub const LUMBER_CAMP: &str = "lumber_camp";
    pub const QUARRY: &str = "quarry";
    pub const FIBER_FARM: &str = "fiber_farm";
    pub const CLAY_PIT: &str = "clay_pit";
    pub const MINE: &str = "mine";
    pub const FARM: &str = "farm";
    pub const WELL: &str = "well";
    pub const SAWMILL: &str = "sawmill";
    pub const ROPEWALK: &str = "ropewalk";
    pub const KILN: &str = "kiln";
    pub const SMITHY: &str = "smithy";
    pub const MILL: &str = "mill";
}

/// Tool identifiers carry this prefix; display names strip it.
pub const TOOL_PREFIX: &str = "Tool_";
