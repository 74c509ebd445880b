//! Save/Load functionality for persisting village state
//!
//! Uses bincode for compact binary serialization of the whole village.
//! Buildings are saved as plain records and rebuilt against the catalog on
//! load, so producer output always follows the current catalog.

use hamlet_logic::catalog::BuildingCatalog;
use hamlet_logic::world::{HexCoord, Tile};
use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

use crate::components::*;
use crate::map::TileMap;
use crate::materials::MaterialQualities;
use crate::scheduler::TickClock;
use crate::warehouse::{Warehouse, WarehouseSnapshot};

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the village
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in seconds
    pub sim_time: f64,
    pub time_scale: f32,
    /// Partial interval carried by the tick clock
    pub accumulated_seconds: f32,
    pub ticks_run: u64,
    pub warehouse: WarehouseSnapshot,
    pub qualities: MaterialQualities,
    /// Sorted by coordinate
    pub tiles: Vec<Tile>,
    /// Claim order
    pub owned: Vec<HexCoord>,
    pub buildings: Vec<SavedBuilding>,
}

/// One placed building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedBuilding {
    pub coord: HexCoord,
    pub kind_id: String,
    pub level: u32,
    pub is_active: bool,
    pub relocation_cooldown_seconds: f32,
    /// Recipe choice and installed tool, processors only
    pub processor: Option<ProcessorState>,
}

impl From<&Building> for SavedBuilding {
    fn from(building: &Building) -> Self {
        Self {
            coord: building.coord,
            kind_id: building.kind_id.clone(),
            level: building.level,
            is_active: building.is_active,
            relocation_cooldown_seconds: building.relocation_cooldown_seconds,
            processor: building.processor().cloned(),
        }
    }
}

/// Result of loading a village
pub struct LoadedVillage {
    pub world: World,
    pub map: TileMap,
    pub warehouse: WarehouseSnapshot,
    pub qualities: MaterialQualities,
    pub sim_time: f64,
    pub time_scale: f32,
    pub accumulated_seconds: f32,
    pub ticks_run: u64,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Saved building kind '{0}' is not in the catalog")]
    UnknownKind(String),
}

/// Snapshot the village into save data
pub fn capture(
    world: &World,
    map: &TileMap,
    warehouse: &Warehouse,
    qualities: &MaterialQualities,
    clock: &TickClock,
    sim_time: f64,
    time_scale: f32,
) -> SaveData {
    let mut tiles: Vec<Tile> = map.tiles().cloned().collect();
    tiles.sort_by_key(|t| (t.coord.x, t.coord.y));

    let buildings = world
        .query::<&Building>()
        .iter()
        .map(|(_, building)| SavedBuilding::from(building))
        .collect();

    SaveData {
        version: SAVE_VERSION,
        sim_time,
        time_scale,
        accumulated_seconds: clock.accumulated_seconds(),
        ticks_run: clock.ticks_run(),
        warehouse: warehouse.snapshot(),
        qualities: qualities.clone(),
        tiles,
        owned: map.owned_coords().to_vec(),
        buildings,
    }
}

/// Write save data to a writer
pub fn save_village<W: Write>(writer: W, data: &SaveData) -> Result<(), SaveError> {
    bincode::serialize_into(writer, data)?;
    Ok(())
}

/// Load a village from a reader, rebuilding buildings from `catalog`
pub fn load_village<R: Read>(reader: R, catalog: &BuildingCatalog) -> Result<LoadedVillage, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut map = TileMap::new();
    for tile in save_data.tiles {
        map.insert_tile(tile);
    }
    for coord in save_data.owned {
        map.claim(coord, u32::MAX);
    }

    let mut world = World::new();
    for saved in save_data.buildings {
        world.spawn((restore_building(saved, catalog)?,));
    }

    Ok(LoadedVillage {
        world,
        map,
        warehouse: save_data.warehouse,
        qualities: save_data.qualities,
        sim_time: save_data.sim_time,
        time_scale: save_data.time_scale,
        accumulated_seconds: save_data.accumulated_seconds,
        ticks_run: save_data.ticks_run,
    })
}

fn restore_building(saved: SavedBuilding, catalog: &BuildingCatalog) -> Result<Building, SaveError> {
    let kind = catalog
        .get(&saved.kind_id)
        .ok_or_else(|| SaveError::UnknownKind(saved.kind_id.clone()))?;

    let mut building = Building::from_kind(kind, saved.coord);
    building.level = saved.level;
    building.is_active = saved.is_active;
    building.relocation_cooldown_seconds = saved.relocation_cooldown_seconds;
    if let (Some(state), Some(slot)) = (saved.processor, building.processor_mut()) {
        *slot = state;
    }
    Ok(building)
}
