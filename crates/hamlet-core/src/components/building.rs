//! Building components: placement, activity and role payload.

use hamlet_logic::catalog::{BuildingKindDef, BuildingRoleKind, ProductionProfile};
use hamlet_logic::resource::ResourceId;
use hamlet_logic::world::HexCoord;
use serde::{Deserialize, Serialize};

/// Building component - one per placed building entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Tile the building stands on
    pub coord: HexCoord,
    /// Catalog kind id (e.g. "lumber_camp")
    pub kind_id: String,
    /// Upgrade level, starts at 1
    pub level: u32,
    /// Switched on by the player (subject to active slots)
    pub is_active: bool,
    /// Seconds left before a relocated building works again
    pub relocation_cooldown_seconds: f32,
    pub role: BuildingRole,
}

impl Building {
    /// Fresh level-1 building of `kind` at `coord`, inactive.
    pub fn from_kind(kind: &BuildingKindDef, coord: HexCoord) -> Self {
        let role = match kind.role {
            BuildingRoleKind::Producer => BuildingRole::Producer(ProductionProfile {
                consumes_active_slot: kind.consumes_active_slot,
                base_output_per_tick: kind.base_output.clone(),
            }),
            BuildingRoleKind::Processor => {
                BuildingRole::Processor(ProcessorState::new(kind.tool_slot.unwrap_or(ResourceId::NONE)))
            }
            BuildingRoleKind::TownHall => BuildingRole::TownHall,
            BuildingRoleKind::Warehouse => BuildingRole::Warehouse,
            BuildingRoleKind::Other => BuildingRole::Other,
        };
        Self {
            coord,
            kind_id: kind.id.clone(),
            level: 1,
            is_active: false,
            relocation_cooldown_seconds: 0.0,
            role,
        }
    }

    pub fn is_relocating(&self) -> bool {
        self.relocation_cooldown_seconds > 0.0
    }

    /// Active and not cooling down after a move.
    pub fn can_work(&self) -> bool {
        self.is_active && !self.is_relocating()
    }

    /// Whether switching this building on takes one of the town hall's slots.
    pub fn consumes_active_slot(&self) -> bool {
        match &self.role {
            BuildingRole::Producer(profile) => profile.consumes_active_slot,
            BuildingRole::Processor(_) => true,
            _ => false,
        }
    }

    pub fn processor(&self) -> Option<&ProcessorState> {
        match &self.role {
            BuildingRole::Processor(state) => Some(state),
            _ => None,
        }
    }

    pub fn processor_mut(&mut self) -> Option<&mut ProcessorState> {
        match &mut self.role {
            BuildingRole::Processor(state) => Some(state),
            _ => None,
        }
    }
}

/// Role-specific payload of a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BuildingRole {
    Producer(ProductionProfile),
    Processor(ProcessorState),
    TownHall,
    Warehouse,
    Other,
}

impl BuildingRole {
    pub fn kind(&self) -> BuildingRoleKind {
        match self {
            BuildingRole::Producer(_) => BuildingRoleKind::Producer,
            BuildingRole::Processor(_) => BuildingRoleKind::Processor,
            BuildingRole::TownHall => BuildingRoleKind::TownHall,
            BuildingRole::Warehouse => BuildingRoleKind::Warehouse,
            BuildingRole::Other => BuildingRoleKind::Other,
        }
    }
}

/// Per-processor state: selected recipe and installed tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorState {
    /// Index into the kind's recipe list
    pub recipe_index: usize,
    /// Slot resource the installed tool must match (NONE = no tool slot)
    pub tool_slot_type: ResourceId,
    /// Installed tool, NONE when empty
    pub installed_tool: ResourceId,
    /// Quality of the installed tool (0 when empty)
    pub installed_tool_quality: f32,
    /// Attempt one conversion after every production tick
    pub auto_convert: bool,
}

impl ProcessorState {
    pub fn new(tool_slot_type: ResourceId) -> Self {
        Self {
            recipe_index: 0,
            tool_slot_type,
            installed_tool: ResourceId::NONE,
            installed_tool_quality: 0.0,
            auto_convert: false,
        }
    }

    pub fn has_tool(&self) -> bool {
        !self.installed_tool.is_none()
    }
}
