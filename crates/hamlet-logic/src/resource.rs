//! Resource identifiers and stacks.
//!
//! Resources are plain `u16` ids so they sort, hash and serialize cheaply.
//! The id order matters: when the warehouse is nearly full, batches are
//! deposited in ascending id order, so lower ids get filled first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::resources;

/// Identifier of a resource type. `ResourceId::NONE` (0) is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u16);

impl ResourceId {
    pub const NONE: ResourceId = ResourceId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Identifier string from the name table, e.g. `"Wood"` or `"Tool_IronAxe"`.
    pub fn name(self) -> Option<&'static str> {
        resource_name(self)
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match resource_name(*self) {
            Some(name) => f.write_str(name),
            None => write!(f, "#{}", self.0),
        }
    }
}

/// An amount of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStack {
    pub id: ResourceId,
    pub amount: u32,
}

impl ResourceStack {
    pub fn new(id: ResourceId, amount: u32) -> Self {
        Self { id, amount }
    }
}

/// Sum of all stack amounts, widened so large batches cannot overflow.
pub fn total_amount(stacks: &[ResourceStack]) -> u64 {
    stacks.iter().map(|s| s.amount as u64).sum()
}

// ── Name table ──────────────────────────────────────────────────────────

const NAMES: &[(ResourceId, &str)] = &[
    // Raw materials
    (resources::WOOD, "Wood"),
    (resources::STONE, "Stone"),
    (resources::FIBER, "Fiber"),
    (resources::CLAY, "Clay"),
    (resources::ORE, "Ore"),
    (resources::GRAIN, "Grain"),
    // Processed goods
    (resources::PLANKS, "Planks"),
    (resources::ROPE, "Rope"),
    (resources::BRICKS, "Bricks"),
    (resources::INGOTS, "Ingots"),
    (resources::FLOUR, "Flour"),
    // Tools
    (resources::TOOL_STONE_AXE, "Tool_StoneAxe"),
    (resources::TOOL_IRON_AXE, "Tool_IronAxe"),
    (resources::TOOL_BRONZE_SAW, "Tool_BronzeSaw"),
    (resources::TOOL_STEEL_SAW, "Tool_SteelSaw"),
    (resources::TOOL_BONE_SPINDLE, "Tool_BoneSpindle"),
    (resources::TOOL_IRON_SPINDLE, "Tool_IronSpindle"),
    (resources::TOOL_IRON_HAMMER, "Tool_IronHammer"),
    (resources::TOOL_MILLSTONE, "Tool_Millstone"),
    (resources::TOOL_CHISEL, "Tool_Chisel"),
    // Tool slots
    (resources::SLOT_AXE, "Slot_Axe"),
    (resources::SLOT_SAW, "Slot_Saw"),
    (resources::SLOT_SPINDLE, "Slot_Spindle"),
    (resources::SLOT_HAMMER, "Slot_Hammer"),
    (resources::SLOT_GRINDER, "Slot_Grinder"),
];

/// Identifier string for a resource id.
pub fn resource_name(id: ResourceId) -> Option<&'static str> {
    NAMES.iter().find(|(rid, _)| *rid == id).map(|(_, name)| *name)
}

/// Reverse lookup of [`resource_name`]. Case-sensitive.
pub fn resource_by_name(name: &str) -> Option<ResourceId> {
    NAMES.iter().find(|(_, n)| *n == name).map(|(id, _)| *id)
}

/// All named resource ids in ascending order.
pub fn all_resources() -> Vec<ResourceId> {
    let mut ids: Vec<ResourceId> = NAMES.iter().map(|(id, _)| *id).collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for id in all_resources() {
            let name = resource_name(id).unwrap();
            assert_eq!(resource_by_name(name), Some(id));
        }
    }

    #[test]
    fn test_none_has_no_name() {
        assert!(ResourceId::NONE.is_none());
        assert_eq!(resource_name(ResourceId::NONE), None);
        assert_eq!(ResourceId::NONE.to_string(), "#0");
    }

    #[test]
    fn test_display_uses_identifier() {
        assert_eq!(resources::WOOD.to_string(), "Wood");
        assert_eq!(resources::TOOL_IRON_AXE.to_string(), "Tool_IronAxe");
        assert_eq!(ResourceId(999).to_string(), "#999");
    }

    #[test]
    fn test_ids_are_unique() {
        let ids = all_resources();
        let mut dedup = ids.clone();
        dedup.dedup();
        assert_eq!(ids.len(), dedup.len());
    }

    #[test]
    fn test_total_amount() {
        let stacks = [
            ResourceStack::new(resources::WOOD, u32::MAX),
            ResourceStack::new(resources::STONE, 1),
        ];
        assert_eq!(total_amount(&stacks), u32::MAX as u64 + 1);
    }
}
