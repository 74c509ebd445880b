//! Tool catalog - which tools fit which processor slot, and how good they are.
//!
//! Built once from a fixed seed list and never mutated. Moving tools in and
//! out of processors is the engine's job, not the catalog's.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{resources::*, TOOL_PREFIX};
use crate::resource::{resource_name, ResourceId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub tool_id: ResourceId,
    pub slot_type: ResourceId,
    pub quality: u32,
    pub display_name: String,
}

const SEED_TOOLS: &[(ResourceId, ResourceId, u32, &str)] = &[
    (TOOL_STONE_AXE, SLOT_AXE, 4, "Stone Axe"),
    (TOOL_IRON_AXE, SLOT_AXE, 12, "Iron Axe"),
    (TOOL_BRONZE_SAW, SLOT_SAW, 8, "Bronze Saw"),
    (TOOL_STEEL_SAW, SLOT_SAW, 16, "Steel Saw"),
    (TOOL_BONE_SPINDLE, SLOT_SPINDLE, 5, "Bone Spindle"),
    (TOOL_IRON_SPINDLE, SLOT_SPINDLE, 11, "Iron Spindle"),
    (TOOL_IRON_HAMMER, SLOT_HAMMER, 12, "Iron Hammer"),
    (TOOL_MILLSTONE, SLOT_GRINDER, 10, "Millstone"),
];

/// Read-only registry of tool definitions.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
    by_id: HashMap<ResourceId, usize>,
}

impl ToolCatalog {
    /// The game's tool set.
    pub fn standard() -> Self {
        Self::new(
            SEED_TOOLS
                .iter()
                .map(|&(tool_id, slot_type, quality, name)| ToolDefinition {
                    tool_id,
                    slot_type,
                    quality,
                    display_name: name.to_string(),
                })
                .collect(),
        )
    }

    /// Build from explicit definitions. Later duplicates of a tool id are ignored.
    pub fn new(definitions: Vec<ToolDefinition>) -> Self {
        let mut tools = Vec::with_capacity(definitions.len());
        let mut by_id = HashMap::with_capacity(definitions.len());
        for def in definitions {
            if by_id.contains_key(&def.tool_id) {
                continue;
            }
            by_id.insert(def.tool_id, tools.len());
            tools.push(def);
        }
        Self { tools, by_id }
    }

    pub fn lookup(&self, tool_id: ResourceId) -> Option<&ToolDefinition> {
        self.by_id.get(&tool_id).map(|&i| &self.tools[i])
    }

    pub fn is_tool(&self, id: ResourceId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Tools that fit `slot_type`, in seed order.
    pub fn tools_for_slot(&self, slot_type: ResourceId) -> Vec<&ToolDefinition> {
        self.tools.iter().filter(|t| t.slot_type == slot_type).collect()
    }

    /// Catalog name, else the identifier without its `Tool_` prefix.
    pub fn display_name(&self, tool_id: ResourceId) -> String {
        if let Some(def) = self.lookup(tool_id) {
            return def.display_name.clone();
        }
        match resource_name(tool_id) {
            Some(name) => name.strip_prefix(TOOL_PREFIX).unwrap_or(name).to_string(),
            None => tool_id.to_string(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
