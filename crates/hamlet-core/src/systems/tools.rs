//! Tool swaps - moving tools between the warehouse and processor slots
//!
//! Tools are warehouse resources. Equipping withdraws the new tool and
//! returns the previous one; unequipping returns the installed tool.

use hamlet_logic::resource::ResourceId;
use hamlet_logic::tools::ToolCatalog;
use log::error;

use crate::components::ProcessorState;
use crate::error::EconomyError;
use crate::warehouse::Warehouse;

/// Why a swap was refused. Nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSwapBlock {
    UnknownTool(ResourceId),
    WrongSlot { tool: ResourceId, slot: ResourceId },
    AlreadyInstalled(ResourceId),
    NotInStock(ResourceId),
    NothingInstalled,
    WarehouseFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSwapOutcome {
    /// `returned` is NONE when the slot was empty
    Equipped { installed: ResourceId, returned: ResourceId },
    Unequipped { returned: ResourceId },
    Blocked(ToolSwapBlock),
}

/// Install `tool_id` from the warehouse, returning any previous tool.
pub fn equip_tool(
    state: &mut ProcessorState,
    tool_id: ResourceId,
    tools: &ToolCatalog,
    warehouse: &mut Warehouse,
) -> Result<ToolSwapOutcome, EconomyError> {
    let Some(def) = tools.lookup(tool_id) else {
        return Ok(ToolSwapOutcome::Blocked(ToolSwapBlock::UnknownTool(tool_id)));
    };
    if def.slot_type != state.tool_slot_type {
        return Ok(ToolSwapOutcome::Blocked(ToolSwapBlock::WrongSlot {
            tool: tool_id,
            slot: state.tool_slot_type,
        }));
    }
    if state.installed_tool == tool_id {
        return Ok(ToolSwapOutcome::Blocked(ToolSwapBlock::AlreadyInstalled(tool_id)));
    }
    if !warehouse.try_remove(tool_id, 1) {
        return Ok(ToolSwapOutcome::Blocked(ToolSwapBlock::NotInStock(tool_id)));
    }

    let previous = state.installed_tool;
    if !previous.is_none() && !warehouse.try_add(previous, 1) {
        warehouse.restore(tool_id, 1);
        error!("Could not return {} while equipping {}, withdrawal rolled back", previous, tool_id);
        return Err(EconomyError::ToolSwapInconsistent(format!(
            "returning {} failed, withdrawal of {} rolled back",
            previous, tool_id
        )));
    }

    state.installed_tool = tool_id;
    state.installed_tool_quality = def.quality as f32;
    Ok(ToolSwapOutcome::Equipped {
        installed: tool_id,
        returned: previous,
    })
}

/// Return the installed tool to the warehouse.
pub fn unequip_tool(state: &mut ProcessorState, warehouse: &mut Warehouse) -> ToolSwapOutcome {
    if !state.has_tool() {
        return ToolSwapOutcome::Blocked(ToolSwapBlock::NothingInstalled);
    }
    let tool = state.installed_tool;
    if !warehouse.try_add(tool, 1) {
        return ToolSwapOutcome::Blocked(ToolSwapBlock::WarehouseFull);
    }
    state.installed_tool = ResourceId::NONE;
    state.installed_tool_quality = 0.0;
    ToolSwapOutcome::Unequipped { returned: tool }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamlet_logic::constants::resources::*;

    fn setup() -> (ProcessorState, ToolCatalog, Warehouse) {
        let mut warehouse = Warehouse::new(1);
        assert!(warehouse.try_add(TOOL_BRONZE_SAW, 1));
        assert!(warehouse.try_add(TOOL_STEEL_SAW, 1));
        (ProcessorState::new(SLOT_SAW), ToolCatalog::standard(), warehouse)
    }

    #[test]
    fn test_equip_then_swap() {
        let (mut state, tools, mut warehouse) = setup();
        let outcome = equip_tool(&mut state, TOOL_BRONZE_SAW, &tools, &mut warehouse).unwrap();
        assert_eq!(
            outcome,
            ToolSwapOutcome::Equipped {
                installed: TOOL_BRONZE_SAW,
                returned: ResourceId::NONE
            }
        );
        assert_eq!(state.installed_tool_quality, 8.0);
        assert_eq!(warehouse.get(TOOL_BRONZE_SAW), 0);

        let outcome = equip_tool(&mut state, TOOL_STEEL_SAW, &tools, &mut warehouse).unwrap();
        assert_eq!(
            outcome,
            ToolSwapOutcome::Equipped {
                installed: TOOL_STEEL_SAW,
                returned: TOOL_BRONZE_SAW
            }
        );
        assert_eq!(warehouse.get(TOOL_BRONZE_SAW), 1);
        assert_eq!(warehouse.get(TOOL_STEEL_SAW), 0);
        assert_eq!(state.installed_tool_quality, 16.0);
    }

    #[test]
    fn test_blocked_swaps() {
        let (mut state, tools, mut warehouse) = setup();
        assert_eq!(
            equip_tool(&mut state, TOOL_IRON_AXE, &tools, &mut warehouse).unwrap(),
            ToolSwapOutcome::Blocked(ToolSwapBlock::WrongSlot {
                tool: TOOL_IRON_AXE,
                slot: SLOT_SAW
            })
        );
        assert_eq!(
            equip_tool(&mut state, WOOD, &tools, &mut warehouse).unwrap(),
            ToolSwapOutcome::Blocked(ToolSwapBlock::UnknownTool(WOOD))
        );
        assert!(warehouse.try_remove(TOOL_STEEL_SAW, 1));
        assert_eq!(
            equip_tool(&mut state, TOOL_STEEL_SAW, &tools, &mut warehouse).unwrap(),
            ToolSwapOutcome::Blocked(ToolSwapBlock::NotInStock(TOOL_STEEL_SAW))
        );
        assert_eq!(
            unequip_tool(&mut state, &mut warehouse),
            ToolSwapOutcome::Blocked(ToolSwapBlock::NothingInstalled)
        );
        assert!(!state.has_tool());
    }

    #[test]
    fn test_already_installed() {
        let (mut state, tools, mut warehouse) = setup();
        equip_tool(&mut state, TOOL_BRONZE_SAW, &tools, &mut warehouse).unwrap();
        assert!(warehouse.try_add(TOOL_BRONZE_SAW, 1));
        assert_eq!(
            equip_tool(&mut state, TOOL_BRONZE_SAW, &tools, &mut warehouse).unwrap(),
            ToolSwapOutcome::Blocked(ToolSwapBlock::AlreadyInstalled(TOOL_BRONZE_SAW))
        );
        assert_eq!(warehouse.get(TOOL_BRONZE_SAW), 1);
    }

    #[test]
    fn test_unequip_needs_space() {
        let (mut state, tools, mut warehouse) = setup();
        equip_tool(&mut state, TOOL_BRONZE_SAW, &tools, &mut warehouse).unwrap();
        assert!(warehouse.try_add(WOOD, warehouse.free_space()));
        assert_eq!(
            unequip_tool(&mut state, &mut warehouse),
            ToolSwapOutcome::Blocked(ToolSwapBlock::WarehouseFull)
        );
        assert_eq!(state.installed_tool, TOOL_BRONZE_SAW);

        assert!(warehouse.try_remove(WOOD, 1));
        assert_eq!(
            unequip_tool(&mut state, &mut warehouse),
            ToolSwapOutcome::Unequipped {
                returned: TOOL_BRONZE_SAW
            }
        );
        assert_eq!(state.installed_tool_quality, 0.0);
    }

    #[test]
    fn test_failed_return_is_inconsistent() {
        // Over capacity after a downgrade: withdrawing one tool leaves no room
        // to return the old one.
        let (mut state, tools, mut warehouse) = setup();
        equip_tool(&mut state, TOOL_BRONZE_SAW, &tools, &mut warehouse).unwrap();
        warehouse.set_level(2);
        assert!(warehouse.try_add(STONE, warehouse.free_space()));
        warehouse.set_level(1);

        let total_before = warehouse.total_stored();
        let result = equip_tool(&mut state, TOOL_STEEL_SAW, &tools, &mut warehouse);
        assert!(matches!(result, Err(EconomyError::ToolSwapInconsistent(_))));
        assert_eq!(state.installed_tool, TOOL_BRONZE_SAW);
        assert_eq!(state.installed_tool_quality, 8.0);
        // The new tool goes back on the shelf.
        assert_eq!(warehouse.get(TOOL_STEEL_SAW), 1);
        assert_eq!(warehouse.get(TOOL_BRONZE_SAW), 0);
        assert_eq!(warehouse.total_stored(), total_before);
    }
}
