//! Active slots - how many working buildings the town hall supports

use hamlet_logic::capacity::{active_slots, clamp_town_hall_level};
use hecs::{Entity, World};

use crate::components::{Building, BuildingRole};
use crate::error::EconomyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    Activated,
    Deactivated,
    Unchanged,
    NoFreeSlot,
}

/// Highest town hall level in the village, 1 when there is none.
pub fn town_hall_level(world: &World) -> u32 {
    world
        .query::<&Building>()
        .iter()
        .filter(|(_, b)| matches!(b.role, BuildingRole::TownHall))
        .map(|(_, b)| b.level)
        .max()
        .map_or(1, clamp_town_hall_level)
}

pub fn active_slot_limit(world: &World) -> u32 {
    active_slots(town_hall_level(world))
}

/// Slots held by active slot-consuming buildings.
pub fn active_slot_usage(world: &World) -> u32 {
    world
        .query::<&Building>()
        .iter()
        .filter(|(_, b)| b.is_active && b.consumes_active_slot())
        .count() as u32
}

/// Switch a building on or off, respecting the slot limit.
pub fn set_active(world: &mut World, entity: Entity, active: bool) -> Result<ActivationOutcome, EconomyError> {
    let (is_active, needs_slot) = {
        let building = world
            .get::<&Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        (building.is_active, building.consumes_active_slot())
    };

    if is_active == active {
        return Ok(ActivationOutcome::Unchanged);
    }
    if active && needs_slot && active_slot_usage(world) >= active_slot_limit(world) {
        return Ok(ActivationOutcome::NoFreeSlot);
    }

    let mut building = world
        .get::<&mut Building>(entity)
        .map_err(|_| EconomyError::UnknownBuilding(entity))?;
    building.is_active = active;
    Ok(if active {
        ActivationOutcome::Activated
    } else {
        ActivationOutcome::Deactivated
    })
}
