//! Production system - one scheduler tick of producer output
//!
//! Every working producer contributes `round(base * multiplier)` of each
//! output, where the multiplier comes from its synergy rules. The
//! contributions are summed per resource, sorted by ascending id and
//! deposited with the clamped policy, so lower ids win when space runs out.

use std::collections::BTreeMap;

use hamlet_logic::catalog::BuildingCatalog;
use hamlet_logic::resource::ResourceStack;
use hamlet_logic::synergy::{evaluate, production_multiplier, SynergyConfig};
use hamlet_logic::world::{HexCoord, WorldQuery};
use hecs::{Entity, World};
use log::{debug, warn};

use super::events::{EconomyEvent, EventQueue};
use crate::components::{Building, BuildingRole};
use crate::warehouse::{ClampedDeposit, Warehouse};

/// What one producer made this tick
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerOutput {
    pub entity: Entity,
    pub coord: HexCoord,
    pub multiplier: f32,
    pub outputs: Vec<ResourceStack>,
}

/// Aggregated output of all producers for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionBatch {
    /// Summed per resource, ascending id
    pub totals: Vec<ResourceStack>,
    pub producers: Vec<ProducerOutput>,
}

impl ProductionBatch {
    pub fn total_units(&self) -> u64 {
        hamlet_logic::resource::total_amount(&self.totals)
    }
}

/// Outcome of a deposited tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub batch: ProductionBatch,
    pub deposit: ClampedDeposit,
    /// The batch had output but nothing was accepted
    pub blocked: bool,
}

/// Compute this tick's output without touching the warehouse.
pub fn collect_production<W: WorldQuery + ?Sized>(
    world: &World,
    catalog: &BuildingCatalog,
    query: &W,
    config: &SynergyConfig,
) -> ProductionBatch {
    let mut totals: BTreeMap<_, u64> = BTreeMap::new();
    let mut producers = Vec::new();

    for (entity, building) in world.query::<&Building>().iter() {
        if !building.can_work() {
            continue;
        }
        let BuildingRole::Producer(profile) = &building.role else {
            continue;
        };
        let Some(kind) = catalog.get(&building.kind_id) else {
            warn!(
                "Skipping producer {:?}: unknown building kind '{}'",
                entity, building.kind_id
            );
            continue;
        };

        let multiplier = production_multiplier(evaluate(building.coord, kind, query, config));
        let mut outputs = Vec::with_capacity(profile.base_output_per_tick.len());
        for stack in &profile.base_output_per_tick {
            let amount = (stack.amount as f32 * multiplier).round();
            if amount < 1.0 || stack.id.is_none() {
                continue;
            }
            let amount = amount.min(u32::MAX as f32) as u32;
            *totals.entry(stack.id).or_default() += amount as u64;
            outputs.push(ResourceStack::new(stack.id, amount));
        }

        if !outputs.is_empty() {
            producers.push(ProducerOutput {
                entity,
                coord: building.coord,
                multiplier,
                outputs,
            });
        }
    }

    ProductionBatch {
        totals: totals
            .into_iter()
            .map(|(id, amount)| ResourceStack::new(id, amount.min(u32::MAX as u64) as u32))
            .collect(),
        producers,
    }
}

/// Run one production tick: collect, deposit (clamped), report.
///
/// Never fails. A full warehouse wastes the batch and raises
/// [`EconomyEvent::ProductionBlocked`]; nothing is carried over.
pub fn production_tick<W: WorldQuery + ?Sized>(
    tick: u64,
    world: &World,
    catalog: &BuildingCatalog,
    query: &W,
    config: &SynergyConfig,
    warehouse: &mut Warehouse,
    events: &mut EventQueue,
) -> TickReport {
    let batch = collect_production(world, catalog, query, config);
    let deposit = warehouse.try_add_clamped(&batch.totals);
    events.extend_inventory(warehouse.drain_notifications());

    let blocked = !batch.totals.is_empty() && deposit.accepted == 0;
    if blocked {
        warn!(
            "Tick {}: production blocked, warehouse full ({} units wasted)",
            tick, deposit.wasted
        );
        events.push(EconomyEvent::ProductionBlocked {
            tick,
            wasted: deposit.wasted,
        });
    } else {
        debug!(
            "Tick {}: {} producers, accepted {}, wasted {}",
            tick,
            batch.producers.len(),
            deposit.accepted,
            deposit.wasted
        );
        events.push(EconomyEvent::TickCompleted {
            tick,
            accepted: deposit.accepted,
            wasted: deposit.wasted,
        });
    }

    TickReport {
        tick,
        batch,
        deposit,
        blocked,
    }
}
