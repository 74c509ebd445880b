//! Village engine - main entry point for running the economy

use hamlet_logic::capacity::tile_capacity;
use hamlet_logic::catalog::BuildingCatalog;
use hamlet_logic::config::EconomyConfig;
use hamlet_logic::resource::ResourceId;
use hamlet_logic::synergy::{evaluate, evaluate_detailed, production_multiplier, SynergyBreakdown};
use hamlet_logic::tools::ToolCatalog;
use hamlet_logic::world::HexCoord;
use hecs::{Entity, World};
use log::{debug, error, info, warn};

use crate::components::*;
use crate::error::EconomyError;
use crate::map::{TileMap, VillageView};
use crate::materials::MaterialQualities;
use crate::persistence::{self, SaveError};
use crate::scheduler::TickClock;
use crate::systems::*;
use crate::warehouse::Warehouse;

/// Main simulation engine
///
/// Owns every piece of mutable economy state. Systems receive the parts
/// they need as arguments; nothing is looked up globally.
pub struct VillageEngine {
    /// ECS world containing all building entities
    pub world: World,
    /// Tiles, roads and claimed land
    pub map: TileMap,
    /// The village store
    pub warehouse: Warehouse,
    /// Current grade of processed materials
    pub qualities: MaterialQualities,
    /// Simulation time in seconds since start
    pub sim_time: f64,

    catalog: BuildingCatalog,
    tools: ToolCatalog,
    config: EconomyConfig,
    clock: TickClock,
    events: EventQueue,
    time_scale: f32,
}

impl VillageEngine {
    /// Create an empty village with a level-1 warehouse
    pub fn new(catalog: BuildingCatalog, config: EconomyConfig) -> Self {
        Self::with_tools(catalog, ToolCatalog::standard(), config)
    }

    pub fn with_tools(catalog: BuildingCatalog, tools: ToolCatalog, config: EconomyConfig) -> Self {
        info!(
            "Village engine created: {} building kinds, {} tools, tick every {}s",
            catalog.len(),
            tools.len(),
            config.tick_interval_seconds
        );
        Self {
            world: World::new(),
            map: TileMap::new(),
            warehouse: Warehouse::new(1),
            qualities: MaterialQualities::new(config.default_material_quality),
            sim_time: 0.0,
            clock: TickClock::from_config(&config),
            catalog,
            tools,
            config,
            events: EventQueue::new(),
            time_scale: 1.0,
        }
    }

    pub fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    pub fn tools(&self) -> &ToolCatalog {
        &self.tools
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    // ── Buildings ──────────────────────────────────────────────────────

    /// Place a building. It is switched on right away if a slot is free.
    pub fn spawn_building(&mut self, kind_id: &str, coord: HexCoord) -> Result<Entity, EconomyError> {
        let kind = self
            .catalog
            .get(kind_id)
            .ok_or_else(|| EconomyError::UnknownKind(kind_id.to_string()))?;
        if self.building_at(coord).is_some() {
            return Err(EconomyError::TileOccupied(coord));
        }

        let building = Building::from_kind(kind, coord);
        let entity = self.world.spawn((building,));
        let outcome = set_active(&mut self.world, entity, true)?;
        debug!("Spawned {} at {:?}: {:?}", kind_id, coord, outcome);
        Ok(entity)
    }

    /// Remove a building. An installed tool goes back to the warehouse if it fits.
    pub fn remove_building(&mut self, entity: Entity) -> Result<Building, EconomyError> {
        let building = self
            .world
            .remove_one::<Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        let _ = self.world.despawn(entity);

        if let Some(state) = building.processor() {
            if state.has_tool() && !self.warehouse.try_add(state.installed_tool, 1) {
                warn!(
                    "Warehouse full: {} from removed {} was lost",
                    state.installed_tool, building.kind_id
                );
            }
        }
        self.flush_inventory_events();
        Ok(building)
    }

    pub fn building(&self, entity: Entity) -> Option<Building> {
        self.world.get::<&Building>(entity).ok().map(|b| (*b).clone())
    }

    pub fn building_at(&self, coord: HexCoord) -> Option<Entity> {
        self.world
            .query::<&Building>()
            .iter()
            .find(|(_, b)| b.coord == coord)
            .map(|(entity, _)| entity)
    }

    pub fn building_count(&self) -> usize {
        self.world.query::<&Building>().iter().count()
    }

    /// Move a building. It stops working until the relocation cooldown runs out.
    pub fn relocate_building(&mut self, entity: Entity, coord: HexCoord) -> Result<(), EconomyError> {
        if let Some(other) = self.building_at(coord) {
            if other != entity {
                return Err(EconomyError::TileOccupied(coord));
            }
        }
        let mut building = self
            .world
            .get::<&mut Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        building.coord = coord;
        building.relocation_cooldown_seconds = self.config.relocation_cooldown_seconds;
        Ok(())
    }

    pub fn set_active(&mut self, entity: Entity, active: bool) -> Result<ActivationOutcome, EconomyError> {
        set_active(&mut self.world, entity, active)
    }

    pub fn town_hall_level(&self) -> u32 {
        town_hall_level(&self.world)
    }

    pub fn active_slot_limit(&self) -> u32 {
        active_slot_limit(&self.world)
    }

    pub fn active_slot_usage(&self) -> u32 {
        active_slot_usage(&self.world)
    }

    // ── Land and storage ───────────────────────────────────────────────

    /// Claim a tile, limited by the town hall's tile capacity.
    pub fn claim_tile(&mut self, coord: HexCoord) -> bool {
        let limit = tile_capacity(self.town_hall_level());
        self.map.claim(coord, limit)
    }

    pub fn set_warehouse_level(&mut self, level: u32) {
        self.warehouse.set_level(level);
        self.flush_inventory_events();
    }

    // ── Simulation ─────────────────────────────────────────────────────

    /// Advance the simulation by `delta_seconds` of real time.
    ///
    /// Returns the reports of the ticks that ran during this step.
    pub fn update(&mut self, delta_seconds: f32) -> Vec<TickReport> {
        let scaled = delta_seconds * self.time_scale;
        if !scaled.is_finite() || scaled <= 0.0 {
            return Vec::new();
        }
        self.sim_time += scaled as f64;

        for (_, building) in self.world.query_mut::<&mut Building>() {
            if building.relocation_cooldown_seconds > 0.0 {
                building.relocation_cooldown_seconds = (building.relocation_cooldown_seconds - scaled).max(0.0);
            }
        }

        let due = self.clock.advance(scaled);
        (0..due).map(|_| self.run_tick()).collect()
    }

    /// Run one production tick now, then any auto-converting processors.
    pub fn run_tick(&mut self) -> TickReport {
        let tick = self.clock.record_tick();
        let view = VillageView::new(&self.map, &self.world);
        let report = production_tick(
            tick,
            &self.world,
            &self.catalog,
            &view,
            &self.config.synergy,
            &mut self.warehouse,
            &mut self.events,
        );

        let auto: Vec<Entity> = self
            .world
            .query::<&Building>()
            .iter()
            .filter(|(_, b)| b.can_work() && b.processor().is_some_and(|p| p.auto_convert))
            .map(|(entity, _)| entity)
            .collect();
        for entity in auto {
            if let Err(e) = self.convert(entity) {
                error!("Auto-conversion at {:?} failed: {}", entity, e);
            }
        }

        report
    }

    // ── Processors ─────────────────────────────────────────────────────

    /// Run one conversion at a processor.
    pub fn convert(&mut self, entity: Entity) -> Result<ConversionOutcome, EconomyError> {
        let building = self
            .world
            .get::<&Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        let state = building.processor().ok_or(EconomyError::NotAProcessor(entity))?;

        let outcome = if building.is_relocating() {
            ConversionOutcome::Blocked(BlockReason::Relocating)
        } else {
            let kind = self
                .catalog
                .get(&building.kind_id)
                .ok_or_else(|| EconomyError::UnknownKind(building.kind_id.clone()))?;
            try_convert(state, &kind.recipes, &mut self.warehouse, &mut self.qualities)?
        };
        drop(building);

        self.flush_inventory_events();
        self.events.push(match outcome {
            ConversionOutcome::Converted {
                output,
                amount,
                quality,
                stored,
            } => EconomyEvent::ConversionCompleted {
                building: entity,
                output,
                amount,
                quality,
                stored,
            },
            ConversionOutcome::Blocked(reason) => EconomyEvent::ConversionBlocked {
                building: entity,
                reason,
            },
        });
        Ok(outcome)
    }

    /// Whether a conversion at `entity` would run right now.
    pub fn can_convert(&self, entity: Entity) -> Result<bool, EconomyError> {
        let building = self
            .world
            .get::<&Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        let state = building.processor().ok_or(EconomyError::NotAProcessor(entity))?;
        if building.is_relocating() {
            return Ok(false);
        }
        let Some(kind) = self.catalog.get(&building.kind_id) else {
            return Ok(false);
        };
        Ok(can_convert(state, &kind.recipes, &self.warehouse).is_ok())
    }

    /// Expected output of the next conversion, including the processor's synergy.
    pub fn preview_conversion(&self, entity: Entity) -> Result<Option<ConversionPreview>, EconomyError> {
        let building = self
            .world
            .get::<&Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        let state = building.processor().ok_or(EconomyError::NotAProcessor(entity))?;
        let kind = self
            .catalog
            .get(&building.kind_id)
            .ok_or_else(|| EconomyError::UnknownKind(building.kind_id.clone()))?;

        let view = VillageView::new(&self.map, &self.world);
        let multiplier = production_multiplier(evaluate(building.coord, kind, &view, &self.config.synergy));
        Ok(preview_conversion(state, &kind.recipes, &self.qualities, multiplier))
    }

    /// Select which of the kind's recipes a processor runs.
    pub fn set_recipe(&mut self, entity: Entity, recipe_index: usize) -> Result<(), EconomyError> {
        self.with_processor(entity, |state| state.recipe_index = recipe_index)
    }

    pub fn set_auto_convert(&mut self, entity: Entity, enabled: bool) -> Result<(), EconomyError> {
        self.with_processor(entity, |state| state.auto_convert = enabled)
    }

    pub fn equip_tool(&mut self, entity: Entity, tool_id: ResourceId) -> Result<ToolSwapOutcome, EconomyError> {
        let mut building = self
            .world
            .get::<&mut Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        let state = building.processor_mut().ok_or(EconomyError::NotAProcessor(entity))?;
        let result = equip_tool(state, tool_id, &self.tools, &mut self.warehouse);
        drop(building);

        self.flush_inventory_events();
        let outcome = result?;
        if let ToolSwapOutcome::Equipped { installed, returned } = outcome {
            self.events.push(EconomyEvent::ToolSwapped {
                building: entity,
                installed,
                removed: returned,
            });
        }
        Ok(outcome)
    }

    pub fn unequip_tool(&mut self, entity: Entity) -> Result<ToolSwapOutcome, EconomyError> {
        let mut building = self
            .world
            .get::<&mut Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        let state = building.processor_mut().ok_or(EconomyError::NotAProcessor(entity))?;
        let outcome = unequip_tool(state, &mut self.warehouse);
        drop(building);

        self.flush_inventory_events();
        if let ToolSwapOutcome::Unequipped { returned } = outcome {
            self.events.push(EconomyEvent::ToolSwapped {
                building: entity,
                installed: ResourceId::NONE,
                removed: returned,
            });
        }
        Ok(outcome)
    }

    /// Rule-by-rule bonus of a building at its current position.
    pub fn synergy_breakdown(&self, entity: Entity) -> Result<SynergyBreakdown, EconomyError> {
        let building = self
            .world
            .get::<&Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        let kind = self
            .catalog
            .get(&building.kind_id)
            .ok_or_else(|| EconomyError::UnknownKind(building.kind_id.clone()))?;
        let view = VillageView::new(&self.map, &self.world);
        Ok(evaluate_detailed(building.coord, kind, &view, &self.config.synergy))
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Take every pending event, oldest first.
    pub fn drain_events(&mut self) -> Vec<EconomyEvent> {
        self.flush_inventory_events();
        self.events.drain()
    }

    fn flush_inventory_events(&mut self) {
        let changes = self.warehouse.drain_notifications();
        self.events.extend_inventory(changes);
    }

    fn with_processor(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut ProcessorState),
    ) -> Result<(), EconomyError> {
        let mut building = self
            .world
            .get::<&mut Building>(entity)
            .map_err(|_| EconomyError::UnknownBuilding(entity))?;
        let state = building.processor_mut().ok_or(EconomyError::NotAProcessor(entity))?;
        f(state);
        Ok(())
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Save village state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        let data = persistence::capture(
            &self.world,
            &self.map,
            &self.warehouse,
            &self.qualities,
            &self.clock,
            self.sim_time,
            self.time_scale,
        );
        persistence::save_village(writer, &data)?;
        info!(
            "Village saved: {} buildings, {} units stored",
            data.buildings.len(),
            self.warehouse.total_stored()
        );
        Ok(())
    }

    /// Load village state from a reader, replacing the current village.
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = persistence::load_village(reader, &self.catalog)?;

        self.world = loaded.world;
        self.map = loaded.map;
        self.warehouse.load_snapshot(&loaded.warehouse);
        self.qualities = loaded.qualities;
        self.sim_time = loaded.sim_time;
        self.time_scale = loaded.time_scale;
        self.clock = TickClock::from_config(&self.config);
        self.clock.restore(loaded.accumulated_seconds, loaded.ticks_run);
        self.events = EventQueue::new();
        self.flush_inventory_events();

        info!(
            "Village loaded: {} buildings, tick {}",
            self.building_count(),
            self.clock.ticks_run()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamlet_logic::constants::{kinds, resources::*};
    use hamlet_logic::world::TerrainType;

    fn engine() -> VillageEngine {
        let catalog = BuildingCatalog::from_json(include_str!("../../../data/village_catalog.json")).unwrap();
        let mut engine = VillageEngine::new(catalog, EconomyConfig::default());
        engine.map = TileMap::hexagon(6, |_| TerrainType::Grassland);
        engine
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine();
        assert_eq!(engine.building_count(), 0);
        assert_eq!(engine.sim_time(), 0.0);
        assert_eq!(engine.warehouse.capacity(), 200);
    }

    #[test]
    fn test_spawn_activates_until_slots_run_out() {
        let mut engine = engine();
        let a = engine.spawn_building(kinds::FARM, HexCoord::new(0, 0)).unwrap();
        let b = engine.spawn_building(kinds::FARM, HexCoord::new(2, 0)).unwrap();
        let c = engine.spawn_building(kinds::FARM, HexCoord::new(4, 0)).unwrap();
        assert!(engine.building(a).unwrap().is_active);
        assert!(engine.building(b).unwrap().is_active);
        assert!(!engine.building(c).unwrap().is_active);
        assert_eq!(engine.active_slot_usage(), 2);
    }

    #[test]
    fn test_spawn_errors() {
        let mut engine = engine();
        assert!(matches!(
            engine.spawn_building("castle", HexCoord::ZERO),
            Err(EconomyError::UnknownKind(_))
        ));
        engine.spawn_building(kinds::WELL, HexCoord::ZERO).unwrap();
        assert!(matches!(
            engine.spawn_building(kinds::FARM, HexCoord::ZERO),
            Err(EconomyError::TileOccupied(_))
        ));
    }

    #[test]
    fn test_update_runs_ticks() {
        let mut engine = engine();
        engine.spawn_building(kinds::FARM, HexCoord::ZERO).unwrap();
        assert!(engine.update(9.0).is_empty());
        let reports = engine.update(1.0);
        assert_eq!(reports.len(), 1);
        assert_eq!(engine.warehouse.get(GRAIN), 5);
        assert_eq!(engine.clock().ticks_run(), 1);
    }

    #[test]
    fn test_time_scale() {
        let mut engine = engine();
        engine.set_time_scale(2.0);
        engine.update(1.0);
        assert!((engine.sim_time() - 2.0).abs() < 1e-9);
        engine.set_time_scale(0.0);
        engine.update(1.0);
        assert!((engine.sim_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_relocation_pauses_production() {
        let mut engine = engine();
        let farm = engine.spawn_building(kinds::FARM, HexCoord::ZERO).unwrap();
        engine.relocate_building(farm, HexCoord::new(1, 1)).unwrap();
        assert_eq!(engine.building_at(HexCoord::new(1, 1)), Some(farm));

        // Cooldown is spent before the tick that ends it runs.
        engine.update(10.0);
        engine.update(10.0);
        assert_eq!(engine.warehouse.get(GRAIN), 0);
        assert!(engine.building(farm).unwrap().is_relocating());
        engine.update(10.0);
        assert_eq!(engine.warehouse.get(GRAIN), 5);
    }

    #[test]
    fn test_convert_and_events() {
        let mut engine = engine();
        let mill = engine.spawn_building(kinds::MILL, HexCoord::ZERO).unwrap();
        assert!(!engine.can_convert(mill).unwrap());
        assert!(engine.warehouse.try_add(GRAIN, 3));
        assert!(engine.can_convert(mill).unwrap());
        engine.drain_events();

        let outcome = engine.convert(mill).unwrap();
        assert!(matches!(outcome, ConversionOutcome::Converted { output, amount: 2, .. } if output == FLOUR));
        let events = engine.drain_events();
        assert!(matches!(events.last(), Some(EconomyEvent::ConversionCompleted { .. })));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, EconomyEvent::InventoryChanged { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_convert_wrong_role() {
        let mut engine = engine();
        let farm = engine.spawn_building(kinds::FARM, HexCoord::ZERO).unwrap();
        assert!(matches!(engine.convert(farm), Err(EconomyError::NotAProcessor(_))));
    }

    #[test]
    fn test_remove_returns_tool() {
        let mut engine = engine();
        let mill = engine.spawn_building(kinds::MILL, HexCoord::ZERO).unwrap();
        assert!(engine.warehouse.try_add(TOOL_MILLSTONE, 1));
        assert!(matches!(
            engine.equip_tool(mill, TOOL_MILLSTONE).unwrap(),
            ToolSwapOutcome::Equipped { .. }
        ));
        assert_eq!(engine.warehouse.get(TOOL_MILLSTONE), 0);

        let removed = engine.remove_building(mill).unwrap();
        assert_eq!(removed.kind_id, kinds::MILL);
        assert_eq!(engine.warehouse.get(TOOL_MILLSTONE), 1);
        assert!(engine.building(mill).is_none());
    }

    #[test]
    fn test_claim_tile_limited_by_hall() {
        let mut engine = engine();
        // Hexagon of radius 6 has 127 tiles; level 1 allows 37.
        let coords: Vec<HexCoord> = engine.map.tiles().map(|t| t.coord).collect();
        let claimed = coords.iter().filter(|&&c| engine.claim_tile(c)).count();
        assert_eq!(claimed, 37);
    }
}
