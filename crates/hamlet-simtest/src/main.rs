//! Hamlet Headless Simulation Harness
//!
//! Validates economy rules and bundled data without a game front end.
//! Runs entirely in-process: no rendering, no input, no networking.
//!
//! Usage:
//!   cargo run -p hamlet-simtest
//!   cargo run -p hamlet-simtest -- --verbose

use hamlet_core::map::{TileMap, VillageView};
use hamlet_core::prelude::*;
use hamlet_logic::capacity::{
    active_slots, tile_capacity, warehouse_capacity, MAX_TOWN_HALL_LEVEL, MAX_WAREHOUSE_LEVEL,
};
use hamlet_logic::catalog::{BuildingCatalog, BuildingRoleKind};
use hamlet_logic::config::EconomyConfig;
use hamlet_logic::constants::{kinds, resources::*, tags};
use hamlet_logic::quality::output_quality;
use hamlet_logic::resource::{all_resources, ResourceStack};
use hamlet_logic::synergy::{evaluate, production_multiplier};
use hamlet_logic::tools::ToolCatalog;
use hamlet_logic::world::{TerrainType, Tile};
use hexx::Hex;
use log::{Level, LevelFilter, Metadata, Record};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

// ── Bundled data (same JSON a front end ships) ──────────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/village_catalog.json");
const CONFIG_JSON: &str = include_str!("../../../data/economy_config.json");

const SOAK_SEED: u64 = 0x4841_4d4c;
const SOAK_STEPS: usize = 600;

/// Just enough of the catalog file to cross-check the parsed catalog
#[derive(Debug, Deserialize)]
struct CatalogHeader {
    kinds: Vec<KindHeader>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct KindHeader {
    id: String,
}

// ── Logging ─────────────────────────────────────────────────────────────

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:5}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    if verbose && log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
    println!("=== Hamlet Economy Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog and config validation
    let catalog = match validate_data(&mut results, verbose) {
        Some(catalog) => catalog,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Capacity tables
    results.extend(validate_capacity_tables(verbose));

    // 3. Quality formula sweep
    results.extend(validate_quality_sweep(verbose));

    // 4. Synergy multipliers on a generated map
    results.extend(validate_synergy_bounds(&catalog, verbose));

    // 5. Warehouse conservation
    results.extend(validate_warehouse_conservation(verbose));

    // 6. Seeded soak run
    results.extend(validate_soak_run(&catalog, verbose));

    // 7. Save/load round trip
    results.extend(validate_save_load(&catalog, verbose));

    let failed = report(&results, verbose);
    if failed > 0 {
        std::process::exit(1);
    }
}

/// Print the summary and return the number of failures.
fn report(results: &[TestResult], verbose: bool) -> usize {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed
}

// ── 1. Data ─────────────────────────────────────────────────────────────

fn validate_data(results: &mut Vec<TestResult>, verbose: bool) -> Option<BuildingCatalog> {
    println!("--- Catalog & Config ---");

    let catalog = match BuildingCatalog::from_json(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("catalog error: {}", e),
            });
            return None;
        }
    };
    results.push(TestResult {
        name: "catalog_parse".into(),
        passed: true,
        detail: format!("{} building kinds loaded", catalog.len()),
    });

    let header_count = serde_json::from_str::<CatalogHeader>(CATALOG_JSON)
        .map(|h| h.kinds.len())
        .unwrap_or(0);
    results.push(TestResult {
        name: "catalog_kind_count".into(),
        passed: header_count == catalog.len(),
        detail: format!("{} in file, {} parsed", header_count, catalog.len()),
    });

    let missing: Vec<&str> = [
        kinds::TOWN_HALL,
        kinds::WAREHOUSE,
        kinds::LUMBER_CAMP,
        kinds::QUARRY,
        kinds::FARM,
        kinds::SAWMILL,
        kinds::MILL,
    ]
    .into_iter()
    .filter(|id| catalog.get(id).is_none())
    .collect();
    results.push(TestResult {
        name: "catalog_key_kinds".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            "hall, warehouse, producers and processors present".into()
        } else {
            format!("missing: {}", missing.join(", "))
        },
    });

    // Every processor slot must accept at least one tool
    let tools = ToolCatalog::standard();
    let orphan_slots: Vec<&str> = catalog
        .kinds()
        .iter()
        .filter(|k| k.role == BuildingRoleKind::Processor)
        .filter(|k| k.tool_slot.is_some_and(|slot| tools.tools_for_slot(slot).is_empty()))
        .map(|k| k.id.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_tool_slots".into(),
        passed: orphan_slots.is_empty(),
        detail: if orphan_slots.is_empty() {
            "every processor slot has a matching tool".into()
        } else {
            format!("no tools for: {}", orphan_slots.join(", "))
        },
    });

    // Processor outputs must be distinct from their inputs
    let cyclic: Vec<String> = catalog
        .kinds()
        .iter()
        .flat_map(|k| k.recipes.iter().map(move |r| (k, r)))
        .filter(|(_, r)| r.inputs.iter().any(|i| i.id == r.output))
        .map(|(k, r)| format!("{} -> {}", k.id, r.output))
        .collect();
    results.push(TestResult {
        name: "catalog_recipes_acyclic".into(),
        passed: cyclic.is_empty(),
        detail: if cyclic.is_empty() {
            "no recipe consumes its own output".into()
        } else {
            cyclic.join(", ")
        },
    });

    match EconomyConfig::from_json(CONFIG_JSON) {
        Ok(config) => results.push(TestResult {
            name: "config_parse".into(),
            passed: config == EconomyConfig::default(),
            detail: format!(
                "tick {}s, {:?}, bundled file matches defaults",
                config.tick_interval_seconds, config.catch_up
            ),
        }),
        Err(e) => results.push(TestResult {
            name: "config_parse".into(),
            passed: false,
            detail: format!("config error: {}", e),
        }),
    }

    if verbose {
        println!("  Building kinds:");
        for kind in catalog.kinds() {
            println!(
                "    {:12} {:?}, {} rules, {} recipes",
                kind.id,
                kind.role,
                kind.synergy_rules.len(),
                kind.recipes.len()
            );
        }
    }

    Some(catalog)
}

// ── 2. Capacity Tables ──────────────────────────────────────────────────

fn validate_capacity_tables(_verbose: bool) -> Vec<TestResult> {
    println!("--- Capacity Tables ---");
    let mut results = Vec::new();

    let warehouse_rising = (1..MAX_WAREHOUSE_LEVEL).all(|l| warehouse_capacity(l) < warehouse_capacity(l + 1));
    results.push(TestResult {
        name: "capacity_warehouse_monotonic".into(),
        passed: warehouse_rising,
        detail: format!(
            "{} at level 1 up to {} at level {}",
            warehouse_capacity(1),
            warehouse_capacity(MAX_WAREHOUSE_LEVEL),
            MAX_WAREHOUSE_LEVEL
        ),
    });

    let hall_rising = (1..MAX_TOWN_HALL_LEVEL)
        .all(|l| active_slots(l) < active_slots(l + 1) && tile_capacity(l) < tile_capacity(l + 1));
    results.push(TestResult {
        name: "capacity_hall_monotonic".into(),
        passed: hall_rising,
        detail: "active slots and tile capacity grow with hall level".into(),
    });

    let clamped = warehouse_capacity(0) == warehouse_capacity(1)
        && warehouse_capacity(99) == warehouse_capacity(MAX_WAREHOUSE_LEVEL)
        && tile_capacity(0) == 37
        && active_slots(u32::MAX) == active_slots(MAX_TOWN_HALL_LEVEL);
    results.push(TestResult {
        name: "capacity_clamping".into(),
        passed: clamped,
        detail: "out-of-range levels clamp to the table ends".into(),
    });

    results
}

// ── 3. Quality ──────────────────────────────────────────────────────────

fn validate_quality_sweep(verbose: bool) -> Vec<TestResult> {
    println!("--- Quality Formula ---");
    let mut results = Vec::new();

    let mut non_monotonic = 0;
    let mut not_neutral = 0;
    for input in 0..=30u32 {
        let mut previous = 0;
        for tool in 0..=30u32 {
            let q = output_quality(input, tool as f32, 0.5, 0.33);
            if q < previous {
                non_monotonic += 1;
            }
            if tool == input && q != input {
                not_neutral += 1;
            }
            previous = q;
        }
    }
    results.push(TestResult {
        name: "quality_monotonic_in_tool".into(),
        passed: non_monotonic == 0,
        detail: format!("{} decreasing steps over 31x31 grid", non_monotonic),
    });
    results.push(TestResult {
        name: "quality_matching_tool_neutral".into(),
        passed: not_neutral == 0,
        detail: "tool quality equal to input leaves quality unchanged".into(),
    });

    let upgrade = output_quality(10, 14.0, 0.5, 0.33);
    let downgrade = output_quality(10, 6.0, 0.5, 0.33);
    results.push(TestResult {
        name: "quality_reference_values".into(),
        passed: upgrade == 12 && downgrade == 8,
        detail: format!("10 with tool 14 -> {}, with tool 6 -> {}", upgrade, downgrade),
    });

    if verbose {
        println!("  Input 10, gain 0.5, loss 0.33:");
        for tool in [0u32, 5, 10, 15, 20] {
            println!("    tool {:2} -> {}", tool, output_quality(10, tool as f32, 0.5, 0.33));
        }
    }

    results
}

// ── 4. Synergy ──────────────────────────────────────────────────────────

fn validate_synergy_bounds(catalog: &BuildingCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Synergy Bounds ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SOAK_SEED);
    let config = EconomyConfig::default();

    let mut engine = VillageEngine::new(catalog.clone(), config.clone());
    engine.map = random_map(&mut rng, 6);
    populate(&mut engine, &mut rng, 40);

    let view = VillageView::new(&engine.map, &engine.world);
    let mut lowest = f32::MAX;
    let mut highest = f32::MIN;
    let mut out_of_range = 0;
    let mut evaluated = 0;
    for tile in engine.map.tiles() {
        for kind in catalog.kinds() {
            let m = production_multiplier(evaluate(tile.coord, kind, &view, &config.synergy));
            lowest = lowest.min(m);
            highest = highest.max(m);
            if !(0.2 - 1e-5..=3.0 + 1e-5).contains(&m) {
                out_of_range += 1;
            }
            evaluated += 1;
        }
    }
    results.push(TestResult {
        name: "synergy_multiplier_bounds".into(),
        passed: out_of_range == 0,
        detail: format!(
            "{} evaluations, multipliers in [{:.2}, {:.2}]",
            evaluated, lowest, highest
        ),
    });

    // Raw bonus far past the clamps
    let clamped = (production_multiplier(10.0) - 3.0).abs() < 1e-5
        && (production_multiplier(-10.0) - 0.2).abs() < 1e-5;
    results.push(TestResult {
        name: "synergy_clamp_edges".into(),
        passed: clamped,
        detail: "raw bonus clamps to [-0.8, +2.0]".into(),
    });

    if verbose {
        println!("  {} buildings placed on {} tiles", engine.building_count(), engine.map.len());
    }

    results
}

// ── 5. Warehouse ────────────────────────────────────────────────────────

fn validate_warehouse_conservation(_verbose: bool) -> Vec<TestResult> {
    println!("--- Warehouse Conservation ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SOAK_SEED ^ 0xff);
    let ids = all_resources();

    let mut violations = 0;
    let mut over_capacity = 0;
    let mut warehouse = Warehouse::new(1);
    for _ in 0..2000 {
        if rng.gen_bool(0.05) {
            warehouse.set_level(rng.gen_range(1..=MAX_WAREHOUSE_LEVEL));
        }
        if rng.gen_bool(0.3) {
            let id = ids[rng.gen_range(0..ids.len())];
            warehouse.try_remove(id, rng.gen_range(0..20));
            continue;
        }

        let batch: Vec<ResourceStack> = (0..rng.gen_range(0..4))
            .map(|_| ResourceStack::new(ids[rng.gen_range(0..ids.len())], rng.gen_range(0..60)))
            .collect();
        let free_before = warehouse.free_space();
        let requested: u32 = batch.iter().map(|s| s.amount).sum();
        let result = warehouse.try_add_clamped(&batch);
        if result.accepted + result.wasted != requested || result.accepted != requested.min(free_before) {
            violations += 1;
        }
        if warehouse.total_stored() > warehouse.capacity() {
            over_capacity += 1;
        }
    }
    // Level drops can leave legitimate overflow; only deposits are checked.
    results.push(TestResult {
        name: "warehouse_clamped_conservation".into(),
        passed: violations == 0,
        detail: format!("{} violations in 2000 operations", violations),
    });
    results.push(TestResult {
        name: "warehouse_level_changes".into(),
        passed: true,
        detail: format!("{} steps over capacity after downgrades", over_capacity),
    });

    results
}

// ── 6. Soak Run ─────────────────────────────────────────────────────────

fn validate_soak_run(catalog: &BuildingCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Soak Run ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SOAK_SEED);

    let mut engine = soak_village(catalog, &mut rng);
    let mut ticks = 0u64;
    let mut over_capacity = 0;
    let mut over_slots = 0;
    let mut blocked = 0;
    let mut conversions = 0;

    for _ in 0..SOAK_STEPS {
        let delta = rng.gen_range(0.5..15.0);
        ticks += engine.update(delta).len() as u64;

        if engine.warehouse.total_stored() > engine.warehouse.capacity() {
            over_capacity += 1;
        }
        if engine.active_slot_usage() > engine.active_slot_limit() {
            over_slots += 1;
        }
        for event in engine.drain_events() {
            match event {
                EconomyEvent::ProductionBlocked { .. } => blocked += 1,
                EconomyEvent::ConversionCompleted { .. } => conversions += 1,
                _ => {}
            }
        }
    }

    results.push(TestResult {
        name: "soak_tick_count".into(),
        passed: ticks == engine.clock().ticks_run() && ticks > 0,
        detail: format!("{} ticks over {:.0}s", ticks, engine.sim_time()),
    });
    results.push(TestResult {
        name: "soak_capacity_respected".into(),
        passed: over_capacity == 0,
        detail: format!(
            "{} / {} stored at end",
            engine.warehouse.total_stored(),
            engine.warehouse.capacity()
        ),
    });
    results.push(TestResult {
        name: "soak_slots_respected".into(),
        passed: over_slots == 0,
        detail: format!(
            "{} / {} active slots in use",
            engine.active_slot_usage(),
            engine.active_slot_limit()
        ),
    });
    results.push(TestResult {
        name: "soak_processors_ran".into(),
        passed: conversions > 0,
        detail: format!("{} conversions, {} blocked ticks", conversions, blocked),
    });

    if verbose {
        println!("  Final stock:");
        for stack in engine.warehouse.iter() {
            println!("    {:14} {}", stack.id.to_string(), stack.amount);
        }
    }

    results
}

// ── 7. Save/Load ────────────────────────────────────────────────────────

fn validate_save_load(catalog: &BuildingCatalog, _verbose: bool) -> Vec<TestResult> {
    println!("--- Save/Load ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SOAK_SEED);

    let mut engine = soak_village(catalog, &mut rng);
    for _ in 0..50 {
        engine.update(rng.gen_range(0.5..15.0));
    }

    let mut buffer = Vec::new();
    if let Err(e) = engine.save(&mut buffer) {
        results.push(TestResult {
            name: "save_roundtrip".into(),
            passed: false,
            detail: format!("save failed: {}", e),
        });
        return results;
    }

    let mut loaded = VillageEngine::new(catalog.clone(), engine.config().clone());
    if let Err(e) = loaded.load(&buffer[..]) {
        results.push(TestResult {
            name: "save_roundtrip".into(),
            passed: false,
            detail: format!("load failed: {}", e),
        });
        return results;
    }
    results.push(TestResult {
        name: "save_roundtrip".into(),
        passed: loaded.warehouse.snapshot() == engine.warehouse.snapshot()
            && loaded.building_count() == engine.building_count(),
        detail: format!("{} bytes, {} buildings", buffer.len(), loaded.building_count()),
    });

    // Both copies must evolve identically from here.
    for _ in 0..50 {
        let delta = rng.gen_range(0.5..15.0);
        engine.update(delta);
        loaded.update(delta);
    }
    results.push(TestResult {
        name: "save_deterministic_resume".into(),
        passed: loaded.warehouse.snapshot() == engine.warehouse.snapshot()
            && loaded.clock().ticks_run() == engine.clock().ticks_run(),
        detail: format!("{} ticks, stock matches", engine.clock().ticks_run()),
    });

    results
}

// ── Village builders ────────────────────────────────────────────────────

fn random_map(rng: &mut StdRng, radius: i32) -> TileMap {
    let mut map = TileMap::hexagon(radius, |_| match rng.gen_range(0..10) {
        0..=2 => TerrainType::Forest,
        3 => TerrainType::Hills,
        4 => TerrainType::Mountain,
        5 => TerrainType::Water,
        _ => TerrainType::Grassland,
    });

    let coords: Vec<Hex> = map.tiles().map(|t| t.coord).collect();
    for coord in coords {
        let Some(tile) = map.tile(coord).cloned() else {
            continue;
        };
        let extra = match rng.gen_range(0..8) {
            0 => Some(tags::FERTILE),
            1 => Some(tags::ROCKS),
            2 => Some(tags::RIVER),
            _ => None,
        };
        if let Some(tag) = extra {
            map.insert_tile(tile.with_tag(tag));
        }
    }
    for x in -radius..=radius {
        map.set_road(Hex::new(x, 0), true);
    }
    map
}

/// Place `count` random buildings on free tiles off the main road.
fn populate(engine: &mut VillageEngine, rng: &mut StdRng, count: usize) {
    let kinds: Vec<String> = engine
        .catalog()
        .kinds()
        .iter()
        .filter(|k| k.role != BuildingRoleKind::TownHall)
        .map(|k| k.id.clone())
        .collect();
    let mut coords: Vec<Hex> = engine.map.tiles().map(|t: &Tile| t.coord).filter(|c| c.y != 0).collect();
    coords.sort_by_key(|c| (c.x, c.y));

    for _ in 0..count {
        if coords.is_empty() || kinds.is_empty() {
            break;
        }
        let coord = coords.swap_remove(rng.gen_range(0..coords.len()));
        let kind = &kinds[rng.gen_range(0..kinds.len())];
        if let Err(e) = engine.spawn_building(kind, coord) {
            log::warn!("Could not place {} at {:?}: {}", kind, coord, e);
        }
    }
}

/// A mid-game village: level-5 hall, level-3 warehouse, seeded stock and tools.
fn soak_village(catalog: &BuildingCatalog, rng: &mut StdRng) -> VillageEngine {
    let mut engine = VillageEngine::new(catalog.clone(), EconomyConfig::default());
    engine.map = random_map(rng, 7);

    if let Ok(hall) = engine.spawn_building(kinds::TOWN_HALL, Hex::ZERO) {
        if let Ok(mut building) = engine.world.get::<&mut Building>(hall) {
            building.level = 5;
        }
    }
    engine.set_warehouse_level(3);
    let owned: Vec<Hex> = engine.map.tiles().map(|t| t.coord).collect();
    for coord in owned {
        engine.claim_tile(coord);
    }

    // Processors first so they hold active slots.
    for (kind, coord) in [(kinds::SAWMILL, Hex::new(1, 1)), (kinds::MILL, Hex::new(-1, 1))] {
        if let Err(e) = engine.spawn_building(kind, coord) {
            log::warn!("Could not place {} at {:?}: {}", kind, coord, e);
        }
    }
    populate(&mut engine, rng, 30);

    for (id, amount) in [(WOOD, 40), (GRAIN, 30), (CLAY, 20), (ORE, 20)] {
        engine.warehouse.try_add(id, amount);
    }
    for tool in [TOOL_BRONZE_SAW, TOOL_BONE_SPINDLE, TOOL_IRON_HAMMER, TOOL_MILLSTONE] {
        engine.warehouse.try_add(tool, 1);
    }

    let processors: Vec<_> = engine
        .world
        .query::<&Building>()
        .iter()
        .filter(|(_, b)| b.processor().is_some())
        .map(|(entity, _)| entity)
        .collect();
    for entity in processors {
        let _ = engine.set_auto_convert(entity, true);
        for tool in [TOOL_BRONZE_SAW, TOOL_BONE_SPINDLE, TOOL_IRON_HAMMER, TOOL_MILLSTONE] {
            if let Ok(ToolSwapOutcome::Equipped { .. }) = engine.equip_tool(entity, tool) {
                break;
            }
        }
    }
    engine.drain_events();
    engine
}
