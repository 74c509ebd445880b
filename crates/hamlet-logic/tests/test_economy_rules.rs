//! Integration tests for synergy evaluation against a world fixture.
//!
//! Exercises: BuildingKindDef → SynergyRule evaluation → district bonus
//! → clamped production multiplier → rounded tick output.
//!
//! All tests are pure logic - no ECS, no engine.

use hamlet_logic::catalog::{BuildingCatalog, BuildingKindDef, BuildingRoleKind};
use hamlet_logic::constants::resources::*;
use hamlet_logic::constants::{kinds, tags};
use hamlet_logic::resource::ResourceStack;
use hamlet_logic::synergy::{
    evaluate, evaluate_detailed, production_multiplier, SynergyConfig, SynergyRule,
};
use hamlet_logic::world::{HexCoord, TerrainType, Tile, WorldQuery};

// ── Helpers ────────────────────────────────────────────────────────────

/// Answers every query from fixed values, regardless of coordinate.
#[derive(Default)]
struct FakeWorld {
    road_adjacent: bool,
    hall_connected: bool,
    adjacent_tags: Vec<(&'static str, u32)>,
    radius_counts: Vec<(&'static str, u32)>,
    owned: Vec<Tile>,
}

impl WorldQuery for FakeWorld {
    fn is_adjacent_to_road(&self, _coord: HexCoord) -> bool {
        self.road_adjacent
    }

    fn is_connected_to_town_hall(&self, _coord: HexCoord) -> bool {
        self.hall_connected
    }

    fn count_adjacent_tiles_with_tag(&self, _coord: HexCoord, tag: &str) -> u32 {
        self.adjacent_tags
            .iter()
            .find(|(t, _)| *t == tag)
            .map_or(0, |(_, n)| *n)
    }

    fn count_buildings_within_radius(&self, _coord: HexCoord, kind_id: &str, _radius: u32) -> u32 {
        self.radius_counts
            .iter()
            .find(|(k, _)| *k == kind_id)
            .map_or(0, |(_, n)| *n)
    }

    fn owned_tiles(&self) -> Vec<&Tile> {
        self.owned.iter().collect()
    }
}

fn lumber_camp() -> BuildingKindDef {
    BuildingKindDef::producer(kinds::LUMBER_CAMP, vec![ResourceStack::new(WOOD, 6)])
        .with_rule(SynergyRule::road_adjacent("Road"))
        .with_rule(SynergyRule::within_radius(kinds::WELL, 2, 0.05, "Wells nearby").per_count(2))
}

fn tick_output(base: u32, multiplier: f32) -> u32 {
    (base as f32 * multiplier).round() as u32
}

// ── Scenario tests ─────────────────────────────────────────────────────

#[test]
fn road_and_capped_radius_rule_give_seven_wood() {
    let world = FakeWorld {
        road_adjacent: true,
        radius_counts: vec![(kinds::WELL, 3)],
        ..Default::default()
    };
    let config = SynergyConfig::default();
    let raw = evaluate(HexCoord::ZERO, &lumber_camp(), &world, &config);
    assert!((raw - 0.20).abs() < 1e-5, "raw bonus was {}", raw);

    let multiplier = production_multiplier(raw);
    assert!((multiplier - 1.20).abs() < 1e-5);
    assert_eq!(tick_output(6, multiplier), 7);
}

#[test]
fn implicit_hall_rule_joins_declared_road_rule() {
    let world = FakeWorld {
        road_adjacent: true,
        hall_connected: true,
        ..Default::default()
    };
    let breakdown = evaluate_detailed(HexCoord::ZERO, &lumber_camp(), &world, &SynergyConfig::default());
    // Road declared explicitly, hall connection implicit.
    let implicit: Vec<_> = breakdown.rules.iter().filter(|r| r.implicit).collect();
    assert_eq!(implicit.len(), 1);
    assert!(implicit[0].satisfied);
    assert!((breakdown.raw_bonus - 0.25).abs() < 1e-5);
}

#[test]
fn implicit_rules_can_be_disabled() {
    let kind = BuildingKindDef::producer(kinds::QUARRY, vec![ResourceStack::new(STONE, 4)]);
    let world = FakeWorld {
        road_adjacent: true,
        hall_connected: true,
        ..Default::default()
    };
    let on = SynergyConfig::default();
    let off = SynergyConfig {
        implicit_road_rules: false,
        ..SynergyConfig::default()
    };
    assert!((evaluate(HexCoord::ZERO, &kind, &world, &on) - 0.25).abs() < 1e-5);
    assert_eq!(evaluate(HexCoord::ZERO, &kind, &world, &off), 0.0);
}

#[test]
fn road_rule_amount_is_overridden_globally() {
    let mut rule = SynergyRule::road_adjacent("Road");
    rule.amount_pct = 1.5;
    let kind = BuildingKindDef::producer(kinds::FARM, vec![ResourceStack::new(GRAIN, 5)]).with_rule(rule);
    let world = FakeWorld {
        road_adjacent: true,
        ..Default::default()
    };
    let config = SynergyConfig {
        road_adjacent_bonus: 0.05,
        implicit_road_rules: false,
        ..SynergyConfig::default()
    };
    assert!((evaluate(HexCoord::ZERO, &kind, &world, &config) - 0.05).abs() < 1e-6);
}

#[test]
fn huge_stack_is_clamped_to_triple_output() {
    let kind = BuildingKindDef::producer(kinds::LUMBER_CAMP, vec![ResourceStack::new(WOOD, 6)])
        .with_rule(SynergyRule::adjacent_tag(tags::FOREST, 0.9, "Forest").per_count(0));
    let world = FakeWorld {
        adjacent_tags: vec![(tags::FOREST, 6)],
        ..Default::default()
    };
    let raw = evaluate(HexCoord::ZERO, &kind, &world, &SynergyConfig::default());
    assert!(raw > 2.0);
    let multiplier = production_multiplier(raw);
    assert!((multiplier - 3.0).abs() < 1e-6);
    assert_eq!(tick_output(6, multiplier), 18);
}

#[test]
fn penalties_floor_at_twenty_percent() {
    let kind = BuildingKindDef::producer(kinds::FARM, vec![ResourceStack::new(GRAIN, 10)])
        .with_rule(SynergyRule::adjacent_tag(tags::ROCKS, -0.5, "Rocky soil").per_count(0));
    let world = FakeWorld {
        adjacent_tags: vec![(tags::ROCKS, 4)],
        ..Default::default()
    };
    let multiplier = production_multiplier(evaluate(HexCoord::ZERO, &kind, &world, &SynergyConfig::default()));
    assert!((multiplier - 0.2).abs() < 1e-6);
    assert_eq!(tick_output(10, multiplier), 2);
}

#[test]
fn district_bonus_is_summed_in() {
    let kind = BuildingKindDef::producer(kinds::LUMBER_CAMP, vec![ResourceStack::new(WOOD, 6)])
        .with_terrain(TerrainType::Forest);
    let mut owned: Vec<Tile> = (0..3)
        .map(|i| Tile::new(HexCoord::new(i, 0), TerrainType::Forest))
        .collect();
    owned.push(Tile::new(HexCoord::new(5, 5), TerrainType::Grassland));
    let world = FakeWorld {
        owned,
        ..Default::default()
    };
    let breakdown = evaluate_detailed(HexCoord::ZERO, &kind, &world, &SynergyConfig::default());
    // 3 of 4 forest tiles: 0.25 * 0.75
    assert!((breakdown.district_bonus - 0.1875).abs() < 1e-5);
    assert!((breakdown.raw_bonus - 0.1875).abs() < 1e-5);
}

#[test]
fn bundled_catalog_loads() {
    let text = include_str!("../../../data/village_catalog.json");
    let catalog = BuildingCatalog::from_json(text).unwrap();
    let sawmill = catalog.get(kinds::SAWMILL).unwrap();
    assert_eq!(sawmill.role, BuildingRoleKind::Processor);
    assert_eq!(sawmill.tool_slot, Some(SLOT_SAW));
    assert!(catalog.get(kinds::TOWN_HALL).is_some());
    for kind in catalog.kinds() {
        if kind.role == BuildingRoleKind::Producer {
            assert!(kind.production_profile().is_some(), "{} has no profile", kind.id);
        }
    }
}
