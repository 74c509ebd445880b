//! Synergy rules - conditional production bonuses per building kind.
//!
//! Each rule asks the world one spatial question about a building's
//! coordinate and turns the answer into a bonus fraction. Road-category
//! rules are tuned centrally: they always pay the global override from
//! [`SynergyConfig`], whatever `amount_pct` the catalog entry carries.
//!
//! The summed bonus is clamped to `[MIN_BONUS, MAX_BONUS]` before it
//! becomes a multiplier, so no stack of rules can push production below
//! 20% or above 300%.

use serde::{Deserialize, Serialize};

use crate::catalog::BuildingKindDef;
use crate::district::{district_bonus, DistrictConfig};
use crate::world::{HexCoord, WorldQuery};

pub const MIN_BONUS: f32 = -0.8;
pub const MAX_BONUS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynergyType {
    RoadAdjacent,
    RoadConnectedToTownHall,
    AdjacentTileTag,
    WithinRadiusBuildingType,
}

impl SynergyType {
    pub fn is_road_category(self) -> bool {
        matches!(
            self,
            SynergyType::RoadAdjacent | SynergyType::RoadConnectedToTownHall
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stacking {
    #[default]
    Binary,
    PerCount,
}

/// One bonus rule declared on a building kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyRule {
    #[serde(rename = "type")]
    pub rule_type: SynergyType,
    /// Bonus fraction (0.05 = +5%). Negative values are penalties.
    #[serde(default)]
    pub amount_pct: f32,
    #[serde(default)]
    pub stacking: Stacking,
    /// Cap for `PerCount` stacking; 0 means unbounded.
    #[serde(default)]
    pub max_stacks: u32,
    /// Tile tag or building kind id, depending on `rule_type`.
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub radius: u32,
    #[serde(default)]
    pub label: String,
}

impl SynergyRule {
    pub fn road_adjacent(label: impl Into<String>) -> Self {
        Self::new(SynergyType::RoadAdjacent, 0.0, label)
    }

    pub fn town_hall_connection(label: impl Into<String>) -> Self {
        Self::new(SynergyType::RoadConnectedToTownHall, 0.0, label)
    }

    pub fn adjacent_tag(tag: impl Into<String>, amount_pct: f32, label: impl Into<String>) -> Self {
        Self {
            target: tag.into(),
            ..Self::new(SynergyType::AdjacentTileTag, amount_pct, label)
        }
    }

    pub fn within_radius(
        kind_id: impl Into<String>,
        radius: u32,
        amount_pct: f32,
        label: impl Into<String>,
    ) -> Self {
        Self {
            target: kind_id.into(),
            radius,
            ..Self::new(SynergyType::WithinRadiusBuildingType, amount_pct, label)
        }
    }

    pub fn per_count(mut self, max_stacks: u32) -> Self {
        self.stacking = Stacking::PerCount;
        self.max_stacks = max_stacks;
        self
    }

    fn new(rule_type: SynergyType, amount_pct: f32, label: impl Into<String>) -> Self {
        Self {
            rule_type,
            amount_pct,
            stacking: Stacking::Binary,
            max_stacks: 0,
            target: String::new(),
            radius: 0,
            label: label.into(),
        }
    }
}

/// Global synergy tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynergyConfig {
    /// Paid by every satisfied `RoadAdjacent` rule, explicit or implicit.
    pub road_adjacent_bonus: f32,
    /// Paid by every satisfied `RoadConnectedToTownHall` rule, explicit or implicit.
    pub town_hall_connection_bonus: f32,
    /// Apply road-category bonuses to kinds that don't declare them.
    pub implicit_road_rules: bool,
    pub district: DistrictConfig,
}

impl Default for SynergyConfig {
    fn default() -> Self {
        Self {
            road_adjacent_bonus: 0.10,
            town_hall_connection_bonus: 0.15,
            implicit_road_rules: true,
            district: DistrictConfig::default(),
        }
    }
}

/// Evaluation result of a single rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub rule: SynergyRule,
    /// Synthesized default road rule rather than a catalog entry.
    pub implicit: bool,
    pub satisfied: bool,
    pub match_count: u32,
    pub bonus: f32,
}

/// Full breakdown of a building's bonus, for display and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SynergyBreakdown {
    pub rules: Vec<RuleOutcome>,
    pub district_bonus: f32,
    pub raw_bonus: f32,
}

impl SynergyBreakdown {
    pub fn multiplier(&self) -> f32 {
        production_multiplier(self.raw_bonus)
    }

    pub fn effective_bonus(&self) -> f32 {
        self.multiplier() - 1.0
    }
}

/// How many times `rule`'s condition holds at `coord`.
pub fn match_count<W: WorldQuery + ?Sized>(rule: &SynergyRule, coord: HexCoord, world: &W) -> u32 {
    match rule.rule_type {
        SynergyType::RoadAdjacent => world.is_adjacent_to_road(coord) as u32,
        SynergyType::RoadConnectedToTownHall => world.is_connected_to_town_hall(coord) as u32,
        SynergyType::AdjacentTileTag => world.count_adjacent_tiles_with_tag(coord, &rule.target),
        SynergyType::WithinRadiusBuildingType => {
            world.count_buildings_within_radius(coord, &rule.target, rule.radius)
        }
    }
}

/// Bonus contributed by `rule` given its match count.
pub fn rule_bonus(rule: &SynergyRule, matches: u32, config: &SynergyConfig) -> f32 {
    if matches == 0 {
        return 0.0;
    }
    match rule.rule_type {
        SynergyType::RoadAdjacent => config.road_adjacent_bonus,
        SynergyType::RoadConnectedToTownHall => config.town_hall_connection_bonus,
        SynergyType::AdjacentTileTag | SynergyType::WithinRadiusBuildingType => {
            match rule.stacking {
                Stacking::Binary => rule.amount_pct,
                Stacking::PerCount => {
                    let stacks = if rule.max_stacks > 0 {
                        matches.min(rule.max_stacks)
                    } else {
                        matches
                    };
                    rule.amount_pct * stacks as f32
                }
            }
        }
    }
}

/// Turn a raw bonus sum into a production multiplier in `[0.2, 3.0]`.
pub fn production_multiplier(raw_bonus: f32) -> f32 {
    if raw_bonus.is_nan() {
        return 1.0;
    }
    1.0 + raw_bonus.clamp(MIN_BONUS, MAX_BONUS)
}

/// Sum of all rule bonuses plus the district bonus, unclamped.
pub fn evaluate<W: WorldQuery + ?Sized>(
    coord: HexCoord,
    kind: &BuildingKindDef,
    world: &W,
    config: &SynergyConfig,
) -> f32 {
    let mut raw: f32 = kind
        .synergy_rules
        .iter()
        .map(|rule| rule_bonus(rule, match_count(rule, coord, world), config))
        .sum();

    for rule in implicit_rules(kind, config) {
        raw += rule_bonus(&rule, match_count(&rule, coord, world), config);
    }

    raw + district_bonus(kind.preferred_terrain, &world.owned_tiles(), &config.district)
}

/// Same as [`evaluate`] but keeps every rule's outcome.
pub fn evaluate_detailed<W: WorldQuery + ?Sized>(
    coord: HexCoord,
    kind: &BuildingKindDef,
    world: &W,
    config: &SynergyConfig,
) -> SynergyBreakdown {
    let explicit = kind.synergy_rules.iter().cloned().map(|rule| (rule, false));
    let implicit = implicit_rules(kind, config).into_iter().map(|rule| (rule, true));

    let rules: Vec<RuleOutcome> = explicit
        .chain(implicit)
        .map(|(rule, implicit)| {
            let matches = match_count(&rule, coord, world);
            let bonus = rule_bonus(&rule, matches, config);
            RuleOutcome {
                rule,
                implicit,
                satisfied: matches > 0,
                match_count: matches,
                bonus,
            }
        })
        .collect();

    let district = district_bonus(kind.preferred_terrain, &world.owned_tiles(), &config.district);
    let raw_bonus = rules.iter().map(|r| r.bonus).sum::<f32>() + district;

    SynergyBreakdown {
        rules,
        district_bonus: district,
        raw_bonus,
    }
}

/// Default road rules for the road categories `kind` leaves undeclared.
fn implicit_rules(kind: &BuildingKindDef, config: &SynergyConfig) -> Vec<SynergyRule> {
    if !config.implicit_road_rules {
        return Vec::new();
    }
    let mut rules = Vec::new();
    if !kind.declares(SynergyType::RoadAdjacent) {
        rules.push(SynergyRule::road_adjacent("Road access"));
    }
    if !kind.declares(SynergyType::RoadConnectedToTownHall) {
        rules.push(SynergyRule::town_hall_connection("Connected to town hall"));
    }
    rules
}
