//! Building kind catalog - immutable per-kind data loaded once at startup.
//!
//! The JSON file names resources by identifier (`"Wood"`, `"Slot_Saw"`)
//! and may use the legacy single-input recipe form; both are resolved here
//! so the rest of the simulation only ever sees ids and multi-input recipes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recipe::{ProcessorRecipe, RecipeError};
use crate::resource::{resource_by_name, ResourceId, ResourceStack};
use crate::synergy::{SynergyRule, SynergyType};
use crate::world::TerrainType;

/// Which role payload a kind's buildings carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingRoleKind {
    Producer,
    Processor,
    TownHall,
    Warehouse,
    Other,
}

/// Per-building production data, copied from the kind at spawn time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionProfile {
    pub consumes_active_slot: bool,
    pub base_output_per_tick: Vec<ResourceStack>,
}

/// Static definition of a building kind.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingKindDef {
    pub id: String,
    pub display_name: String,
    pub role: BuildingRoleKind,
    pub consumes_active_slot: bool,
    pub base_output: Vec<ResourceStack>,
    pub synergy_rules: Vec<SynergyRule>,
    pub preferred_terrain: Option<TerrainType>,
    pub recipes: Vec<ProcessorRecipe>,
    pub tool_slot: Option<ResourceId>,
}

impl BuildingKindDef {
    fn base(id: &str, role: BuildingRoleKind) -> Self {
        Self {
            id: id.to_string(),
            display_name: id.to_string(),
            role,
            consumes_active_slot: matches!(
                role,
                BuildingRoleKind::Producer | BuildingRoleKind::Processor
            ),
            base_output: Vec::new(),
            synergy_rules: Vec::new(),
            preferred_terrain: None,
            recipes: Vec::new(),
            tool_slot: None,
        }
    }

    pub fn producer(id: &str, base_output: Vec<ResourceStack>) -> Self {
        Self {
            base_output,
            ..Self::base(id, BuildingRoleKind::Producer)
        }
    }

    pub fn processor(id: &str, recipes: Vec<ProcessorRecipe>, tool_slot: Option<ResourceId>) -> Self {
        Self {
            recipes,
            tool_slot,
            ..Self::base(id, BuildingRoleKind::Processor)
        }
    }

    /// A kind with no production payload (town hall, warehouse, decorations).
    pub fn structure(id: &str, role: BuildingRoleKind) -> Self {
        Self::base(id, role)
    }

    pub fn with_rule(mut self, rule: SynergyRule) -> Self {
        self.synergy_rules.push(rule);
        self
    }

    pub fn with_terrain(mut self, terrain: TerrainType) -> Self {
        self.preferred_terrain = Some(terrain);
        self
    }

    /// True if a catalog rule of `rule_type` is declared.
    pub fn declares(&self, rule_type: SynergyType) -> bool {
        self.synergy_rules.iter().any(|r| r.rule_type == rule_type)
    }

    pub fn production_profile(&self) -> Option<ProductionProfile> {
        if self.role != BuildingRoleKind::Producer {
            return None;
        }
        Some(ProductionProfile {
            consumes_active_slot: self.consumes_active_slot,
            base_output_per_tick: self.base_output.clone(),
        })
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("building kind '{kind}' references unknown resource '{name}'")]
    UnknownResource { kind: String, name: String },
    #[error("building kind '{kind}' recipe {index}: {source}")]
    InvalidRecipe {
        kind: String,
        index: usize,
        #[source]
        source: RecipeError,
    },
    #[error("building kind '{kind}' recipe {index} has neither inputs nor a legacy input")]
    MissingRecipeInput { kind: String, index: usize },
    #[error("duplicate building kind '{0}'")]
    DuplicateKind(String),
    #[error("producer '{0}' has no base output")]
    ProducerWithoutOutput(String),
}

/// All building kinds, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct BuildingCatalog {
    kinds: Vec<BuildingKindDef>,
    index: HashMap<String, usize>,
}

impl BuildingCatalog {
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let file: raw::CatalogFile = serde_json::from_str(text)?;
        let kinds = file
            .kinds
            .into_iter()
            .map(raw::KindDef::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_kinds(kinds)
    }

    pub fn from_kinds(kinds: Vec<BuildingKindDef>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(kinds.len());
        for (i, kind) in kinds.iter().enumerate() {
            if kind.role == BuildingRoleKind::Producer && kind.base_output.is_empty() {
                return Err(CatalogError::ProducerWithoutOutput(kind.id.clone()));
            }
            for (r, recipe) in kind.recipes.iter().enumerate() {
                recipe.validate().map_err(|source| CatalogError::InvalidRecipe {
                    kind: kind.id.clone(),
                    index: r,
                    source,
                })?;
            }
            if index.insert(kind.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateKind(kind.id.clone()));
            }
        }
        Ok(Self { kinds, index })
    }

    pub fn get(&self, kind_id: &str) -> Option<&BuildingKindDef> {
        self.index.get(kind_id).map(|&i| &self.kinds[i])
    }

    pub fn kinds(&self) -> &[BuildingKindDef] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// On-disk shapes. Resources are identifiers here, not ids.
mod raw {
    use super::*;

    #[derive(Deserialize)]
    pub struct CatalogFile {
        pub kinds: Vec<KindDef>,
    }

    #[derive(Deserialize)]
    pub struct StackDef {
        pub resource: String,
        pub amount: u32,
    }

    #[derive(Deserialize)]
    pub struct RecipeDef {
        #[serde(default)]
        pub inputs: Vec<StackDef>,
        /// Legacy single-input form.
        #[serde(default)]
        pub input: Option<String>,
        #[serde(default)]
        pub input_amount: Option<u32>,
        pub output: String,
        pub base_output_amount: f32,
        #[serde(default = "default_gain")]
        pub gain_factor: f32,
        #[serde(default = "default_loss")]
        pub loss_factor: f32,
    }

    fn default_gain() -> f32 {
        0.5
    }

    fn default_loss() -> f32 {
        0.5
    }

    #[derive(Deserialize)]
    pub struct KindDef {
        pub id: String,
        #[serde(default)]
        pub display_name: Option<String>,
        pub role: BuildingRoleKind,
        #[serde(default)]
        pub consumes_active_slot: Option<bool>,
        #[serde(default)]
        pub base_output: Vec<StackDef>,
        #[serde(default)]
        pub synergy_rules: Vec<SynergyRule>,
        #[serde(default)]
        pub preferred_terrain: Option<TerrainType>,
        #[serde(default)]
        pub recipes: Vec<RecipeDef>,
        #[serde(default)]
        pub tool_slot: Option<String>,
    }

    impl KindDef {
        pub fn resolve(self) -> Result<BuildingKindDef, CatalogError> {
            let kind = self.id.clone();
            let lookup = |name: &str| {
                resource_by_name(name).ok_or_else(|| CatalogError::UnknownResource {
                    kind: kind.clone(),
                    name: name.to_string(),
                })
            };

            let base_output = self
                .base_output
                .iter()
                .map(|s| Ok(ResourceStack::new(lookup(&s.resource)?, s.amount)))
                .collect::<Result<Vec<_>, CatalogError>>()?;

            let mut recipes = Vec::with_capacity(self.recipes.len());
            for (index, def) in self.recipes.iter().enumerate() {
                let mut inputs = def
                    .inputs
                    .iter()
                    .map(|s| Ok(ResourceStack::new(lookup(&s.resource)?, s.amount)))
                    .collect::<Result<Vec<_>, CatalogError>>()?;
                if inputs.is_empty() {
                    let Some(legacy) = def.input.as_deref() else {
                        return Err(CatalogError::MissingRecipeInput {
                            kind: kind.clone(),
                            index,
                        });
                    };
                    inputs.push(ResourceStack::new(lookup(legacy)?, def.input_amount.unwrap_or(1)));
                }
                recipes.push(ProcessorRecipe {
                    inputs,
                    output: lookup(&def.output)?,
                    base_output_amount: def.base_output_amount,
                    gain_factor: def.gain_factor,
                    loss_factor: def.loss_factor,
                });
            }

            let tool_slot = self.tool_slot.as_deref().map(lookup).transpose()?;

            let mut def = BuildingKindDef::base(&self.id, self.role);
            def.display_name = self.display_name.unwrap_or_else(|| self.id.clone());
            if let Some(consumes) = self.consumes_active_slot {
                def.consumes_active_slot = consumes;
            }
            def.base_output = base_output;
            def.synergy_rules = self.synergy_rules;
            def.preferred_terrain = self.preferred_terrain;
            def.recipes = recipes;
            def.tool_slot = tool_slot;
            Ok(def)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::resources::*;

    const SAMPLE: &str = r#"{
        "kinds": [
            {
                "id": "lumber_camp",
                "display_name": "Lumber Camp",
                "role": "Producer",
                "base_output": [{ "resource": "Wood", "amount": 6 }],
                "preferred_terrain": "Forest",
                "synergy_rules": [
                    { "type": "RoadAdjacent", "amount_pct": 0.3, "label": "Road" },
                    { "type": "AdjacentTileTag", "target": "forest", "amount_pct": 0.05,
                      "stacking": "PerCount", "max_stacks": 3, "label": "Woodland" }
                ]
            },
            {
                "id": "mill",
                "role": "Processor",
                "tool_slot": "Slot_Grinder",
                "recipes": [
                    { "input": "Grain", "input_amount": 3, "output": "Flour", "base_output_amount": 2.0 }
                ]
            },
            { "id": "town_hall", "role": "TownHall" }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let catalog = BuildingCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);

        let camp = catalog.get("lumber_camp").unwrap();
        assert_eq!(camp.display_name, "Lumber Camp");
        assert_eq!(camp.base_output, vec![ResourceStack::new(WOOD, 6)]);
        assert_eq!(camp.preferred_terrain, Some(TerrainType::Forest));
        assert!(camp.consumes_active_slot);
        assert!(camp.declares(SynergyType::RoadAdjacent));
        assert!(!camp.declares(SynergyType::RoadConnectedToTownHall));
        assert_eq!(camp.synergy_rules[1].max_stacks, 3);
    }

    #[test]
    fn test_legacy_recipe_is_normalized() {
        let catalog = BuildingCatalog::from_json(SAMPLE).unwrap();
        let mill = catalog.get("mill").unwrap();
        assert_eq!(mill.tool_slot, Some(SLOT_GRINDER));
        assert_eq!(mill.recipes[0].inputs, vec![ResourceStack::new(GRAIN, 3)]);
        assert_eq!(mill.recipes[0].output, FLOUR);
        assert!((mill.recipes[0].gain_factor - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_structures_have_no_profile() {
        let catalog = BuildingCatalog::from_json(SAMPLE).unwrap();
        let hall = catalog.get("town_hall").unwrap();
        assert!(hall.production_profile().is_none());
        assert!(!hall.consumes_active_slot);
        assert!(catalog.get("lumber_camp").unwrap().production_profile().is_some());
    }

    #[test]
    fn test_unknown_resource() {
        let text = r#"{ "kinds": [ { "id": "x", "role": "Producer",
            "base_output": [{ "resource": "Unobtainium", "amount": 1 }] } ] }"#;
        match BuildingCatalog::from_json(text) {
            Err(CatalogError::UnknownResource { kind, name }) => {
                assert_eq!(kind, "x");
                assert_eq!(name, "Unobtainium");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_recipe_rejected() {
        let text = r#"{ "kinds": [ { "id": "bad", "role": "Processor", "recipes": [
            { "inputs": [{ "resource": "Wood", "amount": 1 }], "output": "Planks",
              "base_output_amount": 1.0, "gain_factor": 3.0 } ] } ] }"#;
        assert!(matches!(
            BuildingCatalog::from_json(text),
            Err(CatalogError::InvalidRecipe { index: 0, .. })
        ));
    }

    #[test]
    fn test_recipe_without_any_input() {
        let text = r#"{ "kinds": [ { "id": "bad", "role": "Processor", "recipes": [
            { "output": "Planks", "base_output_amount": 1.0 } ] } ] }"#;
        assert!(matches!(
            BuildingCatalog::from_json(text),
            Err(CatalogError::MissingRecipeInput { .. })
        ));
    }

    #[test]
    fn test_duplicate_kind() {
        let kinds = vec![
            BuildingKindDef::structure("well", BuildingRoleKind::Other),
            BuildingKindDef::structure("well", BuildingRoleKind::Other),
        ];
        assert!(matches!(
            BuildingCatalog::from_kinds(kinds),
            Err(CatalogError::DuplicateKind(_))
        ));
    }

    #[test]
    fn test_producer_needs_output() {
        let kinds = vec![BuildingKindDef::producer("empty", vec![])];
        assert!(matches!(
            BuildingCatalog::from_kinds(kinds),
            Err(CatalogError::ProducerWithoutOutput(_))
        ));
    }
}
