//! Conversion system - processors turning inputs into graded outputs
//!
//! A conversion checks that every recipe input is in stock, derives the
//! output quality from the primary input's quality and the installed tool,
//! withdraws all inputs in one step and deposits the output. Output that
//! doesn't fit in the warehouse is lost.

use std::collections::BTreeMap;

use hamlet_logic::quality::{output_quality, QualityProvider};
use hamlet_logic::recipe::ProcessorRecipe;
use hamlet_logic::resource::ResourceId;
use log::{error, warn};

use crate::components::ProcessorState;
use crate::error::EconomyError;
use crate::warehouse::Warehouse;

/// Why a conversion cannot run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// `recipe_index` points past the kind's recipes
    NoRecipe,
    /// The recipe declares no inputs
    NoInputs,
    MissingInput {
        id: ResourceId,
        needed: u32,
        available: u32,
    },
    /// The building is cooling down after a move
    Relocating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted {
        output: ResourceId,
        amount: u32,
        quality: u32,
        /// False when the warehouse was full and the output was lost
        stored: bool,
    },
    Blocked(BlockReason),
}

/// Expected result of the next conversion, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionPreview {
    pub output: ResourceId,
    pub amount: u32,
    pub quality: u32,
}

/// Read-only check: the active recipe, if every input is in stock.
pub fn can_convert<'r>(
    state: &ProcessorState,
    recipes: &'r [ProcessorRecipe],
    warehouse: &Warehouse,
) -> Result<&'r ProcessorRecipe, BlockReason> {
    let recipe = recipes.get(state.recipe_index).ok_or(BlockReason::NoRecipe)?;
    if recipe.inputs.is_empty() {
        return Err(BlockReason::NoInputs);
    }

    let mut needed: BTreeMap<ResourceId, u32> = BTreeMap::new();
    for input in &recipe.inputs {
        let entry = needed.entry(input.id).or_default();
        *entry = entry.saturating_add(input.amount);
    }
    for (id, needed) in needed {
        let available = warehouse.get(id);
        if available < needed {
            return Err(BlockReason::MissingInput {
                id,
                needed,
                available,
            });
        }
    }
    Ok(recipe)
}

/// Run one conversion of the active recipe.
///
/// Shortfalls come back as `Blocked` with the warehouse untouched. A
/// withdraw failing after the availability check is an invariant
/// violation and is reported as an error.
pub fn try_convert<Q: QualityProvider + ?Sized>(
    state: &ProcessorState,
    recipes: &[ProcessorRecipe],
    warehouse: &mut Warehouse,
    qualities: &mut Q,
) -> Result<ConversionOutcome, EconomyError> {
    let recipe = match can_convert(state, recipes, warehouse) {
        Ok(recipe) => recipe,
        Err(reason) => return Ok(ConversionOutcome::Blocked(reason)),
    };
    let Some(primary) = recipe.primary_input() else {
        return Ok(ConversionOutcome::Blocked(BlockReason::NoInputs));
    };

    let input_quality = qualities.material_quality(primary.id);
    let quality = output_quality(
        input_quality,
        state.installed_tool_quality,
        recipe.gain_factor,
        recipe.loss_factor,
    );
    let amount = recipe.base_output_units();

    if !warehouse.try_remove_all(&recipe.inputs) {
        error!(
            "Withdraw of {:?} failed after availability check passed",
            recipe.inputs
        );
        return Err(EconomyError::ConversionInvariant(format!(
            "could not withdraw inputs for {}",
            recipe.output
        )));
    }

    let stored = warehouse.try_add(recipe.output, amount);
    if !stored {
        warn!(
            "Warehouse full: {} x{} from conversion lost",
            recipe.output, amount
        );
    }
    qualities.set_material_quality(recipe.output, quality);

    Ok(ConversionOutcome::Converted {
        output: recipe.output,
        amount,
        quality,
        stored,
    })
}

/// What the next conversion would yield, with a synergy multiplier applied
/// to the amount. Does not check stock.
pub fn preview_conversion<Q: QualityProvider + ?Sized>(
    state: &ProcessorState,
    recipes: &[ProcessorRecipe],
    qualities: &Q,
    multiplier: f32,
) -> Option<ConversionPreview> {
    let recipe = recipes.get(state.recipe_index)?;
    let primary = recipe.primary_input()?;
    let quality = output_quality(
        qualities.material_quality(primary.id),
        state.installed_tool_quality,
        recipe.gain_factor,
        recipe.loss_factor,
    );
    Some(ConversionPreview {
        output: recipe.output,
        amount: recipe.output_units_with_multiplier(multiplier),
        quality,
    })
}
