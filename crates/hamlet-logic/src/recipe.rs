//! Processor recipes - multi-input conversions with quality transfer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resource::{ResourceId, ResourceStack};

pub const MAX_GAIN_FACTOR: f32 = 2.0;
pub const MAX_LOSS_FACTOR: f32 = 1.0;

/// A conversion a processor building can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorRecipe {
    /// Consumed per conversion. The first entry is the primary input whose
    /// quality feeds the output quality.
    pub inputs: Vec<ResourceStack>,
    pub output: ResourceId,
    pub base_output_amount: f32,
    pub gain_factor: f32,
    pub loss_factor: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecipeError {
    #[error("recipe has no inputs")]
    NoInputs,
    #[error("input {0} has a zero amount")]
    ZeroInput(ResourceId),
    #[error("input uses the NONE resource")]
    NoneInput,
    #[error("recipe has no output resource")]
    NoOutput,
    #[error("base output amount must be positive, got {0}")]
    NonPositiveOutput(f32),
    #[error("gain factor {0} outside [0, 2]")]
    GainOutOfRange(f32),
    #[error("loss factor {0} outside [0, 1]")]
    LossOutOfRange(f32),
}

impl ProcessorRecipe {
    pub fn new(inputs: Vec<ResourceStack>, output: ResourceId, base_output_amount: f32) -> Self {
        Self {
            inputs,
            output,
            base_output_amount,
            gain_factor: 0.5,
            loss_factor: 0.5,
        }
    }

    /// Build from the legacy single-input form.
    pub fn single_input(input: ResourceId, input_amount: u32, output: ResourceId, base_output_amount: f32) -> Self {
        Self::new(vec![ResourceStack::new(input, input_amount)], output, base_output_amount)
    }

    pub fn with_factors(mut self, gain_factor: f32, loss_factor: f32) -> Self {
        self.gain_factor = gain_factor;
        self.loss_factor = loss_factor;
        self
    }

    pub fn primary_input(&self) -> Option<&ResourceStack> {
        self.inputs.first()
    }

    /// Output units of one conversion: `max(1, round(base))`.
    pub fn base_output_units(&self) -> u32 {
        round_units(self.base_output_amount)
    }

    /// Output units with a synergy multiplier applied before rounding.
    pub fn output_units_with_multiplier(&self, multiplier: f32) -> u32 {
        round_units(self.base_output_amount * multiplier)
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.inputs.is_empty() {
            return Err(RecipeError::NoInputs);
        }
        for input in &self.inputs {
            if input.id.is_none() {
                return Err(RecipeError::NoneInput);
            }
            if input.amount == 0 {
                return Err(RecipeError::ZeroInput(input.id));
            }
        }
        if self.output.is_none() {
            return Err(RecipeError::NoOutput);
        }
        if !(self.base_output_amount > 0.0) {
            return Err(RecipeError::NonPositiveOutput(self.base_output_amount));
        }
        if !(0.0..=MAX_GAIN_FACTOR).contains(&self.gain_factor) {
            return Err(RecipeError::GainOutOfRange(self.gain_factor));
        }
        if !(0.0..=MAX_LOSS_FACTOR).contains(&self.loss_factor) {
            return Err(RecipeError::LossOutOfRange(self.loss_factor));
        }
        Ok(())
    }
}

fn round_units(amount: f32) -> u32 {
    let rounded = amount.round();
    if rounded >= 1.0 {
        rounded.min(u32::MAX as f32) as u32
    } else {
        1
    }
}
