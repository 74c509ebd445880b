//! Material quality - how a processor's tool shifts the grade of its output.
//!
//! A tool better than the input pulls quality up by `gain_factor` of the
//! gap; a worse tool drags it down by `loss_factor` of the gap. Both
//! adjustments round away from the input (ceiling of the scaled gap).

use crate::resource::ResourceId;

/// Relative distance above an integer that still counts as that integer
/// when taking the ceiling, so `10 * 0.1` adjusts by 1 and not 2.
const CEIL_TOLERANCE: f64 = 1e-6;

/// Source and sink of per-material quality grades.
pub trait QualityProvider {
    fn material_quality(&self, id: ResourceId) -> u32;
    fn set_material_quality(&mut self, id: ResourceId, value: u32);
}

/// Quality of a processor's output given its input and tool quality.
pub fn output_quality(input_quality: u32, tool_quality: f32, gain_factor: f32, loss_factor: f32) -> u32 {
    let input = input_quality as f64;
    let tool = (tool_quality.max(0.0)) as f64;

    let result = if tool >= input {
        input + tolerant_ceil((tool - input) * gain_factor.max(0.0) as f64)
    } else {
        input - tolerant_ceil((input - tool) * loss_factor.max(0.0) as f64)
    };

    if result <= 0.0 {
        0
    } else {
        result.min(u32::MAX as f64) as u32
    }
}

fn tolerant_ceil(value: f64) -> f64 {
    let nearest = value.round();
    if value > nearest && value - nearest <= CEIL_TOLERANCE * nearest.abs().max(1.0) {
        return nearest.max(0.0);
    }
    value.ceil().max(0.0)
}
