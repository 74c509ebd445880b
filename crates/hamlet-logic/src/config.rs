//! Economy tunables.
//!
//! Every field has a default, so a config file only needs to name the
//! values it changes. An empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::synergy::SynergyConfig;

/// What the production clock does with time beyond one tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CatchUpPolicy {
    /// At most one tick per step; whole excess intervals are discarded.
    #[default]
    DropExcess,
    /// One tick per elapsed interval, up to `max_ticks_per_step`.
    RunAll { max_ticks_per_step: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub tick_interval_seconds: f32,
    pub catch_up: CatchUpPolicy,
    /// Cooldown started when a building is moved.
    pub relocation_cooldown_seconds: f32,
    /// Quality of materials that have never been produced by a processor.
    pub default_material_quality: u32,
    pub synergy: SynergyConfig,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: 10.0,
            catch_up: CatchUpPolicy::DropExcess,
            relocation_cooldown_seconds: 30.0,
            default_material_quality: 0,
            synergy: SynergyConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tick interval must be a positive number of seconds, got {0}")]
    TickInterval(f32),
    #[error("relocation cooldown must not be negative, got {0}")]
    RelocationCooldown(f32),
    #[error("district max bonus must be finite, got {0}")]
    DistrictBonus(f32),
}

impl EconomyConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_interval_seconds.is_finite() && self.tick_interval_seconds > 0.0) {
            return Err(ConfigError::TickInterval(self.tick_interval_seconds));
        }
        if !(self.relocation_cooldown_seconds >= 0.0) {
            return Err(ConfigError::RelocationCooldown(self.relocation_cooldown_seconds));
        }
        if !self.synergy.district.max_bonus.is_finite() {
            return Err(ConfigError::DistrictBonus(self.synergy.district.max_bonus));
        }
        Ok(())
    }
}
