//! Production clock - turns elapsed simulation time into due ticks.

use hamlet_logic::config::{CatchUpPolicy, EconomyConfig};
use serde::{Deserialize, Serialize};

/// Fixed-interval tick clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickClock {
    interval_seconds: f32,
    policy: CatchUpPolicy,
    accumulated_seconds: f32,
    ticks_run: u64,
}

impl TickClock {
    pub fn new(interval_seconds: f32, policy: CatchUpPolicy) -> Self {
        Self {
            interval_seconds,
            policy,
            accumulated_seconds: 0.0,
            ticks_run: 0,
        }
    }

    pub fn from_config(config: &EconomyConfig) -> Self {
        Self::new(config.tick_interval_seconds, config.catch_up)
    }

    /// Add `elapsed` seconds and return how many ticks are now due.
    ///
    /// Non-finite or non-positive `elapsed` is ignored.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 || !(self.interval_seconds > 0.0) {
            return 0;
        }
        self.accumulated_seconds += elapsed;
        if self.accumulated_seconds < self.interval_seconds {
            return 0;
        }

        let intervals = (self.accumulated_seconds / self.interval_seconds).floor();
        self.accumulated_seconds -= intervals * self.interval_seconds;
        // Guard against float drift leaving a negative or full-interval remainder.
        self.accumulated_seconds = self.accumulated_seconds.clamp(0.0, self.interval_seconds);
        if self.accumulated_seconds >= self.interval_seconds {
            self.accumulated_seconds = 0.0;
        }

        let elapsed_ticks = intervals.min(u32::MAX as f32) as u32;
        match self.policy {
            CatchUpPolicy::DropExcess => 1,
            CatchUpPolicy::RunAll { max_ticks_per_step } => {
                elapsed_ticks.min(max_ticks_per_step.max(1))
            }
        }
    }

    /// Count one executed tick and return its 1-based number.
    pub fn record_tick(&mut self) -> u64 {
        self.ticks_run += 1;
        self.ticks_run
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    pub fn accumulated_seconds(&self) -> f32 {
        self.accumulated_seconds
    }

    pub fn interval_seconds(&self) -> f32 {
        self.interval_seconds
    }

    pub fn policy(&self) -> CatchUpPolicy {
        self.policy
    }

    /// Restore persisted progress.
    pub fn restore(&mut self, accumulated_seconds: f32, ticks_run: u64) {
        self.accumulated_seconds = if accumulated_seconds.is_finite() {
            accumulated_seconds.clamp(0.0, self.interval_seconds.max(0.0))
        } else {
            0.0
        };
        self.ticks_run = ticks_run;
    }

    pub fn reset(&mut self) {
        self.accumulated_seconds = 0.0;
        self.ticks_run = 0;
    }
}
