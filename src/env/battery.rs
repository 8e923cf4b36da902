use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;

/// Stored energy with a hard physical bound and a stricter soft band.
///
/// `0 <= state_of_charge <= capacity` holds at all times: [`Battery::apply`]
/// refuses any delta that would leave the hard bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    capacity: f64,
    safe_low: f64,
    safe_high: f64,
    state_of_charge: f64,
}

impl Battery {
    pub fn new(capacity: f64, safe_range: (f64, f64), state_of_charge: f64) -> Self {
        Self {
            capacity,
            safe_low: safe_range.0,
            safe_high: safe_range.1,
            state_of_charge: state_of_charge.clamp(0.0, capacity),
        }
    }

    pub fn from_config(config: &SimulationConfig, state_of_charge: f64) -> Self {
        Self::new(config.battery_capacity, config.safe_range, state_of_charge)
    }

    pub fn state_of_charge(&self) -> f64 {
        self.state_of_charge
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn safe_range(&self) -> (f64, f64) {
        (self.safe_low, self.safe_high)
    }

    /// State of charge as a fraction of capacity
    pub fn fraction(&self) -> f64 {
        if self.capacity > 0.0 {
            self.state_of_charge / self.capacity
        } else {
            0.0
        }
    }

    pub fn target(&self, delta: f64) -> f64 {
        self.state_of_charge + delta
    }

    /// Respects the hard bound `[0, capacity]`
    pub fn is_valid(&self, delta: f64) -> bool {
        let target = self.target(delta);
        (0.0..=self.capacity).contains(&target)
    }

    /// Lands strictly inside the soft band `(low, high)`
    pub fn is_safe(&self, delta: f64) -> bool {
        let target = self.target(delta);
        self.safe_low < target && target < self.safe_high
    }

    /// Applies `delta` if valid. Returns whether the charge changed hands.
    pub fn apply(&mut self, delta: f64) -> bool {
        if !self.is_valid(delta) {
            return false;
        }
        self.state_of_charge = self.target(delta);
        true
    }
}
