use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::SimulationConfig;

/// Discrete action set `0..n`.
///
/// Action `a` moves `(a - n/2) * charge_step` units: codes below the middle
/// discharge (sell), codes above charge (buy), the middle code is idle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionSpace {
    n: usize,
    charge_step: f64,
}

impl ActionSpace {
    pub fn new(n: usize, charge_step: f64) -> Self {
        Self { n, charge_step }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.num_actions, config.charge_step)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn charge_step(&self) -> f64 {
        self.charge_step
    }

    pub fn contains(&self, action: usize) -> bool {
        action < self.n
    }

    /// The idle action
    pub fn middle(&self) -> usize {
        self.n / 2
    }

    pub fn iter(&self) -> Range<usize> {
        0..self.n
    }

    /// Signed energy delta in units; negative = discharge, positive = charge
    pub fn charge_amount(&self, action: usize) -> f64 {
        (action as f64 - self.middle() as f64) * self.charge_step
    }

    /// Largest charge in either direction
    pub fn max_charge_amount(&self) -> f64 {
        self.middle() as f64 * self.charge_step
    }
}
