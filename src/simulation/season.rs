//! # Seasons
//!
//! The season is a pure function of the timestep: the position inside the
//! yearly cycle is split into four equal quarters, Winter first.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumCount, EnumIter,
)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Season of `timestep` in a cycle of `steps_per_year` timesteps
    pub fn at(timestep: u32, steps_per_year: u32) -> Self {
        let steps_per_year = u64::from(steps_per_year.max(1));
        let position = u64::from(timestep) % steps_per_year;
        match position * 4 / steps_per_year {
            0 => Season::Winter,
            1 => Season::Spring,
            2 => Season::Summer,
            _ => Season::Fall,
        }
    }

    /// Stable numeric encoding used in observations
    pub fn index(self) -> usize {
        self as usize
    }

    /// Demand multiplier (heating in winter, cooling in summer)
    pub fn demand_factor(self) -> f64 {
        match self {
            Season::Winter => 1.3,
            Season::Spring => 1.0,
            Season::Summer => 1.1,
            Season::Fall => 1.05,
        }
    }

    /// Fraction of peak solar yield reachable in this season
    pub fn solar_factor(self) -> f64 {
        match self {
            Season::Winter => 0.4,
            Season::Spring => 0.8,
            Season::Summer => 1.0,
            Season::Fall => 0.6,
        }
    }
}
