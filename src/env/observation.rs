use serde::{Deserialize, Serialize};
use strum::EnumCount;

use crate::config::SimulationConfig;
use crate::simulation::{Season, Weather};

/// Number of entries in [`Observation::to_array`]
pub const OBSERVATION_LEN: usize = 7;

/// Field names in vector order
pub const OBSERVATION_FIELDS: [&str; OBSERVATION_LEN] = [
    "time",
    "state_of_charge",
    "season",
    "weather",
    "demand",
    "production",
    "sell_price",
];

/// What an agent sees after `reset` or `step`.
///
/// The vector layout is stable:
/// `[time, state_of_charge, season, weather, demand, production, sell_price]`
/// where `time = timestep / max_timestep`, season and weather are their
/// enum indices, and energy values are in units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestep: u32,
    pub time: f64,
    pub state_of_charge: f64,
    pub season: Season,
    pub weather: Weather,
    pub demand: f64,
    pub production: f64,
    pub sell_price: f64,
}

impl Observation {
    pub fn to_array(&self) -> [f64; OBSERVATION_LEN] {
        [
            self.time,
            self.state_of_charge,
            self.season.index() as f64,
            self.weather.index() as f64,
            self.demand,
            self.production,
            self.sell_price,
        ]
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.to_array().to_vec()
    }
}

/// Per-field bounds of the observation vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub low: [f64; OBSERVATION_LEN],
    pub high: [f64; OBSERVATION_LEN],
}

impl ObservationSpace {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            low: [
                0.0,
                0.0,
                0.0,
                0.0,
                config.min_demand,
                0.0,
                config.min_price,
            ],
            high: [
                1.0,
                config.battery_capacity,
                (Season::COUNT - 1) as f64,
                (Weather::COUNT - 1) as f64,
                config.max_demand,
                config.solar_capacity + config.wind_capacity,
                config.max_price,
            ],
        }
    }

    pub fn contains(&self, values: &[f64]) -> bool {
        values.len() == OBSERVATION_LEN
            && values
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_layout() {
        let obs = Observation {
            timestep: 5,
            time: 0.5,
            state_of_charge: 42.0,
            season: Season::Summer,
            weather: Weather::Rainy,
            demand: 12.0,
            production: 3.0,
            sell_price: 6.5,
        };
        assert_eq!(obs.to_vec(), vec![0.5, 42.0, 2.0, 2.0, 12.0, 3.0, 6.5]);
        assert_eq!(OBSERVATION_FIELDS[1], "state_of_charge");
    }

    #[test]
    fn test_space_bounds() {
        let space = ObservationSpace::from_config(&SimulationConfig::default());
        assert_eq!(space.high[2], 3.0);
        assert_eq!(space.high[3], 4.0);
        assert!(space.contains(&[0.0, 100.0, 3.0, 4.0, 40.0, 45.0, 10.0]));
        assert!(!space.contains(&[0.0, 101.0, 0.0, 0.0, 10.0, 0.0, 1.0]));
        assert!(!space.contains(&[0.0, 1.0]));
    }
}
