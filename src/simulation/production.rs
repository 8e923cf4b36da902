//! # Production Model
//!
//! Solar and wind generation. Solar follows a half-sine over the light
//! window and is zero during the configured dark hours; wind depends only on
//! the weather and a uniform gust factor.

use rand::Rng;
use std::f64::consts::PI;

use super::{hour_of_day, Season, Weather};
use crate::config::SimulationConfig;

/// Whether `timestep` falls inside the dark-hour window `[start, end)`.
///
/// The window wraps around midnight when `start > end`; `start == end`
/// means there are no dark hours.
pub fn is_dark_hour(timestep: u32, config: &SimulationConfig) -> bool {
    let hour = hour_of_day(timestep, config.steps_per_day);
    let (start, end) = config.dark_hours;
    if start <= end {
        start <= hour && hour < end
    } else {
        hour >= start || hour < end
    }
}

/// Relative solar intensity in `[0, 1]`, peaking mid-way through the light window
pub fn daylight_factor(timestep: u32, config: &SimulationConfig) -> f64 {
    if is_dark_hour(timestep, config) {
        return 0.0;
    }
    let steps_per_day = u64::from(config.steps_per_day);
    let hour = u64::from(hour_of_day(timestep, config.steps_per_day));
    let dark_start = u64::from(config.dark_hours.0);
    let dark_end = u64::from(config.dark_hours.1);

    let light_len = if dark_start == dark_end {
        steps_per_day
    } else {
        (dark_start + steps_per_day - dark_end) % steps_per_day
    };
    let position = (hour + steps_per_day - dark_end) % steps_per_day;

    (PI * (position as f64 + 0.5) / light_len as f64).sin().max(0.0)
}

/// Solar yield without randomness, in units
pub fn solar_yield(timestep: u32, season: Season, weather: Weather, config: &SimulationConfig) -> f64 {
    config.solar_capacity
        * daylight_factor(timestep, config)
        * season.solar_factor()
        * weather.solar_factor()
}

/// Total production for `timestep`, in units
pub fn production<R: Rng + ?Sized>(
    timestep: u32,
    season: Season,
    weather: Weather,
    config: &SimulationConfig,
    rng: &mut R,
) -> f64 {
    let gust: f64 = rng.gen_range(0.5..1.0);
    let wind = config.wind_capacity * weather.wind_factor() * gust;
    (solar_yield(timestep, season, weather, config) + wind).max(0.0)
}
