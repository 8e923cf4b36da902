//! # Demand Model
//!
//! Household-style consumption: a time-of-day profile scaled by season and
//! weather, plus Gaussian noise, clamped to the configured demand bounds.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::{hour_of_day, Season, Weather};
use crate::config::SimulationConfig;

/// Time-of-day multiplier on a 24 hour clock
pub fn time_of_day_multiplier(hour: f64) -> f64 {
    if hour < 6.0 {
        // Night: minimal load
        0.6
    } else if hour < 9.0 {
        // Morning peak
        1.2 + (hour - 6.0) * 0.2
    } else if hour < 16.0 {
        1.0
    } else if hour < 21.0 {
        // Evening peak
        1.6 + (hour - 16.0) * 0.1
    } else {
        2.0 - (hour - 21.0) * 0.3
    }
}

/// Electricity demand for `timestep`, in units
pub fn demand<R: Rng + ?Sized>(
    timestep: u32,
    season: Season,
    weather: Weather,
    config: &SimulationConfig,
    rng: &mut R,
) -> f64 {
    let hour = f64::from(hour_of_day(timestep, config.steps_per_day)) * 24.0
        / f64::from(config.steps_per_day);
    let expected = config.base_demand
        * time_of_day_multiplier(hour)
        * season.demand_factor()
        * weather.demand_factor();

    // Always draw, so the random stream advances identically every step
    let noise = Normal::new(0.0, config.demand_noise_std)
        .map(|normal| normal.sample(rng))
        .unwrap_or(0.0);

    (expected + noise).clamp(config.min_demand, config.max_demand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_evening_peak_above_night() {
        assert!(time_of_day_multiplier(19.0) > time_of_day_multiplier(3.0));
        assert!(time_of_day_multiplier(7.0) > time_of_day_multiplier(12.0));
    }

    #[test]
    fn test_demand_within_bounds() {
        let config = SimulationConfig {
            demand_noise_std: 50.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        for t in 0..500 {
            let d = demand(t, Season::Winter, Weather::Snowy, &config, &mut rng);
            assert!(d >= config.min_demand && d <= config.max_demand);
        }
    }

    #[test]
    fn test_noiseless_demand_is_exact() {
        let config = SimulationConfig {
            demand_noise_std: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        // 12:00, spring, sunny: base x 1.0 x 1.0 x 1.0
        let d = demand(12, Season::Spring, Weather::Sunny, &config, &mut rng);
        assert!((d - config.base_demand).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let config = SimulationConfig::default();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for t in 0..48 {
            assert_eq!(
                demand(t, Season::Fall, Weather::Rainy, &config, &mut a),
                demand(t, Season::Fall, Weather::Rainy, &config, &mut b)
            );
        }
    }
}
