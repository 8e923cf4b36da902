//! # Price Model
//!
//! The sell price reacts to the supply/demand imbalance: scarcity pushes it
//! up, surplus pushes it down. The result is always inside
//! `[min_price, max_price]`.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::SimulationConfig;

/// Normalized imbalance, positive when demand exceeds production
pub fn imbalance(demand: f64, production: f64, config: &SimulationConfig) -> f64 {
    (demand - production) / config.max_demand
}

pub fn sell_price<R: Rng + ?Sized>(
    demand: f64,
    production: f64,
    config: &SimulationConfig,
    rng: &mut R,
) -> f64 {
    let noise = Normal::new(0.0, config.price_noise_std)
        .map(|normal| normal.sample(rng))
        .unwrap_or(0.0);
    let price = config.base_price
        + config.price_sensitivity * imbalance(demand, production, config)
        + noise;
    price.clamp(config.min_price, config.max_price)
}
