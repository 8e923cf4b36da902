use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{demand, price, production, Season, Weather};
use crate::config::SimulationConfig;

/// Exogenous market conditions of one timestep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketDrivers {
    pub season: Season,
    pub weather: Weather,
    pub demand: f64,
    pub production: f64,
    pub sell_price: f64,
}

impl MarketDrivers {
    /// Sample the drivers for `timestep`.
    ///
    /// Draw order is fixed (weather, demand noise, wind gust, price noise) and
    /// independent of the agent's action, so a seeded run replays exactly.
    pub fn sample<R: Rng + ?Sized>(timestep: u32, config: &SimulationConfig, rng: &mut R) -> Self {
        let season = Season::at(timestep, config.steps_per_year);
        let weather = Weather::sample(season, rng);
        let demand = demand::demand(timestep, season, weather, config, rng);
        let production = production::production(timestep, season, weather, config, rng);
        let sell_price = price::sell_price(demand, production, config, rng);

        Self {
            season,
            weather,
            demand,
            production,
            sell_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_season_follows_timestep() {
        let config = SimulationConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let drivers = MarketDrivers::sample(4500, &config, &mut rng);
        assert_eq!(drivers.season, Season::Summer);
    }

    #[test]
    fn test_bounds() {
        let config = SimulationConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        for t in 0..2000 {
            let d = MarketDrivers::sample(t * 5, &config, &mut rng);
            assert!(d.demand >= config.min_demand && d.demand <= config.max_demand);
            assert!(d.production >= 0.0);
            assert!(d.sell_price >= config.min_price && d.sell_price <= config.max_price);
        }
    }
}
