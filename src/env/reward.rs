use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::simulation::MarketDrivers;

/// Energy balance and cash flow of one step.
///
/// Discharged energy joins production to serve demand. Charging is fed from
/// whatever is left after demand and topped up from the market. The rest is
/// sold at the sell price; demand nobody serves is penalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Units sold to the market
    pub sold: f64,
    /// Units bought from the market to charge the battery
    pub bought: f64,
    /// Demand left unserved
    pub unmet_demand: f64,
    /// Signed balance `production + discharge - demand - charge`
    pub leftover: f64,
    pub revenue: f64,
    pub cost: f64,
    pub unmet_penalty: f64,
    pub invalid_penalty: f64,
    pub reward: f64,
}

impl Settlement {
    /// Settle `applied_charge` (already checked against the battery) under `drivers`.
    ///
    /// `valid == false` adds the fixed hard-bound penalty; the caller passes
    /// zero battery flow in that case.
    pub fn settle(
        applied_charge: f64,
        drivers: &MarketDrivers,
        valid: bool,
        config: &SimulationConfig,
    ) -> Self {
        let discharge = (-applied_charge).max(0.0);
        let charge = applied_charge.max(0.0);

        let supply = drivers.production + discharge;
        let unmet_demand = (drivers.demand - supply).max(0.0);
        let excess = (supply - drivers.demand).max(0.0);

        let charged_from_excess = charge.min(excess);
        let bought = charge - charged_from_excess;
        let sold = excess - charged_from_excess;

        let revenue = sold * drivers.sell_price;
        let cost = bought * drivers.sell_price;
        let unmet_penalty = unmet_demand * config.unmet_demand_penalty;
        let invalid_penalty = if valid { 0.0 } else { config.invalid_action_penalty };

        Self {
            sold,
            bought,
            unmet_demand,
            leftover: drivers.production + discharge - drivers.demand - charge,
            revenue,
            cost,
            unmet_penalty,
            invalid_penalty,
            reward: revenue - cost - unmet_penalty - invalid_penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Season, Weather};

    fn drivers(demand: f64, production: f64, price: f64) -> MarketDrivers {
        MarketDrivers {
            season: Season::Spring,
            weather: Weather::Sunny,
            demand,
            production,
            sell_price: price,
        }
    }

    #[test]
    fn test_surplus_is_sold() {
        let config = SimulationConfig::default();
        let s = Settlement::settle(0.0, &drivers(10.0, 25.0, 2.0), true, &config);
        assert_eq!(s.sold, 15.0);
        assert_eq!(s.bought, 0.0);
        assert_eq!(s.unmet_demand, 0.0);
        assert_eq!(s.leftover, 15.0);
        assert_eq!(s.reward, 30.0);
    }

    #[test]
    fn test_charging_absorbs_surplus_first() {
        let config = SimulationConfig::default();
        let s = Settlement::settle(20.0, &drivers(10.0, 25.0, 2.0), true, &config);
        // 15 surplus goes into the battery, 5 more is bought
        assert_eq!(s.sold, 0.0);
        assert_eq!(s.bought, 5.0);
        assert_eq!(s.leftover, -5.0);
        assert_eq!(s.reward, -10.0);
    }

    #[test]
    fn test_discharge_covers_shortfall() {
        let config = SimulationConfig::default();
        let s = Settlement::settle(-10.0, &drivers(20.0, 12.0, 3.0), true, &config);
        assert_eq!(s.unmet_demand, 0.0);
        assert_eq!(s.sold, 2.0);
        assert_eq!(s.reward, 6.0);
    }

    #[test]
    fn test_unmet_demand_penalized() {
        let config = SimulationConfig::default();
        let s = Settlement::settle(0.0, &drivers(20.0, 12.0, 3.0), true, &config);
        assert_eq!(s.unmet_demand, 8.0);
        assert_eq!(s.unmet_penalty, 8.0 * config.unmet_demand_penalty);
        assert_eq!(s.reward, -80.0);
    }

    #[test]
    fn test_invalid_action_penalty() {
        let config = SimulationConfig::default();
        let d = drivers(10.0, 25.0, 2.0);
        let idle = Settlement::settle(0.0, &d, true, &config);
        let rejected = Settlement::settle(0.0, &d, false, &config);
        assert_eq!(rejected.reward, idle.reward - config.invalid_action_penalty);
    }
}
