//! # Market Simulation
//!
//! Exogenous drivers of the electricity market. Every sub-model is a free
//! function of `(timestep, season, weather, config, rng)` so it can be tested
//! in isolation with a seeded random source.
//!
//! ## Components
//!
//! - **Season**: deterministic quarter of the yearly cycle
//! - **Weather**: season-conditioned categorical sample
//! - **Demand**: time-of-day profile with seasonal/weather scaling and noise
//! - **Production**: solar (zero in dark hours) plus wind
//! - **Price**: sell price driven by the supply/demand imbalance

pub mod demand;
pub mod drivers;
pub mod price;
pub mod production;
pub mod season;
pub mod weather;

pub use drivers::MarketDrivers;
pub use season::Season;
pub use weather::Weather;

/// Step index inside the current day
pub fn hour_of_day(timestep: u32, steps_per_day: u32) -> u32 {
    timestep % steps_per_day.max(1)
}
