//! # Electricity Market
//!
//! A discrete-time electricity market simulator for training agents that
//! charge, discharge and trade a battery under weather- and season-dependent
//! demand, production and prices.
//!
//! The [`env::ElectricityMarketEnv`] is the only stateful component. Agents,
//! training loops and evaluation tooling talk to it exclusively through
//! `reset` / `step` / `observation` / `action_masks`.

pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod evaluation;
pub mod simulation;
pub mod telemetry;

pub use config::{Config, SimulationConfig};
pub use env::{ElectricityMarketEnv, StepResult};
pub use error::EnvError;
