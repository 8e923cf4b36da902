//! # Market Environment
//!
//! Gym-style environment around the market simulation:
//! - `reset(seed)` -> (observation, info)
//! - `step(action)` -> observation, reward, terminated, truncated, info
//! - `action_masks()` -> admissible actions, delegated to a [`MaskingPolicy`]
//!
//! Contract violations (unknown action, stepping a finished episode) return
//! [`EnvError`]. Infeasible actions are absorbed into the reward: the
//! battery stays where it is and a fixed penalty applies.

pub mod action;
pub mod battery;
pub mod masking;
pub mod observation;
pub mod reward;

pub use action::ActionSpace;
pub use battery::Battery;
pub use masking::{ExpertKnowledgeMask, MaskingKind, MaskingPolicy, ValidityMask};
pub use observation::{Observation, ObservationSpace, OBSERVATION_FIELDS, OBSERVATION_LEN};
pub use reward::Settlement;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};
use validator::Validate;

use crate::config::SimulationConfig;
use crate::error::EnvError;
use crate::simulation::MarketDrivers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeStatus {
    Running,
    /// `timestep` reached `max_timestep`
    Terminated,
    /// Stopped by `truncate_after`
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// One line per `render()` on stdout
    Human,
    /// One `tracing` event per `render()`
    Log,
}

/// Mutable simulation state, owned by a single environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub timestep: u32,
    pub battery: Battery,
    pub drivers: MarketDrivers,
    pub status: EpisodeStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetInfo {
    pub seed: Option<u64>,
    pub state_of_charge: f64,
}

/// Diagnostics of one step; never needed for correctness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInfo {
    pub timestep: u32,
    pub action: usize,
    /// Delta asked for by the action
    pub requested_charge: f64,
    /// Delta actually applied (zero when rejected)
    pub applied_charge: f64,
    pub is_valid: bool,
    pub is_safe: bool,
    pub state_of_charge: f64,
    /// `state_of_charge` converted with `granularity_wh`
    pub state_of_charge_wh: f64,
    #[serde(flatten)]
    pub drivers: MarketDrivers,
    #[serde(flatten)]
    pub settlement: Settlement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

impl StepResult {
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Electricity market environment.
///
/// Independent instances share nothing but the (immutable) masking
/// strategy; each owns its random source.
#[derive(Debug, Clone)]
pub struct ElectricityMarketEnv {
    config: SimulationConfig,
    actions: ActionSpace,
    masking: Arc<dyn MaskingPolicy>,
    render_mode: Option<RenderMode>,
    rng: StdRng,
    state: EnvironmentState,
}

impl ElectricityMarketEnv {
    /// Environment with the default validity-only masking
    pub fn new(config: SimulationConfig) -> Result<Self, EnvError> {
        Self::with_masking(config, Arc::new(ValidityMask))
    }

    pub fn with_masking(
        config: SimulationConfig,
        masking: Arc<dyn MaskingPolicy>,
    ) -> Result<Self, EnvError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let actions = ActionSpace::from_config(&config);
        let state = initial_state(&config, &mut rng);

        Ok(Self {
            config,
            actions,
            masking,
            render_mode: None,
            rng,
            state,
        })
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = Some(render_mode);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn action_space(&self) -> ActionSpace {
        self.actions
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::from_config(&self.config)
    }

    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    pub fn masking_policy(&self) -> &dyn MaskingPolicy {
        self.masking.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.state.status != EpisodeStatus::Running
    }

    /// Start a new episode.
    ///
    /// `Some(seed)` reseeds the random source so the whole trajectory
    /// replays; `None` keeps drawing from the current stream.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, ResetInfo) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        self.state = initial_state(&self.config, &mut self.rng);
        let state_of_charge = self.state.battery.state_of_charge();

        info!(
            seed = ?seed,
            state_of_charge,
            max_timestep = self.config.max_timestep,
            masking = self.masking.name(),
            "environment reset"
        );

        (
            self.observation(),
            ResetInfo {
                seed,
                state_of_charge,
            },
        )
    }

    /// Advance the market by one timestep.
    pub fn step(&mut self, action: usize) -> Result<StepResult, EnvError> {
        if !self.actions.contains(action) {
            return Err(EnvError::InvalidAction {
                action,
                num_actions: self.actions.n(),
            });
        }
        if self.is_done() {
            return Err(EnvError::EpisodeFinished {
                timestep: self.state.timestep,
            });
        }

        let requested_charge = self.actions.charge_amount(action);
        let is_valid = self.state.battery.is_valid(requested_charge);
        let is_safe = self.state.battery.is_safe(requested_charge);

        let next_timestep = self.state.timestep + 1;
        let drivers = MarketDrivers::sample(next_timestep, &self.config, &mut self.rng);

        let applied_charge = if self.state.battery.apply(requested_charge) {
            requested_charge
        } else {
            debug!(
                timestep = self.state.timestep,
                action,
                requested_charge,
                state_of_charge = self.state.battery.state_of_charge(),
                "action would breach battery capacity, rejected"
            );
            0.0
        };

        let settlement = Settlement::settle(applied_charge, &drivers, is_valid, &self.config);

        self.state.timestep = next_timestep;
        self.state.drivers = drivers;

        let terminated = next_timestep >= self.config.max_timestep;
        let truncated = !terminated
            && self
                .config
                .truncate_after
                .is_some_and(|limit| next_timestep >= limit);
        self.state.status = if terminated {
            EpisodeStatus::Terminated
        } else if truncated {
            EpisodeStatus::Truncated
        } else {
            EpisodeStatus::Running
        };

        trace!(
            timestep = next_timestep,
            action,
            reward = settlement.reward,
            state_of_charge = self.state.battery.state_of_charge(),
            demand = drivers.demand,
            production = drivers.production,
            sell_price = drivers.sell_price,
            "step"
        );

        Ok(StepResult {
            observation: self.observation(),
            reward: settlement.reward,
            terminated,
            truncated,
            info: StepInfo {
                timestep: next_timestep,
                action,
                requested_charge,
                applied_charge,
                is_valid,
                is_safe,
                state_of_charge: self.state.battery.state_of_charge(),
                state_of_charge_wh: self.config.to_wh(self.state.battery.state_of_charge()),
                drivers,
                settlement,
            },
        })
    }

    /// Admissible actions under the configured masking strategy
    pub fn action_masks(&self) -> Vec<bool> {
        self.masking.mask(&self.state.battery, &self.actions)
    }

    /// Respects the hard capacity bound; unknown actions are never valid
    pub fn is_action_valid(&self, action: usize) -> bool {
        self.actions.contains(action)
            && self.state.battery.is_valid(self.actions.charge_amount(action))
    }

    /// Lands strictly inside the safe band; unknown actions are never safe
    pub fn is_action_safe(&self, action: usize) -> bool {
        self.actions.contains(action)
            && self.state.battery.is_safe(self.actions.charge_amount(action))
    }

    pub fn observation(&self) -> Observation {
        let drivers = &self.state.drivers;
        Observation {
            timestep: self.state.timestep,
            time: f64::from(self.state.timestep) / f64::from(self.config.max_timestep),
            state_of_charge: self.state.battery.state_of_charge(),
            season: drivers.season,
            weather: drivers.weather,
            demand: drivers.demand,
            production: drivers.production,
            sell_price: drivers.sell_price,
        }
    }

    /// Display the current state; never touches the simulation
    pub fn render(&self) {
        match self.render_mode {
            Some(RenderMode::Human) => println!("{self}"),
            Some(RenderMode::Log) => {
                let drivers = &self.state.drivers;
                info!(
                    timestep = self.state.timestep,
                    state_of_charge = self.state.battery.state_of_charge(),
                    state_of_charge_wh = self.config.to_wh(self.state.battery.state_of_charge()),
                    charge_fraction = self.state.battery.fraction(),
                    season = %drivers.season,
                    weather = %drivers.weather,
                    demand = drivers.demand,
                    production = drivers.production,
                    sell_price = drivers.sell_price,
                    "market state"
                );
            }
            None => {}
        }
    }
}

/// Timestep 0 of a new episode; draws the initial charge (if randomized)
/// before the drivers.
fn initial_state(config: &SimulationConfig, rng: &mut StdRng) -> EnvironmentState {
    let state_of_charge = if config.randomize_initial_charge {
        let (low, high) = config.safe_range;
        rng.gen_range(low..high)
    } else {
        config.initial_state_of_charge
    };

    EnvironmentState {
        timestep: 0,
        battery: Battery::from_config(config, state_of_charge),
        drivers: MarketDrivers::sample(0, config, rng),
        status: EpisodeStatus::Running,
    }
}

impl fmt::Display for ElectricityMarketEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let drivers = &self.state.drivers;
        let mask: String = self
            .action_masks()
            .iter()
            .map(|&allowed| if allowed { '#' } else { '.' })
            .collect();
        write!(
            f,
            "t={:>5}/{} soc={:>6.1}/{:.0} ({:>3.0}%) {:<6} {:<6} demand={:>5.1} production={:>5.1} price={:>5.2} mask=[{}]",
            self.state.timestep,
            self.config.max_timestep,
            self.state.battery.state_of_charge(),
            self.state.battery.capacity(),
            self.state.battery.fraction() * 100.0,
            drivers.season,
            drivers.weather,
            drivers.demand,
            drivers.production,
            drivers.sell_price,
            mask
        )
    }
}
