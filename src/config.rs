use anyhow::{Context, Result};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

use crate::env::masking::MaskingKind;

/// Environment variable prefix for overrides, e.g. `EMARKET__ENV__MAX_TIMESTEP=10`
pub const ENV_PREFIX: &str = "EMARKET__";

/// Default location of the TOML configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub env: SimulationConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        let config: Config = figment
            .extract()
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        config
            .env
            .validate()
            .context("invalid [env] section")?;
        Ok(config)
    }
}

/// Immutable parameters of one market environment.
///
/// All energy quantities are expressed in units of `granularity_wh`
/// (100 Wh by default); prices are per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_bounds"))]
pub struct SimulationConfig {
    /// Episode horizon in timesteps (one timestep = one hour)
    #[validate(range(min = 1))]
    pub max_timestep: u32,
    /// Externally imposed step limit; reported through `truncated`
    pub truncate_after: Option<u32>,
    /// Energy of a single unit in Wh
    #[validate(range(min = 1))]
    pub granularity_wh: u32,

    /// Hard upper bound of the battery
    #[validate(range(min = 0.0))]
    pub battery_capacity: f64,
    pub initial_state_of_charge: f64,
    /// Draw the initial charge uniformly from the safe band on reset
    pub randomize_initial_charge: bool,
    /// Soft operating band `(low, high)` used for expert masking
    pub safe_range: (f64, f64),

    /// Size of the discrete action set; the middle action is idle
    #[validate(range(min = 1))]
    pub num_actions: usize,
    /// Units moved per action level
    #[validate(range(min = 0.0))]
    pub charge_step: f64,

    pub min_price: f64,
    pub max_price: f64,
    pub base_price: f64,
    /// Price response to the normalized demand/production imbalance
    pub price_sensitivity: f64,
    #[validate(range(min = 0.0))]
    pub price_noise_std: f64,

    pub min_demand: f64,
    pub max_demand: f64,
    pub base_demand: f64,
    #[validate(range(min = 0.0))]
    pub demand_noise_std: f64,

    #[validate(range(min = 0.0))]
    pub solar_capacity: f64,
    #[validate(range(min = 0.0))]
    pub wind_capacity: f64,

    #[validate(range(min = 1))]
    pub steps_per_day: u32,
    /// Hours `[start, end)` without solar yield; wraps around midnight
    pub dark_hours: (u32, u32),
    /// Length of the season cycle; split into four equal seasons
    #[validate(range(min = 4))]
    pub steps_per_year: u32,

    #[validate(range(min = 0.0))]
    pub unmet_demand_penalty: f64,
    /// Fixed penalty for an action that would breach the hard capacity bound
    #[validate(range(exclusive_min = 0.0))]
    pub invalid_action_penalty: f64,

    /// Seed for the random source used before the first seeded reset
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_timestep: 8760,
            truncate_after: None,
            granularity_wh: 100,
            battery_capacity: 100.0,
            initial_state_of_charge: 50.0,
            randomize_initial_charge: false,
            safe_range: (10.0, 90.0),
            num_actions: 21,
            charge_step: 2.0,
            min_price: 0.0,
            max_price: 10.0,
            base_price: 4.0,
            price_sensitivity: 6.0,
            price_noise_std: 0.3,
            min_demand: 5.0,
            max_demand: 40.0,
            base_demand: 10.0,
            demand_noise_std: 1.0,
            solar_capacity: 30.0,
            wind_capacity: 15.0,
            steps_per_day: 24,
            dark_hours: (20, 6),
            steps_per_year: 8760,
            unmet_demand_penalty: 10.0,
            invalid_action_penalty: 100.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Short episodes for smoke runs and CI
    pub fn quick(max_timestep: u32) -> Self {
        Self {
            max_timestep,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_initial_state_of_charge(mut self, state_of_charge: f64) -> Self {
        self.initial_state_of_charge = state_of_charge;
        self
    }

    /// Index of the idle action
    pub fn middle_action(&self) -> usize {
        self.num_actions / 2
    }

    /// Converts an energy amount in units to Wh
    pub fn to_wh(&self, units: f64) -> f64 {
        units * f64::from(self.granularity_wh)
    }

    fn float_fields(&self) -> [(&'static str, f64); 19] {
        [
            ("battery_capacity", self.battery_capacity),
            ("initial_state_of_charge", self.initial_state_of_charge),
            ("safe_range.0", self.safe_range.0),
            ("safe_range.1", self.safe_range.1),
            ("charge_step", self.charge_step),
            ("min_price", self.min_price),
            ("max_price", self.max_price),
            ("base_price", self.base_price),
            ("price_sensitivity", self.price_sensitivity),
            ("price_noise_std", self.price_noise_std),
            ("min_demand", self.min_demand),
            ("max_demand", self.max_demand),
            ("base_demand", self.base_demand),
            ("demand_noise_std", self.demand_noise_std),
            ("solar_capacity", self.solar_capacity),
            ("wind_capacity", self.wind_capacity),
            ("unmet_demand_penalty", self.unmet_demand_penalty),
            ("invalid_action_penalty", self.invalid_action_penalty),
            ("granularity_wh", f64::from(self.granularity_wh)),
        ]
    }
}

fn bounds_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

fn validate_bounds(config: &SimulationConfig) -> Result<(), ValidationError> {
    if let Some((name, value)) = config
        .float_fields()
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(bounds_error("non_finite", format!("{name} must be finite, got {value}")));
    }
    let (low, high) = config.safe_range;
    if !(0.0 <= low && low < high && high <= config.battery_capacity) {
        return Err(bounds_error(
            "safe_range",
            format!(
                "safe range ({low}, {high}) must satisfy 0 <= low < high <= capacity {}",
                config.battery_capacity
            ),
        ));
    }
    if !(0.0..=config.battery_capacity).contains(&config.initial_state_of_charge) {
        return Err(bounds_error(
            "initial_state_of_charge",
            format!(
                "initial charge {} outside [0, {}]",
                config.initial_state_of_charge, config.battery_capacity
            ),
        ));
    }
    if config.num_actions % 2 == 0 {
        return Err(bounds_error(
            "num_actions",
            format!("num_actions {} must be odd so the middle action is idle", config.num_actions),
        ));
    }
    if config.min_price >= config.max_price || config.min_price < 0.0 {
        return Err(bounds_error(
            "price_bounds",
            format!("price bounds [{}, {}] are inverted or negative", config.min_price, config.max_price),
        ));
    }
    if config.min_demand >= config.max_demand || config.min_demand < 0.0 {
        return Err(bounds_error(
            "demand_bounds",
            format!("demand bounds [{}, {}] are inverted or negative", config.min_demand, config.max_demand),
        ));
    }
    let (dark_start, dark_end) = config.dark_hours;
    if dark_start >= config.steps_per_day || dark_end >= config.steps_per_day {
        return Err(bounds_error(
            "dark_hours",
            format!("dark hours ({dark_start}, {dark_end}) must lie within a day of {} steps", config.steps_per_day),
        ));
    }
    if config.truncate_after == Some(0) {
        return Err(bounds_error("truncate_after", "truncate_after must be positive".to_string()));
    }
    Ok(())
}

/// Which decision rule an agent uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Random,
    PriceThreshold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub policy: PolicyKind,
    /// Masking strategy handed to the environment; `None` = agent ignores masks
    #[serde(default)]
    pub masking: Option<MaskingKind>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Fraction of `max_price` at or below which the threshold policy charges
    #[serde(default = "default_buy_threshold")]
    pub buy_threshold: f64,
    /// Fraction of `max_price` at or above which the threshold policy discharges
    #[serde(default = "default_sell_threshold")]
    pub sell_threshold: f64,
}

fn default_buy_threshold() -> f64 {
    0.3
}

fn default_sell_threshold() -> f64 {
    0.6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// One evaluation episode is played per seed
    pub evaluate_seeds: Vec<u64>,
    pub render: bool,
    pub report_path: Option<PathBuf>,
    pub agents: Vec<AgentConfig>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            evaluate_seeds: vec![90000],
            render: false,
            report_path: None,
            agents: vec![
                AgentConfig {
                    name: "MaskableRandomAgent".to_string(),
                    policy: PolicyKind::Random,
                    masking: Some(MaskingKind::Validity),
                    seed: Some(10000),
                    buy_threshold: default_buy_threshold(),
                    sell_threshold: default_sell_threshold(),
                },
                AgentConfig {
                    name: "ExpertMaskableRandomAgent".to_string(),
                    policy: PolicyKind::Random,
                    masking: Some(MaskingKind::ExpertKnowledge),
                    seed: Some(10000),
                    buy_threshold: default_buy_threshold(),
                    sell_threshold: default_sell_threshold(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert_eq!(SimulationConfig::default().middle_action(), 10);
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let config = SimulationConfig::quick(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_safe_range_outside_capacity() {
        let config = SimulationConfig {
            safe_range: (10.0, 120.0),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.to_string().contains("safe range"));
    }

    #[test]
    fn test_rejects_even_action_count() {
        let config = SimulationConfig {
            num_actions: 20,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let cases = [
            SimulationConfig { charge_step: f64::INFINITY, ..SimulationConfig::quick(10) },
            SimulationConfig { charge_step: f64::NAN, ..SimulationConfig::quick(10) },
            SimulationConfig { max_price: f64::NAN, ..SimulationConfig::quick(10) },
            SimulationConfig { min_demand: f64::NAN, ..SimulationConfig::quick(10) },
            SimulationConfig { price_noise_std: f64::INFINITY, ..SimulationConfig::quick(10) },
            SimulationConfig { unmet_demand_penalty: f64::NAN, ..SimulationConfig::quick(10) },
        ];
        for config in cases {
            let errors = config.validate().unwrap_err();
            assert!(errors.to_string().contains("finite"), "{errors}");
        }
    }

    #[test]
    fn test_rejects_zero_invalid_action_penalty() {
        let config = SimulationConfig {
            invalid_action_penalty: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            invalid_action_penalty: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_units_to_wh() {
        let config = SimulationConfig::default();
        assert_eq!(config.to_wh(2.5), 250.0);
    }

    #[test]
    fn test_rejects_initial_charge_above_capacity() {
        let config = SimulationConfig::default().with_initial_state_of_charge(150.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extract_from_toml() {
        let toml = r#"
            [env]
            max_timestep = 10
            safe_range = [20.0, 80.0]

            [player]
            evaluate_seeds = [1, 2, 3]

            [[player.agents]]
            name = "expert"
            policy = "price_threshold"
            masking = "expert_knowledge"
        "#;
        let config: Config = Figment::from(Toml::string(toml)).extract().unwrap();

        assert_eq!(config.env.max_timestep, 10);
        assert_eq!(config.env.safe_range, (20.0, 80.0));
        // untouched fields keep their defaults
        assert_eq!(config.env.battery_capacity, 100.0);
        assert_eq!(config.player.evaluate_seeds, vec![1, 2, 3]);
        assert_eq!(config.player.agents.len(), 1);
        assert_eq!(config.player.agents[0].policy, PolicyKind::PriceThreshold);
        assert_eq!(config.player.agents[0].masking, Some(MaskingKind::ExpertKnowledge));
        assert_eq!(config.player.agents[0].buy_threshold, 0.3);
    }
}
