use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::env::{ActionSpace, Observation};

/// Picks an action from an observation and an optional mask
pub trait DecisionPolicy: Send {
    fn name(&self) -> &'static str;

    fn choose(&mut self, observation: &Observation, mask: Option<&[bool]>, actions: &ActionSpace) -> usize;
}

/// Indices allowed by `mask`, or every action without one
fn allowed_actions(mask: Option<&[bool]>, actions: &ActionSpace) -> Vec<usize> {
    match mask {
        Some(mask) => mask.iter().positions(|&allowed| allowed).collect(),
        None => actions.iter().collect(),
    }
}

/// Uniform choice among allowed actions
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl DecisionPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, _observation: &Observation, mask: Option<&[bool]>, actions: &ActionSpace) -> usize {
        allowed_actions(mask, actions)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_else(|| actions.middle())
    }
}

/// Baseline heuristic:
/// - Charge as hard as allowed when the price is at or below `buy_threshold * max_price`
/// - Discharge as hard as allowed when it is at or above `sell_threshold * max_price`
/// - Stay as close to idle as allowed otherwise
#[derive(Debug, Clone)]
pub struct PriceThresholdPolicy {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub max_price: f64,
}

impl PriceThresholdPolicy {
    pub fn new(buy_threshold: f64, sell_threshold: f64, max_price: f64) -> Self {
        Self {
            buy_threshold,
            sell_threshold,
            max_price,
        }
    }

    fn target(&self, price: f64, actions: &ActionSpace) -> usize {
        if price >= self.sell_threshold * self.max_price {
            0
        } else if price <= self.buy_threshold * self.max_price {
            actions.n().saturating_sub(1)
        } else {
            actions.middle()
        }
    }
}

impl DecisionPolicy for PriceThresholdPolicy {
    fn name(&self) -> &'static str {
        "price_threshold"
    }

    fn choose(&mut self, observation: &Observation, mask: Option<&[bool]>, actions: &ActionSpace) -> usize {
        let target = self.target(observation.sell_price, actions);
        allowed_actions(mask, actions)
            .into_iter()
            .min_by_key(|action| action.abs_diff(target))
            .unwrap_or_else(|| actions.middle())
    }
}
