//! # Agents
//!
//! An [`Agent`] is composed of a [`DecisionPolicy`] and a flag saying whether
//! it consults the environment's action mask. The masking strategy itself
//! belongs to the environment.

pub mod policy;

pub use policy::{DecisionPolicy, PriceThresholdPolicy, RandomPolicy};

use tracing::{debug, info};

use crate::config::{AgentConfig, PolicyKind, SimulationConfig};
use crate::env::ElectricityMarketEnv;
use crate::error::EnvError;
use crate::evaluation::EvaluationData;

pub struct Agent {
    name: String,
    policy: Box<dyn DecisionPolicy>,
    use_masking: bool,
}

impl Agent {
    pub fn new(name: impl Into<String>, policy: Box<dyn DecisionPolicy>, use_masking: bool) -> Self {
        Self {
            name: name.into(),
            policy,
            use_masking,
        }
    }

    pub fn from_config(config: &AgentConfig, env_config: &SimulationConfig) -> Self {
        let policy: Box<dyn DecisionPolicy> = match config.policy {
            PolicyKind::Random => Box::new(RandomPolicy::new(config.seed)),
            PolicyKind::PriceThreshold => Box::new(PriceThresholdPolicy::new(
                config.buy_threshold,
                config.sell_threshold,
                env_config.max_price,
            )),
        };
        Self::new(config.name.clone(), policy, config.masking.is_some())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uses_masking(&self) -> bool {
        self.use_masking
    }

    pub fn choose_action(&mut self, env: &ElectricityMarketEnv) -> usize {
        let mask = self.use_masking.then(|| env.action_masks());
        self.policy
            .choose(&env.observation(), mask.as_deref(), &env.action_space())
    }

    /// Plays one episode to the end and returns its total reward
    pub fn play_episode(
        &mut self,
        env: &mut ElectricityMarketEnv,
        seed: Option<u64>,
        render: bool,
    ) -> Result<f64, EnvError> {
        env.reset(seed);
        let mut total = 0.0;
        loop {
            let action = self.choose_action(env);
            let result = env.step(action)?;
            total += result.reward;
            if render {
                env.render();
            }
            if result.is_done() {
                debug!(
                    agent = %self.name,
                    timestep = result.info.timestep,
                    terminated = result.terminated,
                    truncated = result.truncated,
                    "episode finished"
                );
                return Ok(total);
            }
        }
    }

    /// One episode per seed
    pub fn evaluate(
        &mut self,
        env: &mut ElectricityMarketEnv,
        seeds: &[u64],
        render: bool,
    ) -> Result<EvaluationData, EnvError> {
        let mut data = EvaluationData::default();
        for &seed in seeds {
            let reward = self.play_episode(env, Some(seed), render)?;
            info!(
                agent = %self.name,
                policy = self.policy.name(),
                seed,
                reward,
                "evaluation episode"
            );
            data.push(reward);
        }
        Ok(data)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("policy", &self.policy.name())
            .field("use_masking", &self.use_masking)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::env::{ExpertKnowledgeMask, MaskingKind};
    use std::sync::Arc;

    #[test]
    fn test_masked_random_agent_never_rejected() {
        let mut env = ElectricityMarketEnv::new(SimulationConfig::quick(200).with_seed(1)).unwrap();
        let mut agent = Agent::new("random", Box::new(RandomPolicy::new(Some(5))), true);

        env.reset(Some(5));
        while !env.is_done() {
            let action = agent.choose_action(&env);
            let result = env.step(action).unwrap();
            assert!(result.info.is_valid);
        }
    }

    #[test]
    fn test_evaluate_one_episode_per_seed() {
        let config = SimulationConfig::quick(24);
        let mut env =
            ElectricityMarketEnv::with_masking(config, Arc::new(ExpertKnowledgeMask)).unwrap();
        let mut agent = Agent::new("random", Box::new(RandomPolicy::new(Some(1))), true);

        let data = agent.evaluate(&mut env, &[1, 2, 3], false).unwrap();
        assert_eq!(data.episodes, vec![0, 1, 2]);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_evaluation_reproducible() {
        let config = SimulationConfig::quick(48);
        let run = || {
            let mut env = ElectricityMarketEnv::new(config.clone()).unwrap();
            let mut agent = Agent::new("random", Box::new(RandomPolicy::new(Some(9))), true);
            agent.evaluate(&mut env, &[11, 12], false).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_from_config() {
        let player = PlayerConfig::default();
        let env_config = SimulationConfig::default();
        let agent = Agent::from_config(&player.agents[1], &env_config);
        assert_eq!(agent.name(), "ExpertMaskableRandomAgent");
        assert!(agent.uses_masking());
        assert_eq!(player.agents[1].masking, Some(MaskingKind::ExpertKnowledge));
    }
}
