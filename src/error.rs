use thiserror::Error;

/// Caller contract violations.
///
/// Domain infeasibilities (battery overflow, unmet demand) never show up here;
/// they are settled through the reward and [`crate::env::StepInfo`].
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Action {action} is outside the action space (0..{num_actions})")]
    InvalidAction { action: usize, num_actions: usize },

    #[error("Episode already finished at timestep {timestep}; call reset() first")]
    EpisodeFinished { timestep: u32 },

    #[error("Invalid simulation config: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),
}
