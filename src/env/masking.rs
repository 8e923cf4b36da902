//! Action masking strategies.
//!
//! The environment delegates `action_masks()` to a [`MaskingPolicy`] chosen
//! at construction time; the transition logic never looks at masks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{ActionSpace, Battery};

pub trait MaskingPolicy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// One entry per action in `actions`; `true` = admissible
    fn mask(&self, battery: &Battery, actions: &ActionSpace) -> Vec<bool>;
}

/// Allows every action that respects the hard capacity bound.
///
/// Never empty: the idle action keeps the charge where it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidityMask;

impl MaskingPolicy for ValidityMask {
    fn name(&self) -> &'static str {
        "validity"
    }

    fn mask(&self, battery: &Battery, actions: &ActionSpace) -> Vec<bool> {
        actions
            .iter()
            .map(|action| battery.is_valid(actions.charge_amount(action)))
            .collect()
    }
}

/// Expert knowledge: admissible actions must be valid and keep the charge
/// strictly inside the safe band.
///
/// When nothing qualifies the middle action is forced on so that masking
/// agents always have a choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpertKnowledgeMask;

impl MaskingPolicy for ExpertKnowledgeMask {
    fn name(&self) -> &'static str {
        "expert_knowledge"
    }

    fn mask(&self, battery: &Battery, actions: &ActionSpace) -> Vec<bool> {
        let mut mask: Vec<bool> = actions
            .iter()
            .map(|action| {
                let delta = actions.charge_amount(action);
                battery.is_valid(delta) && battery.is_safe(delta)
            })
            .collect();

        if !mask.iter().any(|&allowed| allowed) {
            if let Some(middle) = mask.get_mut(actions.middle()) {
                *middle = true;
            }
        }
        mask
    }
}

/// Configurable selector for the built-in strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskingKind {
    Validity,
    ExpertKnowledge,
}

impl MaskingKind {
    pub fn into_policy(self) -> Arc<dyn MaskingPolicy> {
        match self {
            MaskingKind::Validity => Arc::new(ValidityMask),
            MaskingKind::ExpertKnowledge => Arc::new(ExpertKnowledgeMask),
        }
    }
}
