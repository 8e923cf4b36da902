//! Evaluation results and their export.

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Total reward per evaluation episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationData {
    pub episodes: Vec<usize>,
    pub rewards: Vec<f64>,
}

impl EvaluationData {
    pub fn push(&mut self, reward: f64) {
        self.episodes.push(self.rewards.len());
        self.rewards.push(reward);
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn mean_reward(&self) -> Option<f64> {
        if self.rewards.is_empty() {
            return None;
        }
        Some(self.rewards.iter().sum::<f64>() / self.rewards.len() as f64)
    }

    /// Rewards as a short comma separated list, for logs
    pub fn summary(&self) -> String {
        self.rewards.iter().map(|r| format!("{r:.2}")).join(", ")
    }
}

/// Evaluation data keyed by agent name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub agents: BTreeMap<String, EvaluationData>,
}

impl EvaluationReport {
    pub fn insert(&mut self, agent: impl Into<String>, data: EvaluationData) {
        self.agents.insert(agent.into(), data);
    }

    /// Writes JSON for `.json` paths and YAML otherwise
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let body = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self).context("report JSON encode failed")?,
            _ => serde_yaml::to_string(self).context("report YAML encode failed")?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_numbers_episodes() {
        let mut data = EvaluationData::default();
        data.push(1.0);
        data.push(3.0);
        assert_eq!(data.episodes, vec![0, 1]);
        assert_eq!(data.mean_reward(), Some(2.0));
        assert_eq!(data.summary(), "1.00, 3.00");
    }

    #[test]
    fn test_empty_mean() {
        assert_eq!(EvaluationData::default().mean_reward(), None);
    }

    #[test]
    fn test_write_yaml_and_json() {
        let mut report = EvaluationReport::default();
        let mut data = EvaluationData::default();
        data.push(-12.5);
        report.insert("MaskableRandomAgent", data);

        let dir = std::env::temp_dir().join(format!("emarket-report-{}", std::process::id()));
        let yaml_path = dir.join("report.yaml");
        let json_path = dir.join("report.json");
        report.write(&yaml_path).unwrap();
        report.write(&json_path).unwrap();

        let yaml: EvaluationReport =
            serde_yaml::from_str(&fs::read_to_string(&yaml_path).unwrap()).unwrap();
        let json: EvaluationReport =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(yaml, report);
        assert_eq!(json, report);

        fs::remove_dir_all(dir).ok();
    }
}
