use anyhow::{Context, Result};
use electricity_market::agent::Agent;
use electricity_market::config::Config;
use electricity_market::env::{ElectricityMarketEnv, MaskingKind, RenderMode};
use electricity_market::evaluation::EvaluationReport;
use electricity_market::telemetry::init_tracing;
use tracing::{info, warn};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    if cfg.player.agents.is_empty() {
        warn!("no agents configured; nothing to evaluate");
        return Ok(());
    }

    info!(
        max_timestep = cfg.env.max_timestep,
        agents = cfg.player.agents.len(),
        seeds = cfg.player.evaluate_seeds.len(),
        "starting evaluation"
    );

    let mut report = EvaluationReport::default();
    for agent_cfg in &cfg.player.agents {
        let masking = agent_cfg.masking.unwrap_or(MaskingKind::Validity).into_policy();
        let mut env = ElectricityMarketEnv::with_masking(cfg.env.clone(), masking)
            .with_context(|| format!("failed to build environment for {}", agent_cfg.name))?;
        if cfg.player.render {
            env = env.with_render_mode(RenderMode::Log);
        }

        let mut agent = Agent::from_config(agent_cfg, &cfg.env);
        let data = agent
            .evaluate(&mut env, &cfg.player.evaluate_seeds, cfg.player.render)
            .with_context(|| format!("evaluation of {} failed", agent.name()))?;

        info!(
            agent = agent.name(),
            mean_reward = data.mean_reward().unwrap_or_default(),
            rewards = %data.summary(),
            "agent evaluated"
        );
        report.insert(agent.name(), data);
    }

    if let Some(path) = &cfg.player.report_path {
        report.write(path)?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}
