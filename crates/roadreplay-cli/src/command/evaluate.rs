use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use roadreplay_evaluator::{EpisodeEvaluator, EpisodeStats};

use crate::{
    schema::{episode_log::EpisodeLog, report::EvaluationReport},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Episode log JSON file
    episode: PathBuf,
    /// Environment configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scenario index the episode was played as (selected from the config otherwise)
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        episode,
        config,
        seed,
        output,
    } = arg;

    let config = util::read_config_file(config.as_deref())?;
    let log: EpisodeLog = util::read_json_file("episode", episode)?;
    log.scenario
        .validate()
        .with_context(|| format!("Invalid scenario in {}", episode.display()))?;

    let (scenario, navigator, snapshots) = log.into_parts();
    let mut evaluator = EpisodeEvaluator::new(config)?;
    let mut episode = evaluator
        .reset(*seed, scenario, navigator)
        .context("Failed to select scenario")?;
    let seed = episode.scalars().seed;
    let scenario_id = episode.scenario().id.clone();
    eprintln!(
        "Evaluating scenario {scenario_id:?} (seed {seed}, {} snapshots)",
        snapshots.len()
    );

    let mut stats = EpisodeStats::new();
    let mut steps = Vec::new();
    for snapshot in &snapshots {
        let outcome = episode.evaluate_step(snapshot);
        stats.record_step(&outcome);
        let done = outcome.done;
        steps.push(outcome);
        if done {
            break;
        }
    }

    match stats.termination() {
        Some(done_info) => {
            let reasons: Vec<_> = done_info.reasons().collect();
            eprintln!(
                "Episode ended after {} steps: {}",
                stats.steps(),
                reasons.join(", ")
            );
        }
        None => eprintln!(
            "Episode log ended after {} steps without termination",
            stats.steps()
        ),
    }
    eprintln!(
        "  reward: {:.3}, cost: {:.3}, route completion: {:.3}",
        stats.total_reward(),
        stats.total_cost(),
        stats.route_completion()
    );
    if let Some(mean) = stats.mean_distance_error() {
        eprintln!("  mean distance error: {mean:.3}");
    }

    let report = EvaluationReport {
        evaluated_at: Utc::now(),
        scenario_id,
        seed,
        config: evaluator.config().clone(),
        steps,
        summary: stats,
    };
    Output::save_json(&report, output.clone())?;
    Ok(())
}
