use std::path::PathBuf;

use rand::Rng as _;
use roadreplay_evaluator::EpisodeEvaluator;
use roadreplay_scenario::SelectorSeed;

use crate::{
    schema::report::SeedSchedule,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SelectSeedsArg {
    /// Environment configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of resets to simulate
    #[arg(long, default_value_t = 10)]
    count: usize,
    /// Seed of the selector's random generator (32 hex characters)
    #[arg(long)]
    rng_seed: Option<SelectorSeed>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SelectSeedsArg) -> anyhow::Result<()> {
    let SelectSeedsArg {
        config,
        count,
        rng_seed,
        output,
    } = arg;

    let config = util::read_config_file(config.as_deref())?;
    let rng_seed = rng_seed.unwrap_or_else(|| rand::rng().random());
    let window = config.scenario_window()?;
    let sequential = config.sequential_seed;

    let mut evaluator = EpisodeEvaluator::with_selector_seed(config, rng_seed)?;
    let seeds = (0..*count)
        .map(|_| evaluator.select_seed(None))
        .collect::<Result<Vec<_>, _>>()?;
    eprintln!(
        "Selected {} seeds from [{}, {})",
        seeds.len(),
        window.start(),
        window.end()
    );

    let schedule = SeedSchedule {
        rng_seed,
        window,
        sequential,
        seeds,
    };
    Output::save_json(&schedule, output.clone())?;
    Ok(())
}
