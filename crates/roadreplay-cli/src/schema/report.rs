use chrono::{DateTime, Utc};
use roadreplay_evaluator::{EnvConfig, EpisodeStats, StepOutcome};
use roadreplay_scenario::{ScenarioWindow, SelectorSeed};
use serde::{Deserialize, Serialize};

/// Result of evaluating one recorded episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Timestamp when the evaluation ran (ISO 8601 format)
    pub evaluated_at: DateTime<Utc>,
    pub scenario_id: String,
    /// Scenario index the episode was played as
    pub seed: u64,
    pub config: EnvConfig,
    /// Outcome of every evaluated step, up to and including the terminating one
    pub steps: Vec<StepOutcome>,
    pub summary: EpisodeStats,
}

/// Scenario indices produced by successive resets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSchedule {
    pub rng_seed: SelectorSeed,
    pub window: ScenarioWindow,
    pub sequential: bool,
    pub seeds: Vec<u64>,
}
