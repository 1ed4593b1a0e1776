//! Episode lifecycle and the per-step evaluation entry point.
//!
//! [`EpisodeEvaluator`] lives as long as the environment. It owns the scenario
//! selector (the only state carried across episodes) and the step evaluators built
//! from the configuration. Each reset produces an [`Episode`] holding the
//! per-episode data.
//!
//! # Step Order
//!
//! [`Episode::evaluate_step`] is the only way to evaluate a step. It runs:
//!
//! ```text
//! advance step counter
//!     ↓
//! TrajectoryNavigator::sample      (one projection per step)
//!     ↓ NavigationSample
//! TerminationEvaluator::evaluate → (done, done_info)
//! CostEvaluator::evaluate        → (cost, cost_info)
//! RewardShaper::evaluate         → (reward, reward_info)
//! ```
//!
//! All three evaluators read the same sample, so none of them can observe a
//! route-relative lateral offset computed for another position.
//!
//! # Example
//!
//! ```
//! use roadreplay_evaluator::{
//!     EnvConfig, EpisodeEvaluator, TrajectoryNavigator, VehicleStateSnapshot,
//! };
//! use roadreplay_scenario::{Polyline, ScenarioRecord, Vec2};
//!
//! let mut evaluator = EpisodeEvaluator::new(EnvConfig::default()).unwrap();
//! let trajectory = Polyline::new(vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)]).unwrap();
//! let mut episode = evaluator
//!     .reset(
//!         None,
//!         ScenarioRecord::default(),
//!         TrajectoryNavigator::new(Box::new(trajectory)),
//!     )
//!     .unwrap();
//!
//! let snapshot = VehicleStateSnapshot::new(Vec2::new(2.0, 0.0), Vec2::new(0.0, 0.0));
//! let outcome = episode.evaluate_step(&snapshot);
//! assert!(!outcome.done);
//! assert_eq!(outcome.reward, 2.0);
//! ```

use roadreplay_scenario::{
    CoordinateTransform, ExpertStateMatcher, ScenarioRecord, ScenarioSelector, SeedOutOfRangeError,
    SelectorSeed,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::{ConfigError, EnvConfig},
    cost::{CostEvaluator, CostInfo},
    navigation::TrajectoryNavigator,
    reward::{RewardShaper, StepInfo},
    termination::{DoneInfo, TerminationEvaluator},
    vehicle::VehicleStateSnapshot,
};

/// Everything one step produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: u64,
    pub done: bool,
    pub done_info: DoneInfo,
    pub cost: f64,
    pub cost_info: CostInfo,
    pub reward: f64,
    pub reward_info: StepInfo,
}

/// Mutable per-episode state owned by the evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeScalars {
    /// Number of steps evaluated so far. Never exceeds the horizon.
    pub step: u64,
    /// Scenario index of the episode.
    pub seed: u64,
}

/// The three step evaluators, built once from the configuration.
#[derive(Debug, Clone, Copy)]
struct StepEvaluators {
    termination: TerminationEvaluator,
    cost: CostEvaluator,
    reward: RewardShaper,
}

impl StepEvaluators {
    fn from_config(config: &EnvConfig) -> Self {
        let expert =
            ExpertStateMatcher::new(CoordinateTransform::from_enabled(config.coordinate_transform));
        Self {
            termination: TerminationEvaluator::from_config(config),
            cost: CostEvaluator::from_config(config),
            reward: RewardShaper::from_config(config, expert),
        }
    }
}

/// Environment-lifetime evaluator: selects scenarios and starts episodes.
#[derive(Debug)]
pub struct EpisodeEvaluator {
    config: EnvConfig,
    selector: ScenarioSelector,
    evaluators: StepEvaluators,
    current_seed: Option<u64>,
}

impl EpisodeEvaluator {
    /// Creates an evaluator whose random scenario draws are seeded from the thread RNG.
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let selector = ScenarioSelector::new(config.scenario_window()?, config.sequential_seed);
        Ok(Self::with_selector(config, selector))
    }

    /// Like [`Self::new`], but with a specific seed for reproducible scenario draws.
    pub fn with_selector_seed(config: EnvConfig, seed: SelectorSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let selector =
            ScenarioSelector::with_seed(config.scenario_window()?, config.sequential_seed, seed);
        Ok(Self::with_selector(config, selector))
    }

    fn with_selector(config: EnvConfig, selector: ScenarioSelector) -> Self {
        let evaluators = StepEvaluators::from_config(&config);
        Self {
            config,
            selector,
            evaluators,
            current_seed: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Scenario index of the most recent episode.
    #[must_use]
    pub fn current_seed(&self) -> Option<u64> {
        self.current_seed
    }

    /// Selects the scenario index of the next episode and records it as current.
    pub fn select_seed(&mut self, force_seed: Option<u64>) -> Result<u64, SeedOutOfRangeError> {
        let seed = self.selector.select(force_seed, self.current_seed)?;
        self.current_seed = Some(seed);
        Ok(seed)
    }

    /// Selects the next scenario and starts an episode on it.
    ///
    /// `scenario` and `navigator` must describe the scenario of the selected
    /// index; callers that load scenario data by index use [`Self::select_seed`]
    /// first and pass the selected index back as `force_seed`.
    pub fn reset(
        &mut self,
        force_seed: Option<u64>,
        scenario: ScenarioRecord,
        navigator: TrajectoryNavigator,
    ) -> Result<Episode, SeedOutOfRangeError> {
        let seed = self.select_seed(force_seed)?;
        info!(
            seed,
            scenario = %scenario.id,
            track_length = navigator.trajectory().length(),
            "episode started"
        );
        Ok(Episode {
            evaluators: self.evaluators,
            horizon: self.config.horizon,
            scenario,
            navigator,
            scalars: EpisodeScalars { step: 0, seed },
        })
    }
}

/// One running episode.
#[derive(Debug)]
pub struct Episode {
    evaluators: StepEvaluators,
    horizon: Option<u64>,
    scenario: ScenarioRecord,
    navigator: TrajectoryNavigator,
    scalars: EpisodeScalars,
}

impl Episode {
    #[must_use]
    pub fn scalars(&self) -> EpisodeScalars {
        self.scalars
    }

    #[must_use]
    pub fn scenario(&self) -> &ScenarioRecord {
        &self.scenario
    }

    /// Evaluates the vehicle state after one simulation step.
    pub fn evaluate_step(&mut self, vehicle: &VehicleStateSnapshot) -> StepOutcome {
        if self.horizon.is_none_or(|horizon| self.scalars.step < horizon) {
            self.scalars.step += 1;
        }
        let step = self.scalars.step;
        let StepEvaluators {
            termination,
            cost,
            reward,
        } = &self.evaluators;

        let sample = self.navigator.sample(vehicle.position);
        let (done, done_info) = termination.evaluate(vehicle, &sample, step);
        let (cost, cost_info) = cost.evaluate(vehicle, &sample);
        let (reward, reward_info) = reward.evaluate(
            vehicle,
            &self.navigator,
            &sample,
            &self.scenario,
            usize::try_from(step).unwrap_or(usize::MAX),
        );
        debug!(
            step,
            route_completion = sample.route_completion,
            route_lateral = sample.route_lateral,
            reward,
            cost,
            done,
            "step evaluated"
        );

        StepOutcome {
            step,
            done,
            done_info,
            cost,
            cost_info,
            reward,
            reward_info,
        }
    }
}
