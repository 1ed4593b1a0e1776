use serde::{Deserialize, Serialize};

use crate::{episode::StepOutcome, termination::DoneInfo};

/// Statistics accumulated over one episode.
///
/// # Example
///
/// ```
/// use roadreplay_evaluator::EpisodeStats;
///
/// let stats = EpisodeStats::new();
/// assert_eq!(stats.steps(), 0);
/// assert_eq!(stats.mean_distance_error(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    steps: u64,
    total_reward: f64,
    total_cost: f64,
    route_completion: f64,
    distance_error_sum: f64,
    distance_error_count: u64,
    max_distance_error: Option<f64>,
    distance_error_final: Option<f64>,
    termination: Option<DoneInfo>,
}

impl EpisodeStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: 0,
            total_reward: 0.0,
            total_cost: 0.0,
            route_completion: 0.0,
            distance_error_sum: 0.0,
            distance_error_count: 0,
            max_distance_error: None,
            distance_error_final: None,
            termination: None,
        }
    }

    /// Number of evaluated steps.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    #[must_use]
    pub const fn total_reward(&self) -> f64 {
        self.total_reward
    }

    #[must_use]
    pub const fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Route completion at the last evaluated step.
    #[must_use]
    pub const fn route_completion(&self) -> f64 {
        self.route_completion
    }

    /// Mean distance to the expert over the steps where the expert was known.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_distance_error(&self) -> Option<f64> {
        (self.distance_error_count > 0)
            .then(|| self.distance_error_sum / self.distance_error_count as f64)
    }

    #[must_use]
    pub const fn max_distance_error(&self) -> Option<f64> {
        self.max_distance_error
    }

    /// Distance to the expert's final state at the last step where the expert was known.
    #[must_use]
    pub const fn distance_error_final(&self) -> Option<f64> {
        self.distance_error_final
    }

    /// Termination reasons of the step that ended the episode, if it has ended.
    #[must_use]
    pub const fn termination(&self) -> Option<&DoneInfo> {
        self.termination.as_ref()
    }

    /// Updates statistics with the outcome of one step.
    ///
    /// This should be called once per evaluated step, in order.
    pub fn record_step(&mut self, outcome: &StepOutcome) {
        self.steps += 1;
        self.total_reward += outcome.reward;
        self.total_cost += outcome.cost;
        self.route_completion = outcome.reward_info.route_completion;

        if let Some(error) = outcome.reward_info.distance_error {
            self.distance_error_sum += error;
            self.distance_error_count += 1;
            self.max_distance_error = Some(self.max_distance_error.map_or(error, |m| m.max(error)));
        }
        if let Some(error) = outcome.reward_info.distance_error_final {
            self.distance_error_final = Some(error);
        }
        if outcome.done {
            self.termination = Some(outcome.done_info);
        }
    }
}
