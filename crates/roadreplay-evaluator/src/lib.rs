//! Step evaluation for driving agents replaying recorded scenarios.
//!
//! After every simulation step, the evaluator decides whether the episode ends,
//! how much safety cost the step incurs, and how much reward it earns. It also
//! reports how far the agent is from the logged expert.
//!
//! # Architecture
//!
//! ```text
//! EpisodeEvaluator (environment lifetime: config, scenario selection)
//!     ↓ reset
//! Episode (episode lifetime: scenario, navigator, step counter)
//!     ↓ evaluate_step
//! TrajectoryNavigator::sample → NavigationSample
//!     ↓ read by
//! TerminationEvaluator / CostEvaluator / RewardShaper
//! ```
//!
//! # Modules
//!
//! - [`config`] - Environment options and their defaults
//! - [`vehicle`] - Per-step snapshot of the agent vehicle, provided by the simulator
//! - [`navigation`] - Reference trajectory, route and lanes; one projection per step
//! - [`termination`] - Termination reasons and the out-of-road check
//! - [`cost`] - Safety cost
//! - [`reward`] - Dense reward, terminal overrides and expert diagnostics
//! - [`episode`] - Episode lifecycle and the step entry point
//!
//! # Design Principles
//!
//! ## One Sample per Step
//!
//! The vehicle position is projected onto the reference trajectory and the route
//! once per step. The resulting [`NavigationSample`] is passed to every evaluator
//! explicitly, so the termination, cost and reward of a step always agree on where
//! the vehicle is.
//!
//! ## First Match Wins
//!
//! Termination reasons accumulate, but cost and terminal reward pick a single
//! value by priority. Their orders are documented in [`cost`] and [`reward`].
//!
//! ## Expert Distances Are Diagnostics
//!
//! The distance to the logged expert is reported in [`StepInfo`] for offline
//! evaluation. It never changes the reward or the termination.
//!
//! # Example
//!
//! ```
//! use roadreplay_evaluator::{
//!     EnvConfig, EpisodeEvaluator, EpisodeStats, TrajectoryNavigator, VehicleStateSnapshot,
//! };
//! use roadreplay_scenario::{Polyline, ScenarioRecord, Vec2};
//!
//! let config = EnvConfig {
//!     sequential_seed: true,
//!     ..EnvConfig::default()
//! };
//! let mut evaluator = EpisodeEvaluator::new(config).unwrap();
//!
//! let trajectory = Polyline::new(vec![Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0)]).unwrap();
//! let mut episode = evaluator
//!     .reset(
//!         None,
//!         ScenarioRecord::default(),
//!         TrajectoryNavigator::new(Box::new(trajectory)),
//!     )
//!     .unwrap();
//! assert_eq!(episode.scalars().seed, 0);
//!
//! let mut stats = EpisodeStats::new();
//! let mut last = Vec2::new(0.0, 0.0);
//! for x in [5.0, 10.0, 15.0, 20.0] {
//!     let position = Vec2::new(x, 0.0);
//!     let outcome = episode.evaluate_step(&VehicleStateSnapshot::new(position, last));
//!     stats.record_step(&outcome);
//!     last = position;
//!     if outcome.done {
//!         break;
//!     }
//! }
//! assert!(stats.termination().unwrap().arrive_dest);
//! ```

pub use self::{
    config::{ConfigError, EnvConfig},
    cost::{CostEvaluator, CostInfo},
    episode::{Episode, EpisodeEvaluator, EpisodeScalars, StepOutcome},
    episode_stats::EpisodeStats,
    navigation::{NavigationSample, ReferenceLane, TrajectoryNavigator},
    reward::{RewardShaper, StepInfo},
    termination::{DoneInfo, OutOfRoadPolicy, TerminationEvaluator},
    vehicle::VehicleStateSnapshot,
};

pub mod config;
pub mod cost;
pub mod episode;
mod episode_stats;
pub mod navigation;
pub mod reward;
pub mod termination;
pub mod vehicle;
