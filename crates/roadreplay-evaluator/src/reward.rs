//! Reward shaping.
//!
//! # Dense Reward
//!
//! The dense reward pays for progress along the lane the vehicle drives in:
//!
//! ```text
//! reward = driving_reward × (long_now - long_last) × lateral_factor
//!
//! where:
//!   long_now, lat_now = current lane coordinates of the position
//!   long_last         = current lane coordinates of the last position
//!   lateral_factor    = clip(1 - 2 × |lat_now| / 6, 0, 1)   if use_lateral_reward
//!                     = 1                                   otherwise
//! ```
//!
//! The current lane is the vehicle's lane when it is one of the navigator's
//! reference lanes, the first reference lane otherwise.
//!
//! # Terminal Overrides
//!
//! Terminal events replace the dense reward (they are not added to it). The first
//! matching event wins:
//!
//! 1. arrived → `+success_reward`
//! 2. out of road → `-out_of_road_penalty`
//! 3. crashed into a vehicle → `-crash_vehicle_penalty`
//! 4. crashed into an object → `-crash_object_penalty`
//!
//! # Diagnostics
//!
//! [`StepInfo`] records the dense reward before overrides, progress measured
//! along the full reference trajectory (a coarser frame than the lane used for
//! the dense reward), and when the scenario logs the agent's track, the distance
//! to the expert at the current step and at its final valid state. The expert
//! distances are for offline evaluation only and never enter the reward.

use roadreplay_scenario::{ExpertStateMatcher, ScenarioRecord, resolve_track_id};
use serde::{Deserialize, Serialize};

use crate::{
    config::EnvConfig,
    navigation::{NavigationSample, TrajectoryNavigator},
    termination::{OutOfRoadPolicy, is_arrive_destination},
    vehicle::VehicleStateSnapshot,
};

/// Lateral span over which the lane-keeping factor falls from 1 to 0 on both sides.
const LATERAL_FACTOR_SPAN: f64 = 6.0;

/// Lane-keeping factor applied to the dense reward.
#[must_use]
pub fn lateral_factor(lateral: f64) -> f64 {
    (1.0 - 2.0 * lateral.abs() / LATERAL_FACTOR_SPAN).clamp(0.0, 1.0)
}

/// Per-step reward diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Dense reward before terminal overrides.
    pub step_reward: f64,
    pub track_length: f64,
    pub current_distance: f64,
    pub route_completion: f64,
    /// `[width, length]` of the vehicle.
    pub car_size: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_error_final: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamics_mode: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct RewardShaper {
    out_of_road: OutOfRoadPolicy,
    driving_reward: f64,
    use_lateral_reward: bool,
    success_reward: f64,
    out_of_road_penalty: f64,
    crash_vehicle_penalty: f64,
    crash_object_penalty: f64,
    expert: ExpertStateMatcher,
}

impl RewardShaper {
    #[must_use]
    pub fn from_config(config: &EnvConfig, expert: ExpertStateMatcher) -> Self {
        Self {
            out_of_road: OutOfRoadPolicy::from_config(config),
            driving_reward: config.driving_reward,
            use_lateral_reward: config.use_lateral_reward,
            success_reward: config.success_reward,
            out_of_road_penalty: config.out_of_road_penalty,
            crash_vehicle_penalty: config.crash_vehicle_penalty,
            crash_object_penalty: config.crash_object_penalty,
            expert,
        }
    }

    /// Dense progress reward along the current lane.
    #[must_use]
    pub fn dense_reward(
        &self,
        vehicle: &VehicleStateSnapshot,
        navigator: &TrajectoryNavigator,
    ) -> f64 {
        let lane = navigator.current_lane(vehicle.lane.as_deref());
        let (long_last, _) = lane.local_coordinates(vehicle.last_position);
        let (long_now, lateral_now) = lane.local_coordinates(vehicle.position);
        let lateral_factor = if self.use_lateral_reward {
            lateral_factor(lateral_now)
        } else {
            1.0
        };
        self.driving_reward * (long_now - long_last) * lateral_factor
    }

    /// Terminal reward replacing the dense reward, if any terminal event occurred.
    #[must_use]
    pub fn terminal_reward(
        &self,
        vehicle: &VehicleStateSnapshot,
        sample: &NavigationSample,
    ) -> Option<f64> {
        if is_arrive_destination(sample) {
            Some(self.success_reward)
        } else if self.out_of_road.is_out_of_road(vehicle, sample) {
            Some(-self.out_of_road_penalty)
        } else if vehicle.crash_vehicle {
            Some(-self.crash_vehicle_penalty)
        } else if vehicle.crash_object {
            Some(-self.crash_object_penalty)
        } else {
            None
        }
    }

    /// Computes the reward of one step.
    ///
    /// # Arguments
    ///
    /// * `vehicle` - Vehicle state after the step
    /// * `navigator` - Navigator of the episode (for the current lane)
    /// * `sample` - Navigation sample of this step
    /// * `scenario` - Scenario record, for the expert diagnostics
    /// * `step` - Current step index
    ///
    /// # Returns
    ///
    /// `(reward, step_info)`
    #[must_use]
    pub fn evaluate(
        &self,
        vehicle: &VehicleStateSnapshot,
        navigator: &TrajectoryNavigator,
        sample: &NavigationSample,
        scenario: &ScenarioRecord,
        step: usize,
    ) -> (f64, StepInfo) {
        let step_reward = self.dense_reward(vehicle, navigator);
        let reward = self
            .terminal_reward(vehicle, sample)
            .unwrap_or(step_reward);

        let track_id = resolve_track_id(scenario, &vehicle.agent_id);
        let expert = self.expert.lookup(scenario, track_id, step);

        let info = StepInfo {
            step_reward,
            track_length: sample.track_length,
            current_distance: sample.longitudinal,
            route_completion: sample.route_completion,
            car_size: [vehicle.width, vehicle.length],
            distance_error: expert.map(|m| vehicle.position.distance(m.position)),
            distance_error_final: expert.map(|m| vehicle.position.distance(m.final_position)),
            dynamics_mode: vehicle.dynamics_mode.clone(),
        };
        (reward, info)
    }
}
