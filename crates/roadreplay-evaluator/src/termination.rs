//! Episode termination.
//!
//! Termination reasons are independent flags evaluated in a fixed order. Several
//! can be true in the same step; none of them short-circuits the others.
//!
//! | reason | condition | gated by |
//! |---|---|---|
//! | `arrive_dest` | route completion > 0.95 | - |
//! | `out_of_road` | route completion < -0.1, or the out-of-road check | - |
//! | `crash_vehicle` | collided with a vehicle | `crash_vehicle_done` |
//! | `crash_object` | collided with an object | - |
//! | `crash_building` | collided with a building | - |
//! | `max_step` | step counter reached the horizon | `horizon` |
//!
//! `crash` aggregates the three crash reasons. The episode is done when any
//! reason is set.
//!
//! # Out-of-Road Check
//!
//! The check has two modes, selected by `relax_out_of_road_done`:
//!
//! - **Relaxed** (default): more than 10m from the route, on a continuous yellow
//!   line, or on a sidewalk.
//! - **Strict**: on a sidewalk, a continuous yellow line or a continuous white
//!   line. The 10m route-distance rule applies only with `out_of_route_done`.
//!
//! The same check drives the out-of-road cost and penalty.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{config::EnvConfig, navigation::NavigationSample, vehicle::VehicleStateSnapshot};

/// Route completion above which the agent has arrived.
pub const ARRIVAL_ROUTE_COMPLETION: f64 = 0.95;

/// Route completion below which the agent is considered to have left the route backwards.
pub const BEHIND_START_ROUTE_COMPLETION: f64 = -0.1;

/// Maximum lateral distance from the route, in meters.
pub const MAX_ROUTE_LATERAL_DISTANCE: f64 = 10.0;

/// Returns whether the agent has arrived at the end of the reference trajectory.
#[must_use]
pub fn is_arrive_destination(sample: &NavigationSample) -> bool {
    sample.route_completion > ARRIVAL_ROUTE_COMPLETION
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRoadPolicy {
    Relaxed,
    Strict { out_of_route_done: bool },
}

impl OutOfRoadPolicy {
    #[must_use]
    pub fn from_config(config: &EnvConfig) -> Self {
        if config.relax_out_of_road_done {
            Self::Relaxed
        } else {
            Self::Strict {
                out_of_route_done: config.out_of_route_done,
            }
        }
    }

    #[must_use]
    pub fn is_out_of_road(
        &self,
        vehicle: &VehicleStateSnapshot,
        sample: &NavigationSample,
    ) -> bool {
        let off_route = sample.route_lateral.abs() > MAX_ROUTE_LATERAL_DISTANCE;
        match *self {
            Self::Relaxed => {
                off_route || vehicle.on_yellow_continuous_line || vehicle.crash_sidewalk
            }
            Self::Strict { out_of_route_done } => {
                vehicle.crash_sidewalk
                    || vehicle.on_yellow_continuous_line
                    || vehicle.on_white_continuous_line
                    || (out_of_route_done && off_route)
            }
        }
    }
}

/// Termination reasons of one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneInfo {
    pub arrive_dest: bool,
    pub out_of_road: bool,
    pub crash_vehicle: bool,
    pub crash_object: bool,
    pub crash_building: bool,
    /// Any of the three crash reasons.
    pub crash: bool,
    pub max_step: bool,
}

impl DoneInfo {
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.arrive_dest
            || self.out_of_road
            || self.crash_vehicle
            || self.crash_object
            || self.crash_building
            || self.max_step
    }

    /// Names of the reasons that are set, in evaluation order. `crash` is not listed.
    pub fn reasons(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.arrive_dest, "arrive_dest"),
            (self.out_of_road, "out_of_road"),
            (self.crash_vehicle, "crash_vehicle"),
            (self.crash_object, "crash_object"),
            (self.crash_building, "crash_building"),
            (self.max_step, "max_step"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TerminationEvaluator {
    out_of_road: OutOfRoadPolicy,
    crash_vehicle_done: bool,
    horizon: Option<u64>,
}

impl TerminationEvaluator {
    #[must_use]
    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            out_of_road: OutOfRoadPolicy::from_config(config),
            crash_vehicle_done: config.crash_vehicle_done,
            horizon: config.horizon,
        }
    }

    /// Decides whether the episode ends at `step`.
    ///
    /// # Returns
    ///
    /// `(done, done_info)`
    #[must_use]
    pub fn evaluate(
        &self,
        vehicle: &VehicleStateSnapshot,
        sample: &NavigationSample,
        step: u64,
    ) -> (bool, DoneInfo) {
        let crash_vehicle = vehicle.crash_vehicle && self.crash_vehicle_done;
        let mut info = DoneInfo {
            arrive_dest: is_arrive_destination(sample),
            out_of_road: self.out_of_road.is_out_of_road(vehicle, sample)
                || sample.route_completion < BEHIND_START_ROUTE_COMPLETION,
            crash_vehicle,
            crash_object: vehicle.crash_object,
            crash_building: vehicle.crash_building,
            crash: false,
            max_step: self.horizon.is_some_and(|horizon| step >= horizon),
        };
        info.crash = info.crash_vehicle || info.crash_object || info.crash_building;

        for reason in info.reasons() {
            info!(agent = %vehicle.agent_id, step, reason, "episode ended");
        }
        (info.is_done(), info)
    }
}

#[cfg(test)]
mod tests {
    use roadreplay_scenario::Vec2;

    use super::*;

    fn sample(route_completion: f64, route_lateral: f64) -> NavigationSample {
        NavigationSample {
            longitudinal: route_completion * 100.0,
            lateral: route_lateral,
            track_length: 100.0,
            route_completion,
            route_lateral,
        }
    }

    fn vehicle() -> VehicleStateSnapshot {
        VehicleStateSnapshot::new(Vec2::ZERO, Vec2::ZERO)
    }

    fn evaluator(config: &EnvConfig) -> TerminationEvaluator {
        TerminationEvaluator::from_config(config)
    }

    #[test]
    fn test_running_episode() {
        let (done, info) =
            evaluator(&EnvConfig::default()).evaluate(&vehicle(), &sample(0.5, 0.0), 1);
        assert!(!done);
        assert_eq!(info, DoneInfo::default());
    }

    #[test]
    fn test_arrival_threshold() {
        let e = evaluator(&EnvConfig::default());
        let (done, info) = e.evaluate(&vehicle(), &sample(0.950_001, 0.0), 1);
        assert!(done && info.arrive_dest);

        let (done, info) = e.evaluate(&vehicle(), &sample(0.95 - 1e-9, 0.0), 1);
        assert!(!done && !info.arrive_dest);

        // Exactly at the threshold is not an arrival
        let (_, info) = e.evaluate(&vehicle(), &sample(0.95, 0.0), 1);
        assert!(!info.arrive_dest);
    }

    #[test]
    fn test_behind_start_is_out_of_road() {
        let config = EnvConfig {
            relax_out_of_road_done: false,
            ..EnvConfig::default()
        };
        let (done, info) = evaluator(&config).evaluate(&vehicle(), &sample(-0.1001, 0.0), 1);
        assert!(done && info.out_of_road);

        let (done, _) = evaluator(&config).evaluate(&vehicle(), &sample(-0.0999, 0.0), 1);
        assert!(!done);
    }

    #[test]
    fn test_relaxed_lateral_threshold() {
        let e = evaluator(&EnvConfig::default());
        let (_, info) = e.evaluate(&vehicle(), &sample(0.5, 10.0001), 1);
        assert!(info.out_of_road);
        let (_, info) = e.evaluate(&vehicle(), &sample(0.5, -10.0001), 1);
        assert!(info.out_of_road);
        let (done, info) = e.evaluate(&vehicle(), &sample(0.5, 9.9999), 1);
        assert!(!done && !info.out_of_road);
    }

    #[test]
    fn test_relaxed_line_and_sidewalk() {
        let e = evaluator(&EnvConfig::default());

        let mut v = vehicle();
        v.on_yellow_continuous_line = true;
        assert!(e.evaluate(&v, &sample(0.5, 0.0), 1).1.out_of_road);

        let mut v = vehicle();
        v.crash_sidewalk = true;
        assert!(e.evaluate(&v, &sample(0.5, 0.0), 1).1.out_of_road);

        // White lines only count in strict mode
        let mut v = vehicle();
        v.on_white_continuous_line = true;
        assert!(!e.evaluate(&v, &sample(0.5, 0.0), 1).1.out_of_road);
    }

    #[test]
    fn test_strict_mode() {
        let strict = EnvConfig {
            relax_out_of_road_done: false,
            ..EnvConfig::default()
        };
        let e = evaluator(&strict);

        let mut v = vehicle();
        v.on_white_continuous_line = true;
        assert!(e.evaluate(&v, &sample(0.5, 0.0), 1).1.out_of_road);

        // Far from the route is ignored without out_of_route_done
        assert!(!e.evaluate(&vehicle(), &sample(0.5, 15.0), 1).1.out_of_road);

        let e = evaluator(&EnvConfig {
            out_of_route_done: true,
            ..strict
        });
        assert!(e.evaluate(&vehicle(), &sample(0.5, 15.0), 1).1.out_of_road);
    }

    #[test]
    fn test_crash_vehicle_is_gated() {
        let mut v = vehicle();
        v.crash_vehicle = true;

        let (done, info) = evaluator(&EnvConfig::default()).evaluate(&v, &sample(0.5, 0.0), 1);
        assert!(!done);
        assert!(!info.crash_vehicle && !info.crash);

        let config = EnvConfig {
            crash_vehicle_done: true,
            ..EnvConfig::default()
        };
        let (done, info) = evaluator(&config).evaluate(&v, &sample(0.5, 0.0), 1);
        assert!(done && info.crash_vehicle && info.crash);
    }

    #[test]
    fn test_object_and_building_crashes_always_end() {
        let e = evaluator(&EnvConfig::default());

        let mut v = vehicle();
        v.crash_object = true;
        let (done, info) = e.evaluate(&v, &sample(0.5, 0.0), 1);
        assert!(done && info.crash_object && info.crash);

        let mut v = vehicle();
        v.crash_building = true;
        let (done, info) = e.evaluate(&v, &sample(0.5, 0.0), 1);
        assert!(done && info.crash_building && info.crash);
    }

    #[test]
    fn test_reasons_accumulate() {
        let mut v = vehicle();
        v.crash_object = true;
        v.crash_building = true;
        let (done, info) = evaluator(&EnvConfig::default()).evaluate(&v, &sample(0.99, 12.0), 1);
        assert!(done);
        assert_eq!(
            info.reasons().collect::<Vec<_>>(),
            ["arrive_dest", "out_of_road", "crash_object", "crash_building"]
        );
    }

    #[test]
    fn test_horizon() {
        let config = EnvConfig {
            horizon: Some(10),
            ..EnvConfig::default()
        };
        let e = evaluator(&config);
        assert!(!e.evaluate(&vehicle(), &sample(0.5, 0.0), 9).0);
        let (done, info) = e.evaluate(&vehicle(), &sample(0.5, 0.0), 10);
        assert!(done && info.max_step && !info.crash);

        let unlimited = evaluator(&EnvConfig {
            horizon: None,
            ..EnvConfig::default()
        });
        assert!(!unlimited.evaluate(&vehicle(), &sample(0.5, 0.0), 100_000).0);
    }
}
