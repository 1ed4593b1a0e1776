use serde::{Deserialize, Serialize};

use crate::{
    config::EnvConfig, navigation::NavigationSample, termination::OutOfRoadPolicy,
    vehicle::VehicleStateSnapshot,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostInfo {
    pub cost: f64,
}

/// Safety cost of one step.
///
/// The first matching condition wins:
///
/// 1. out of road → `out_of_road_cost`
/// 2. crashed into a vehicle → `crash_vehicle_cost`
/// 3. crashed into an object → `crash_object_cost`
/// 4. otherwise → 0
///
/// Building crashes end the episode but carry no cost.
#[derive(Debug, Clone, Copy)]
pub struct CostEvaluator {
    out_of_road: OutOfRoadPolicy,
    out_of_road_cost: f64,
    crash_vehicle_cost: f64,
    crash_object_cost: f64,
}

impl CostEvaluator {
    #[must_use]
    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            out_of_road: OutOfRoadPolicy::from_config(config),
            out_of_road_cost: config.out_of_road_cost,
            crash_vehicle_cost: config.crash_vehicle_cost,
            crash_object_cost: config.crash_object_cost,
        }
    }

    /// # Returns
    ///
    /// `(cost, cost_info)`
    #[must_use]
    pub fn evaluate(
        &self,
        vehicle: &VehicleStateSnapshot,
        sample: &NavigationSample,
    ) -> (f64, CostInfo) {
        let cost = if self.out_of_road.is_out_of_road(vehicle, sample) {
            self.out_of_road_cost
        } else if vehicle.crash_vehicle {
            self.crash_vehicle_cost
        } else if vehicle.crash_object {
            self.crash_object_cost
        } else {
            0.0
        };
        (cost, CostInfo { cost })
    }
}
