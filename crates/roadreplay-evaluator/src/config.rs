//! Environment configuration.
//!
//! [`EnvConfig`] bundles every option the evaluator reads. It deserializes from
//! JSON with every field optional (missing fields take the defaults below) and
//! unknown keys rejected, so that a typo in a configuration file fails loudly
//! instead of silently running with a default.
//!
//! # Defaults
//!
//! | option | default |
//! |---|---|
//! | `start_scenario_index` | 0 |
//! | `num_scenario` | 3 |
//! | `sequential_seed` | false |
//! | `horizon` | 500 |
//! | `success_reward` | 10.0 |
//! | `out_of_road_penalty` | 10.0 |
//! | `crash_vehicle_penalty` | 1.0 |
//! | `crash_object_penalty` | 1.0 |
//! | `driving_reward` | 1.0 |
//! | `use_lateral_reward` | false |
//! | `crash_vehicle_cost` | 1.0 |
//! | `crash_object_cost` | 1.0 |
//! | `out_of_road_cost` | 1.0 |
//! | `out_of_route_done` | false |
//! | `crash_vehicle_done` | false |
//! | `relax_out_of_road_done` | true |
//! | `coordinate_transform` | true |

use roadreplay_scenario::{EmptyWindowError, ScenarioWindow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("invalid scenario window: {_0}")]
    ScenarioWindow(EmptyWindowError),
    #[display("horizon must be positive when set")]
    ZeroHorizon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    // ===== Scenario selection =====
    /// First scenario index of the window this environment plays.
    pub start_scenario_index: u64,
    /// Number of scenarios in the window.
    pub num_scenario: u64,
    /// Play scenarios in order instead of drawing them at random.
    pub sequential_seed: bool,
    /// Maximum number of steps per episode. `None` disables the limit.
    pub horizon: Option<u64>,

    // ===== Reward =====
    pub success_reward: f64,
    pub out_of_road_penalty: f64,
    pub crash_vehicle_penalty: f64,
    pub crash_object_penalty: f64,
    pub driving_reward: f64,
    pub use_lateral_reward: bool,

    // ===== Cost =====
    pub crash_vehicle_cost: f64,
    pub crash_object_cost: f64,
    pub out_of_road_cost: f64,

    // ===== Termination =====
    pub out_of_route_done: bool,
    pub crash_vehicle_done: bool,
    pub relax_out_of_road_done: bool,

    // ===== Coordinate system =====
    /// Convert logged positions to the simulation frame before comparing them.
    pub coordinate_transform: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            start_scenario_index: 0,
            num_scenario: 3,
            sequential_seed: false,
            horizon: Some(500),

            success_reward: 10.0,
            out_of_road_penalty: 10.0,
            crash_vehicle_penalty: 1.0,
            crash_object_penalty: 1.0,
            driving_reward: 1.0,
            use_lateral_reward: false,

            crash_vehicle_cost: 1.0,
            crash_object_cost: 1.0,
            out_of_road_cost: 1.0,

            out_of_route_done: false,
            crash_vehicle_done: false,
            relax_out_of_road_done: true,

            coordinate_transform: true,
        }
    }
}

impl EnvConfig {
    /// Returns the window of scenario indices this configuration may play.
    pub fn scenario_window(&self) -> Result<ScenarioWindow, ConfigError> {
        ScenarioWindow::new(self.start_scenario_index, self.num_scenario)
            .map_err(ConfigError::ScenarioWindow)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scenario_window()?;
        if self.horizon == Some(0) {
            return Err(ConfigError::ZeroHorizon);
        }
        Ok(())
    }
}
