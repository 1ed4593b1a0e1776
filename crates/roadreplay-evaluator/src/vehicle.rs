use roadreplay_scenario::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier of a lane in the road network.
pub type LaneId = String;

pub const DEFAULT_AGENT_ID: &str = "default_agent";
pub const DEFAULT_VEHICLE_WIDTH: f64 = 1.852;
pub const DEFAULT_VEHICLE_LENGTH: f64 = 4.515;

/// Vehicle state after one simulation step, as reported by the simulator.
///
/// Crash and line flags describe contacts during the step that just finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleStateSnapshot {
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    pub position: Vec2,
    pub last_position: Vec2,
    /// Lane the vehicle is currently driving in, if the simulator located one.
    #[serde(default)]
    pub lane: Option<LaneId>,

    #[serde(default)]
    pub crash_vehicle: bool,
    #[serde(default)]
    pub crash_object: bool,
    #[serde(default)]
    pub crash_building: bool,
    #[serde(default)]
    pub crash_sidewalk: bool,
    #[serde(default)]
    pub on_yellow_continuous_line: bool,
    #[serde(default)]
    pub on_white_continuous_line: bool,

    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_length")]
    pub length: f64,
    /// Dynamics mode label, reported only by vehicles that support switching dynamics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamics_mode: Option<String>,
}

fn default_agent_id() -> String {
    DEFAULT_AGENT_ID.to_owned()
}

fn default_width() -> f64 {
    DEFAULT_VEHICLE_WIDTH
}

fn default_length() -> f64 {
    DEFAULT_VEHICLE_LENGTH
}

impl VehicleStateSnapshot {
    /// Creates a snapshot of the default agent with no contact flags set.
    #[must_use]
    pub fn new(position: Vec2, last_position: Vec2) -> Self {
        Self {
            agent_id: default_agent_id(),
            position,
            last_position,
            lane: None,
            crash_vehicle: false,
            crash_object: false,
            crash_building: false,
            crash_sidewalk: false,
            on_yellow_continuous_line: false,
            on_white_continuous_line: false,
            width: DEFAULT_VEHICLE_WIDTH,
            length: DEFAULT_VEHICLE_LENGTH,
            dynamics_mode: None,
        }
    }
}
