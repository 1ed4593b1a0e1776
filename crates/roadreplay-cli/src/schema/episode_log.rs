use roadreplay_evaluator::{
    ReferenceLane, TrajectoryNavigator, VehicleStateSnapshot, vehicle::LaneId,
};
use roadreplay_scenario::{Polyline, ScenarioRecord};
use serde::{Deserialize, Serialize};

/// Recorded rollout of one agent on one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeLog {
    /// Scenario the agent was placed in, including the expert tracks
    pub scenario: ScenarioRecord,
    /// Reference trajectory the agent is expected to follow
    pub trajectory: Polyline,
    /// Route for the out-of-road check (defaults to the trajectory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Polyline>,
    /// Lanes used for the dense reward (defaults to the trajectory)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_lanes: Vec<LaneRecord>,
    /// Vehicle state after each simulation step, in order
    pub snapshots: Vec<VehicleStateSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneRecord {
    pub id: LaneId,
    pub points: Polyline,
}

impl EpisodeLog {
    /// Splits the log into the scenario, the navigator and the snapshots.
    pub fn into_parts(self) -> (ScenarioRecord, TrajectoryNavigator, Vec<VehicleStateSnapshot>) {
        let Self {
            scenario,
            trajectory,
            route,
            reference_lanes,
            snapshots,
        } = self;

        let mut navigator = TrajectoryNavigator::new(Box::new(trajectory));
        if let Some(route) = route {
            navigator = navigator.with_route(Box::new(route));
        }
        let lanes = reference_lanes
            .into_iter()
            .map(|lane| ReferenceLane::new(lane.id, Box::new(lane.points)))
            .collect();
        (scenario, navigator.with_reference_lanes(lanes), snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_log() {
        let json = r#"{
            "scenario": {
                "metadata": { "sdc_id": "ego" },
                "tracks": {
                    "ego": { "state": { "position": [[0, 0], [5, 0]], "valid": [true, true] } }
                }
            },
            "trajectory": [[0, 0], [10, 0]],
            "reference_lanes": [{ "id": "lane-1", "points": [[0, 3], [10, 3]] }],
            "snapshots": [
                { "position": [5, 0], "last_position": [0, 0], "lane": "lane-1" }
            ]
        }"#;
        let log: EpisodeLog = serde_json::from_str(json).unwrap();
        assert!(log.route.is_none());
        assert_eq!(log.snapshots.len(), 1);
        log.scenario.validate().unwrap();

        let (scenario, navigator, snapshots) = log.into_parts();
        assert!(scenario.sdc_track().is_some());
        assert_eq!(navigator.reference_lanes().len(), 1);
        assert_eq!(navigator.route().length(), 10.0);
        assert_eq!(snapshots[0].lane.as_deref(), Some("lane-1"));
    }

    fn log_with_trajectory(trajectory: &str) -> String {
        format!(
            r#"{{
                "scenario": {{ "metadata": {{ "sdc_id": "ego" }}, "tracks": {{}} }},
                "trajectory": {trajectory},
                "snapshots": []
            }}"#
        )
    }

    #[test]
    fn test_rejects_degenerate_trajectory() {
        serde_json::from_str::<EpisodeLog>(&log_with_trajectory("[[1, 1], [4, 5]]")).unwrap();

        let err = serde_json::from_str::<EpisodeLog>(&log_with_trajectory("[[1, 1]]")).unwrap_err();
        assert!(err.to_string().contains("at least 2"), "{err}");

        let err = serde_json::from_str::<EpisodeLog>(&log_with_trajectory("[[1, 1], [1, 1]]"))
            .unwrap_err();
        assert!(err.to_string().contains("at least 2"), "{err}");
    }
}
