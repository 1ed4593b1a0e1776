//! Trajectory-relative navigation.
//!
//! The navigator knows three kinds of reference paths for one episode:
//!
//! - the **reference trajectory**: the recorded path the agent is expected to
//!   follow; progress and route completion are measured along it
//! - the **route**: the path used for the out-of-road lateral check. It defaults to
//!   the reference trajectory. Measuring the lateral offset against the route rather
//!   than the current lane keeps multi-lane roads from triggering out-of-road
//! - the **reference lanes**: the lanes the agent is currently expected to drive in,
//!   used for the dense progress reward
//!
//! Each step, [`TrajectoryNavigator::sample`] projects the vehicle position once
//! and returns a [`NavigationSample`] that every evaluator of that step reads.

use std::fmt;

use roadreplay_scenario::{ReferencePath, Vec2};
use serde::{Deserialize, Serialize};

use crate::vehicle::LaneId;

/// Projects `position` onto `trajectory`, see [`ReferencePath::local_coordinates`].
#[must_use]
pub fn local_coordinates(trajectory: &dyn ReferencePath, position: Vec2) -> (f64, f64) {
    trajectory.local_coordinates(position)
}

/// Projection of one vehicle position, computed once per step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationSample {
    /// Distance along the reference trajectory. Negative behind its start, larger
    /// than `track_length` past its end.
    pub longitudinal: f64,
    /// Signed offset from the reference trajectory.
    pub lateral: f64,
    pub track_length: f64,
    /// `longitudinal / track_length`.
    pub route_completion: f64,
    /// Signed offset from the route, read by the out-of-road check.
    pub route_lateral: f64,
}

/// A lane the agent is expected to drive in.
pub struct ReferenceLane {
    pub id: LaneId,
    pub path: Box<dyn ReferencePath>,
}

impl fmt::Debug for ReferenceLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceLane")
            .field("id", &self.id)
            .field("length", &self.path.length())
            .finish()
    }
}

impl ReferenceLane {
    #[must_use]
    pub fn new(id: impl Into<LaneId>, path: Box<dyn ReferencePath>) -> Self {
        Self {
            id: id.into(),
            path,
        }
    }
}

#[derive(Debug)]
pub struct TrajectoryNavigator {
    trajectory: Box<dyn ReferencePath>,
    route: Option<Box<dyn ReferencePath>>,
    reference_lanes: Vec<ReferenceLane>,
}

impl TrajectoryNavigator {
    /// Creates a navigator whose route and single reference lane are the trajectory itself.
    #[must_use]
    pub fn new(trajectory: Box<dyn ReferencePath>) -> Self {
        Self {
            trajectory,
            route: None,
            reference_lanes: Vec::new(),
        }
    }

    /// Uses `route` instead of the trajectory for the out-of-road lateral check.
    #[must_use]
    pub fn with_route(mut self, route: Box<dyn ReferencePath>) -> Self {
        self.route = Some(route);
        self
    }

    /// Sets the reference lanes for the dense reward.
    ///
    /// The first lane is the fallback for vehicles outside every reference lane.
    #[must_use]
    pub fn with_reference_lanes(mut self, lanes: Vec<ReferenceLane>) -> Self {
        self.reference_lanes = lanes;
        self
    }

    #[must_use]
    pub fn trajectory(&self) -> &dyn ReferencePath {
        self.trajectory.as_ref()
    }

    #[must_use]
    pub fn route(&self) -> &dyn ReferencePath {
        self.route.as_deref().unwrap_or(self.trajectory.as_ref())
    }

    #[must_use]
    pub fn reference_lanes(&self) -> &[ReferenceLane] {
        &self.reference_lanes
    }

    /// Returns the lane used for the dense reward.
    ///
    /// This is `lane` when it is one of the reference lanes, otherwise the first
    /// reference lane. Without reference lanes the trajectory is used.
    #[must_use]
    pub fn current_lane(&self, lane: Option<&str>) -> &dyn ReferencePath {
        let matching = lane.and_then(|id| self.reference_lanes.iter().find(|l| l.id == id));
        match matching.or(self.reference_lanes.first()) {
            Some(lane) => lane.path.as_ref(),
            None => self.trajectory.as_ref(),
        }
    }

    /// Projects `position` onto the trajectory and the route.
    #[must_use]
    pub fn sample(&self, position: Vec2) -> NavigationSample {
        let (longitudinal, lateral) = local_coordinates(self.trajectory(), position);
        let track_length = self.trajectory.length();
        let (_, route_lateral) = local_coordinates(self.route(), position);
        NavigationSample {
            longitudinal,
            lateral,
            track_length,
            route_completion: longitudinal / track_length,
            route_lateral,
        }
    }
}
