//! Lookup of logged expert states.
//!
//! The expert is the vehicle that was actually recorded driving the scenario.
//! Comparing the agent's position with the expert's at the same step gives the
//! divergence metrics used for offline evaluation.
//!
//! # Index Resolution
//!
//! Logged tracks have gaps (frames where the object was occluded or not tracked),
//! marked by the validity mask. For a query step `t` the matcher resolves:
//!
//! ```text
//! last_valid = max { i | valid[i] }
//! index      = min(t, last_valid)
//! while !valid[index] && index > 0:
//!     index -= 1
//! ```
//!
//! Index 0 is returned even when it is itself invalid. Existing evaluation logs
//! were produced with this behavior, so it is kept as is.

use tracing::debug;

use crate::{CoordinateTransform, ScenarioRecord, TrackState, Vec2};

/// Agent ids that refer to the scenario's self-driving car.
pub const SDC_AGENT_IDS: [&str; 2] = ["sdc", "default_agent"];

/// Maps an agent id to the track id it replays.
///
/// The ego agent ids in [`SDC_AGENT_IDS`] resolve to the record's SDC track;
/// every other agent id is the track id itself.
#[must_use]
pub fn resolve_track_id<'a>(record: &'a ScenarioRecord, agent_id: &'a str) -> &'a str {
    if SDC_AGENT_IDS.contains(&agent_id) {
        &record.metadata.sdc_id
    } else {
        agent_id
    }
}

/// Expert positions resolved for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpertMatch {
    /// Resolved index into the track's state sequence.
    pub index: usize,
    /// Expert position at [`Self::index`], in the simulation frame.
    pub position: Vec2,
    /// Expert position at the last valid index, in the simulation frame.
    pub final_position: Vec2,
}

/// Resolves logged expert positions under validity masks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpertStateMatcher {
    transform: CoordinateTransform,
}

impl ExpertStateMatcher {
    #[must_use]
    pub const fn new(transform: CoordinateTransform) -> Self {
        Self { transform }
    }

    /// Resolves the expert state of `track_id` at `step`.
    ///
    /// # Returns
    ///
    /// `None` when the track is missing from the record or has no states. This is a
    /// missing-data case, not an error: callers omit their diagnostics.
    #[must_use]
    pub fn lookup(
        &self,
        record: &ScenarioRecord,
        track_id: &str,
        step: usize,
    ) -> Option<ExpertMatch> {
        let state = &record.track(track_id)?.state;
        let last_valid = last_valid_index(state)?;
        let index = resolve_index(state, step)?;
        Some(ExpertMatch {
            index,
            position: self.transform.apply(*state.position.get(index)?),
            final_position: self.transform.apply(*state.position.get(last_valid)?),
        })
    }

    /// Returns the expert position of `track_id` at `step`, see [`Self::lookup`].
    #[must_use]
    pub fn match_step(&self, record: &ScenarioRecord, track_id: &str, step: usize) -> Option<Vec2> {
        self.lookup(record, track_id, step).map(|m| m.position)
    }

    /// Returns the expert position of `track_id` at its last valid index.
    #[must_use]
    pub fn final_position(&self, record: &ScenarioRecord, track_id: &str) -> Option<Vec2> {
        let state = &record.track(track_id)?.state;
        let last_valid = last_valid_index(state)?;
        state
            .position
            .get(last_valid)
            .map(|p| self.transform.apply(*p))
    }
}

/// Largest valid index; a track with no valid state at all degrades to index 0.
fn last_valid_index(state: &TrackState) -> Option<usize> {
    if state.is_empty() {
        return None;
    }
    Some(state.last_valid_index().unwrap_or(0))
}

/// Resolves the state index used for `step`, see the module documentation.
#[must_use]
pub fn resolve_index(state: &TrackState, step: usize) -> Option<usize> {
    let last_valid = last_valid_index(state)?;
    let mut index = step.min(last_valid);
    while !state.is_valid(index) && index > 0 {
        index -= 1;
    }
    if !state.is_valid(index) {
        debug!(step, "no valid expert state at or before step, using index 0");
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScenarioMetadata, Track};

    fn state(valid: &[u8]) -> TrackState {
        TrackState {
            position: (0..valid.len())
                .map(|i| Vec2::new(i as f64, 10.0 * i as f64))
                .collect(),
            valid: valid.iter().map(|v| *v != 0).collect(),
        }
    }

    fn record(valid: &[u8]) -> ScenarioRecord {
        let mut record = ScenarioRecord {
            id: "test".to_owned(),
            metadata: ScenarioMetadata {
                sdc_id: "ego".to_owned(),
            },
            ..Default::default()
        };
        record.tracks.insert(
            "ego".to_owned(),
            Track {
                state: state(valid),
            },
        );
        record
    }

    #[test]
    fn test_query_past_last_valid_clamps() {
        // last_valid = 1, query 3 clamps to 1 which is valid
        assert_eq!(resolve_index(&state(&[1, 1, 0, 0]), 3), Some(1));
    }

    #[test]
    fn test_walks_back_over_gaps() {
        let s = state(&[1, 0, 0, 1, 1]);
        assert_eq!(resolve_index(&s, 2), Some(0));
        assert_eq!(resolve_index(&s, 3), Some(3));
        let s = state(&[1, 1, 0, 1]);
        assert_eq!(resolve_index(&s, 2), Some(1));
    }

    #[test]
    fn test_invalid_index_zero_is_used() {
        assert_eq!(resolve_index(&state(&[0, 0, 1]), 1), Some(0));
        assert_eq!(resolve_index(&state(&[0, 0, 0]), 2), Some(0));
    }

    #[test]
    fn test_empty_state_resolves_nothing() {
        assert_eq!(resolve_index(&TrackState::default(), 0), None);
    }

    #[test]
    fn test_lookup_applies_transform() {
        let record = record(&[1, 1, 0, 0]);

        let raw = ExpertStateMatcher::new(CoordinateTransform::Identity);
        let m = raw.lookup(&record, "ego", 3).unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.position, Vec2::new(1.0, 10.0));
        assert_eq!(m.final_position, Vec2::new(1.0, 10.0));

        let mirrored = ExpertStateMatcher::new(CoordinateTransform::MirrorLateral);
        assert_eq!(
            mirrored.match_step(&record, "ego", 0),
            Some(Vec2::new(0.0, -0.0))
        );
        assert_eq!(
            mirrored.final_position(&record, "ego"),
            Some(Vec2::new(1.0, -10.0))
        );
    }

    #[test]
    fn test_missing_track_is_not_an_error() {
        let matcher = ExpertStateMatcher::default();
        let mut record = record(&[1]);
        assert_eq!(matcher.lookup(&record, "other", 0), None);

        record.tracks.insert("empty".to_owned(), Track::default());
        assert_eq!(matcher.lookup(&record, "empty", 0), None);
        assert_eq!(matcher.final_position(&record, "empty"), None);
    }

    #[test]
    fn test_resolve_track_id() {
        let record = record(&[1]);
        assert_eq!(resolve_track_id(&record, "sdc"), "ego");
        assert_eq!(resolve_track_id(&record, "default_agent"), "ego");
        assert_eq!(resolve_track_id(&record, "42"), "42");
    }
}
