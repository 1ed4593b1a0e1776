use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Identifier of a logged object track within a scenario.
pub type TrackId = String;

/// Time-indexed logged states of one object.
///
/// `position[t]` is only trustworthy when `valid[t]` is `true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    pub position: Vec<Vec2>,
    pub valid: Vec<bool>,
}

impl TrackState {
    #[must_use]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Returns whether the state at `index` is valid. Out-of-range indices are invalid.
    #[must_use]
    pub fn is_valid(&self, index: usize) -> bool {
        self.valid.get(index).copied().unwrap_or(false)
    }

    /// Returns the largest index whose state is valid, if any.
    #[must_use]
    pub fn last_valid_index(&self) -> Option<usize> {
        self.valid.iter().rposition(|valid| *valid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub state: TrackState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    /// Track id of the self-driving car (the ego vehicle).
    pub sdc_id: TrackId,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ScenarioError {
    #[display("track {track_id} has {positions} positions but {valid} validity flags")]
    MaskLengthMismatch {
        track_id: TrackId,
        positions: usize,
        valid: usize,
    },
}

/// One recorded driving scenario.
///
/// Read-only for the duration of an episode.
///
/// # Example
///
/// ```
/// use roadreplay_scenario::ScenarioRecord;
///
/// let json = r#"{
///     "id": "demo",
///     "metadata": { "sdc_id": "ego" },
///     "tracks": {
///         "ego": { "state": { "position": [[0.0, 0.0], [1.0, 0.0]], "valid": [true, true] } }
///     }
/// }"#;
/// let record: ScenarioRecord = serde_json::from_str(json).unwrap();
/// record.validate().unwrap();
/// assert_eq!(record.sdc_track().unwrap().state.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    #[serde(default)]
    pub id: String,
    pub metadata: ScenarioMetadata,
    pub tracks: BTreeMap<TrackId, Track>,
}

impl ScenarioRecord {
    /// Checks that every track has one validity flag per position.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (track_id, track) in &self.tracks {
            let state = &track.state;
            if state.position.len() != state.valid.len() {
                return Err(ScenarioError::MaskLengthMismatch {
                    track_id: track_id.clone(),
                    positions: state.position.len(),
                    valid: state.valid.len(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.get(track_id)
    }

    #[must_use]
    pub fn sdc_track(&self) -> Option<&Track> {
        self.track(&self.metadata.sdc_id)
    }
}
