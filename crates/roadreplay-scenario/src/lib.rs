//! Recorded-scenario data for the replay evaluator.
//!
//! This crate holds everything the evaluator reads but never mutates during an
//! episode:
//!
//! - [`geometry`] - 2D points, polylines, and the [`ReferencePath`] trait used to
//!   project positions onto trajectories, routes and lanes
//! - [`ScenarioRecord`] - logged tracks (positions + validity masks) of one scenario
//! - [`CoordinateTransform`] - remap from the log frame to the simulation frame
//! - [`ExpertStateMatcher`] - resolves the logged expert position for a step
//! - [`ScenarioSelector`] - chooses which scenario the next episode plays
//!
//! # Example
//!
//! ```
//! use roadreplay_scenario::{
//!     CoordinateTransform, ExpertStateMatcher, ScenarioRecord, ScenarioSelector, ScenarioWindow,
//! };
//!
//! let window = ScenarioWindow::new(0, 3).unwrap();
//! let mut selector = ScenarioSelector::new(window, true);
//! let seed = selector.select(None, None).unwrap();
//! assert_eq!(seed, 0);
//!
//! let record = ScenarioRecord::default();
//! let matcher = ExpertStateMatcher::new(CoordinateTransform::Identity);
//! assert!(matcher.match_step(&record, "sdc", 0).is_none());
//! ```

pub use self::{expert::*, geometry::*, record::*, selector::*, transform::*};

pub mod expert;
pub mod geometry;
mod record;
mod selector;
mod transform;
