//! Planar geometry: points, polylines, and path-relative coordinates.
//!
//! Every reference path consulted by the evaluator (the recorded trajectory, the
//! route, the individual lanes) is exposed through the [`ReferencePath`] trait. The
//! concrete [`Polyline`] implementation parameterizes an ordered list of waypoints
//! by arclength.
//!
//! # Local Coordinates
//!
//! ```text
//!            lateral > 0 (left)
//!                 ↑
//!   start ●───────┼────────● end      → direction of travel
//!                 ↓
//!            lateral < 0 (right)
//!   |<-- longitudinal -->|
//! ```
//!
//! The longitudinal coordinate is extrapolated past both ends: a point behind the
//! start has a negative longitudinal value, a point beyond the end has a value
//! larger than [`ReferencePath::length`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D point or vector in meters.
///
/// Serialized as a two-element array `[x, y]`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Mul,
    derive_more::Div,
)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for Vec2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for [f64; 2] {
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product; positive when `other` lies to the left of `self`.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A path parameterized by arclength.
///
/// Implementors are built outside the evaluator (one per episode) and are
/// immutable afterwards; the evaluator only queries them.
pub trait ReferencePath: fmt::Debug + Send + Sync {
    /// Projects `position` onto the path.
    ///
    /// # Returns
    ///
    /// `(longitudinal, lateral)`: the distance along the path from its start, and
    /// the signed perpendicular offset (positive to the left of the travel direction).
    fn local_coordinates(&self, position: Vec2) -> (f64, f64);

    /// Total arclength of the path. Always positive.
    fn length(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum PolylineError {
    #[display("polyline needs at least 2 distinct points, got {count}")]
    TooFewPoints { count: usize },
    #[display("polyline point #{index} is not finite")]
    NonFinitePoint { index: usize },
}

/// An ordered sequence of waypoints with cumulative arclength.
///
/// Consecutive duplicate points are dropped on construction, so every segment has
/// a positive length and the total length is positive.
///
/// # Example
///
/// ```
/// use roadreplay_scenario::{Polyline, ReferencePath as _, Vec2};
///
/// let line = Polyline::new(vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)]).unwrap();
/// assert_eq!(line.length(), 10.0);
/// assert_eq!(line.local_coordinates(Vec2::new(4.0, 2.0)), (4.0, 2.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec2>", into = "Vec<Vec2>")]
pub struct Polyline {
    points: Vec<Vec2>,
    cumulative_length: Vec<f64>,
}

impl TryFrom<Vec<Vec2>> for Polyline {
    type Error = PolylineError;

    fn try_from(points: Vec<Vec2>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Polyline> for Vec<Vec2> {
    fn from(polyline: Polyline) -> Self {
        polyline.points
    }
}

impl Polyline {
    pub fn new(points: Vec<Vec2>) -> Result<Self, PolylineError> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(PolylineError::NonFinitePoint { index });
        }

        let mut deduped: Vec<Vec2> = Vec::with_capacity(points.len());
        for point in points {
            if deduped.last().is_none_or(|last| *last != point) {
                deduped.push(point);
            }
        }
        if deduped.len() < 2 {
            return Err(PolylineError::TooFewPoints {
                count: deduped.len(),
            });
        }

        let mut cumulative_length = Vec::with_capacity(deduped.len());
        let mut total = 0.0;
        cumulative_length.push(total);
        for segment in deduped.windows(2) {
            total += segment[0].distance(segment[1]);
            cumulative_length.push(total);
        }

        Ok(Self {
            points: deduped,
            cumulative_length,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.points[0]
    }

    #[must_use]
    pub fn end(&self) -> Vec2 {
        self.points[self.points.len() - 1]
    }

    /// Returns the point at arclength `s`, clamped to the polyline.
    #[must_use]
    pub fn position_at(&self, s: f64) -> Vec2 {
        let s = s.clamp(0.0, self.length());
        let segment = self
            .cumulative_length
            .partition_point(|&c| c <= s)
            .saturating_sub(1)
            .min(self.points.len() - 2);
        let start = self.points[segment];
        let end = self.points[segment + 1];
        let segment_length = self.cumulative_length[segment + 1] - self.cumulative_length[segment];
        let t = (s - self.cumulative_length[segment]) / segment_length;
        start + (end - start) * t
    }
}

impl ReferencePath for Polyline {
    fn local_coordinates(&self, position: Vec2) -> (f64, f64) {
        let last_segment = self.points.len() - 2;
        // (squared distance, longitudinal, lateral)
        let mut best: Option<(f64, f64, f64)> = None;

        for (i, segment) in self.points.windows(2).enumerate() {
            let start = segment[0];
            let segment_length = self.cumulative_length[i + 1] - self.cumulative_length[i];
            let direction = (segment[1] - start) / segment_length;
            let offset = position - start;

            // The first and last segments extend to infinity so that points behind
            // the start or past the end still get a longitudinal coordinate.
            let mut t = offset.dot(direction);
            if i > 0 {
                t = t.max(0.0);
            }
            if i < last_segment {
                t = t.min(segment_length);
            }

            let foot = start + direction * t;
            let distance_squared = (position - foot).length_squared();
            if best.is_none_or(|(d, _, _)| distance_squared < d) {
                let lateral = distance_squared.sqrt().copysign(direction.cross(offset));
                best = Some((distance_squared, self.cumulative_length[i] + t, lateral));
            }
        }

        let (_, longitudinal, lateral) =
            best.expect("polyline always has at least one segment");
        (longitudinal, lateral)
    }

    fn length(&self) -> f64 {
        self.cumulative_length[self.cumulative_length.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polyline(points: &[[f64; 2]]) -> Polyline {
        Polyline::new(points.iter().copied().map(Vec2::from).collect()).unwrap()
    }

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_rejects_degenerate_polylines() {
        assert_eq!(
            Polyline::new(vec![]),
            Err(PolylineError::TooFewPoints { count: 0 })
        );
        assert_eq!(
            Polyline::new(vec![Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)]),
            Err(PolylineError::TooFewPoints { count: 1 })
        );
        assert_eq!(
            Polyline::new(vec![Vec2::ZERO, Vec2::new(f64::NAN, 0.0)]),
            Err(PolylineError::NonFinitePoint { index: 1 })
        );
    }

    #[test]
    fn test_length_is_cumulative() {
        let line = polyline(&[[0.0, 0.0], [3.0, 4.0], [3.0, 4.0], [3.0, 10.0]]);
        assert_eq!(line.points().len(), 3);
        assert!((line.length() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_straight_line_coordinates() {
        let line = polyline(&[[0.0, 0.0], [10.0, 0.0]]);
        assert_close(line.local_coordinates(Vec2::new(5.0, 1.5)), (5.0, 1.5));
        assert_close(line.local_coordinates(Vec2::new(5.0, -1.5)), (5.0, -1.5));
    }

    #[test]
    fn test_extrapolates_past_both_ends() {
        let line = polyline(&[[0.0, 0.0], [10.0, 0.0], [20.0, 0.0]]);
        assert_close(line.local_coordinates(Vec2::new(-3.0, 0.5)), (-3.0, 0.5));
        assert_close(line.local_coordinates(Vec2::new(25.0, -0.5)), (25.0, -0.5));
    }

    #[test]
    fn test_corner_coordinates() {
        // L-shaped path: east for 10m, then north for 10m
        let line = polyline(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
        assert_close(line.local_coordinates(Vec2::new(11.0, 5.0)), (15.0, -1.0));
        assert_close(line.local_coordinates(Vec2::new(9.0, 5.0)), (15.0, 1.0));
        assert_close(line.local_coordinates(Vec2::new(4.0, -2.0)), (4.0, -2.0));
    }

    #[test]
    fn test_position_at() {
        let line = polyline(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
        assert_eq!(line.position_at(5.0), Vec2::new(5.0, 0.0));
        assert_eq!(line.position_at(15.0), Vec2::new(10.0, 5.0));
        assert_eq!(line.position_at(-1.0), line.start());
        assert_eq!(line.position_at(100.0), line.end());
    }

    #[test]
    fn test_serde_as_point_array() {
        let line = polyline(&[[0.0, 0.0], [1.0, 2.0]]);
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, "[[0.0,0.0],[1.0,2.0]]");
        let parsed: Polyline = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, line);

        let result: Result<Polyline, _> = serde_json::from_str("[[0.0,0.0]]");
        assert!(result.unwrap_err().to_string().contains("at least 2"));
    }

    mod route_completion_property {
        use proptest::prelude::*;

        use super::*;

        fn zigzag() -> Polyline {
            polyline(&[[0.0, 0.0], [10.0, 0.0], [20.0, 5.0], [30.0, 5.0]])
        }

        fn ordered(a: f64, b: f64) -> (f64, f64) {
            if a <= b { (a, b) } else { (b, a) }
        }

        proptest! {
            /// A point on the path projects to its own arclength.
            #[test]
            fn prop_on_path_longitudinal_is_arclength(
                a in 0.0f64..1.0,
                b in 0.0f64..1.0,
            ) {
                let line = zigzag();
                let (lo, hi) = ordered(a, b);
                let s_lo = lo * line.length();
                let s_hi = hi * line.length();
                let (long_lo, lat_lo) = line.local_coordinates(line.position_at(s_lo));
                let (long_hi, lat_hi) = line.local_coordinates(line.position_at(s_hi));
                prop_assert!((long_lo - s_lo).abs() < 1e-9);
                prop_assert!((long_hi - s_hi).abs() < 1e-9);
                prop_assert!(lat_lo.abs() < 1e-9 && lat_hi.abs() < 1e-9);
                prop_assert!(long_lo <= long_hi + 1e-9);

                let completion = long_hi / line.length();
                prop_assert!((-1e-9..=1.0 + 1e-9).contains(&completion));
            }

            /// Off the path, the projection may snap across a corner, but only locally.
            #[test]
            fn prop_nudged_longitudinal_roughly_monotonic(
                a in 0.0f64..1.0,
                b in 0.0f64..1.0,
                lateral in -0.5f64..0.5,
            ) {
                let line = zigzag();
                let (lo, hi) = ordered(a, b);
                let nudge = Vec2::new(0.0, lateral);
                let p_lo = line.position_at(lo * line.length()) + nudge;
                let p_hi = line.position_at(hi * line.length()) + nudge;
                let (long_lo, _) = line.local_coordinates(p_lo);
                let (long_hi, _) = line.local_coordinates(p_hi);
                prop_assert!(long_lo <= long_hi + 1.0);
            }
        }
    }
}
