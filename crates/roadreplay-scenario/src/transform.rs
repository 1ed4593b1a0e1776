use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Remap between the log's native frame and the simulation frame.
///
/// Logged scenarios use a frame whose lateral axis is mirrored relative to the
/// simulator, so positions read from a log are converted with `(x, y) -> (x, -y)`
/// before being compared with vehicle positions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateTransform {
    /// Log coordinates are already simulation coordinates.
    Identity,
    /// Mirror the lateral axis.
    #[default]
    MirrorLateral,
}

impl CoordinateTransform {
    /// Maps the `coordinate_transform` configuration switch to a transform.
    #[must_use]
    pub const fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::MirrorLateral
        } else {
            Self::Identity
        }
    }

    /// Converts a position from the log frame to the simulation frame.
    #[must_use]
    pub fn apply(self, position: Vec2) -> Vec2 {
        match self {
            Self::Identity => position,
            Self::MirrorLateral => Vec2::new(position.x, -position.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(CoordinateTransform::Identity.apply(p), p);
        assert_eq!(
            CoordinateTransform::MirrorLateral.apply(p),
            Vec2::new(3.0, -4.0)
        );
        assert_eq!(
            CoordinateTransform::from_enabled(false),
            CoordinateTransform::Identity
        );
        assert_eq!(
            CoordinateTransform::from_enabled(true),
            CoordinateTransform::MirrorLateral
        );
    }
}
