//! # Localization estimate

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pose estimate of the vehicle.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LocalizationEstimate {
    pub header: Header,

    pub pose: Pose,
}

/// Pose of the vehicle body in the map frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Pose {
    /// Position of the vehicle reference point.
    ///
    /// Units: meters
    pub position: [f64; 3],

    /// Attitude of the body as a quaternion, in `[x, y, z, w]` order.
    pub orientation: [f64; 4],

    /// Heading of the vehicle, measured from the map X axis.
    ///
    /// Units: radians
    pub heading: f64,

    /// Velocity of the vehicle in the map frame.
    ///
    /// Units: meters/second
    pub linear_velocity: [f64; 3],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
            heading: 0.0,
            linear_velocity: [0.0; 3],
        }
    }
}
