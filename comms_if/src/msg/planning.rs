//! # Planning trajectory

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{GearPosition, Header};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Trajectory published by the planner.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AdcTrajectory {
    pub header: Header,

    /// Ordered trajectory samples, the first is the closest to the current time.
    pub trajectory_point: Vec<TrajectoryPoint>,

    /// Geometric path the trajectory was built on.
    pub path_point: Vec<PathPoint>,

    pub estop: EStop,

    /// True if the planner replanned from scratch for this trajectory.
    pub is_replan: bool,

    /// Gear the planner expects the trajectory to be driven in.
    pub gear: GearPosition,
}

/// A planned pose/speed/acceleration sample.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct TrajectoryPoint {
    pub path_point: PathPoint,

    /// Speed at this point.
    ///
    /// Units: meters/second
    pub v: f64,

    /// Acceleration at this point.
    ///
    /// Units: meters/second^2
    pub a: f64,

    /// Time of this point relative to the trajectory header timestamp.
    ///
    /// Units: seconds
    pub relative_time: f64,
}

/// A point of the geometric path, in the map frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// Heading of the path at this point.
    ///
    /// Units: radians
    pub theta: f64,

    /// Curvature of the path at this point.
    ///
    /// Units: 1/meters
    pub kappa: f64,

    /// Distance along the path.
    ///
    /// Units: meters
    pub s: f64,
}

/// Emergency stop request from the planner.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EStop {
    pub is_estop: bool,
    pub reason: String,
}
