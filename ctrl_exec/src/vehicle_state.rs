//! # Vehicle state
//!
//! Estimates the attitude and speed of the vehicle from the latest localization and chassis
//! messages. The control cycle only uses the pitch, which is reported in the command's debug data.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Quaternion, UnitQuaternion};

use comms_if::msg::{Chassis, LocalizationEstimate};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Provides the vehicle state to the control cycle.
pub trait VehicleStateProvider: Send {
    /// Update the estimate from new inputs.
    fn update(&mut self, localization: &LocalizationEstimate, chassis: &Chassis);

    /// Pitch of the vehicle, nose up positive.
    ///
    /// Units: radians
    fn pitch(&self) -> f64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Vehicle state derived directly from the localization pose.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseVehicleState {
    roll_rad: f64,
    pitch_rad: f64,
    yaw_rad: f64,
    speed_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseVehicleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roll(&self) -> f64 {
        self.roll_rad
    }

    pub fn yaw(&self) -> f64 {
        self.yaw_rad
    }

    pub fn speed(&self) -> f64 {
        self.speed_ms
    }
}

impl VehicleStateProvider for PoseVehicleState {
    fn update(&mut self, localization: &LocalizationEstimate, chassis: &Chassis) {
        let [x, y, z, w] = localization.pose.orientation;

        // A zero quaternion carries no attitude, keep the previous one
        let q = Quaternion::new(w, x, y, z);
        if q.norm() > f64::EPSILON {
            let (roll, pitch, yaw) = UnitQuaternion::from_quaternion(q).euler_angles();
            self.roll_rad = roll;
            self.pitch_rad = pitch;
            self.yaw_rad = yaw;
        }

        self.speed_ms = chassis.speed_mps;
    }

    fn pitch(&self) -> f64 {
        self.pitch_rad
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_pitch_from_pose() {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.1, 0.5);
        let mut loc = LocalizationEstimate::default();
        loc.pose.orientation = [q.i, q.j, q.k, q.w];
        let mut chassis = Chassis::default();
        chassis.speed_mps = 3.0;

        let mut state = PoseVehicleState::new();
        state.update(&loc, &chassis);

        assert!((state.pitch() - 0.1).abs() < 1e-9);
        assert!((state.yaw() - 0.5).abs() < 1e-9);
        assert!(state.roll().abs() < 1e-9);
        assert_eq!(state.speed(), 3.0);
    }

    #[test]
    fn test_identity_and_zero() {
        let mut state = PoseVehicleState::new();
        state.update(&LocalizationEstimate::default(), &Chassis::default());
        assert_eq!(state.pitch(), 0.0);

        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.2);
        let mut loc = LocalizationEstimate::default();
        loc.pose.orientation = [q.i, q.j, q.k, q.w];
        state.update(&loc, &Chassis::default());
        assert!((state.pitch() - 0.2).abs() < 1e-9);

        // Zero quaternion keeps the last attitude
        loc.pose.orientation = [0.0; 4];
        state.update(&loc, &Chassis::default());
        assert!((state.pitch() - 0.2).abs() < 1e-9);
    }
}
