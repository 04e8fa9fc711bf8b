//! # Chassis report

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Actuator feedback reported by the vehicle.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Chassis {
    pub header: Header,

    /// Which party is in control of the vehicle.
    pub driving_mode: DrivingMode,

    pub gear_location: GearPosition,

    /// Measured throttle actuator value.
    ///
    /// For the pedal emulator this is the voltage-equivalent read back from the throttle line.
    pub throttle_percentage: f64,

    /// Measured brake actuator value, voltage-equivalent as for the throttle.
    pub brake_percentage: f64,

    /// Measured steering wheel angle.
    pub steering_percentage: f64,

    /// Vehicle speed.
    ///
    /// Units: meters/second
    pub speed_mps: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Driving mode of the vehicle.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrivingMode {
    CompleteManual,
    CompleteAutoDrive,
    AutoSteerOnly,
    AutoSpeedOnly,
    EmergencyMode,
}

/// Gear selector position.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GearPosition {
    Neutral,
    Drive,
    Reverse,
    Parking,
    Low,
    Invalid,
    None,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DrivingMode {
    fn default() -> Self {
        DrivingMode::CompleteManual
    }
}

impl Default for GearPosition {
    fn default() -> Self {
        GearPosition::None
    }
}

impl DrivingMode {
    /// True only when the vehicle has handed both steering and speed over to automation.
    pub fn is_auto(&self) -> bool {
        matches!(self, DrivingMode::CompleteAutoDrive)
    }
}
