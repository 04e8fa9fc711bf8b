//! # Control command
//!
//! The single output message of the control executable, published once per cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{GearPosition, Header, PadMessage};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Actuation command sent to the drive-by-wire interface.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ControlCommand {
    pub header: Header,

    /// Throttle actuator demand, output of the throttle controller.
    pub throttle: f64,

    /// Brake actuator demand, output of the brake controller.
    pub brake: f64,

    /// Steering motor rate demand, output of the steering controller.
    pub steering_rate: f64,

    /// Steering target as a percentage of full lock, as requested by the task agent.
    pub steering_target: f64,

    /// Target speed.
    ///
    /// Units: meters/second
    pub speed: f64,

    /// Requested longitudinal acceleration.
    ///
    /// Units: meters/second^2
    pub acceleration: f64,

    pub gear_location: GearPosition,

    pub latency_stats: LatencyStats,

    pub debug: ControlDebug,

    /// Pad message forwarded on the cycle it was received.
    pub pad_msg: Option<PadMessage>,
}

/// Timing of the cycle which produced the command.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct LatencyStats {
    /// Total time spent producing the command.
    ///
    /// Units: milliseconds
    pub total_time_ms: f64,

    /// True if the cycle took longer than the nominal control period.
    pub total_time_exceeded: bool,
}

/// Debug information attached to the command.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct ControlDebug {
    pub simple_lon_debug: SimpleLongitudinalDebug,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct SimpleLongitudinalDebug {
    /// Vehicle pitch including the configured offset.
    ///
    /// Units: degrees
    pub vehicle_pitch: f64,
}
