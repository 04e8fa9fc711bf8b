//! Control module parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{actuation, input_check, manual};
use comms_if::msg::DrivingAction;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the control module.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Nominal period of the control cycle, a cycle longer than this is flagged as exceeded.
    ///
    /// Units: seconds
    pub control_period_s: f64,

    /// Offset added to the reported vehicle pitch.
    ///
    /// Units: degrees
    pub pitch_offset_deg: f64,

    /// Pad action reported until the first pad message is received.
    pub default_driving_action: DrivingAction,

    /// Treat the chassis as always being in complete auto drive, for bench testing with a
    /// chassis which does not report its driving mode.
    pub force_auto_drive: bool,

    /// Number of latency records in each logged latency summary.
    pub latency_report_every: usize,

    pub input_check: input_check::Params,

    pub actuation: actuation::Params,

    pub auto_targets: AutoTargets,

    pub manual: manual::Params,

    pub joy: manual::JoyParams,
}

/// Pedal voltage targets of the autonomous path.
///
/// The targets are selected by the sign of the acceleration requested by the task agent.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct AutoTargets {
    /// Throttle target while accelerating.
    pub throttle_apply: f64,

    /// Throttle target otherwise.
    pub throttle_rest: f64,

    /// Brake target while decelerating.
    pub brake_apply: f64,

    /// Brake target otherwise.
    pub brake_rest: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            control_period_s: 0.01,
            pitch_offset_deg: 0.0,
            default_driving_action: DrivingAction::Stop,
            force_auto_drive: false,
            latency_report_every: 100,
            input_check: input_check::Params::default(),
            actuation: actuation::Params::default(),
            auto_targets: AutoTargets::default(),
            manual: manual::Params::default(),
            joy: manual::JoyParams::default(),
        }
    }
}

impl Default for AutoTargets {
    fn default() -> Self {
        Self {
            throttle_apply: 0.76,
            throttle_rest: 1.8,
            brake_apply: 0.8,
            brake_rest: 2.5,
        }
    }
}

impl AutoTargets {
    /// Throttle and brake targets for the requested acceleration.
    ///
    /// An emergency stop always selects braking.
    pub fn select(&self, acceleration: f64, estop: bool) -> (f64, f64) {
        let throttle = if !estop && acceleration > 0.0 {
            self.throttle_apply
        } else {
            self.throttle_rest
        };

        let brake = if estop || acceleration < 0.0 {
            self.brake_apply
        } else {
            self.brake_rest
        };

        (throttle, brake)
    }
}
