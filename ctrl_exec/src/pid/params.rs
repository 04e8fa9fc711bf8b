//! PID controller parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a single PID controller.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PidParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Limit on the magnitude of the integral accumulation
    pub integrator_limit: f64,

    /// Limit on the magnitude of the output
    pub output_limit: f64,

    /// The kind of actuator driven by the controller, which selects the saturation policy.
    pub actuator: ActuatorKind,
}

/// Saturation applied to the raw controller output.
///
/// Any nonzero output smaller in magnitude than `snap_threshold` is pushed out to
/// `±snap_threshold` so that the actuator overcomes its own deadband, then the output is clamped
/// into `±output_limit`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct SaturationPolicy {
    pub snap_threshold: f64,
    pub output_limit: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Actuators driven by a PID controller.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorKind {
    /// The steering motor.
    Steering,

    /// Throttle or brake pedal emulation.
    Propulsion,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ActuatorKind {
    /// Minimum nonzero output magnitude for this kind of actuator.
    pub fn snap_threshold(&self) -> f64 {
        match self {
            ActuatorKind::Steering => 1.0,
            ActuatorKind::Propulsion => 27.0,
        }
    }
}

impl SaturationPolicy {
    /// Policy for the steering motor.
    pub fn steering(output_limit: f64) -> Self {
        Self {
            snap_threshold: ActuatorKind::Steering.snap_threshold(),
            output_limit,
        }
    }

    /// Policy for the throttle and brake actuators.
    pub fn propulsion(output_limit: f64) -> Self {
        Self {
            snap_threshold: ActuatorKind::Propulsion.snap_threshold(),
            output_limit,
        }
    }

    /// Apply the policy to a raw output.
    pub fn apply(&self, raw: f64) -> f64 {
        util::maths::clamp_sym(
            util::maths::snap_from_zero(raw, self.snap_threshold),
            self.output_limit,
        )
    }
}

impl PidParams {
    /// Saturation policy selected by these parameters.
    pub fn saturation(&self) -> SaturationPolicy {
        match self.actuator {
            ActuatorKind::Steering => SaturationPolicy::steering(self.output_limit),
            ActuatorKind::Propulsion => SaturationPolicy::propulsion(self.output_limit),
        }
    }
}
