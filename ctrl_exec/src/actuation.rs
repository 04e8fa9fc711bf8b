//! # Actuation
//!
//! The three actuated quantities of the vehicle, each driven by its own [`PidControl`]:
//!
//! - Steering: the error is the target wheel angle minus the measured angle, and the output is a
//!   steering rate demand.
//! - Throttle and brake: the pedals are emulated with voltages, the error is the target voltage
//!   minus the measured voltage scaled by a fixed gain, and the output is the pedal demand.
//!
//! Both the autonomous path and the manual override drive the vehicle through [`Actuators`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use crate::pid::{ActuatorKind, PidControl, PidParams};
use comms_if::msg::Chassis;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Actuation parameters.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Time step passed to every controller computation.
    ///
    /// Units: seconds
    pub pid_dt_s: f64,

    /// Maximum magnitude of the steering wheel angle target.
    pub max_steer_rotation: f64,

    /// Deadband of the steering controller.
    pub steer_deadband: f64,

    /// Deadband of the throttle and brake controllers.
    pub pedal_deadband: f64,

    /// Gain applied to the pedal voltage error before it is passed to the controller.
    pub pedal_error_gain: f64,

    pub steer_pid: PidParams,
    pub throttle_pid: PidParams,
    pub brake_pid: PidParams,
}

/// Measured state of the actuators, read from the chassis report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Feedback {
    /// Steering wheel angle
    pub steer_angle: f64,

    /// Throttle voltage-equivalent
    pub throttle: f64,

    /// Brake voltage-equivalent
    pub brake: f64,
}

/// Outputs of the actuator controllers for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Demands {
    /// The (clamped) steering wheel angle target the steering controller was driven towards.
    pub steer_target: f64,

    pub steering_rate: f64,
    pub throttle: f64,
    pub brake: f64,
}

/// The steering, throttle and brake controllers.
#[derive(Debug, Clone)]
pub struct Actuators {
    params: Params,
    steer: PidControl,
    throttle: PidControl,
    brake: PidControl,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            pid_dt_s: 0.01,
            max_steer_rotation: 720.0,
            steer_deadband: 2.0,
            pedal_deadband: 0.5,
            pedal_error_gain: 10.0,
            steer_pid: PidParams {
                k_p: 0.86,
                k_i: 0.14,
                k_d: 0.02,
                integrator_limit: 10.0,
                output_limit: 50.0,
                actuator: ActuatorKind::Steering,
            },
            throttle_pid: PidParams {
                k_p: 4.0,
                k_i: 1.45,
                k_d: 0.0,
                integrator_limit: 10.0,
                output_limit: 65.0,
                actuator: ActuatorKind::Propulsion,
            },
            brake_pid: PidParams {
                k_p: 19.75,
                k_i: 0.25,
                k_d: 0.0,
                integrator_limit: 10.0,
                output_limit: 80.0,
                actuator: ActuatorKind::Propulsion,
            },
        }
    }
}

impl Feedback {
    pub fn from_chassis(chassis: &Chassis) -> Self {
        Self {
            steer_angle: chassis.steering_percentage,
            throttle: chassis.throttle_percentage,
            brake: chassis.brake_percentage,
        }
    }
}

impl Actuators {
    pub fn new(params: Params) -> Self {
        Self {
            steer: PidControl::new(&params.steer_pid),
            throttle: PidControl::new(&params.throttle_pid),
            brake: PidControl::new(&params.brake_pid),
            params,
        }
    }

    /// Reset all three controllers.
    pub fn reset(&mut self) {
        self.steer.reset();
        self.throttle.reset();
        self.brake.reset();
    }

    /// Clamp a steering wheel angle target into the allowed rotation.
    pub fn clamp_steer_target(&self, target: f64) -> f64 {
        util::maths::clamp_sym(target, self.params.max_steer_rotation)
    }

    /// Drive the steering wheel towards the target angle, returning the steering rate demand.
    pub fn drive_steering(&mut self, target: f64, feedback: &Feedback) -> f64 {
        let error = target - feedback.steer_angle;
        let output = self
            .steer
            .compute(error, self.params.pid_dt_s, self.params.steer_deadband);

        trace!(
            "Steering: target {:.03}, current {:.03}, error {:.03}, output {:.03}",
            target,
            feedback.steer_angle,
            error,
            output
        );

        output
    }

    /// Drive the throttle towards the target voltage, returning the throttle demand.
    pub fn drive_throttle(&mut self, target: f64, feedback: &Feedback) -> f64 {
        let error = (target - feedback.throttle) * self.params.pedal_error_gain;
        let output = self
            .throttle
            .compute(error, self.params.pid_dt_s, self.params.pedal_deadband);

        trace!(
            "Throttle: target {:.03}, current {:.03}, error {:.03}, output {:.03}",
            target,
            feedback.throttle,
            error,
            output
        );

        output
    }

    /// Drive the brake towards the target voltage, returning the brake demand.
    pub fn drive_brake(&mut self, target: f64, feedback: &Feedback) -> f64 {
        let error = (target - feedback.brake) * self.params.pedal_error_gain;
        let output = self
            .brake
            .compute(error, self.params.pid_dt_s, self.params.pedal_deadband);

        trace!(
            "Brake: target {:.03}, current {:.03}, error {:.03}, output {:.03}",
            target,
            feedback.brake,
            error,
            output
        );

        output
    }

    /// Drive all three actuators towards their targets.
    ///
    /// The steering target is clamped into the allowed rotation before use.
    pub fn drive(
        &mut self,
        steer_target: f64,
        throttle_target: f64,
        brake_target: f64,
        feedback: &Feedback,
    ) -> Demands {
        let steer_target = self.clamp_steer_target(steer_target);

        Demands {
            steer_target,
            steering_rate: self.drive_steering(steer_target, feedback),
            brake: self.drive_brake(brake_target, feedback),
            throttle: self.drive_throttle(throttle_target, feedback),
        }
    }

    pub fn steer(&self) -> &PidControl {
        &self.steer
    }

    pub fn throttle(&self) -> &PidControl {
        &self.throttle
    }

    pub fn brake(&self) -> &PidControl {
        &self.brake
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn params() -> Params {
        Params::default()
    }

    #[test]
    fn test_drive() {
        let mut act = Actuators::new(params());
        let feedback = Feedback {
            steer_angle: 10.0,
            throttle: 1.8,
            brake: 2.5,
        };

        let dems = act.drive(15.0, 1.8, 0.8, &feedback);

        assert_eq!(dems.steer_target, 15.0);
        assert!((dems.steering_rate - 4.307).abs() < 1e-9);

        // Throttle already at target
        assert_eq!(dems.throttle, 0.0);

        // Brake error of -17 saturates at the brake limit
        assert_eq!(dems.brake, -80.0);
    }

    #[test]
    fn test_steer_target_clamped() {
        let mut act = Actuators::new(params());
        let dems = act.drive(-1000.0, 1.8, 2.5, &Feedback::default());
        assert_eq!(dems.steer_target, -720.0);
        assert_eq!(dems.steering_rate, -50.0);

        act.reset();
        assert_eq!(act.steer().prev_output(), 0.0);
        assert_eq!(act.throttle().prev_output(), 0.0);
        assert_eq!(act.brake().prev_output(), 0.0);
    }
}
