//! # Manual override engine
//!
//! While the override is enabled the operator drives the vehicle directly and the task agent is
//! bypassed.
//!
//! Steering is incremental: on each cycle a direction is held the target becomes the *measured*
//! angle plus or minus a fixed increment, clamped into the allowed rotation. With no direction
//! held the target stays where it was. On the first cycle after the engine is reset the target is
//! set to the measured angle, so engaging the override never jerks the wheel.
//!
//! Throttle and brake are both driven every cycle. Whichever pedal the operator is not pressing is
//! held at its rest target.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use super::{JoySnapshot, Params};
use crate::actuation::{Actuators, Demands, Feedback};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The manual override engine.
#[derive(Debug, Clone)]
pub struct ManualCtrl {
    params: Params,

    /// Current steering wheel angle target
    steer_target: f64,

    /// True until the first cycle after construction or reset
    first_cycle: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ManualCtrl {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            steer_target: 0.0,
            first_cycle: true,
        }
    }

    /// Forget the steering target, the next cycle starts from the measured angle.
    pub fn reset(&mut self) {
        self.first_cycle = true;
    }

    /// Current steering wheel angle target.
    pub fn steer_target(&self) -> f64 {
        self.steer_target
    }

    /// Drive the actuators from the operator's inputs.
    pub fn compute(
        &mut self,
        joy: &JoySnapshot,
        feedback: &Feedback,
        actuators: &mut Actuators,
    ) -> Demands {
        if self.first_cycle {
            self.steer_target = feedback.steer_angle;
            self.first_cycle = false;
        }

        let direction = match (joy.steer_left, joy.steer_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };

        if direction != 0.0 {
            self.steer_target = actuators
                .clamp_steer_target(direction * self.params.steer_increment + feedback.steer_angle);
        }

        let (throttle_target, brake_target) = match (joy.accelerate, joy.decelerate) {
            (true, false) => (joy.throttle_target, self.params.brake_rest),
            (false, true) => (self.params.throttle_rest, joy.brake_target),
            _ => (self.params.throttle_rest, self.params.brake_rest),
        };

        trace!(
            "Manual targets: steer {:.03}, throttle {:.03}, brake {:.03}",
            self.steer_target,
            throttle_target,
            brake_target
        );

        actuators.drive(self.steer_target, throttle_target, brake_target, feedback)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
