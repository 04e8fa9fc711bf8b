//! Manual override parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the manual override engine.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Increment applied to the measured steering angle while a direction is held.
    pub steer_increment: f64,

    /// Throttle voltage target when the operator is not accelerating.
    pub throttle_rest: f64,

    /// Brake voltage target when the operator is not braking.
    pub brake_rest: f64,
}

/// Mapping of the joystick events onto override targets.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct JoyParams {
    /// Trigger axis values at or below this are treated as released.
    pub axis_deadzone: i32,

    /// Range of trigger axis values beyond the deadzone, maps onto one volt of target.
    pub axis_span: f64,

    /// Throttle voltage target at the edge of the deadzone.
    pub throttle_base: f64,

    /// Brake voltage target at the edge of the deadzone.
    pub brake_base: f64,

    /// Throttle voltage target when the throttle trigger is released.
    pub throttle_release: f64,

    /// Brake voltage target when the brake trigger is released.
    pub brake_release: f64,

    /// Change of the autonomous steering scale per press of the vertical hat.
    pub scale_step: f64,

    /// Autonomous steering scale at start-up.
    pub initial_scale: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            steer_increment: 18.0,
            throttle_rest: 2.0,
            brake_rest: 2.5,
        }
    }
}

impl Default for JoyParams {
    fn default() -> Self {
        Self {
            axis_deadzone: 15,
            axis_span: 240.0,
            throttle_base: 1.65,
            brake_base: 1.8,
            throttle_release: 2.0,
            brake_release: 2.5,
            scale_step: 0.01,
            initial_scale: 1.0,
        }
    }
}
