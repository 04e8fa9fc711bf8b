//! # PID controller module
//!
//! A single feedback controller used for every actuated quantity of the vehicle: the steering
//! wheel angle and the throttle and brake pedal voltages.
//!
//! Each cycle the caller passes the error, the time step and a deadband. The controller:
//!
//! 1. Returns the previous output unchanged if the time step is not positive.
//! 2. Computes the derivative of the error, which is zero on the first sample after
//!    initialisation or reset.
//! 3. Accumulates `error * dt * k_i` into the integral and clamps it into the integrator limit.
//! 4. Sums the three terms and applies the [`SaturationPolicy`] chosen at construction.
//! 5. Forces the output to zero if the error is inside the deadband.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::Serialize;

pub use params::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller with integrator clamping and output saturation.
#[derive(Debug, Serialize, Clone)]
pub struct PidControl {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    /// Limit on the integral accumulation
    integrator_limit: f64,

    /// Saturation applied to the output
    saturation: SaturationPolicy,

    /// The integral accumulation, already multiplied by `k_i`
    integral: f64,

    /// Error passed in on the previous computation
    prev_error: f64,

    /// Output of the previous computation
    prev_output: f64,

    /// True until the first computation after `init` or `reset`
    first_hit: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidControl {
    /// Create a new controller from the given parameters.
    pub fn new(params: &PidParams) -> Self {
        Self {
            k_p: params.k_p,
            k_i: params.k_i,
            k_d: params.k_d,
            integrator_limit: params.integrator_limit,
            saturation: params.saturation(),
            integral: 0.0,
            prev_error: 0.0,
            prev_output: 0.0,
            first_hit: true,
        }
    }

    /// Replace the gains and limits of the controller and reset its state.
    pub fn init(&mut self, params: &PidParams) {
        *self = Self::new(params);
    }

    /// Clear the integral and the error/output history.
    ///
    /// The next computation behaves as the first one after `init`.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.prev_output = 0.0;
        self.first_hit = true;
    }

    /// Compute the controller output for the given error.
    ///
    /// # Inputs
    /// - `error`: setpoint minus measurement, in the units of the controlled quantity
    /// - `dt`: time since the previous computation, seconds
    /// - `deadband`: errors with a magnitude at or below this value produce a zero output
    pub fn compute(&mut self, error: f64, dt: f64, deadband: f64) -> f64 {
        if dt <= 0.0 {
            warn!(
                "PID computation with non-positive dt ({}), reusing previous output {}",
                dt, self.prev_output
            );
            return self.prev_output;
        }

        let diff = if self.first_hit {
            self.first_hit = false;
            0.0
        } else {
            (error - self.prev_error) / dt
        };

        // Anti-windup
        self.integral = util::maths::clamp_sym(
            self.integral + error * dt * self.k_i,
            self.integrator_limit,
        );

        let mut output = self.saturation.apply(error * self.k_p + self.integral + diff * self.k_d);

        if error.abs() <= deadband {
            self.prev_error = 0.0;
            output = 0.0;
        } else {
            self.prev_error = error;
        }

        self.prev_output = output;

        output
    }

    /// Current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Error stored by the last computation.
    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }

    /// Output of the last computation.
    pub fn prev_output(&self) -> f64 {
        self.prev_output
    }

    /// Saturation policy of the controller.
    pub fn saturation(&self) -> SaturationPolicy {
        self.saturation
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
