//! Tracking agent parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the tracking agent
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Time step between two computations.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Lateral controller proportional gain
    pub lat_k_p: f64,

    /// Lateral controller integral gain
    pub lat_k_i: f64,

    /// Lateral controller derivative gain
    pub lat_k_d: f64,

    /// Heading controller proportional gain
    pub head_k_p: f64,

    /// Heading controller integral gain
    pub head_k_i: f64,

    /// Heading controller derivative gain
    pub head_k_d: f64,

    /// Limit on the magnitude of the steering target.
    ///
    /// Units: percent of full lock
    pub steer_limit_pct: f64,

    /// Gain from the speed error to the requested acceleration.
    ///
    /// Units: 1/seconds
    pub speed_gain: f64,

    /// The limit on lateral error. Above this limit the computation fails.
    ///
    /// Units: meters
    pub lat_error_limit_m: f64,

    /// The limit on heading error. Above this limit the computation fails.
    ///
    /// Units: radians
    pub head_error_limit_rad: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            dt_s: 0.01,
            lat_k_p: 20.0,
            lat_k_i: 0.0,
            lat_k_d: 0.0,
            head_k_p: 60.0,
            head_k_i: 0.0,
            head_k_d: 0.0,
            steer_limit_pct: 100.0,
            speed_gain: 0.5,
            lat_error_limit_m: 2.0,
            head_error_limit_rad: 0.8,
        }
    }
}
