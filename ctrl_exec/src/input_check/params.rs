//! Input check parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the input checks.
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// If false the staleness checks are skipped.
    pub enable_input_timestamp_check: bool,

    /// Trajectory points slower than this are considered stopped.
    ///
    /// Units: meters/second
    pub minimum_speed_resolution: f64,

    /// Trajectory points with less acceleration than this are considered stopped.
    ///
    /// Units: meters/second^2
    pub max_acceleration_when_stopped: f64,

    /// Number of localization periods which may be missed before localization is stale.
    pub max_localization_miss_num: u32,

    /// Nominal period of the localization stream.
    ///
    /// Units: seconds
    pub localization_period_s: f64,

    /// Number of chassis periods which may be missed before the chassis is stale.
    pub max_chassis_miss_num: u32,

    /// Nominal period of the chassis stream.
    ///
    /// Units: seconds
    pub chassis_period_s: f64,

    /// Number of trajectory periods which may be missed before the trajectory is stale.
    pub max_planning_miss_num: u32,

    /// Nominal period of the trajectory stream.
    ///
    /// Units: seconds
    pub trajectory_period_s: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            enable_input_timestamp_check: true,
            minimum_speed_resolution: 0.2,
            max_acceleration_when_stopped: 0.01,
            max_localization_miss_num: 20,
            localization_period_s: 0.01,
            max_chassis_miss_num: 20,
            chassis_period_s: 0.01,
            max_planning_miss_num: 20,
            trajectory_period_s: 0.1,
        }
    }
}
