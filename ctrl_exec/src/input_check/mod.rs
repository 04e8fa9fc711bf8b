//! # Input check module
//!
//! Checks applied to a [`LocalView`] before an autonomous command is computed from it:
//!
//! - [`check_input`] rejects a trajectory with no points unless the planner is requesting an
//!   emergency stop, and snaps near-stationary trajectory points to exactly zero.
//! - [`check_timestamp`] rejects the snapshot if any of localization, chassis or trajectory (in
//!   that order) has not been updated within its allowed number of missed periods.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use serde::Serialize;

use crate::local_view::LocalView;
pub use params::Params;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Input streams subject to the staleness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stream {
    Localization,
    Chassis,
    Trajectory,
}

/// Reasons a snapshot is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Planning has no trajectory point (sequence {seq})")]
    EmptyTrajectory { seq: u32 },

    #[error("{stream:?} msg lost for {age_s:.06} s")]
    Timeout { stream: Stream, age_s: f64 },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Validate the trajectory of the snapshot and sanitize its near-stationary points.
pub fn check_input(view: &mut LocalView, params: &Params) -> Result<(), InputError> {
    let trajectory = &mut view.trajectory;

    if trajectory.trajectory_point.is_empty() && !trajectory.estop.is_estop {
        debug!("Planning has no trajectory point");
        return Err(InputError::EmptyTrajectory {
            seq: trajectory.header.sequence_num,
        });
    }

    for point in trajectory.trajectory_point.iter_mut() {
        if point.v.abs() < params.minimum_speed_resolution
            && point.a.abs() < params.max_acceleration_when_stopped
        {
            point.v = 0.0;
            point.a = 0.0;
        }
    }

    Ok(())
}

/// Check that no input stream of the snapshot is stale at `now_s`.
///
/// Always passes if the check is disabled in the parameters.
pub fn check_timestamp(view: &LocalView, now_s: f64, params: &Params) -> Result<(), InputError> {
    if !params.enable_input_timestamp_check {
        trace!("Skipping input timestamp check");
        return Ok(());
    }

    let streams = [
        (
            Stream::Localization,
            view.localization.header.timestamp_sec,
            params.max_localization_miss_num,
            params.localization_period_s,
        ),
        (
            Stream::Chassis,
            view.chassis.header.timestamp_sec,
            params.max_chassis_miss_num,
            params.chassis_period_s,
        ),
        (
            Stream::Trajectory,
            view.trajectory.header.timestamp_sec,
            params.max_planning_miss_num,
            params.trajectory_period_s,
        ),
    ];

    for (stream, timestamp_s, miss_num, period_s) in streams.iter() {
        let age_s = now_s - timestamp_s;

        if age_s > (*miss_num as f64) * period_s {
            debug!("{:?} msg lost for {:.06} s", stream, age_s);
            return Err(InputError::Timeout {
                stream: *stream,
                age_s,
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
