//! # Task agent module
//!
//! The task agent turns the planned trajectory into the autonomous targets of a cycle: a
//! steering target (percent of full lock), a requested acceleration, a target speed and a gear.
//! The control module only depends on the [`TaskAgent`] trait, [`TrackingAgent`] is the agent
//! shipped with the executable.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod tracking;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::{AdcTrajectory, Chassis, ControlCommand, LocalizationEstimate};

pub use params::Params;
pub use tracking::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Computes the autonomous targets from a trajectory.
pub trait TaskAgent: Send {
    /// Fill the steering target, acceleration, speed and gear of `cmd`.
    fn compute_control_command(
        &mut self,
        localization: &LocalizationEstimate,
        chassis: &Chassis,
        trajectory: &AdcTrajectory,
        cmd: &mut ControlCommand,
    ) -> Result<(), AgentError>;

    /// Clear any state accumulated over previous computations.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors reported by a task agent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    #[error("The trajectory contains no points")]
    NoTrajectoryPoints,

    #[error("Lateral error of {error_m:.03} m exceeds the limit of {limit_m:.03} m")]
    LateralErrorLimit { error_m: f64, limit_m: f64 },

    #[error("Heading error of {error_rad:.03} rad exceeds the limit of {limit_rad:.03} rad")]
    HeadingErrorLimit { error_rad: f64, limit_rad: f64 },
}
