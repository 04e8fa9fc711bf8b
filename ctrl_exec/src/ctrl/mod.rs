//! # Control module
//!
//! Produces one [`ControlCommand`] per cycle. Every cycle one of three paths is taken:
//!
//! 1. **Zero fallback**, when the chassis is not in complete auto drive. An all-zero command in
//!    drive is produced and every controller, the task agent, the manual override engine and the
//!    buffered trajectory are reset.
//! 2. **Autonomous**, when in auto drive with the override disabled. The inputs are checked, the
//!    task agent computes the steering target and acceleration from the trajectory, and the
//!    actuator controllers are driven towards the resulting targets.
//! 3. **Manual override**, when in auto drive with the override enabled. The operator's joystick
//!    inputs drive the actuators through the manual override engine.
//!
//! Input and compute failures do not stop the cycle. The command is still produced, in an
//! emergency stop state, and the failure is reported in the header status.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::{input_check::InputError, task_agent::AgentError};
use comms_if::msg::ErrorCode;

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the module, used in the header of the produced commands.
pub const MODULE_NAME: &str = "control";

/// Pitch debug values below this are considered unset.
const PITCH_EPSILON: f64 = 1e-6;

/// Consecutive production failures are logged on the first and then every this many cycles.
const FAILURE_LOG_EVERY: u64 = 100;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which prevent a command from being produced at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CtrlError {
    #[error("Chassis msg is not ready")]
    ChassisNotReady,

    #[error("Localization msg is not ready")]
    LocalizationNotReady,
}

/// Errors of the autonomous path, reported in the command's header.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProduceError {
    #[error("Control input check failed: {0}")]
    Input(InputError),

    #[error("Task agent failed: {0}")]
    Compute(AgentError),
}

/// Path taken by a control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CtrlPath {
    ZeroFallback,
    Autonomous,
    ManualOverride,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProduceError {
    /// Code reported in the header status for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ProduceError::Input(InputError::EmptyTrajectory { .. }) => {
                ErrorCode::ControlInputInvalid
            }
            ProduceError::Input(InputError::Timeout { .. }) => ErrorCode::ControlInputStale,
            ProduceError::Compute(_) => ErrorCode::ControlComputeError,
        }
    }
}

impl From<InputError> for ProduceError {
    fn from(e: InputError) -> Self {
        ProduceError::Input(e)
    }
}

impl From<AgentError> for ProduceError {
    fn from(e: AgentError) -> Self {
        ProduceError::Compute(e)
    }
}
