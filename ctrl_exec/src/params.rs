//! # Control Executable Parameters
//!
//! This module provide parameters for the control executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::local_view::PendingQueueSizes;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The main loop period is `control_period_s` of the control module parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CtrlExecParams {
    /// Minimum level of the log records, one of `info`, `debug` or `trace`.
    pub log_level: String,

    /// Path to the joystick input event device. If not given the manual override is unavailable.
    pub joy_device_path: Option<String>,

    /// Pending queue size of each input channel
    pub queue_sizes: PendingQueueSizes,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
