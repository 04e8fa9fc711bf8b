//! # Message header

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Header attached to every message.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Header {
    /// Time at which the message was published, seconds since the unix epoch.
    pub timestamp_sec: f64,

    /// Name of the module which published the message.
    pub module_name: String,

    /// Sequence number, incremented by the publisher for every message.
    pub sequence_num: u32,

    /// Timestamp of the lidar data the message was derived from, in nanoseconds.
    pub lidar_timestamp: Option<u64>,

    /// Timestamp of the camera data the message was derived from, in nanoseconds.
    pub camera_timestamp: Option<u64>,

    /// Timestamp of the radar data the message was derived from, in nanoseconds.
    pub radar_timestamp: Option<u64>,

    /// Processing status of the publisher.
    pub status: StatusPb,
}

/// Status of a module's processing as carried in a header.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StatusPb {
    pub error_code: ErrorCode,
    pub msg: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Error codes reported by the control module.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    Ok,

    /// The input snapshot was rejected, e.g. the trajectory was empty.
    ControlInputInvalid,

    /// One of the input streams has not been updated within its allowed period.
    ControlInputStale,

    /// The trajectory-to-target computation failed.
    ControlComputeError,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Ok
    }
}

impl Header {
    /// Stamp the header as published now by `module_name`.
    ///
    /// The sequence number is incremented by one (wrapping).
    pub fn fill(&mut self, module_name: &str, now_s: f64) {
        self.module_name = module_name.to_string();
        self.timestamp_sec = now_s;
        self.sequence_num = self.sequence_num.wrapping_add(1);
    }
}
