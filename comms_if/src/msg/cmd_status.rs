//! # Planning command status

use serde::{Deserialize, Serialize};

use super::Header;

/// Status of the command currently being executed by the planner.
///
/// The control module caches this message but does not act on it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CommandStatus {
    pub header: Header,
    pub command_id: u64,
    pub status: CommandStatusType,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandStatusType {
    Running,
    Finished,
    Error,
}

impl Default for CommandStatusType {
    fn default() -> Self {
        CommandStatusType::Running
    }
}
