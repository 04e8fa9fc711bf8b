//! # Pad message

use serde::{Deserialize, Serialize};

use super::Header;

/// Operator request sent from the driving pad.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PadMessage {
    pub header: Header,
    pub action: DrivingAction,
}

/// Discrete driving actions the operator can request.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrivingAction {
    Stop,
    Start,
    Reset,
}

impl Default for DrivingAction {
    fn default() -> Self {
        DrivingAction::Stop
    }
}
