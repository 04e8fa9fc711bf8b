//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the control software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions exchanged over the bus
pub mod msg;

/// In-process observe-latest channels
pub mod bus;

/// Equipment interfaces (input devices)
pub mod eqpt;

/// Network module
pub mod net;
