//! # Control library.
//!
//! This library allows other crates in the workspace, and the integration tests, to access items
//! defined inside the control crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuation - the steering, throttle and brake controllers
pub mod actuation;

/// Bus client - receives the input messages from the upstream publisher
pub mod bus_client;

/// Command server - publishes the produced control commands
pub mod cmd_server;

/// Control module - selects the control path and produces one command per cycle
pub mod ctrl;

/// Input checks - validity and staleness of the inputs of the autonomous path
pub mod input_check;

/// Latency recorder - periodic summaries of the cycle latency
pub mod latency;

/// Local view - the latest copy of each input stream
pub mod local_view;

/// Manual override - joystick reading and the manual override engine
pub mod manual;

/// Executable parameters
pub mod params;

/// PID controller with the actuator saturation policies
pub mod pid;

/// Task agent - computes the autonomous targets from the trajectory
pub mod task_agent;

/// Vehicle state - attitude estimate used for the pitch report
pub mod vehicle_state;
