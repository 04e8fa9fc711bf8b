//! # Manual override module
//!
//! The operator can take over the vehicle with a handheld joystick. A background thread reads
//! the joystick ([`JoyDevice`]) and keeps a [`JoyState`] up to date, which the control cycle
//! reads to decide whether the override is enabled and, if it is, to drive the vehicle through
//! the [`ManualCtrl`] engine.
//!
//! The joystick also tunes the autonomous path: the vertical hat changes the scale applied to the
//! autonomous steering target.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod device;
mod joy_events;
mod joy_state;
mod override_ctrl;
mod params;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use device::*;
pub use joy_events::apply_event;
pub use joy_state::*;
pub use override_ctrl::*;
pub use params::*;
