//! Utility library for the drive-by-wire control software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;
pub mod time;
