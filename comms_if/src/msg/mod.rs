//! # Message definitions
//!
//! All messages consumed or produced by the control executable. Every message carries a
//! [`Header`] so that staleness can be judged against the time it was stamped.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod chassis;
pub mod cmd_status;
pub mod control_cmd;
pub mod header;
pub mod localization;
pub mod pad;
pub mod planning;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use chassis::*;
pub use cmd_status::*;
pub use control_cmd::*;
pub use header::*;
pub use localization::*;
pub use pad::*;
pub use planning::*;
