//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with equipment attached to the
//! control computer.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod joy;
