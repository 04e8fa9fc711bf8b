//! # Joystick equipment interface
//!
//! The operator's handheld device is read through the Linux input subsystem. Every record read
//! from the device file is a `struct input_event`:
//!
//! ```text
//! struct input_event {
//!     struct timeval time;    // 16 bytes on 64 bit targets
//!     __u16 type;
//!     __u16 code;
//!     __s32 value;
//! };
//! ```
//!
//! Records are in the host's native byte order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Size of one `input_event` record.
pub const INPUT_EVENT_SIZE: usize = 24;

/// Key or button event type.
pub const EV_KEY: u16 = 0x01;

/// Absolute axis event type.
pub const EV_ABS: u16 = 0x03;

/// Left trigger axis, mapped to the brake.
pub const ABS_Z: u16 = 0x02;

/// Right trigger axis, mapped to the throttle.
pub const ABS_RZ: u16 = 0x05;

/// Horizontal direction pad.
pub const ABS_HAT0X: u16 = 0x10;

/// Vertical direction pad.
pub const ABS_HAT0Y: u16 = 0x11;

/// South face button (A on most pads), enables the manual override.
pub const BTN_SOUTH: u16 = 0x130;

/// East face button (B on most pads), disables the manual override.
pub const BTN_EAST: u16 = 0x131;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A raw event record as read from an input device file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEvent {
    /// Seconds part of the kernel timestamp.
    pub time_sec: i64,

    /// Microseconds part of the kernel timestamp.
    pub time_usec: i64,

    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Events of the handheld device that the control module reacts to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoyEvent {
    /// Throttle trigger position, raw axis value.
    ThrottleAxis(i32),

    /// Brake trigger position, raw axis value.
    BrakeAxis(i32),

    /// Horizontal hat, `-1` for left, `1` for right and `0` for neutral.
    HatX(i32),

    /// Vertical hat, `-1` for up, `1` for down and `0` for neutral.
    HatY(i32),

    /// Override enable button pressed.
    EnableOverride,

    /// Override disable button pressed.
    DisableOverride,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputEvent {
    /// Read one event record from the given reader.
    ///
    /// Blocks until a complete record is available, or returns an `UnexpectedEof` error if the
    /// reader ends part way through a record.
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let time_sec = reader.read_i64::<NativeEndian>()?;
        let time_usec = reader.read_i64::<NativeEndian>()?;
        let event_type = reader.read_u16::<NativeEndian>()?;
        let code = reader.read_u16::<NativeEndian>()?;
        let value = reader.read_i32::<NativeEndian>()?;

        Ok(Self {
            time_sec,
            time_usec,
            event_type,
            code,
            value,
        })
    }

    /// Write this event as a raw record, the inverse of [`InputEvent::read_from`].
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i64::<NativeEndian>(self.time_sec)?;
        writer.write_i64::<NativeEndian>(self.time_usec)?;
        writer.write_u16::<NativeEndian>(self.event_type)?;
        writer.write_u16::<NativeEndian>(self.code)?;
        writer.write_i32::<NativeEndian>(self.value)?;

        Ok(())
    }

    /// Build an absolute axis event with a zero timestamp.
    pub fn abs(code: u16, value: i32) -> Self {
        Self {
            event_type: EV_ABS,
            code,
            value,
            ..Default::default()
        }
    }

    /// Build a key event with a zero timestamp.
    pub fn key(code: u16, value: i32) -> Self {
        Self {
            event_type: EV_KEY,
            code,
            value,
            ..Default::default()
        }
    }

    /// Interpret the raw record, returning `None` for events the control module ignores.
    ///
    /// Button releases (value `0`) and auto-repeats are ignored, only presses are reported.
    pub fn to_joy_event(&self) -> Option<JoyEvent> {
        match (self.event_type, self.code) {
            (EV_ABS, ABS_RZ) => Some(JoyEvent::ThrottleAxis(self.value)),
            (EV_ABS, ABS_Z) => Some(JoyEvent::BrakeAxis(self.value)),
            (EV_ABS, ABS_HAT0X) => Some(JoyEvent::HatX(self.value)),
            (EV_ABS, ABS_HAT0Y) => Some(JoyEvent::HatY(self.value)),
            (EV_KEY, BTN_SOUTH) if self.value == 1 => Some(JoyEvent::EnableOverride),
            (EV_KEY, BTN_EAST) if self.value == 1 => Some(JoyEvent::DisableOverride),
            _ => None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
