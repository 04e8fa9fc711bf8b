//! # Joystick state
//!
//! State written by the joystick reader thread and read by the control cycle. Every field is an
//! independent atomic, so neither side ever waits for the other. Fields are read one at a time,
//! which means a snapshot may mix values from before and after a concurrent event.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::JoyParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Operator override state shared between the joystick reader and the control cycle.
#[derive(Debug)]
pub struct JoyState {
    throttle_target: AtomicF64,
    brake_target: AtomicF64,
    steer_left: AtomicBool,
    steer_right: AtomicBool,
    scale: AtomicF64,
    override_enabled: AtomicBool,
    accelerate: AtomicBool,
    decelerate: AtomicBool,
}

/// A copy of the joystick state read at one point of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JoySnapshot {
    /// Throttle voltage target requested by the throttle trigger
    pub throttle_target: f64,

    /// Brake voltage target requested by the brake trigger
    pub brake_target: f64,

    pub steer_left: bool,
    pub steer_right: bool,

    /// Scale factor applied to the autonomous steering target
    pub scale: f64,

    pub override_enabled: bool,

    /// The throttle trigger is pressed beyond its deadzone
    pub accelerate: bool,

    /// The brake trigger is pressed beyond its deadzone
    pub decelerate: bool,
}

/// An `f64` stored as its bit pattern.
#[derive(Debug)]
struct AtomicF64(AtomicU64);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JoyState {
    /// Create the state with released triggers and override disabled.
    pub fn new(params: &JoyParams) -> Self {
        Self {
            throttle_target: AtomicF64::new(params.throttle_release),
            brake_target: AtomicF64::new(params.brake_release),
            steer_left: AtomicBool::new(false),
            steer_right: AtomicBool::new(false),
            scale: AtomicF64::new(params.initial_scale),
            override_enabled: AtomicBool::new(false),
            accelerate: AtomicBool::new(false),
            decelerate: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> JoySnapshot {
        JoySnapshot {
            throttle_target: self.throttle_target.load(),
            brake_target: self.brake_target.load(),
            steer_left: self.steer_left.load(Ordering::Relaxed),
            steer_right: self.steer_right.load(Ordering::Relaxed),
            scale: self.scale.load(),
            override_enabled: self.override_enabled.load(Ordering::Relaxed),
            accelerate: self.accelerate.load(Ordering::Relaxed),
            decelerate: self.decelerate.load(Ordering::Relaxed),
        }
    }

    pub fn override_enabled(&self) -> bool {
        self.override_enabled.load(Ordering::Relaxed)
    }

    pub fn scale(&self) -> f64 {
        self.scale.load()
    }

    pub fn set_throttle_target(&self, target: f64) {
        self.throttle_target.store(target)
    }

    pub fn set_brake_target(&self, target: f64) {
        self.brake_target.store(target)
    }

    pub fn set_steer(&self, left: bool, right: bool) {
        self.steer_left.store(left, Ordering::Relaxed);
        self.steer_right.store(right, Ordering::Relaxed);
    }

    pub fn set_scale(&self, scale: f64) {
        self.scale.store(scale)
    }

    pub fn set_override_enabled(&self, enabled: bool) {
        self.override_enabled.store(enabled, Ordering::Relaxed)
    }

    pub fn set_accelerate(&self, accelerate: bool) {
        self.accelerate.store(accelerate, Ordering::Relaxed)
    }

    pub fn set_decelerate(&self, decelerate: bool) {
        self.decelerate.store(decelerate, Ordering::Relaxed)
    }

    /// Release every input and disable the override, keeping the steering scale.
    pub fn release_all(&self, params: &JoyParams) {
        self.set_override_enabled(false);
        self.set_steer(false, false);
        self.set_accelerate(false);
        self.set_decelerate(false);
        self.set_throttle_target(params.throttle_release);
        self.set_brake_target(params.brake_release);
    }
}

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = JoyState::new(&JoyParams::default());
        let snap = state.snapshot();

        assert_eq!(snap.throttle_target, 2.0);
        assert_eq!(snap.brake_target, 2.5);
        assert_eq!(snap.scale, 1.0);
        assert!(!snap.override_enabled);
        assert!(!snap.accelerate && !snap.decelerate);
        assert!(!snap.steer_left && !snap.steer_right);
    }

    #[test]
    fn test_release_all() {
        let params = JoyParams::default();
        let state = JoyState::new(&params);

        state.set_override_enabled(true);
        state.set_steer(true, false);
        state.set_accelerate(true);
        state.set_throttle_target(1.2);
        state.set_scale(0.9);

        state.release_all(&params);

        let snap = state.snapshot();
        assert!(!snap.override_enabled);
        assert!(!snap.steer_left);
        assert!(!snap.accelerate);
        assert_eq!(snap.throttle_target, 2.0);
        assert_eq!(snap.scale, 0.9);
    }
}
