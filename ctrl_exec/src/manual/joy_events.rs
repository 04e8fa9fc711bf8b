//! # Joystick event mapping
//!
//! Applies one joystick event to the shared [`JoyState`]:
//!
//! - Throttle axis: inside the deadzone the throttle is released. Otherwise the operator is
//!   accelerating (which cancels decelerating) with a target of
//!   `throttle_base - (value - deadzone) / span`.
//! - Brake axis: as for the throttle, with `brake_base` and the roles swapped.
//! - Horizontal hat: `-1` steers left, `1` steers right, anything else is neutral.
//! - Vertical hat: `-1` increases the autonomous steering scale by one step, `1` decreases it.
//! - South button enables the override, east button disables it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, trace};

use super::{JoyParams, JoyState};
use comms_if::eqpt::joy::JoyEvent;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Apply a joystick event to the state.
pub fn apply_event(state: &JoyState, event: JoyEvent, params: &JoyParams) {
    trace!("Joystick event: {:?}", event);

    match event {
        JoyEvent::ThrottleAxis(value) => {
            if value <= params.axis_deadzone {
                state.set_accelerate(false);
                state.set_throttle_target(params.throttle_release);
            } else {
                state.set_accelerate(true);
                state.set_decelerate(false);
                state.set_throttle_target(axis_target(params.throttle_base, value, params));
            }
        }
        JoyEvent::BrakeAxis(value) => {
            if value <= params.axis_deadzone {
                state.set_decelerate(false);
                state.set_brake_target(params.brake_release);
            } else {
                state.set_decelerate(true);
                state.set_accelerate(false);
                state.set_brake_target(axis_target(params.brake_base, value, params));
            }
        }
        JoyEvent::HatX(-1) => state.set_steer(true, false),
        JoyEvent::HatX(1) => state.set_steer(false, true),
        JoyEvent::HatX(_) => state.set_steer(false, false),
        JoyEvent::HatY(-1) => {
            let scale = state.scale() + params.scale_step;
            state.set_scale(scale);
            info!("Autonomous steering scale increased to {:.02}", scale);
        }
        JoyEvent::HatY(1) => {
            let scale = state.scale() - params.scale_step;
            state.set_scale(scale);
            info!("Autonomous steering scale decreased to {:.02}", scale);
        }
        JoyEvent::HatY(_) => (),
        JoyEvent::EnableOverride => {
            if !state.override_enabled() {
                info!("Manual override enabled");
            }
            state.set_override_enabled(true);
        }
        JoyEvent::DisableOverride => {
            if state.override_enabled() {
                info!("Manual override disabled");
            }
            state.set_override_enabled(false);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Voltage target for a trigger position outside the deadzone.
///
/// The target falls by one volt over `axis_span` counts past the deadzone.
fn axis_target(base: f64, value: i32, params: &JoyParams) -> f64 {
    let deadzone = params.axis_deadzone as f64;

    util::maths::lin_map(
        (deadzone, deadzone + params.axis_span),
        (base, base - 1.0),
        value as f64,
    )
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_throttle_axis() {
        let params = JoyParams::default();
        let state = JoyState::new(&params);

        apply_event(&state, JoyEvent::BrakeAxis(100), &params);
        apply_event(&state, JoyEvent::ThrottleAxis(255), &params);

        let snap = state.snapshot();
        assert!(snap.accelerate);
        assert!(!snap.decelerate);
        assert!((snap.throttle_target - 0.65).abs() < 1e-12);

        apply_event(&state, JoyEvent::ThrottleAxis(15), &params);
        let snap = state.snapshot();
        assert!(!snap.accelerate);
        assert_eq!(snap.throttle_target, 2.0);
    }

    #[test]
    fn test_brake_axis() {
        let params = JoyParams::default();
        let state = JoyState::new(&params);

        apply_event(&state, JoyEvent::ThrottleAxis(100), &params);
        apply_event(&state, JoyEvent::BrakeAxis(135), &params);

        let snap = state.snapshot();
        assert!(snap.decelerate);
        assert!(!snap.accelerate);
        assert!((snap.brake_target - 1.3).abs() < 1e-12);

        apply_event(&state, JoyEvent::BrakeAxis(0), &params);
        let snap = state.snapshot();
        assert!(!snap.decelerate);
        assert_eq!(snap.brake_target, 2.5);
    }

    #[test]
    fn test_hats() {
        let params = JoyParams::default();
        let state = JoyState::new(&params);

        apply_event(&state, JoyEvent::HatX(-1), &params);
        assert!(state.snapshot().steer_left);
        apply_event(&state, JoyEvent::HatX(1), &params);
        let snap = state.snapshot();
        assert!(!snap.steer_left && snap.steer_right);
        apply_event(&state, JoyEvent::HatX(0), &params);
        let snap = state.snapshot();
        assert!(!snap.steer_left && !snap.steer_right);

        apply_event(&state, JoyEvent::HatY(-1), &params);
        apply_event(&state, JoyEvent::HatY(-1), &params);
        apply_event(&state, JoyEvent::HatY(0), &params);
        assert!((state.scale() - 1.02).abs() < 1e-12);
        apply_event(&state, JoyEvent::HatY(1), &params);
        assert!((state.scale() - 1.01).abs() < 1e-12);
    }

    #[test]
    fn test_override_buttons() {
        let params = JoyParams::default();
        let state = JoyState::new(&params);

        apply_event(&state, JoyEvent::EnableOverride, &params);
        assert!(state.override_enabled());
        apply_event(&state, JoyEvent::EnableOverride, &params);
        assert!(state.override_enabled());
        apply_event(&state, JoyEvent::DisableOverride, &params);
        assert!(!state.override_enabled());
    }
}
