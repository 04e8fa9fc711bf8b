//! Implementations for the CtrlComponent state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::{sync::Arc, time::Instant};

// Internal
use super::{
    CtrlError, CtrlPath, Params, ProduceError, FAILURE_LOG_EVERY, MODULE_NAME, PITCH_EPSILON,
};
use crate::{
    actuation::{Actuators, Demands, Feedback},
    input_check,
    latency::LatencyRecorder,
    local_view::{InputReaders, LocalView, LocalViewStore, NotReady},
    manual::{JoySnapshot, JoyState, ManualCtrl},
    task_agent::TaskAgent,
    vehicle_state::VehicleStateProvider,
};
use comms_if::msg::{ControlCommand, DrivingMode, ErrorCode, GearPosition};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Control module state
pub struct CtrlComponent {
    params: Params,

    readers: InputReaders,
    store: LocalViewStore,

    agent: Box<dyn TaskAgent>,
    vehicle_state: Box<dyn VehicleStateProvider>,

    joy: Arc<JoyState>,
    manual: ManualCtrl,

    actuators: Actuators,

    latency: LatencyRecorder,

    /// Path taken on the previous cycle, `None` before the first cycle
    last_path: Option<CtrlPath>,

    /// Command produced on the previous cycle
    prev_cmd: ControlCommand,

    num_consec_failures: u64,
}

/// Data required to initialise the control module.
pub struct InitData {
    pub params: Params,

    /// Reading ends of the input channels
    pub readers: InputReaders,

    pub agent: Box<dyn TaskAgent>,

    pub vehicle_state: Box<dyn VehicleStateProvider>,

    /// Joystick state, shared with the joystick reader
    pub joy: Arc<JoyState>,
}

/// Input data to the control module.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Time at the start of the cycle, seconds since the unix epoch
    pub now_s: f64,
}

/// Status report for control processing.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub path: CtrlPath,

    /// True if the path changed this cycle
    pub path_changed: bool,

    /// Reason for the emergency stop, if one was requested this cycle
    pub estop_reason: Option<String>,

    pub error_code: ErrorCode,

    /// Demands of the actuator controllers, zero on the zero fallback path
    pub demands: Demands,

    pub joy: JoySnapshot,

    pub total_time_ms: f64,
    pub total_time_exceeded: bool,
}

/// Outcome of the path taken by a cycle.
struct PathOutcome {
    status: Result<(), ProduceError>,
    estop_reason: Option<String>,
    demands: Demands,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Invalid control parameter: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for CtrlComponent {
    type InitData = InitData;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = ControlCommand;
    type StatusReport = StatusReport;
    type ProcError = CtrlError;

    /// Initialise the control module.
    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        let params = init_data.params;

        if !(params.control_period_s > 0.0) {
            return Err(InitError::InvalidParams(format!(
                "control_period_s must be positive, found {}",
                params.control_period_s
            )));
        }
        if !(params.actuation.pid_dt_s > 0.0) {
            return Err(InitError::InvalidParams(format!(
                "actuation.pid_dt_s must be positive, found {}",
                params.actuation.pid_dt_s
            )));
        }
        if !(params.actuation.max_steer_rotation >= 0.0) {
            return Err(InitError::InvalidParams(format!(
                "actuation.max_steer_rotation must not be negative, found {}",
                params.actuation.max_steer_rotation
            )));
        }

        Ok(Self {
            store: LocalViewStore::new(params.default_driving_action),
            readers: init_data.readers,
            agent: init_data.agent,
            vehicle_state: init_data.vehicle_state,
            joy: init_data.joy,
            manual: ManualCtrl::new(params.manual.clone()),
            actuators: Actuators::new(params.actuation.clone()),
            latency: LatencyRecorder::new(MODULE_NAME, params.latency_report_every),
            last_path: None,
            prev_cmd: ControlCommand::default(),
            num_consec_failures: 0,
            params,
        })
    }

    /// Perform cyclic processing of the control module.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let start_instant = Instant::now();

        // ---- INPUTS ----

        let pad_received = self.store.observe(&self.readers);

        let mut view = self.store.snapshot().map_err(|e| {
            debug!("Cannot produce a command, {} msg is not ready", e);
            match e {
                NotReady::Chassis => CtrlError::ChassisNotReady,
                NotReady::Localization => CtrlError::LocalizationNotReady,
            }
        })?;

        if self.params.force_auto_drive {
            view.chassis.driving_mode = DrivingMode::CompleteAutoDrive;
        }

        let joy = self.joy.snapshot();

        // ---- PATH SELECTION ----

        let path = if !view.chassis.driving_mode.is_auto() {
            CtrlPath::ZeroFallback
        } else if joy.override_enabled {
            CtrlPath::ManualOverride
        } else {
            CtrlPath::Autonomous
        };

        let path_changed = self.last_path != Some(path);
        if path_changed {
            info!("Control path changed from {:?} to {:?}", self.last_path, path);

            self.actuators.reset();
            if path == CtrlPath::ManualOverride {
                self.manual.reset();
            }
        }

        // ---- COMMAND PRODUCTION ----

        let mut cmd = ControlCommand::default();

        let outcome = match path {
            CtrlPath::ZeroFallback => {
                self.reset_and_produce_zero(&mut cmd);
                PathOutcome {
                    status: Ok(()),
                    estop_reason: None,
                    demands: Demands::default(),
                }
            }
            CtrlPath::Autonomous => {
                self.produce_autonomous(&mut view, input_data.now_s, &joy, &mut cmd)
            }
            CtrlPath::ManualOverride => {
                let demands = self.manual.compute(
                    &joy,
                    &Feedback::from_chassis(&view.chassis),
                    &mut self.actuators,
                );
                apply_demands(&mut cmd, &demands);
                cmd.gear_location = view.chassis.gear_location;

                PathOutcome {
                    status: Ok(()),
                    estop_reason: None,
                    demands,
                }
            }
        };

        match outcome.status {
            Err(ref e) => {
                self.num_consec_failures += 1;
                if self.num_consec_failures % FAILURE_LOG_EVERY == 1 {
                    warn!(
                        "Failed to produce control command ({} consecutive): {}",
                        self.num_consec_failures, e
                    );
                }
            }
            Ok(()) if self.num_consec_failures > 0 => {
                info!(
                    "Control command produced after {} consecutive failures",
                    self.num_consec_failures
                );
                self.num_consec_failures = 0;
            }
            Ok(()) => (),
        }

        // ---- HEADER ----

        if pad_received {
            cmd.pad_msg = Some(view.pad_msg.clone());
        }

        let error_code = match outcome.status {
            Ok(()) => ErrorCode::Ok,
            Err(ref e) => e.error_code(),
        };
        cmd.header.status.error_code = error_code;
        cmd.header.status.msg = match (&outcome.estop_reason, &outcome.status) {
            (Some(reason), _) => reason.clone(),
            (None, Err(e)) => e.to_string(),
            (None, Ok(())) => String::new(),
        };

        cmd.header.lidar_timestamp = view.trajectory.header.lidar_timestamp;
        cmd.header.camera_timestamp = view.trajectory.header.camera_timestamp;
        cmd.header.radar_timestamp = view.trajectory.header.radar_timestamp;

        cmd.header.sequence_num = self.prev_cmd.header.sequence_num;
        cmd.header.fill(MODULE_NAME, input_data.now_s);

        // ---- PITCH ----

        if cmd.debug.simple_lon_debug.vehicle_pitch.abs() < PITCH_EPSILON {
            self.vehicle_state.update(&view.localization, &view.chassis);
            cmd.debug.simple_lon_debug.vehicle_pitch =
                self.vehicle_state.pitch().to_degrees() + self.params.pitch_offset_deg;
        }

        // ---- LATENCY ----

        let elapsed_s = start_instant.elapsed().as_secs_f64();
        let total_time_ms = elapsed_s * 1e3;
        let total_time_exceeded = total_time_ms > self.params.control_period_s * 1e3;

        cmd.latency_stats.total_time_ms = total_time_ms;
        cmd.latency_stats.total_time_exceeded = total_time_exceeded;

        if total_time_exceeded {
            warn!(
                "Control cycle took {:.03} ms, longer than the {:.03} ms period",
                total_time_ms,
                self.params.control_period_s * 1e3
            );
        } else {
            trace!("Control cycle took {:.03} ms", total_time_ms);
        }

        if let Some(lidar_ts) = view.trajectory.header.lidar_timestamp {
            self.latency
                .append(lidar_ts, input_data.now_s, input_data.now_s + elapsed_s);
        }

        // ---- OUTPUT ----

        self.prev_cmd = cmd.clone();
        self.last_path = Some(path);

        let report = StatusReport {
            path,
            path_changed,
            estop_reason: outcome.estop_reason,
            error_code,
            demands: outcome.demands,
            joy,
            total_time_ms,
            total_time_exceeded,
        };

        Ok((cmd, report))
    }
}

impl CtrlComponent {
    /// Command produced on the previous cycle.
    pub fn prev_cmd(&self) -> &ControlCommand {
        &self.prev_cmd
    }

    /// Path taken on the previous cycle.
    pub fn last_path(&self) -> Option<CtrlPath> {
        self.last_path
    }

    /// The actuator controllers.
    pub fn actuators(&self) -> &Actuators {
        &self.actuators
    }

    /// The manual override engine.
    pub fn manual(&self) -> &ManualCtrl {
        &self.manual
    }

    /// Sequence number of the buffered trajectory.
    pub fn buffered_trajectory_seq(&self) -> Option<u32> {
        self.store.latest_trajectory_seq()
    }

    /// Produce the all-stop command and reset everything carrying state between cycles.
    fn reset_and_produce_zero(&mut self, cmd: &mut ControlCommand) {
        cmd.throttle = 0.0;
        cmd.steering_target = 0.0;
        cmd.steering_rate = 0.0;
        cmd.speed = 0.0;
        cmd.brake = 0.0;
        cmd.gear_location = GearPosition::Drive;

        self.actuators.reset();
        self.agent.reset();
        self.manual.reset();

        self.store.clear_trajectory();
        self.readers.trajectory.clear_data();

        trace!("Produced zero control command");
    }

    /// Run the input checks and the task agent, then drive the actuators towards the resulting
    /// targets.
    fn produce_autonomous(
        &mut self,
        view: &mut LocalView,
        now_s: f64,
        joy: &JoySnapshot,
        cmd: &mut ControlCommand,
    ) -> PathOutcome {
        let mut estop_reason = None;

        let status = self.check_and_compute(view, now_s, cmd, &mut estop_reason);

        // The agent produced nothing usable, hold the wheel where the last command left it
        if let Err(ref e) = status {
            estop_reason = Some(e.to_string());
            cmd.steering_target = self.prev_cmd.steering_target;
            cmd.gear_location = GearPosition::Drive;
        }

        let estop = estop_reason.is_some();
        if estop {
            debug!("Emergency stop: {:?}", estop_reason);
        }

        let steer_target = -cmd.steering_target * joy.scale;
        let (throttle_target, brake_target) = self
            .params
            .auto_targets
            .select(cmd.acceleration, estop);

        trace!(
            "Autonomous targets: steer {:.03} ({:.02} % x {:.02}), accel {:.03}, \
            throttle {:.03}, brake {:.03}",
            steer_target,
            cmd.steering_target,
            joy.scale,
            cmd.acceleration,
            throttle_target,
            brake_target
        );

        let demands = self.actuators.drive(
            steer_target,
            throttle_target,
            brake_target,
            &Feedback::from_chassis(&view.chassis),
        );
        apply_demands(cmd, &demands);

        PathOutcome {
            status,
            estop_reason,
            demands,
        }
    }

    fn check_and_compute(
        &mut self,
        view: &mut LocalView,
        now_s: f64,
        cmd: &mut ControlCommand,
        estop_reason: &mut Option<String>,
    ) -> Result<(), ProduceError> {
        input_check::check_input(view, &self.params.input_check)?;
        input_check::check_timestamp(view, now_s, &self.params.input_check)?;

        let estop = &view.trajectory.estop;
        if estop.is_estop {
            *estop_reason = Some(format!("estop from planning : {}", estop.reason));
        }

        if !view.trajectory.trajectory_point.is_empty() {
            self.agent.compute_control_command(
                &view.localization,
                &view.chassis,
                &view.trajectory,
                cmd,
            )?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn apply_demands(cmd: &mut ControlCommand, demands: &Demands) {
    cmd.steering_rate = demands.steering_rate;
    cmd.throttle = demands.throttle;
    cmd.brake = demands.brake;
}
