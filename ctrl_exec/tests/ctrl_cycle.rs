//! Whole-cycle tests of the control module, driven through the input channels.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use comms_if::msg::{
    AdcTrajectory, Chassis, ControlCommand, DrivingAction, DrivingMode, ErrorCode, GearPosition,
    LocalizationEstimate, PadMessage, PathPoint, TrajectoryPoint,
};
use ctrl_lib::{
    ctrl::{self, CtrlComponent, CtrlError, CtrlPath},
    local_view::{input_channels, InputWriters, PendingQueueSizes},
    manual::JoyState,
    pid::PidControl,
    task_agent::{AgentError, TaskAgent},
    vehicle_state::PoseVehicleState,
};
use nalgebra::UnitQuaternion;
use util::module::State;

// ------------------------------------------------------------------------------------------------
// HARNESS
// ------------------------------------------------------------------------------------------------

const NOW_S: f64 = 1000.0;

/// Agent requesting a fixed steering target and acceleration.
struct MockAgent {
    calls: Arc<AtomicUsize>,
    resets: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

struct Harness {
    ctrl: CtrlComponent,
    writers: InputWriters,
    joy: Arc<JoyState>,
    calls: Arc<AtomicUsize>,
    resets: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl TaskAgent for MockAgent {
    fn compute_control_command(
        &mut self,
        _localization: &LocalizationEstimate,
        _chassis: &Chassis,
        _trajectory: &AdcTrajectory,
        cmd: &mut ControlCommand,
    ) -> Result<(), AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(AgentError::LateralErrorLimit {
                error_m: 3.0,
                limit_m: 2.0,
            });
        }

        cmd.steering_target = 10.0;
        cmd.acceleration = 1.0;
        cmd.speed = 2.0;
        cmd.gear_location = GearPosition::Drive;

        Ok(())
    }

    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

impl Harness {
    fn new(params: ctrl::Params) -> Self {
        let (writers, readers) = input_channels(&PendingQueueSizes {
            chassis: 10,
            trajectory: 1,
            cmd_status: 1,
            localization: 10,
            pad: 10,
        });

        let joy = Arc::new(JoyState::new(&params.joy));
        let calls = Arc::new(AtomicUsize::new(0));
        let resets = Arc::new(AtomicUsize::new(0));
        let fail = Arc::new(AtomicBool::new(false));

        let ctrl = CtrlComponent::init(ctrl::InitData {
            params,
            readers,
            agent: Box::new(MockAgent {
                calls: calls.clone(),
                resets: resets.clone(),
                fail: fail.clone(),
            }),
            vehicle_state: Box::new(PoseVehicleState::new()),
            joy: joy.clone(),
        })
        .unwrap();

        Self {
            ctrl,
            writers,
            joy,
            calls,
            resets,
            fail,
        }
    }

    /// Publish a fresh chassis, localization and a one point trajectory.
    fn publish_nominal(&self, mode: DrivingMode, traj_seq: u32) {
        self.writers.chassis.write(chassis(mode));
        self.writers.localization.write(localization());
        self.writers.trajectory.write(trajectory(traj_seq, 1));
    }

    fn cycle(&mut self) -> Result<(ControlCommand, ctrl::StatusReport), CtrlError> {
        self.ctrl.proc(&ctrl::InputData { now_s: NOW_S })
    }
}

fn chassis(mode: DrivingMode) -> Chassis {
    let mut c = Chassis::default();
    c.header.timestamp_sec = NOW_S;
    c.driving_mode = mode;
    c.gear_location = GearPosition::Drive;
    c.steering_percentage = 0.0;
    c.throttle_percentage = 1.8;
    c.brake_percentage = 2.5;
    c
}

fn localization() -> LocalizationEstimate {
    let mut l = LocalizationEstimate::default();
    l.header.timestamp_sec = NOW_S;
    l
}

fn trajectory(seq: u32, num_points: usize) -> AdcTrajectory {
    let mut t = AdcTrajectory::default();
    t.header.timestamp_sec = NOW_S;
    t.header.sequence_num = seq;
    t.trajectory_point = (0..num_points)
        .map(|i| TrajectoryPoint {
            path_point: PathPoint {
                x: i as f64,
                ..Default::default()
            },
            v: 2.0,
            a: 0.5,
            ..Default::default()
        })
        .collect();
    t
}

fn assert_near(value: f64, expected: f64) {
    assert!(
        (value - expected).abs() < 1e-6,
        "expected {}, found {}",
        expected,
        value
    );
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn test_not_ready() {
    let mut h = Harness::new(ctrl::Params::default());

    assert_eq!(h.cycle().unwrap_err(), CtrlError::ChassisNotReady);

    h.writers.chassis.write(chassis(DrivingMode::CompleteAutoDrive));
    assert_eq!(h.cycle().unwrap_err(), CtrlError::LocalizationNotReady);

    // Nothing was produced
    assert_eq!(h.ctrl.prev_cmd().header.sequence_num, 0);
    assert_eq!(h.ctrl.last_path(), None);

    h.writers.localization.write(localization());
    assert!(h.cycle().is_ok());
}

#[test]
fn test_autonomous() {
    let mut h = Harness::new(ctrl::Params::default());
    h.publish_nominal(DrivingMode::CompleteAutoDrive, 5);

    let (cmd, report) = h.cycle().unwrap();

    assert_eq!(report.path, CtrlPath::Autonomous);
    assert!(report.path_changed);
    assert_eq!(report.error_code, ErrorCode::Ok);
    assert_eq!(report.estop_reason, None);
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);

    // Steering target is the negated agent target: error -10 from a centred wheel
    assert_near(report.demands.steer_target, -10.0);
    assert_near(cmd.steering_rate, -10.0 * 0.86 - 10.0 * 0.01 * 0.14);

    // Accelerating: throttle towards 0.76 from 1.8, brake resting at 2.5
    assert_near(cmd.throttle, -10.4 * 4.0 - 10.4 * 0.01 * 1.45);
    assert_eq!(cmd.brake, 0.0);

    // Agent outputs are kept
    assert_eq!(cmd.steering_target, 10.0);
    assert_eq!(cmd.speed, 2.0);
    assert_eq!(cmd.gear_location, GearPosition::Drive);

    assert_eq!(cmd.header.module_name, ctrl::MODULE_NAME);
    assert_eq!(cmd.header.timestamp_sec, NOW_S);
    assert_eq!(cmd.header.sequence_num, 1);
    assert_eq!(cmd.header.status.error_code, ErrorCode::Ok);
    assert!(cmd.header.status.msg.is_empty());
    assert!(cmd.pad_msg.is_none());

    let (cmd, report) = h.cycle().unwrap();
    assert!(!report.path_changed);
    assert_eq!(cmd.header.sequence_num, 2);
}

#[test]
fn test_steering_scale() {
    let mut h = Harness::new(ctrl::Params::default());
    h.publish_nominal(DrivingMode::CompleteAutoDrive, 5);
    h.joy.set_scale(0.5);

    let (_, report) = h.cycle().unwrap();
    assert_near(report.demands.steer_target, -5.0);
}

#[test]
fn test_planning_estop() {
    let mut h = Harness::new(ctrl::Params::default());
    h.writers.chassis.write(chassis(DrivingMode::CompleteAutoDrive));
    h.writers.localization.write(localization());

    let mut traj = trajectory(3, 2);
    traj.estop.is_estop = true;
    traj.estop.reason = "obstacle ahead".into();
    h.writers.trajectory.write(traj);

    let (cmd, report) = h.cycle().unwrap();

    assert_eq!(report.path, CtrlPath::Autonomous);
    assert_eq!(
        report.estop_reason.as_deref(),
        Some("estop from planning : obstacle ahead")
    );
    assert_eq!(cmd.header.status.error_code, ErrorCode::Ok);
    assert_eq!(cmd.header.status.msg, "estop from planning : obstacle ahead");

    // The agent still runs, but braking is selected regardless of the requested acceleration
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cmd.throttle, 0.0);
    assert_eq!(cmd.brake, -80.0);
}

#[test]
fn test_empty_trajectory() {
    let mut h = Harness::new(ctrl::Params::default());
    h.writers.chassis.write(chassis(DrivingMode::CompleteAutoDrive));
    h.writers.localization.write(localization());
    h.writers.trajectory.write(trajectory(4, 0));

    let (cmd, report) = h.cycle().unwrap();

    assert_eq!(report.error_code, ErrorCode::ControlInputInvalid);
    assert_eq!(cmd.header.status.error_code, ErrorCode::ControlInputInvalid);
    assert!(report.estop_reason.is_some());
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    assert_eq!(cmd.brake, -80.0);
}

#[test]
fn test_stale_chassis() {
    let mut h = Harness::new(ctrl::Params::default());

    let mut c = chassis(DrivingMode::CompleteAutoDrive);
    c.header.timestamp_sec = NOW_S - 1.0;
    h.writers.chassis.write(c);
    h.writers.localization.write(localization());
    h.writers.trajectory.write(trajectory(1, 1));

    let (cmd, report) = h.cycle().unwrap();

    assert_eq!(report.error_code, ErrorCode::ControlInputStale);
    assert_eq!(cmd.header.status.error_code, ErrorCode::ControlInputStale);
    assert!(cmd.header.status.msg.contains("Chassis"));
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);

    // Disabling the check lets the same inputs through
    let mut params = ctrl::Params::default();
    params.input_check.enable_input_timestamp_check = false;
    let mut h = Harness::new(params);
    let mut c = chassis(DrivingMode::CompleteAutoDrive);
    c.header.timestamp_sec = NOW_S - 1.0;
    h.writers.chassis.write(c);
    h.writers.localization.write(localization());
    h.writers.trajectory.write(trajectory(1, 1));

    let (_, report) = h.cycle().unwrap();
    assert_eq!(report.error_code, ErrorCode::Ok);
}

#[test]
fn test_agent_failure() {
    let mut h = Harness::new(ctrl::Params::default());
    h.publish_nominal(DrivingMode::CompleteAutoDrive, 5);
    h.fail.store(true, Ordering::SeqCst);

    let (cmd, report) = h.cycle().unwrap();

    assert_eq!(report.error_code, ErrorCode::ControlComputeError);
    assert_eq!(cmd.header.status.error_code, ErrorCode::ControlComputeError);
    assert!(cmd.header.status.msg.contains("Lateral error"));
    assert_eq!(cmd.brake, -80.0);
    assert_eq!(cmd.steering_target, 0.0);
    assert_eq!(cmd.gear_location, GearPosition::Drive);
}

#[test]
fn test_estop_holds_steering() {
    let mut h = Harness::new(ctrl::Params::default());
    h.publish_nominal(DrivingMode::CompleteAutoDrive, 5);

    let (cmd, _) = h.cycle().unwrap();
    assert_eq!(cmd.steering_target, 10.0);

    // The wheel has reached the target, then localization goes stale
    let mut c = chassis(DrivingMode::CompleteAutoDrive);
    c.steering_percentage = -10.0;
    h.writers.chassis.write(c);
    let mut l = localization();
    l.header.timestamp_sec = NOW_S - 5.0;
    h.writers.localization.write(l);

    let (cmd, report) = h.cycle().unwrap();

    assert_eq!(report.error_code, ErrorCode::ControlInputStale);
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);

    // The wheel is held where it is rather than driven back to centre
    assert_eq!(cmd.steering_target, 10.0);
    assert_near(report.demands.steer_target, -10.0);
    assert_eq!(cmd.steering_rate, 0.0);
    assert_eq!(cmd.gear_location, GearPosition::Drive);
    assert_eq!(cmd.brake, -80.0);
}

#[test]
fn test_zero_fallback() {
    let mut h = Harness::new(ctrl::Params::default());

    // Engage first so there is controller state to reset
    h.publish_nominal(DrivingMode::CompleteAutoDrive, 5);
    h.cycle().unwrap();
    assert!(h.ctrl.actuators().steer().prev_output() != 0.0);

    h.writers.chassis.write(chassis(DrivingMode::CompleteManual));
    let (cmd, report) = h.cycle().unwrap();

    assert_eq!(report.path, CtrlPath::ZeroFallback);
    assert!(report.path_changed);
    assert_eq!(cmd.throttle, 0.0);
    assert_eq!(cmd.brake, 0.0);
    assert_eq!(cmd.steering_rate, 0.0);
    assert_eq!(cmd.steering_target, 0.0);
    assert_eq!(cmd.speed, 0.0);
    assert_eq!(cmd.gear_location, GearPosition::Drive);
    assert_eq!(cmd.header.status.error_code, ErrorCode::Ok);
    assert_eq!(cmd.header.sequence_num, 2);

    assert_eq!(h.resets.load(Ordering::SeqCst), 1);
    assert_eq!(h.ctrl.actuators().steer().prev_output(), 0.0);
    assert_eq!(h.ctrl.actuators().steer().integral(), 0.0);

    // The next computation is a first sample, with no derivative kick from the old error
    let actuation = ctrl::Params::default().actuation;
    let mut reset = h.ctrl.actuators().steer().clone();
    let mut fresh = PidControl::new(&actuation.steer_pid);
    let output = reset.compute(-10.0, actuation.pid_dt_s, actuation.steer_deadband);
    assert_eq!(output, fresh.compute(-10.0, actuation.pid_dt_s, actuation.steer_deadband));
    assert_near(output, -10.0 * 0.86 - 10.0 * 0.01 * 0.14);

    // The trajectory header is kept, so a republication of it is not picked up again
    assert_eq!(h.ctrl.buffered_trajectory_seq(), Some(5));
    h.writers.chassis.write(chassis(DrivingMode::CompleteAutoDrive));
    h.writers.trajectory.write(trajectory(5, 1));
    let (_, report) = h.cycle().unwrap();
    assert_eq!(report.error_code, ErrorCode::ControlInputInvalid);

    // A new trajectory is
    h.writers.trajectory.write(trajectory(6, 1));
    let (_, report) = h.cycle().unwrap();
    assert_eq!(report.error_code, ErrorCode::Ok);
    assert_eq!(h.ctrl.buffered_trajectory_seq(), Some(6));
}

#[test]
fn test_force_auto_drive() {
    let mut params = ctrl::Params::default();
    params.force_auto_drive = true;
    let mut h = Harness::new(params);
    h.publish_nominal(DrivingMode::CompleteManual, 5);

    let (_, report) = h.cycle().unwrap();
    assert_eq!(report.path, CtrlPath::Autonomous);
}

#[test]
fn test_manual_override() {
    let mut h = Harness::new(ctrl::Params::default());
    h.publish_nominal(DrivingMode::CompleteAutoDrive, 5);
    h.cycle().unwrap();

    // Pedals resting at the manual rest voltages
    let mut c = chassis(DrivingMode::CompleteAutoDrive);
    c.throttle_percentage = 2.0;
    c.gear_location = GearPosition::Reverse;
    h.writers.chassis.write(c);

    h.joy.set_override_enabled(true);
    h.joy.set_steer(false, true);

    let (cmd, report) = h.cycle().unwrap();

    assert_eq!(report.path, CtrlPath::ManualOverride);
    assert!(report.path_changed);
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);

    // Controllers were reset on the path change, so this is a first hit with an error of 18
    assert_near(report.demands.steer_target, 18.0);
    assert_near(cmd.steering_rate, 18.0 * 0.86 + 18.0 * 0.01 * 0.14);
    assert_eq!(cmd.throttle, 0.0);
    assert_eq!(cmd.brake, 0.0);

    // Gear follows the chassis
    assert_eq!(cmd.gear_location, GearPosition::Reverse);
    assert_eq!(cmd.header.status.error_code, ErrorCode::Ok);

    // Releasing the override returns to the autonomous path
    h.joy.set_override_enabled(false);
    let (_, report) = h.cycle().unwrap();
    assert_eq!(report.path, CtrlPath::Autonomous);
    assert!(report.path_changed);
    assert_eq!(h.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_pad_forwarded() {
    let mut h = Harness::new(ctrl::Params::default());
    h.publish_nominal(DrivingMode::CompleteAutoDrive, 5);

    h.writers.pad.write(PadMessage {
        action: DrivingAction::Start,
        ..Default::default()
    });

    let (cmd, _) = h.cycle().unwrap();
    assert_eq!(cmd.pad_msg.map(|p| p.action), Some(DrivingAction::Start));

    let (cmd, _) = h.cycle().unwrap();
    assert!(cmd.pad_msg.is_none());
}

#[test]
fn test_header_pitch_and_timestamps() {
    let mut params = ctrl::Params::default();
    params.pitch_offset_deg = 1.0;
    let mut h = Harness::new(params);

    let q = UnitQuaternion::from_euler_angles(0.0, 0.1, 0.0);
    let mut loc = localization();
    loc.pose.orientation = [q.i, q.j, q.k, q.w];

    let mut traj = trajectory(7, 1);
    traj.header.lidar_timestamp = Some(999_990_000_000);
    traj.header.camera_timestamp = Some(999_980_000_000);

    h.writers.chassis.write(chassis(DrivingMode::CompleteAutoDrive));
    h.writers.localization.write(loc);
    h.writers.trajectory.write(traj);

    let (cmd, _) = h.cycle().unwrap();

    assert_near(
        cmd.debug.simple_lon_debug.vehicle_pitch,
        0.1_f64.to_degrees() + 1.0,
    );
    assert_eq!(cmd.header.lidar_timestamp, Some(999_990_000_000));
    assert_eq!(cmd.header.camera_timestamp, Some(999_980_000_000));
    assert_eq!(cmd.header.radar_timestamp, None);
    assert!(cmd.latency_stats.total_time_ms >= 0.0);
}

#[test]
fn test_invalid_params() {
    let (_, readers) = input_channels(&PendingQueueSizes {
        chassis: 1,
        trajectory: 1,
        cmd_status: 1,
        localization: 1,
        pad: 1,
    });

    let mut params = ctrl::Params::default();
    params.control_period_s = 0.0;

    let joy = Arc::new(JoyState::new(&params.joy));
    let result = CtrlComponent::init(ctrl::InitData {
        params,
        readers,
        agent: Box::new(MockAgent {
            calls: Arc::new(AtomicUsize::new(0)),
            resets: Arc::new(AtomicUsize::new(0)),
            fail: Arc::new(AtomicBool::new(false)),
        }),
        vehicle_state: Box::new(PoseVehicleState::new()),
        joy,
    });

    assert!(result.is_err());
}

#[test]
fn test_param_files() {
    let ctrl_params: ctrl::Params =
        util::params::from_toml_str(include_str!("../../params/ctrl.toml")).unwrap();
    assert_eq!(ctrl_params.control_period_s, 0.01);
    assert_eq!(ctrl_params.actuation.brake_pid.output_limit, 80.0);
    assert_eq!(ctrl_params.default_driving_action, DrivingAction::Stop);

    let _: ctrl_lib::task_agent::Params =
        util::params::from_toml_str(include_str!("../../params/task_agent.toml")).unwrap();
    let _: comms_if::net::NetParams =
        util::params::from_toml_str(include_str!("../../params/net.toml")).unwrap();
    let _: ctrl_lib::params::CtrlExecParams =
        util::params::from_toml_str(include_str!("../../params/ctrl_exec.toml")).unwrap();
}
