//! # Control Cycle Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use comms_if::msg::{
    AdcTrajectory, Chassis, ControlCommand, DrivingMode, LocalizationEstimate, PathPoint,
    TrajectoryPoint,
};
use ctrl_lib::{
    ctrl::{self, CtrlComponent},
    local_view::{input_channels, PendingQueueSizes},
    manual::JoyState,
    task_agent::{self, TaskAgent, TrackingAgent},
    vehicle_state::PoseVehicleState,
};
use util::module::State;

const NOW_S: f64 = 1000.0;

fn ctrl_cycle_benchmark(c: &mut Criterion) {
    // ---- Build dummy inputs ----

    let mut chassis = Chassis::default();
    chassis.header.timestamp_sec = NOW_S;
    chassis.driving_mode = DrivingMode::CompleteAutoDrive;
    chassis.throttle_percentage = 1.8;
    chassis.brake_percentage = 2.5;
    chassis.speed_mps = 2.0;

    let mut localization = LocalizationEstimate::default();
    localization.header.timestamp_sec = NOW_S;
    localization.pose.position = [50.0, 0.3, 0.0];

    // Straight trajectory along x with 0.5 m between points
    let mut trajectory = AdcTrajectory::default();
    trajectory.header.timestamp_sec = NOW_S;
    trajectory.header.sequence_num = 1;
    trajectory.trajectory_point = (0..200)
        .map(|i| TrajectoryPoint {
            path_point: PathPoint {
                x: i as f64 * 0.5,
                s: i as f64 * 0.5,
                ..Default::default()
            },
            v: 2.0,
            ..Default::default()
        })
        .collect();

    // Bench the tracking agent alone
    let mut agent = TrackingAgent::new(task_agent::Params::default());
    c.bench_function("TrackingAgent::compute_control_command", |b| {
        b.iter(|| {
            let mut cmd = ControlCommand::default();
            agent
                .compute_control_command(&localization, &chassis, &trajectory, &mut cmd)
                .unwrap();
            cmd
        })
    });

    // Bench a full autonomous cycle
    let params = ctrl::Params::default();
    let (writers, readers) = input_channels(&PendingQueueSizes {
        chassis: 10,
        trajectory: 1,
        cmd_status: 1,
        localization: 10,
        pad: 10,
    });
    let joy = Arc::new(JoyState::new(&params.joy));

    let mut ctrl_comp = CtrlComponent::init(ctrl::InitData {
        params,
        readers,
        agent: Box::new(TrackingAgent::new(task_agent::Params::default())),
        vehicle_state: Box::new(PoseVehicleState::new()),
        joy,
    })
    .unwrap();

    c.bench_function("CtrlComponent::proc", |b| {
        b.iter(|| {
            writers.chassis.write(chassis.clone());
            writers.localization.write(localization.clone());
            writers.trajectory.write(trajectory.clone());
            ctrl_comp.proc(&ctrl::InputData { now_s: NOW_S }).unwrap()
        })
    });
}

criterion_group!(benches, ctrl_cycle_benchmark);
criterion_main!(benches);
