//! # Tracking agent
//!
//! Keeps the vehicle on the planned trajectory using a pair of PID controllers operating on the
//! lateral error and the heading error.
//!
//! Each computation the trajectory point closest to the vehicle is found, and the segment joining
//! it to the next point is used as the local path. The lateral error is the signed distance
//! between the vehicle and that segment, the heading error is the angle between the vehicle's
//! heading and the segment. The two controller outputs are summed into a steering target.
//!
//! The longitudinal targets come straight from the matched point: its speed is the target speed,
//! and the requested acceleration is the point's acceleration plus a correction proportional to
//! the speed error.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::{Vector2, Vector3};
use serde::Serialize;

use super::{AgentError, Params, TaskAgent};
use comms_if::msg::{
    AdcTrajectory, Chassis, ControlCommand, GearPosition, LocalizationEstimate, TrajectoryPoint,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller without saturation, used for the tracking errors.
#[derive(Debug, Serialize, Clone)]
pub struct TrackingPid {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

/// Trajectory tracking agent.
#[derive(Debug, Clone)]
pub struct TrackingAgent {
    params: Params,

    /// Lateral error controller
    lat_ctrl: TrackingPid,

    /// Heading error controller
    head_ctrl: TrackingPid,

    /// Errors of the last computation
    report: TrackingReport,
}

/// Errors computed on the last cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TrackingReport {
    /// Index of the trajectory point closest to the vehicle
    pub nearest_index: usize,

    /// Positive when the vehicle is left of the path
    pub lat_error_m: f64,

    /// Positive when the vehicle points right of the path
    pub head_error_rad: f64,
}

/// The local straight-line approximation of the path.
struct Segment {
    start: Vector2<f64>,

    /// Unit direction of the segment
    direction: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrackingPid {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            integral: 0f64,
            prev_error: None,
        }
    }

    /// Get the value of the controller for the given error and time step.
    pub fn get(&mut self, error: f64, dt: f64) -> f64 {
        let mut deriv = 0.0;

        if dt > 0.0 {
            self.integral += error * dt;

            if let Some(e) = self.prev_error {
                deriv = (error - e) / dt;
            }
        }

        self.prev_error = Some(error);

        self.k_p * error + self.k_i * self.integral + self.k_d * deriv
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }
}

impl TrackingAgent {
    pub fn new(params: Params) -> Self {
        Self {
            lat_ctrl: TrackingPid::new(params.lat_k_p, params.lat_k_i, params.lat_k_d),
            head_ctrl: TrackingPid::new(params.head_k_p, params.head_k_i, params.head_k_d),
            params,
            report: TrackingReport::default(),
        }
    }

    /// Errors of the last computation.
    pub fn report(&self) -> TrackingReport {
        self.report
    }

    /// Index of the trajectory point closest to the position.
    fn nearest_point(points: &[TrajectoryPoint], position: &Vector2<f64>) -> usize {
        let mut nearest = 0;
        let mut nearest_dist = f64::INFINITY;

        for (i, p) in points.iter().enumerate() {
            let dist = (Vector2::new(p.path_point.x, p.path_point.y) - position).norm_squared();
            if dist < nearest_dist {
                nearest = i;
                nearest_dist = dist;
            }
        }

        nearest
    }

    /// Build the segment through the point at `index`.
    ///
    /// The segment runs to the next point, or from the previous one for the last point. If the
    /// points coincide, or there is only one point, the heading of the point is used.
    fn segment(points: &[TrajectoryPoint], index: usize) -> Segment {
        let point = |i: usize| Vector2::new(points[i].path_point.x, points[i].path_point.y);

        let (start, end) = if index + 1 < points.len() {
            (point(index), point(index + 1))
        } else if index > 0 {
            (point(index - 1), point(index))
        } else {
            (point(index), point(index))
        };

        let delta = end - start;
        let direction = if delta.norm() > f64::EPSILON {
            delta.normalize()
        } else {
            let theta = points[index].path_point.theta;
            Vector2::new(theta.cos(), theta.sin())
        };

        Segment { start, direction }
    }

    /// Calculate the lateral error to the segment.
    ///
    /// Lateral error will be positive if the vehicle is to the "left" of the segment, and negative
    /// if it's to the right (following right hand rule).
    fn calc_lat_error(segment: &Segment, position: &Vector2<f64>) -> f64 {
        let rel = position - segment.start;

        Vector3::new(segment.direction[0], segment.direction[1], 0.0)
            .cross(&Vector3::new(rel[0], rel[1], 0.0))[2]
    }

    /// Calculate the heading error to the segment
    ///
    /// The heading error is +ve if the vehicle is pointing to the right of the segment, and
    /// negative if it's pointing to the left (right hand rule about Z)
    fn calc_head_error(segment: &Segment, heading_rad: f64) -> f64 {
        let pose_dir = Vector2::new(heading_rad.cos(), heading_rad.sin());

        let head_err_rad = segment.direction.angle(&pose_dir);

        let cross = Vector3::new(pose_dir[0], pose_dir[1], 0.0).cross(&Vector3::new(
            segment.direction[0],
            segment.direction[1],
            0.0,
        ));

        head_err_rad * cross[2].signum()
    }
}

impl TaskAgent for TrackingAgent {
    fn compute_control_command(
        &mut self,
        localization: &LocalizationEstimate,
        chassis: &Chassis,
        trajectory: &AdcTrajectory,
        cmd: &mut ControlCommand,
    ) -> Result<(), AgentError> {
        let points = &trajectory.trajectory_point;
        if points.is_empty() {
            return Err(AgentError::NoTrajectoryPoints);
        }

        let pose = &localization.pose;
        let position = Vector2::new(pose.position[0], pose.position[1]);

        let nearest = Self::nearest_point(points, &position);
        let segment = Self::segment(points, nearest);

        let lat_error_m = Self::calc_lat_error(&segment, &position);
        let head_error_rad = Self::calc_head_error(&segment, pose.heading);

        self.report = TrackingReport {
            nearest_index: nearest,
            lat_error_m,
            head_error_rad,
        };

        // Enforce limits on heading and lateral errors
        if lat_error_m.abs() > self.params.lat_error_limit_m {
            return Err(AgentError::LateralErrorLimit {
                error_m: lat_error_m,
                limit_m: self.params.lat_error_limit_m,
            });
        }
        if head_error_rad.abs() > self.params.head_error_limit_rad {
            return Err(AgentError::HeadingErrorLimit {
                error_rad: head_error_rad,
                limit_rad: self.params.head_error_limit_rad,
            });
        }

        // Left of the path steers right, pointing right of the path steers left
        let steer_pct = self.head_ctrl.get(head_error_rad, self.params.dt_s)
            - self.lat_ctrl.get(lat_error_m, self.params.dt_s);

        let target = &points[nearest];

        cmd.steering_target = util::maths::clamp_sym(steer_pct, self.params.steer_limit_pct);
        cmd.speed = target.v;
        cmd.acceleration = target.a + self.params.speed_gain * (target.v - chassis.speed_mps);
        cmd.gear_location = match trajectory.gear {
            GearPosition::None | GearPosition::Invalid => GearPosition::Drive,
            g => g,
        };

        trace!(
            "TrackingAgent: point {}, lat {:.03} m, head {:.03} rad, steer {:.02} %, accel {:.03}",
            nearest,
            lat_error_m,
            head_error_rad,
            cmd.steering_target,
            cmd.acceleration
        );

        Ok(())
    }

    fn reset(&mut self) {
        self.lat_ctrl.reset();
        self.head_ctrl.reset();
        self.report = TrackingReport::default();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::msg::PathPoint;
    use std::f64::consts::FRAC_PI_2;

    /// Straight trajectory along the X axis.
    fn straight(v: f64, a: f64) -> AdcTrajectory {
        let mut t = AdcTrajectory::default();
        t.trajectory_point = (0..10)
            .map(|i| TrajectoryPoint {
                path_point: PathPoint {
                    x: i as f64,
                    ..Default::default()
                },
                v,
                a,
                ..Default::default()
            })
            .collect();
        t
    }

    fn loc(x: f64, y: f64, heading: f64) -> LocalizationEstimate {
        let mut l = LocalizationEstimate::default();
        l.pose.position = [x, y, 0.0];
        l.pose.heading = heading;
        l
    }

    #[test]
    fn test_on_path() {
        let mut agent = TrackingAgent::new(Params::default());
        let mut cmd = ControlCommand::default();
        let mut chassis = Chassis::default();
        chassis.speed_mps = 1.0;

        agent
            .compute_control_command(&loc(3.2, 0.0, 0.0), &chassis, &straight(2.0, 0.1), &mut cmd)
            .unwrap();

        assert_eq!(agent.report().nearest_index, 3);
        assert_eq!(cmd.steering_target, 0.0);
        assert_eq!(cmd.speed, 2.0);
        assert!((cmd.acceleration - 0.6).abs() < 1e-12);
        assert_eq!(cmd.gear_location, GearPosition::Drive);
    }

    #[test]
    fn test_error_signs() {
        let mut agent = TrackingAgent::new(Params::default());
        let mut cmd = ControlCommand::default();

        // Left of the path, steer right
        agent
            .compute_control_command(
                &loc(4.0, 0.5, 0.0),
                &Chassis::default(),
                &straight(1.0, 0.0),
                &mut cmd,
            )
            .unwrap();
        assert!((agent.report().lat_error_m - 0.5).abs() < 1e-12);
        assert!((cmd.steering_target + 10.0).abs() < 1e-9);

        // Pointing right of the path, steer left
        agent.reset();
        agent
            .compute_control_command(
                &loc(4.0, 0.0, -0.1),
                &Chassis::default(),
                &straight(1.0, 0.0),
                &mut cmd,
            )
            .unwrap();
        assert!((agent.report().head_error_rad - 0.1).abs() < 1e-9);
        assert!(cmd.steering_target > 0.0);
    }

    #[test]
    fn test_failures() {
        let mut agent = TrackingAgent::new(Params::default());
        let mut cmd = ControlCommand::default();

        assert_eq!(
            agent.compute_control_command(
                &loc(0.0, 0.0, 0.0),
                &Chassis::default(),
                &AdcTrajectory::default(),
                &mut cmd
            ),
            Err(AgentError::NoTrajectoryPoints)
        );

        assert!(matches!(
            agent.compute_control_command(
                &loc(4.0, 3.0, 0.0),
                &Chassis::default(),
                &straight(1.0, 0.0),
                &mut cmd
            ),
            Err(AgentError::LateralErrorLimit { .. })
        ));

        assert!(matches!(
            agent.compute_control_command(
                &loc(4.0, 0.0, FRAC_PI_2),
                &Chassis::default(),
                &straight(1.0, 0.0),
                &mut cmd
            ),
            Err(AgentError::HeadingErrorLimit { .. })
        ));
    }

    #[test]
    fn test_single_point_uses_heading() {
        let mut agent = TrackingAgent::new(Params::default());
        let mut cmd = ControlCommand::default();

        let mut t = AdcTrajectory::default();
        t.gear = GearPosition::Reverse;
        t.trajectory_point = vec![TrajectoryPoint {
            path_point: PathPoint {
                theta: FRAC_PI_2,
                ..Default::default()
            },
            ..Default::default()
        }];

        // Path along +Y, vehicle at +X is right of it
        agent
            .compute_control_command(&loc(0.5, 0.0, FRAC_PI_2), &Chassis::default(), &t, &mut cmd)
            .unwrap();

        assert!((agent.report().lat_error_m + 0.5).abs() < 1e-9);
        assert!(cmd.steering_target > 0.0);
        assert_eq!(cmd.gear_location, GearPosition::Reverse);
    }
}
