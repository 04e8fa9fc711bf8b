//! Main control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Start the joystick reader, if a joystick device is configured
//!     - Start the bus client (inputs) and the command server (outputs)
//!     - Main loop:
//!         - Control processing, producing one command
//!         - Command publication
//!         - Sleep until the end of the cycle period
//!
//! # Modules
//!
//! All cyclic modules (e.g. `ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::net::NetParams;
use ctrl_lib::{
    bus_client::BusClient,
    cmd_server::CmdServer,
    ctrl::{self, CtrlComponent},
    local_view::input_channels,
    manual::{JoyDevice, JoyState},
    params::CtrlExecParams,
    task_agent::{self, TrackingAgent},
    vehicle_state::PoseVehicleState,
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    let exec_params: CtrlExecParams =
        util::params::load("ctrl_exec.toml").wrap_err("Could not load exec params")?;

    let log_level: LevelFilter = exec_params
        .log_level
        .parse()
        .map_err(|_| eyre!("Invalid log level \"{}\"", exec_params.log_level))?;

    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Drive-by-wire Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let ctrl_params: ctrl::Params =
        util::params::load("ctrl.toml").wrap_err("Could not load control params")?;
    let agent_params: task_agent::Params =
        util::params::load("task_agent.toml").wrap_err("Could not load task agent params")?;
    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Parameters loaded");
    debug!("Exec parameters: {:#?}", exec_params);

    // ---- INITIALISE JOYSTICK ----

    let joy = Arc::new(JoyState::new(&ctrl_params.joy));

    // Without a joystick the override can never be enabled, the autonomous path is unaffected.
    let joy_device = match exec_params.joy_device_path {
        Some(ref path) => match JoyDevice::open(path, joy.clone(), ctrl_params.joy) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("Manual override unavailable: {}", e);
                None
            }
        },
        None => {
            info!("No joystick device configured, manual override unavailable");
            None
        }
    };

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let (writers, readers) = input_channels(&exec_params.queue_sizes);

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let bus_client = {
        let c = BusClient::new(&zmq_ctx, &net_params, writers)
            .wrap_err("Failed to initialise BusClient")?;
        info!("BusClient initialised");
        c
    };

    let mut cmd_server = {
        let s = CmdServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise CmdServer")?;
        info!("CmdServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- INITIALISE MODULES ----

    // The control module validates the period, the loop paces itself on the same value
    let control_period_s = ctrl_params.control_period_s;

    let mut ctrl_comp = CtrlComponent::init(ctrl::InitData {
        params: ctrl_params,
        readers,
        agent: Box::new(TrackingAgent::new(agent_params)),
        vehicle_state: Box::new(PoseVehicleState::new()),
        joy,
    })
    .wrap_err("Failed to initialise the control module")?;
    info!("Control module init complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(control_period_s);
    let mut num_consec_cycle_overruns: u64 = 0;
    let mut joy_lost_reported = false;
    let mut bus_lost_reported = false;

    // Losing the bus only makes the inputs go stale, commands keep being published
    loop {
        let cycle_start_instant = Instant::now();

        // ---- CONTROL PROCESSING ----

        match ctrl_comp.proc(&ctrl::InputData {
            now_s: util::time::now_unix_s(),
        }) {
            Ok((cmd, report)) => {
                debug!(
                    "Control: {:?}, error code {:?}, steer rate {:.03}, throttle {:.03}, \
                    brake {:.03}",
                    report.path, report.error_code, cmd.steering_rate, cmd.throttle, cmd.brake
                );

                if let Err(e) = cmd_server.send(&cmd) {
                    warn!("CmdServer error: {}", e)
                }
            }
            Err(e) => warn!("No control command this cycle: {}", e),
        }

        if let Some(ref d) = joy_device {
            if !d.is_alive() && !joy_lost_reported {
                warn!("Joystick device lost, manual override released");
                joy_lost_reported = true;
            }
        }

        if !bus_client.is_alive() && !bus_lost_reported {
            warn!("BusClient stopped receiving, inputs will go stale");
            bus_lost_reported = true;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive overruns)",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64(),
                    num_consec_cycle_overruns
                );
            }
        }
    }
}
