//! # Bus Client
//!
//! The BusClient subscribes to the input topics of the control module and writes every message it
//! receives into the matching input channel. Messages are published as frames of the form
//! `"<topic> <json>"`, see [`comms_if::net::to_frame`].
//!
//! Receiving happens on a background thread, so a slow publisher never holds up the control cycle.
//! The cycle observes the channels at the start of every cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, trace, warn};
use serde::de::DeserializeOwned;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crate::local_view::InputWriters;
use comms_if::{
    bus::Writer,
    net::{
        split_frame, zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions, Topics,
    },
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to the input subscriber thread.
pub struct BusClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
    bg_alive: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BusClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not spawn the bus client thread: {0}")]
    SpawnError(std::io::Error),
}

/// Outcome of dispatching a single frame.
#[derive(Debug, Clone, PartialEq)]
enum Dispatch {
    Written,
    UnknownTopic(String),
    Malformed,
    DeserializeError(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BusClient {
    /// Create a new instance of the BusClient, subscribed to every input topic.
    ///
    /// This function will not block until the publisher connects.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        writers: InputWriters,
    ) -> Result<Self, BusClientError> {
        let topics = &params.topics;

        let socket_options = SocketOptions {
            subscribe: vec![
                topics.chassis.clone(),
                topics.trajectory.clone(),
                topics.cmd_status.clone(),
                topics.localization.clone(),
                topics.pad.clone(),
            ],
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.input_endpoint,
        )
        .map_err(BusClientError::SocketError)?;

        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_alive = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();
        let bg_alive_clone = bg_alive.clone();
        let topics = topics.clone();

        let bg_jh = thread::Builder::new()
            .name("bus_client".into())
            .spawn(move || {
                bg_thread(socket, bg_run_clone, topics, writers);
                bg_alive_clone.store(false, Ordering::Relaxed);
            })
            .map_err(BusClientError::SpawnError)?;

        Ok(Self {
            bg_jh: Some(bg_jh),
            bg_run,
            bg_alive,
        })
    }

    /// True while the background thread is receiving.
    pub fn is_alive(&self) -> bool {
        self.bg_alive.load(Ordering::Relaxed)
    }

    /// Stop the background thread and wait for it to finish.
    pub fn shutdown(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                error!("BusClient background thread panicked");
            }
        }
    }
}

impl Drop for BusClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, writes each received message into its input channel.
fn bg_thread(
    socket: MonitoredSocket,
    run: Arc<AtomicBool>,
    topics: Topics,
    writers: InputWriters,
) {
    while run.load(Ordering::Relaxed) {
        let frame = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message on the input bus");
                continue;
            }
            Err(e) if is_transient(e) => continue,
            Err(e) => {
                error!("Error receiving message from the input bus: {:?}", e);
                break;
            }
        };

        match dispatch(&frame, &topics, &writers) {
            Dispatch::Written => (),
            Dispatch::UnknownTopic(t) => trace!("Ignoring message on unknown topic \"{}\"", t),
            Dispatch::Malformed => warn!("Malformed frame on the input bus"),
            Dispatch::DeserializeError(e) => warn!("Error deserialising input message: {}", e),
        }
    }
}

/// Receive errors after which the socket is still usable: timeouts and interrupting signals.
fn is_transient(e: zmq::Error) -> bool {
    matches!(e, zmq::Error::EAGAIN | zmq::Error::EINTR)
}

/// Route a frame to the channel of its topic.
fn dispatch(frame: &str, topics: &Topics, writers: &InputWriters) -> Dispatch {
    let (topic, payload) = match split_frame(frame) {
        Some(p) => p,
        None => return Dispatch::Malformed,
    };

    if topic == topics.chassis {
        write_json(&writers.chassis, payload)
    } else if topic == topics.trajectory {
        write_json(&writers.trajectory, payload)
    } else if topic == topics.cmd_status {
        write_json(&writers.cmd_status, payload)
    } else if topic == topics.localization {
        write_json(&writers.localization, payload)
    } else if topic == topics.pad {
        write_json(&writers.pad, payload)
    } else {
        Dispatch::UnknownTopic(topic.to_string())
    }
}

fn write_json<T: DeserializeOwned>(writer: &Writer<T>, payload: &str) -> Dispatch {
    match serde_json::from_str(payload) {
        Ok(msg) => {
            writer.write(msg);
            Dispatch::Written
        }
        Err(e) => Dispatch::DeserializeError(e.to_string()),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::local_view::{input_channels, PendingQueueSizes};
    use comms_if::{
        msg::{Chassis, DrivingAction, DrivingMode, PadMessage},
        net::to_frame,
    };

    fn topics() -> Topics {
        Topics {
            chassis: "chassis".into(),
            trajectory: "trajectory".into(),
            cmd_status: "cmd_status".into(),
            localization: "localization".into(),
            pad: "pad".into(),
        }
    }

    fn sizes() -> PendingQueueSizes {
        PendingQueueSizes {
            chassis: 1,
            trajectory: 1,
            cmd_status: 1,
            localization: 1,
            pad: 1,
        }
    }

    #[test]
    fn test_dispatch() {
        let (writers, readers) = input_channels(&sizes());

        let mut chassis = Chassis::default();
        chassis.driving_mode = DrivingMode::CompleteAutoDrive;
        let frame = to_frame("chassis", &chassis).unwrap();

        assert_eq!(dispatch(&frame, &topics(), &writers), Dispatch::Written);
        assert_eq!(readers.chassis.observe(), 1);
        assert_eq!(*readers.chassis.latest_observed().unwrap(), chassis);

        let mut pad = PadMessage::default();
        pad.action = DrivingAction::Start;
        let frame = to_frame("pad", &pad).unwrap();
        assert_eq!(dispatch(&frame, &topics(), &writers), Dispatch::Written);
        assert_eq!(readers.pad.observe(), 1);
        assert_eq!(readers.pad.latest_observed().unwrap().action, DrivingAction::Start);

        // Nothing written to the other channels
        assert_eq!(readers.trajectory.observe(), 0);
        assert_eq!(readers.localization.observe(), 0);
    }

    #[test]
    fn test_dispatch_rejects() {
        let (writers, readers) = input_channels(&sizes());

        assert_eq!(
            dispatch("routing {}", &topics(), &writers),
            Dispatch::UnknownTopic("routing".into())
        );
        assert_eq!(dispatch("chassis", &topics(), &writers), Dispatch::Malformed);

        match dispatch("chassis {not json", &topics(), &writers) {
            Dispatch::DeserializeError(_) => (),
            d => panic!("Expected a deserialize error, got {:?}", d),
        }

        assert_eq!(readers.chassis.observe(), 0);
    }

    #[test]
    fn test_transient_errors() {
        assert!(is_transient(zmq::Error::EAGAIN));
        assert!(is_transient(zmq::Error::EINTR));

        assert!(!is_transient(zmq::Error::ETERM));
        assert!(!is_transient(zmq::Error::ENOTSOCK));
    }
}
