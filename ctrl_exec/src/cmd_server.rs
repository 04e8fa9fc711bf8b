//! # Command Server
//!
//! Publishes each control command produced by the control cycle on the command topic.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    msg::ControlCommand,
    net::{to_frame, zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Control command publisher
pub struct CmdServer {
    socket: MonitoredSocket,
    topic: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the command: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the command: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdServer {
    /// Create a new instance of the command server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CmdServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.cmd_endpoint)
            .map_err(CmdServerError::SocketError)?;

        Ok(Self {
            socket,
            topic: params.cmd_topic.clone(),
        })
    }

    /// Returns true if at least one subscriber has connected.
    pub fn connected(&self) -> bool {
        self.socket.connected()
    }

    pub fn send(&mut self, cmd: &ControlCommand) -> Result<(), CmdServerError> {
        let frame = to_frame(&self.topic, cmd).map_err(CmdServerError::SerializationError)?;

        self.socket
            .send(&frame, 0)
            .map_err(CmdServerError::SendError)
    }
}
