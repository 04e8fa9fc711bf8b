//! # Joystick device
//!
//! Reads raw input events from the joystick device file on a dedicated thread and applies them to
//! the shared [`JoyState`].
//!
//! Reads from the device block and cannot be cancelled. A shutdown releases the override at once,
//! the thread itself exits when the next event arrives (which is discarded) or the device reports
//! end of file. Nothing waits for the thread to finish.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, info, warn};
use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use super::{joy_events::apply_event, JoyParams, JoyState};
use comms_if::eqpt::joy::InputEvent;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to the joystick reader thread.
pub struct JoyDevice {
    state: Arc<JoyState>,
    params: JoyParams,

    bg_run: Arc<AtomicBool>,
    bg_alive: Arc<AtomicBool>,
    bg_jh: Option<JoinHandle<()>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum JoyDeviceError {
    #[error("Could not open the joystick device {0:?}: {1}")]
    OpenError(PathBuf, io::Error),

    #[error("Could not spawn the joystick reader thread: {0}")]
    SpawnError(io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JoyDevice {
    /// Open the device file and start reading events from it.
    pub fn open<P: AsRef<Path>>(
        path: P,
        state: Arc<JoyState>,
        params: JoyParams,
    ) -> Result<Self, JoyDeviceError> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|e| JoyDeviceError::OpenError(path.to_path_buf(), e))?;

        info!("Joystick device {:?} opened", path);

        Self::spawn_reader(file, state, params)
    }

    /// Start reading events from any reader producing `input_event` records.
    pub fn spawn_reader<R>(
        reader: R,
        state: Arc<JoyState>,
        params: JoyParams,
    ) -> Result<Self, JoyDeviceError>
    where
        R: Read + Send + 'static,
    {
        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_alive = Arc::new(AtomicBool::new(true));

        let bg_run_clone = bg_run.clone();
        let bg_alive_clone = bg_alive.clone();
        let state_clone = state.clone();

        let bg_jh = thread::Builder::new()
            .name("joy_reader".into())
            .spawn(move || {
                bg_thread(reader, bg_run_clone, state_clone, params);
                bg_alive_clone.store(false, Ordering::Relaxed);
            })
            .map_err(JoyDeviceError::SpawnError)?;

        Ok(Self {
            state,
            params,
            bg_run,
            bg_alive,
            bg_jh: Some(bg_jh),
        })
    }

    /// True while the reader thread is running.
    pub fn is_alive(&self) -> bool {
        self.bg_alive.load(Ordering::Relaxed)
    }

    /// Release the override and ask the reader thread to stop.
    ///
    /// The thread stays blocked in its read until the next event or end of file, anything read
    /// after this call is not applied.
    pub fn shutdown(&self) {
        self.bg_run.store(false, Ordering::Relaxed);
        self.state.release_all(&self.params);
    }

    /// Wait for the reader thread to finish.
    ///
    /// Only returns once the thread has seen the shutdown request or the device has closed.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                error!("Joystick reader thread panicked");
            }
        }
    }
}

impl Drop for JoyDevice {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, applies every event read from the device to the state.
///
/// When the device fails or closes the override is released, so the vehicle does not keep
/// following the last operator input.
fn bg_thread<R: Read>(mut reader: R, run: Arc<AtomicBool>, state: Arc<JoyState>, params: JoyParams) {
    while run.load(Ordering::Relaxed) {
        let event = match InputEvent::read_from(&mut reader) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!("Joystick device closed");
                break;
            }
            Err(e) => {
                error!("Error reading from the joystick device: {}", e);
                break;
            }
        };

        if !run.load(Ordering::Relaxed) {
            break;
        }

        if let Some(joy_event) = event.to_joy_event() {
            apply_event(&state, joy_event, &params);
        }
    }

    if state.override_enabled() {
        warn!("Joystick reader stopped while the manual override was enabled, releasing it");
    }
    state.release_all(&params);

    info!("Joystick reader stopped");
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
