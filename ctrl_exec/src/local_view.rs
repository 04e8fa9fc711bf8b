//! # Local view
//!
//! The control cycle works on a snapshot of the latest message of each input stream, called the
//! local view. Receiving threads publish messages into the input channels, the cycle observes the
//! channels and copies the newest messages into the [`LocalViewStore`], and then takes a
//! [`LocalView`] snapshot from it.
//!
//! All stream copies held by the store sit behind one mutex, so a snapshot never pairs messages
//! from different updates in a torn state.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard};

use comms_if::{
    bus::{self, Reader, Writer},
    msg::{AdcTrajectory, Chassis, CommandStatus, DrivingAction, LocalizationEstimate, PadMessage},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the inputs used by one control cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalView {
    pub chassis: Chassis,
    pub trajectory: AdcTrajectory,
    pub localization: LocalizationEstimate,
    pub pad_msg: PadMessage,
}

/// Holder of the latest copy of every input stream.
pub struct LocalViewStore {
    latest: Mutex<Latest>,
}

/// Pending queue size of each input channel.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PendingQueueSizes {
    pub chassis: usize,
    pub trajectory: usize,
    pub cmd_status: usize,
    pub localization: usize,
    pub pad: usize,
}

/// Reading ends of the input channels, owned by the control cycle.
pub struct InputReaders {
    pub chassis: Reader<Chassis>,
    pub trajectory: Reader<AdcTrajectory>,
    pub cmd_status: Reader<CommandStatus>,
    pub localization: Reader<LocalizationEstimate>,
    pub pad: Reader<PadMessage>,
}

/// Writing ends of the input channels, owned by whatever receives the messages.
#[derive(Clone)]
pub struct InputWriters {
    pub chassis: Writer<Chassis>,
    pub trajectory: Writer<AdcTrajectory>,
    pub cmd_status: Writer<CommandStatus>,
    pub localization: Writer<LocalizationEstimate>,
    pub pad: Writer<PadMessage>,
}

#[derive(Default)]
struct Latest {
    chassis: Option<Chassis>,
    trajectory: Option<AdcTrajectory>,
    cmd_status: Option<CommandStatus>,
    localization: Option<LocalizationEstimate>,
    pad: PadMessage,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A stream required to build a snapshot has never been received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    Chassis,
    Localization,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create the input channels.
pub fn input_channels(sizes: &PendingQueueSizes) -> (InputWriters, InputReaders) {
    let (chassis_w, chassis_r) = bus::channel("chassis", sizes.chassis);
    let (trajectory_w, trajectory_r) = bus::channel("trajectory", sizes.trajectory);
    let (cmd_status_w, cmd_status_r) = bus::channel("cmd_status", sizes.cmd_status);
    let (localization_w, localization_r) = bus::channel("localization", sizes.localization);
    let (pad_w, pad_r) = bus::channel("pad", sizes.pad);

    (
        InputWriters {
            chassis: chassis_w,
            trajectory: trajectory_w,
            cmd_status: cmd_status_w,
            localization: localization_w,
            pad: pad_w,
        },
        InputReaders {
            chassis: chassis_r,
            trajectory: trajectory_r,
            cmd_status: cmd_status_r,
            localization: localization_r,
            pad: pad_r,
        },
    )
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LocalViewStore {
    /// Create an empty store. Until a pad message is received the given action is reported.
    pub fn new(default_action: DrivingAction) -> Self {
        Self {
            latest: Mutex::new(Latest {
                pad: PadMessage {
                    action: default_action,
                    ..Default::default()
                },
                ..Default::default()
            }),
        }
    }

    pub fn on_chassis(&self, chassis: &Chassis) {
        trace!("Received chassis data: {:?}", chassis);
        self.lock().chassis = Some(chassis.clone());
    }

    /// Store a new trajectory.
    ///
    /// The trajectory is only copied if its sequence number differs from the one already held,
    /// returns `true` if it was copied.
    pub fn on_trajectory(&self, trajectory: &AdcTrajectory) -> bool {
        let mut latest = self.lock();

        let is_new = match latest.trajectory {
            Some(ref t) => t.header.sequence_num != trajectory.header.sequence_num,
            None => true,
        };

        if is_new {
            trace!(
                "Received trajectory {} with {} points",
                trajectory.header.sequence_num,
                trajectory.trajectory_point.len()
            );
            latest.trajectory = Some(trajectory.clone());
        }

        is_new
    }

    pub fn on_cmd_status(&self, status: &CommandStatus) {
        trace!("Received command status: {:?}", status);
        self.lock().cmd_status = Some(status.clone());
    }

    pub fn on_localization(&self, localization: &LocalizationEstimate) {
        trace!("Received localization: {:?}", localization);
        self.lock().localization = Some(localization.clone());
    }

    pub fn on_pad(&self, pad: &PadMessage) {
        debug!("Received pad message: {:?}", pad.action);
        self.lock().pad = pad.clone();
    }

    /// Observe every input channel and copy the newest message of each into the store.
    ///
    /// Returns `true` if a new pad message was observed this cycle.
    pub fn observe(&self, readers: &InputReaders) -> bool {
        readers.chassis.observe();
        if let Some(chassis) = readers.chassis.latest_observed() {
            self.on_chassis(&chassis);
        }

        readers.trajectory.observe();
        if let Some(trajectory) = readers.trajectory.latest_observed() {
            self.on_trajectory(&trajectory);
        }

        readers.cmd_status.observe();
        if let Some(status) = readers.cmd_status.latest_observed() {
            self.on_cmd_status(&status);
        }

        readers.localization.observe();
        if let Some(localization) = readers.localization.latest_observed() {
            self.on_localization(&localization);
        }

        match readers.pad.observe() {
            0 => false,
            _ => match readers.pad.latest_observed() {
                Some(pad) => {
                    self.on_pad(&pad);
                    true
                }
                None => false,
            },
        }
    }

    /// Copy every stream into a snapshot.
    ///
    /// Fails if no chassis or no localization has been received yet. A missing trajectory is
    /// replaced by an empty one.
    pub fn snapshot(&self) -> Result<LocalView, NotReady> {
        let latest = self.lock();

        let chassis = latest.chassis.clone().ok_or(NotReady::Chassis)?;
        let localization = latest.localization.clone().ok_or(NotReady::Localization)?;

        let trajectory = match latest.trajectory {
            Some(ref t) => t.clone(),
            None => {
                debug!("No trajectory received yet, using an empty trajectory");
                AdcTrajectory::default()
            }
        };

        Ok(LocalView {
            chassis,
            trajectory,
            localization,
            pad_msg: latest.pad.clone(),
        })
    }

    /// Drop the points of the buffered trajectory.
    ///
    /// The header is kept so that a republication of the same trajectory is not copied again.
    pub fn clear_trajectory(&self) {
        if let Some(ref mut t) = self.lock().trajectory {
            t.trajectory_point.clear();
            t.path_point.clear();
        }
    }

    /// Sequence number of the buffered trajectory, if there is one.
    pub fn latest_trajectory_seq(&self) -> Option<u32> {
        self.lock()
            .trajectory
            .as_ref()
            .map(|t| t.header.sequence_num)
    }

    /// The latest command status received from the planner.
    pub fn latest_cmd_status(&self) -> Option<CommandStatus> {
        self.lock().cmd_status.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Latest> {
        match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Display for NotReady {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotReady::Chassis => write!(f, "chassis"),
            NotReady::Localization => write!(f, "localization"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::msg::TrajectoryPoint;

    fn sizes() -> PendingQueueSizes {
        PendingQueueSizes {
            chassis: 10,
            trajectory: 10,
            cmd_status: 10,
            localization: 10,
            pad: 10,
        }
    }

    fn trajectory(seq: u32, num_points: usize) -> AdcTrajectory {
        let mut t = AdcTrajectory::default();
        t.header.sequence_num = seq;
        t.trajectory_point = vec![TrajectoryPoint::default(); num_points];
        t
    }

    #[test]
    fn test_not_ready() {
        let store = LocalViewStore::new(DrivingAction::Stop);
        assert_eq!(store.snapshot(), Err(NotReady::Chassis));

        store.on_chassis(&Chassis::default());
        assert_eq!(store.snapshot(), Err(NotReady::Localization));

        store.on_localization(&LocalizationEstimate::default());
        let view = store.snapshot().unwrap();
        assert!(view.trajectory.trajectory_point.is_empty());
        assert_eq!(view.pad_msg.action, DrivingAction::Stop);
    }

    #[test]
    fn test_trajectory_sequence() {
        let store = LocalViewStore::new(DrivingAction::Start);

        assert!(store.on_trajectory(&trajectory(1, 3)));
        assert!(!store.on_trajectory(&trajectory(1, 5)));
        assert_eq!(store.latest_trajectory_seq(), Some(1));

        store.clear_trajectory();

        // Same sequence is not copied back in after a clear
        assert!(!store.on_trajectory(&trajectory(1, 3)));
        assert!(store.on_trajectory(&trajectory(2, 4)));

        store.on_chassis(&Chassis::default());
        store.on_localization(&LocalizationEstimate::default());
        assert_eq!(store.snapshot().unwrap().trajectory.trajectory_point.len(), 4);
    }

    #[test]
    fn test_observe_channels() {
        let (writers, readers) = input_channels(&sizes());
        let store = LocalViewStore::new(DrivingAction::Stop);

        let mut chassis = Chassis::default();
        chassis.speed_mps = 1.0;
        writers.chassis.write(chassis.clone());
        chassis.speed_mps = 2.0;
        writers.chassis.write(chassis);
        writers.localization.write(LocalizationEstimate::default());
        writers.trajectory.write(trajectory(7, 2));
        writers.cmd_status.write(CommandStatus::default());

        assert!(!store.observe(&readers));

        let view = store.snapshot().unwrap();
        assert_eq!(view.chassis.speed_mps, 2.0);
        assert_eq!(view.trajectory.header.sequence_num, 7);
        assert!(store.latest_cmd_status().is_some());

        writers.pad.write(PadMessage {
            action: DrivingAction::Reset,
            ..Default::default()
        });
        assert!(store.observe(&readers));
        assert!(!store.observe(&readers));
        assert_eq!(store.snapshot().unwrap().pad_msg.action, DrivingAction::Reset);
    }
}
