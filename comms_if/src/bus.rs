//! # In-process observe-latest bus
//!
//! A small channel used to hand messages from the receiving threads to the cyclic control task.
//! Writers push messages into a bounded pending queue, dropping the oldest message when the queue
//! is full. The reader periodically calls [`Reader::observe`] which moves all pending messages
//! into the observed set, after which [`Reader::latest_observed`] gives the newest of them.
//!
//! Writers and readers never block each other for longer than it takes to move an `Arc` between
//! queues.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Writing end of a bus channel. May be cloned to give multiple producers.
pub struct Writer<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

/// Reading end of a bus channel.
pub struct Reader<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

struct Inner<T> {
    name: String,

    capacity: usize,

    pending: VecDeque<Arc<T>>,

    observed: VecDeque<Arc<T>>,

    num_dropped: u64,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a new channel with the given name and pending queue size.
///
/// A `pending_queue_size` of zero is treated as one.
pub fn channel<T>(name: &str, pending_queue_size: usize) -> (Writer<T>, Reader<T>) {
    let inner = Arc::new(Mutex::new(Inner {
        name: name.to_string(),
        capacity: pending_queue_size.max(1),
        pending: VecDeque::new(),
        observed: VecDeque::new(),
        num_dropped: 0,
    }));

    (
        Writer {
            inner: inner.clone(),
        },
        Reader { inner },
    )
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T> Writer<T> {
    /// Push a new message into the pending queue.
    pub fn write(&self, msg: T) {
        let mut inner = lock(&self.inner);

        if inner.pending.len() >= inner.capacity {
            inner.pending.pop_front();
            inner.num_dropped += 1;
            trace!(
                "Channel \"{}\" full, dropped oldest message ({} dropped in total)",
                inner.name,
                inner.num_dropped
            );
        }

        inner.pending.push_back(Arc::new(msg));
    }
}

impl<T> Clone for Writer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Reader<T> {
    /// Move all pending messages into the observed set.
    ///
    /// Returns the number of newly observed messages.
    pub fn observe(&self) -> usize {
        let mut inner = lock(&self.inner);
        let inner = &mut *inner;

        let num_new = inner.pending.len();
        inner.observed.extend(inner.pending.drain(..));

        while inner.observed.len() > inner.capacity {
            inner.observed.pop_front();
        }

        num_new
    }

    /// Get the newest observed message, if any has been observed since the last clear.
    pub fn latest_observed(&self) -> Option<Arc<T>> {
        lock(&self.inner).observed.back().cloned()
    }

    /// Drop every pending and observed message.
    pub fn clear_data(&self) {
        let mut inner = lock(&self.inner);
        inner.pending.clear();
        inner.observed.clear();
    }

    /// Name of the channel.
    pub fn name(&self) -> String {
        lock(&self.inner).name.clone()
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Lock the channel, recovering the data if another thread panicked while holding the lock.
fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
