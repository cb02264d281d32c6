//!  src/util/debounce.rs
//!  ===================================================================
//!  Trailing-edge debouncer for a single input stream.
//!
//!  • At most one pending sleeper; a new submission aborts the previous
//!    one before arming a fresh timer.
//!  • Every submission is stamped with a sequence number. A timer that
//!    fired just before being superseded can still land in the channel,
//!    so the owner passes each delivery through [`Debouncer::accept`],
//!    which only lets the latest submission through.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant as TokioInstant, sleep_until},
};
use tracing::{debug, trace};

/// Output of an elapsed quiet interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounced<T> {
    pub seq: u64,
    pub value: T,
}

/// Coalesces bursts of events into the last one.
pub struct Debouncer<T> {
    delay: Duration,
    seq: u64,
    pending: bool,
    sleeper: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Debounced<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a new debouncer and its Rx endpoint
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<Debounced<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let deb = Self {
            delay,
            seq: 0,
            pending: false,
            sleeper: None,
            tx,
        };
        (deb, rx)
    }

    /// Submit an event; restarts the quiet interval.
    pub fn submit(&mut self, ev: T) {
        self.abort_sleeper();

        self.seq += 1;
        self.pending = true;
        let seq = self.seq;
        trace!(seq, "Debouncer armed");

        let deadline = TokioInstant::now() + self.delay;
        let tx = self.tx.clone();

        self.sleeper = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            debug!(seq, "Debounce interval elapsed");
            let _ = tx.send(Debounced { seq, value: ev });
        }));
    }

    /// Drop any pending event without firing it.
    pub fn cancel(&mut self) {
        self.abort_sleeper();
        self.pending = false;
        // Invalidate anything already queued.
        self.seq += 1;
    }

    /// Unwrap a delivery if it belongs to the latest submission.
    pub fn accept(&mut self, delivered: Debounced<T>) -> Option<T> {
        if self.pending && delivered.seq == self.seq {
            self.pending = false;
            self.sleeper = None;
            Some(delivered.value)
        } else {
            trace!(seq = delivered.seq, latest = self.seq, "Dropping superseded debounce");
            None
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    fn abort_sleeper(&mut self) {
        if let Some(handle) = self.sleeper.take() {
            handle.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.sleeper.take() {
            handle.abort();
        }
    }
}
