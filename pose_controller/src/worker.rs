//! Background session thread for windowed mode.
//!
//! The worker owns the source, classifier and actuator; the UI thread only
//! ever sees copied [`Snapshot`]s arriving over a bounded channel.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gesture_classifier::GestureClassifier;
use key_actuator::Actuator;
use log::{debug, info, warn};

use crate::session::{Presenter, Session, SessionSummary, Snapshot, StopFlag};
use crate::source::PoseSource;
use crate::ControllerError;

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

// ════════════════════════════════════════════════════════════════════════════
// ChannelPresenter
// ════════════════════════════════════════════════════════════════════════════

/// Forwards snapshots without ever blocking the session.  When the UI falls
/// behind, the new snapshot is dropped; when the UI is gone, the session
/// ends.
pub struct ChannelPresenter {
    tx:      SyncSender<Snapshot>,
    dropped: u64,
}

impl ChannelPresenter {
    pub fn new(tx: SyncSender<Snapshot>) -> Self {
        ChannelPresenter { tx, dropped: 0 }
    }

    pub fn dropped(&self) -> u64 { self.dropped }
}

impl Presenter for ChannelPresenter {
    fn present(&mut self, snapshot: &Snapshot) -> bool {
        match self.tx.try_send(snapshot.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("snapshot receiver gone after {} dropped frames", self.dropped);
                false
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Worker
// ════════════════════════════════════════════════════════════════════════════

type SessionResult = Result<SessionSummary, ControllerError>;

pub struct Worker {
    rx:     Receiver<Snapshot>,
    stop:   StopFlag,
    handle: Option<JoinHandle<SessionResult>>,
}

impl Worker {
    /// Start a session on a new thread.
    ///
    /// The actuator is built inside the thread, so OS keyboard handles never
    /// cross threads.  `capacity` bounds the snapshot channel.
    pub fn spawn<F>(
        source: Box<dyn PoseSource>,
        classifier: GestureClassifier,
        make_actuator: F,
        capacity: usize,
    ) -> Result<Worker, ControllerError>
    where
        F: FnOnce() -> Actuator + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        let stop = StopFlag::new();
        let worker_stop = stop.clone();

        let handle = thread::Builder::new()
            .name("pose-worker".into())
            .spawn(move || {
                let actuator = make_actuator();
                Session::new(source, classifier, actuator, ChannelPresenter::new(tx))
                    .with_stop_flag(worker_stop)
                    .run()
            })
            .map_err(ControllerError::Spawn)?;

        Ok(Worker { rx, stop, handle: Some(handle) })
    }

    /// The most recent snapshot, discarding anything older.
    pub fn latest(&self) -> Option<Snapshot> {
        let mut last = None;
        loop {
            match self.rx.try_recv() {
                Ok(s) => last = Some(s),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return last,
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Ask the session to stop and wait up to `timeout` for it.
    ///
    /// Returns `Ok(None)` when the thread didn't finish in time; it is left
    /// detached.
    pub fn shutdown(mut self, timeout: Duration) -> Result<Option<SessionSummary>, ControllerError> {
        self.stop.request();
        let Some(handle) = self.handle.take() else { return Ok(None) };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("pose worker did not stop within {:?}; detaching it", timeout);
                return Ok(None);
            }
            thread::sleep(Duration::from_millis(5));
        }

        match handle.join() {
            Ok(result) => {
                info!("pose worker stopped");
                result.map(Some)
            }
            Err(_) => Err(ControllerError::WorkerPanicked),
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop.request();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
