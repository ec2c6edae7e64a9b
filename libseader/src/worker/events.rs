// libseader-rs/libseader/src/worker/events.rs

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};

use crate::credential::Credential;
use crate::sam::session::SamEvent;

/// Terminal outcomes delivered to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    SamMissing,
    SamPresent,
    SamWrong,
    Success(Credential),
    Fail,
}

impl From<SamEvent> for WorkerEvent {
    fn from(event: SamEvent) -> Self {
        match event {
            SamEvent::Present => Self::SamPresent,
            SamEvent::Missing => Self::SamMissing,
            SamEvent::Wrong => Self::SamWrong,
        }
    }
}

/// Observer side of a stop request. Nothing is ever sent on the channel;
/// dropping the [`StopHandle`] disconnects it, which wakes every waiter.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: Receiver<()>,
}

/// Owner side of a stop request
#[derive(Debug)]
pub struct StopHandle {
    tx: Option<Sender<()>>,
}

pub fn stop_signal() -> (StopHandle, StopSignal) {
    let (tx, rx) = bounded(0);
    (StopHandle { tx: Some(tx) }, StopSignal { rx })
}

impl StopHandle {
    pub fn stop(&mut self) {
        self.tx.take();
    }
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleep for `duration` unless stopped first. Returns true when stopped.
    pub fn sleep(&self, duration: Duration) -> bool {
        match self.rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => false,
            _ => true,
        }
    }
}
