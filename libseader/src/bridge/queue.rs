// libseader-rs/libseader/src/bridge/queue.rs

//! PendingApdu: SAM answers on their way from the transport thread to the
//! poller callback. The producer never waits longer than its push timeout;
//! an answer that does not fit in time is dropped.

use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError, bounded};
use log::{debug, warn};

use crate::utils::hex_preview;
use crate::{Error, Result};

/// Accepted queue capacities
pub const MIN_QUEUE_CAPACITY: usize = 2;
pub const MAX_QUEUE_CAPACITY: usize = 3;

#[derive(Debug, Clone)]
pub struct ApduProducer {
    tx: Sender<Vec<u8>>,
    push_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ApduConsumer {
    rx: Receiver<Vec<u8>>,
}

pub fn pending_apdu(capacity: usize, push_timeout: Duration) -> Result<(ApduProducer, ApduConsumer)> {
    if !(MIN_QUEUE_CAPACITY..=MAX_QUEUE_CAPACITY).contains(&capacity) {
        return Err(Error::InvalidConfig(format!(
            "queue capacity {} outside {}..={}",
            capacity, MIN_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY
        )));
    }
    let (tx, rx) = bounded(capacity);
    Ok((ApduProducer { tx, push_timeout }, ApduConsumer { rx }))
}

impl ApduProducer {
    pub fn push(&self, apdu: Vec<u8>) -> Result<()> {
        match self.tx.send_timeout(apdu, self.push_timeout) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(apdu)) => {
                warn!("pending APDU queue full, dropping [{}]", hex_preview(&apdu, 16));
                Err(Error::QueueFull)
            }
            Err(SendTimeoutError::Disconnected(_)) => Err(Error::Disconnected),
        }
    }
}

impl ApduConsumer {
    /// Take the next answer without blocking.
    pub fn try_pop(&self) -> Option<Vec<u8>> {
        match self.rx.try_recv() {
            Ok(apdu) => Some(apdu),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Discard everything queued. Returns how many answers were dropped.
    pub fn drain(&self) -> usize {
        let dropped = self.rx.try_iter().count();
        if dropped > 0 {
            debug!("discarded {} queued APDUs", dropped);
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.rx.capacity().unwrap_or(0)
    }
}
