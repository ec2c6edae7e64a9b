// libseader-rs/libseader/src/worker/config.rs

use std::time::Duration;

use crate::bridge::queue::{MAX_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY};
use crate::sam::session::{DEFAULT_RETRY_BUDGET, SessionConfig};
use crate::utils::*;
use crate::{Error, Result};

/// Timing and sizing knobs of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorkerConfig {
    /// SlotStatus probes before the SAM is reported missing
    pub retry_budget: u8,
    pub retry_delay: Duration,
    /// PendingApdu capacity, 2 or 3
    pub queue_capacity: usize,
    /// Longest the transport thread waits on a full queue
    pub queue_push_timeout: Duration,
    /// Receive poll interval of the transport thread
    pub receive_poll: Duration,
    /// Longest the transmit thread waits for a reply before sending on
    pub reply_timeout: Duration,
    /// Ceiling for card timeouts requested by the SAM
    pub max_fwt: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
            retry_delay: ms(DEFAULT_RETRY_DELAY_MS),
            queue_capacity: MIN_QUEUE_CAPACITY,
            queue_push_timeout: ms(DEFAULT_QUEUE_PUSH_TIMEOUT_MS),
            receive_poll: ms(DEFAULT_RECEIVE_POLL_MS),
            reply_timeout: ms(DEFAULT_REPLY_TIMEOUT_MS),
            max_fwt: ms(DEFAULT_MAX_FWT_MS),
        }
    }
}

impl WorkerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_budget(mut self, retries: u8) -> Self {
        self.retry_budget = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_queue_push_timeout(mut self, timeout: Duration) -> Self {
        self.queue_push_timeout = timeout;
        self
    }

    pub fn with_receive_poll(mut self, poll: Duration) -> Self {
        self.receive_poll = poll;
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn with_max_fwt(mut self, fwt: Duration) -> Self {
        self.max_fwt = fwt;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_QUEUE_CAPACITY..=MAX_QUEUE_CAPACITY).contains(&self.queue_capacity) {
            return Err(Error::InvalidConfig(format!(
                "queue_capacity must be {}..={}, got {}",
                MIN_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY, self.queue_capacity
            )));
        }
        if self.receive_poll.is_zero() {
            return Err(Error::InvalidConfig("receive_poll must be non-zero".into()));
        }
        if self.reply_timeout.is_zero() {
            return Err(Error::InvalidConfig("reply_timeout must be non-zero".into()));
        }
        if self.max_fwt.is_zero() {
            return Err(Error::InvalidConfig("max_fwt must be non-zero".into()));
        }
        Ok(())
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            retry_budget: self.retry_budget,
            retry_delay: self.retry_delay,
        }
    }
}
