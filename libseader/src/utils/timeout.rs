//! Default timings for the SAM link.
//!
//! The values follow what a SAM behind a UART tolerates: a short receive
//! poll so the transport thread stays responsive to stop requests, a
//! 100 ms back-off between slot status probes, and a one second ceiling on
//! any single reply.

use std::time::Duration;

/// Transport receive poll in milliseconds
pub const DEFAULT_RECEIVE_POLL_MS: u64 = 10;

/// Wait between slot status probes while looking for a SAM
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Longest wait for the reply to a frame before the next one is sent
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 1000;

/// Bounded wait of the queue producer before an item is dropped
pub const DEFAULT_QUEUE_PUSH_TIMEOUT_MS: u64 = 50;

/// Frame waiting time ceiling applied to card transceives
pub const DEFAULT_MAX_FWT_MS: u64 = 200;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Clamp a SAM-requested card timeout (milliseconds) to the FWT ceiling.
/// Zero or negative requests fall back to the ceiling.
pub fn card_timeout(requested_ms: i64, ceiling: Duration) -> Duration {
    if requested_ms <= 0 {
        return ceiling;
    }
    ms(requested_ms as u64).min(ceiling)
}
