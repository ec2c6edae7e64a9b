// libseader-rs/libseader/src/transport/traits.rs

use crate::Result;

/// Byte link to the SAM reader.
///
/// The worker reads and writes from two threads, so a transport must be
/// able to hand out a second handle onto the same link.
pub trait Transport: Send {
    /// Write all bytes to the link
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Return whatever bytes arrive within `timeout_ms`. Fails with
    /// `Error::Timeout` when nothing arrived.
    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>>;

    /// Second handle onto the same link
    fn try_clone(&self) -> Result<Box<dyn Transport>>;

    /// Release the link. Further I/O fails.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
