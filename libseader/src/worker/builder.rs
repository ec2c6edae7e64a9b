// libseader-rs/libseader/src/worker/builder.rs

use super::config::WorkerConfig;
use super::handle::{Idle, SeaderWorker};
use crate::transport::Transport;
use crate::{Error, Result};

/// Helper to construct a worker with optional configuration.
#[derive(Default)]
pub struct WorkerBuilder {
    transport: Option<Box<dyn Transport>>,
    config: WorkerConfig,
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide an already-created transport instance (e.g. MockTransport)
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Open the serial device at `path`.
    #[cfg(feature = "serial")]
    pub fn with_serial_port(self, path: &str) -> Result<Self> {
        let transport = crate::transport::SerialTransport::open(path)?;
        Ok(self.with_transport(Box::new(transport)))
    }

    /// Consume the builder and return an idle worker. A transport is
    /// required.
    pub fn build(self) -> Result<SeaderWorker<Idle>> {
        match self.transport {
            Some(t) => SeaderWorker::new_with_transport(t, self.config),
            None => Err(Error::InvalidConfig("no transport provided".into())),
        }
    }
}
