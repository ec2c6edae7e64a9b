// libseader-rs/libseader/src/prelude.rs

pub use crate::bridge::{
    BridgeState, CardPoller, CardPollerBridge, Iso14443aInfo, NoopPriority, PollerCommand,
    PollerEvent, PollerKind, Priority, PriorityControl, TransceiveError,
};
pub use crate::credential::{CardKind, Credential};
pub use crate::payload::{Payload, SamVersion};
pub use crate::sam::SamInfo;
pub use crate::transport::{MockTransport, Transport};
pub use crate::worker::{Idle, Running, SeaderWorker, WorkerBuilder, WorkerConfig, WorkerEvent};
pub use crate::{Error, Result, Routing, Slot, Uid};

#[cfg(feature = "serial")]
pub use crate::transport::SerialTransport;

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, ms, parse_hex};
