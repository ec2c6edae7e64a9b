// libseader-rs/libseader/src/bridge/mod.rs

//! The card side: relaying SAM commands to a contactless card from
//! inside the poller callback.

pub mod conversation;
pub mod poller;
pub mod priority;
pub mod queue;

pub use conversation::{BridgeState, CardPollerBridge};
pub use poller::{CardPoller, Iso14443aInfo, PollerCommand, PollerEvent, PollerKind, TransceiveError};
pub use priority::{NoopPriority, Priority, PriorityControl};
pub use queue::{ApduConsumer, ApduProducer, pending_apdu};
