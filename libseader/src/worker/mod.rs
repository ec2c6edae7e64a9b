// libseader-rs/libseader/src/worker/mod.rs

pub mod builder;
pub mod config;
pub mod events;
pub mod handle;
mod threads;

pub use builder::WorkerBuilder;
pub use config::WorkerConfig;
pub use events::{StopHandle, StopSignal, WorkerEvent, stop_signal};
pub use handle::{Idle, Running, SeaderWorker};
