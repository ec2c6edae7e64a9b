// libseader-rs/libseader/src/lib.rs

//! libseader
//!
//! Host side of a Secure Access Module reader: CCID framing over a serial
//! link, SAM discovery, the SAM's DER payload protocol, and the bridge that
//! relays SAM commands to a contactless card until a credential comes out.
#![warn(missing_docs)]

pub mod bridge;
pub mod constants;
pub mod credential;
pub mod error;
pub mod payload;
pub mod prelude;
pub mod protocol;
pub mod sam;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;
pub mod worker;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
