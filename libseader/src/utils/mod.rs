//! Small helpers shared across the crate: hex formatting for logs and the
//! default link timings.

pub mod hex;
pub mod timeout;

pub use self::hex::*;
pub use self::timeout::*;
