// libseader-rs/libseader/src/sam/mod.rs

pub mod link;
pub mod router;
pub mod session;

pub use link::{Handled, LinkRequest, SamContext, SamLink};
pub use router::{RouterAction, SamInfo, SamResponseRouter};
pub use session::{SamEvent, SamSession, SessionAction, SessionConfig, SessionPhase};
