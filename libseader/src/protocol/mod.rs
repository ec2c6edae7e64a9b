// libseader-rs/libseader/src/protocol/mod.rs

pub mod apdu;
pub mod ccid;
pub mod checksum;
pub mod frame;
pub mod parser;

pub use apdu::{ApduReply, encode_sam_apdu, get_response};
pub use ccid::{CcidEvent, CcidMessage, Framer, SlotChange, SlotEvent, drain_events};
pub use checksum::{append_crc16_picopass, crc16_picopass, lrc};
pub use frame::{CcidHeader, SerialFrame};
