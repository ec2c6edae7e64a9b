// libseader-rs/libseader/src/types.rs

use crate::Error;
use crate::constants::PAYLOAD_PREFIX_LEN;
use derive_more::Display;
use std::convert::TryFrom;

/// Payload routing addresses placed ahead of every DER body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{:02x}/{:02x}/{:02x}", to, from, reply_to)]
pub struct Routing {
    pub to: u8,
    pub from: u8,
    pub reply_to: u8,
}

impl Routing {
    /// SAM commands (version, serial, card detected, PACS request)
    pub const SAM_COMMAND: Self = Self::new(0x44, 0x0A, 0x44);
    /// Card replies forwarded to the SAM
    pub const NFC_RX: Self = Self::new(0x14, 0x0A, 0x00);
    /// Acknowledgement of a field-off command
    pub const NFC_ACK: Self = Self::new(0x44, 0x0A, 0x00);

    pub const fn new(to: u8, from: u8, reply_to: u8) -> Self {
        Self { to, from, reply_to }
    }

    /// The 6-byte prefix: routing followed by three zero bytes
    pub fn prefix(&self) -> [u8; PAYLOAD_PREFIX_LEN] {
        [self.to, self.from, self.reply_to, 0, 0, 0]
    }
}

impl TryFrom<&[u8]> for Routing {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < 3 {
            return Err(Error::InvalidLength {
                expected: 3,
                actual: bytes.len(),
            });
        }
        Ok(Self::new(bytes[0], bytes[1], bytes[2]))
    }
}

/// Card unique identifier (UID for ISO14443, CSN for Picopass)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Uid(Vec<u8>);

impl Uid {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

/// CCID slot index. The SAM reader exposes two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "slot {}", _0)]
pub struct Slot(u8);

impl Slot {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// The slot probed after this one while looking for a SAM
    pub fn other(&self) -> Self {
        Self(self.0 ^ 1)
    }
}

impl TryFrom<u8> for Slot {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (value as usize) < crate::constants::SLOT_COUNT {
            Ok(Self(value))
        } else {
            Err(Error::InvalidSlot(value))
        }
    }
}
