// libseader-rs/libseader/src/credential/mod.rs

//! Turning the SAM's final answer into a credential.

pub mod pacs;
pub mod sio;

use derive_more::Display;

pub use pacs::{PacsBits, unpack_pacs};
pub use sio::CredentialDraft;

/// Physical card family the credential was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardKind {
    #[display(fmt = "iClass/Picopass")]
    Picopass,
    #[display(fmt = "DESFire")]
    Desfire,
    #[display(fmt = "MIFARE Classic")]
    MifareClassic,
    #[display(fmt = "ISO14443-4A")]
    Iso14443_4a,
}

impl CardKind {
    /// Classify an ISO14443-A card by ATQA and SAK.
    pub fn classify(atqa: [u8; 2], sak: u8) -> Self {
        match (atqa, sak) {
            ([0x44, 0x03], 0x20) => Self::Desfire,
            ([0x44 | 0x04, _], 0x08 | 0x88 | 0x09) => Self::MifareClassic,
            ([0x01, 0x0F], 0x01) => Self::MifareClassic,
            ([0x42 | 0x02, _], 0x18) => Self::MifareClassic,
            _ => Self::Iso14443_4a,
        }
    }
}

/// Access credential extracted from a card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Credential {
    pub bit_length: u16,
    /// Right-justified credential bits
    pub value: u64,
    pub kind: Option<CardKind>,
    pub sio: Option<Vec<u8>>,
    pub diversifier: Option<Vec<u8>>,
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bit: {:x}", self.bit_length, self.value)?;
        if let Some(kind) = self.kind {
            write!(f, " ({})", kind)?;
        }
        Ok(())
    }
}
