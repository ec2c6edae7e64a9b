// libseader-rs/libseader/src/credential/sio.rs

use log::debug;

use super::{CardKind, Credential};
use crate::constants::{
    DESFIRE_READ_SIO, READ4_BLOCK6, READ4_BLOCK9, READ4_BLOCK10, READ4_BLOCK13, SIO_MAX_LEN,
};
use crate::utils::bytes_to_hex;

/// First byte of a well-formed SIO (DER SEQUENCE)
const SIO_START: u8 = 0x30;

/// Bytes of a Picopass READ4 reply (4 blocks of 8)
const READ4_LEN: usize = 32;

/// What is learned about a card during one read, ahead of the PACS answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialDraft {
    pub kind: Option<CardKind>,
    pub diversifier: Option<Vec<u8>>,
    sio: Vec<u8>,
}

impl CredentialDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything from the previous read.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn sio(&self) -> &[u8] {
        &self.sio
    }

    /// Inspect one card exchange and keep any SIO bytes it carries.
    pub fn capture_sio(&mut self, tx: &[u8], rx: &[u8]) {
        if tx == READ4_BLOCK6 || tx == READ4_BLOCK10 {
            if rx.len() >= READ4_LEN && rx[0] == SIO_START {
                self.place(0, &rx[..READ4_LEN]);
                debug!("SIO head captured from block {}", tx[1]);
            }
        } else if tx == READ4_BLOCK9 || tx == READ4_BLOCK13 {
            if rx.len() >= READ4_LEN {
                self.place(READ4_LEN, &rx[8..READ4_LEN]);
                debug!("SIO tail captured from block {}", tx[1]);
            }
        } else if tx == DESFIRE_READ_SIO && rx.len() > 2 && rx[0] == SIO_START {
            let body = &rx[..rx.len() - 2];
            self.sio.clear();
            self.place(0, body);
            debug!("SIO captured from DESFire [{}]", bytes_to_hex(body));
        }
    }

    fn place(&mut self, offset: usize, bytes: &[u8]) {
        let end = (offset + bytes.len()).min(SIO_MAX_LEN);
        if offset >= end {
            return;
        }
        if self.sio.len() < end {
            self.sio.resize(end, 0);
        }
        self.sio[offset..end].copy_from_slice(&bytes[..end - offset]);
    }

    /// Merge the draft into a freshly unpacked credential.
    pub fn finish(&self, mut credential: Credential) -> Credential {
        credential.kind = self.kind;
        credential.diversifier = self.diversifier.clone();
        credential.sio = match self.sio.first() {
            Some(&SIO_START) => Some(self.sio.clone()),
            _ => None,
        };
        credential
    }
}
