//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize the reader/SAM simulation and mock card setup
//! so tests across the crate and tests/ directory can reuse the same logic.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::bridge::{CardPoller, Iso14443aInfo, PollerKind, Priority, PriorityControl, TransceiveError};
use crate::constants::*;
use crate::payload::{self, Payload};
use crate::protocol::frame::{CcidHeader, SerialFrame};
use crate::types::Routing;

/// Routing the SAM uses for its own answers
pub const SAM_REPLY_ROUTING: Routing = Routing::new(0x0A, 0x44, 0x0A);

/// Build a reader-to-host frame.
#[doc(hidden)]
pub fn reader_frame(message_type: u8, slot: u8, sequence: u8, status: u8, error: u8, payload: &[u8]) -> Vec<u8> {
    let header = CcidHeader {
        message_type,
        slot,
        sequence,
        params: [status, error, 0x00],
    };
    SerialFrame::encode(&header, payload).unwrap_or_default()
}

#[doc(hidden)]
pub fn slot_status(slot: u8, status: u8) -> Vec<u8> {
    reader_frame(CCID_SLOT_STATUS, slot, 0, status, 0x00, &[])
}

#[doc(hidden)]
pub fn data_block(slot: u8, payload: &[u8]) -> Vec<u8> {
    reader_frame(CCID_DATA_BLOCK, slot, 0, 0x00, 0x00, payload)
}

/// A payload as the SAM answers it: prefixed DER followed by `90 00`.
#[doc(hidden)]
pub fn sam_apdu_reply(payload: &Payload) -> Vec<u8> {
    let mut apdu = payload::encode(payload, SAM_REPLY_ROUTING).unwrap_or_default();
    apdu.extend_from_slice(&[SW1_SUCCESS, 0x00]);
    apdu
}

/// Responder for [`MockTransport::set_responder`](crate::transport::MockTransport::set_responder)
/// that behaves like a reader with a SAM in `sam_slot`. Each XfrBlock is
/// answered with the next scripted APDU reply.
#[doc(hidden)]
pub fn sam_responder(
    sam_slot: u8,
    apdu_replies: Vec<Vec<u8>>,
) -> impl FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static {
    let mut replies: VecDeque<Vec<u8>> = apdu_replies.into();
    move |frame: &[u8]| {
        let Ok((header, _)) = SerialFrame::decode(frame) else {
            return Vec::new();
        };
        let slot = header.slot;
        let seq = header.sequence;
        let reply = match header.message_type {
            CCID_GET_SLOT_STATUS if slot == sam_slot => {
                reader_frame(CCID_SLOT_STATUS, slot, seq, 0x00, 0x00, &[])
            }
            CCID_GET_SLOT_STATUS => reader_frame(CCID_SLOT_STATUS, slot, seq, 0x02, 0x00, &[]),
            CCID_POWER_ON if slot == sam_slot => {
                reader_frame(CCID_DATA_BLOCK, slot, seq, 0x00, 0x00, &SAM_ATR)
            }
            CCID_POWER_ON => reader_frame(CCID_SLOT_STATUS, slot, seq, 0x02, 0x00, &[]),
            CCID_SET_PARAMETERS => reader_frame(CCID_PARAMETERS, slot, seq, 0x00, 0x00, &[0x11]),
            CCID_XFR_BLOCK => match replies.pop_front() {
                Some(apdu) => reader_frame(CCID_DATA_BLOCK, slot, seq, 0x00, 0x00, &apdu),
                None => return Vec::new(),
            },
            _ => return Vec::new(),
        };
        vec![reply]
    }
}

/// PriorityControl that records every change.
#[derive(Debug, Clone, Default)]
pub struct RecordingPriority {
    calls: Arc<Mutex<Vec<Priority>>>,
}

impl RecordingPriority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Priority> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PriorityControl for RecordingPriority {
    fn set_priority(&mut self, priority: Priority) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(priority);
    }
}

/// Scripted contactless card
#[derive(Debug, Clone)]
pub struct MockPoller {
    pub kind: PollerKind,
    pub uid: Vec<u8>,
    pub info: Option<Iso14443aInfo>,
    pub replies: VecDeque<Result<Vec<u8>, TransceiveError>>,
    pub sent: Vec<(Vec<u8>, Duration)>,
}

impl MockPoller {
    pub fn picopass(uid: &[u8]) -> Self {
        Self {
            kind: PollerKind::Picopass,
            uid: uid.to_vec(),
            info: None,
            replies: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    pub fn iso14443a(uid: &[u8], atqa: [u8; 2], sak: u8) -> Self {
        Self {
            kind: PollerKind::Iso14443_4a,
            uid: uid.to_vec(),
            info: Some(Iso14443aInfo { atqa, sak }),
            replies: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    pub fn push_reply(&mut self, reply: Result<Vec<u8>, TransceiveError>) {
        self.replies.push_back(reply);
    }
}

impl CardPoller for MockPoller {
    fn kind(&self) -> PollerKind {
        self.kind
    }

    fn uid(&self) -> Vec<u8> {
        self.uid.clone()
    }

    fn iso14443a_info(&self) -> Option<Iso14443aInfo> {
        self.info
    }

    fn transceive(&mut self, tx: &[u8], timeout: Duration) -> Result<Vec<u8>, TransceiveError> {
        self.sent.push((tx.to_vec(), timeout));
        self.replies
            .pop_front()
            .unwrap_or(Err(TransceiveError::Timeout))
    }
}
