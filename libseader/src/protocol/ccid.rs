// libseader-rs/libseader/src/protocol/ccid.rs

//! CCID over serial: the stream parser for reader replies and the encoder
//! for the four commands sent to the reader.

use log::{debug, warn};

use crate::constants::*;
use crate::protocol::frame::{CcidHeader, SerialFrame};
use crate::types::Slot;
use crate::utils::bytes_to_hex;
use crate::Result;

/// Card presence change reported for one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEvent {
    CardIn,
    CardOut,
}

/// Decoded NotifySlotChange: one optional event per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotChange {
    pub slots: [Option<SlotEvent>; SLOT_COUNT],
}

impl SlotChange {
    /// Interpret the status byte as two independent 2-bit fields.
    pub fn from_status(status: u8) -> Self {
        let slot0 = match status & SLOT_0_MASK {
            CARD_IN_0 => Some(SlotEvent::CardIn),
            CARD_OUT_0 => Some(SlotEvent::CardOut),
            _ => None,
        };
        let slot1 = match status & SLOT_1_MASK {
            CARD_IN_1 => Some(SlotEvent::CardIn),
            CARD_OUT_1 => Some(SlotEvent::CardOut),
            _ => None,
        };
        Self {
            slots: [slot0, slot1],
        }
    }

    /// Iterate `(slot, event)` pairs that carry an event
    pub fn events(&self) -> impl Iterator<Item = (Slot, SlotEvent)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|e| (Slot::try_from(i as u8).unwrap_or(Slot::ZERO), e)))
    }
}

/// Parsed view over a received frame. The payload borrows the receive
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcidMessage<'a> {
    pub message_type: u8,
    pub length: usize,
    pub slot: u8,
    pub sequence: u8,
    pub status: u8,
    pub error: u8,
    pub chain: u8,
    pub payload: &'a [u8],
}

impl<'a> CcidMessage<'a> {
    fn from_parts(header: CcidHeader, payload: &'a [u8]) -> Self {
        Self {
            message_type: header.message_type,
            length: payload.len(),
            slot: header.slot,
            sequence: header.sequence,
            status: header.params[0],
            error: header.params[1],
            chain: header.params[2],
            payload,
        }
    }
}

/// One unit of reader output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcidEvent<'a> {
    SlotChange(SlotChange),
    Message(CcidMessage<'a>),
}

/// Stream parser and command encoder. Holds the per-slot sequence
/// counters; everything else about a frame is stateless.
#[derive(Debug, Default)]
pub struct Framer {
    sequence: [u8; SLOT_COUNT],
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number for `slot`. Counters wrap to 0 instead of
    /// issuing 255.
    pub fn next_sequence(&mut self, slot: Slot) -> u8 {
        let seq = &mut self.sequence[slot.index()];
        if *seq > 254 {
            *seq = 0;
        }
        let current = *seq;
        *seq = seq.wrapping_add(1);
        current
    }

    /// Sequence number the next command on `slot` will carry
    pub fn peek_sequence(&self, slot: Slot) -> u8 {
        self.sequence[slot.index()]
    }

    pub fn reset_sequence(&mut self, slot: Slot) {
        self.sequence[slot.index()] = 0;
    }

    pub fn encode_power_on(&mut self, slot: Slot) -> Result<Vec<u8>> {
        self.encode(CCID_POWER_ON, slot, [0, 0, 0], &[])
    }

    pub fn encode_get_slot_status(&mut self, slot: Slot) -> Result<Vec<u8>> {
        self.encode(CCID_GET_SLOT_STATUS, slot, [0, 0, 0], &[])
    }

    /// SetParameters selecting T=1 with the reader's default parameters
    pub fn encode_set_parameters(&mut self, slot: Slot) -> Result<Vec<u8>> {
        self.encode(CCID_SET_PARAMETERS, slot, [PROTOCOL_T1, 0, 0], &[])
    }

    pub fn encode_xfr_block(&mut self, slot: Slot, data: &[u8]) -> Result<Vec<u8>> {
        self.encode(CCID_XFR_BLOCK, slot, [0, 0, 0], data)
    }

    fn encode(
        &mut self,
        message_type: u8,
        slot: Slot,
        params: [u8; 3],
        data: &[u8],
    ) -> Result<Vec<u8>> {
        let header = CcidHeader {
            message_type,
            slot: slot.as_u8(),
            sequence: self.next_sequence(slot),
            params,
        };
        let frame = SerialFrame::encode(&header, data)?;
        debug!("ccid tx {}", bytes_to_hex(&frame));
        Ok(frame)
    }

    /// Parse the front of `buf`.
    ///
    /// Returns the number of bytes the caller must drain and, when a unit
    /// was complete, the event. A partial frame is never consumed: only the
    /// garbage skipped ahead of it is reported, so the caller keeps the
    /// partial bytes and feeds again once more data has arrived. Callers
    /// loop while the consumed count is nonzero.
    pub fn feed<'a>(buf: &'a [u8]) -> (usize, Option<CcidEvent<'a>>) {
        let mut pos = 0usize;

        loop {
            let rest = &buf[pos..];
            if rest.len() < 2 {
                return (pos, None);
            }

            if is_slot_change(rest) {
                let change = SlotChange::from_status(rest[1]);
                return (pos + 2, Some(CcidEvent::SlotChange(change)));
            }

            if rest[0] == SYNC && rest[1] == NAK {
                if rest.len() < 3 {
                    return (pos, None);
                }
                debug!("ccid nak {:02x}", rest[2]);
                pos += 3;
                continue;
            }

            if rest[0] != SYNC || rest[1] != CTRL {
                if rest.len() > 2 {
                    pos += 1;
                    continue;
                }
                return (pos, None);
            }

            if rest.len() < FRAME_HEADER_LEN {
                return (pos, None);
            }

            let total = match SerialFrame::expected_len(rest) {
                Ok(total) => total,
                Err(e) => {
                    warn!("ccid resync: {}", e);
                    pos += 1;
                    continue;
                }
            };
            if rest.len() < total {
                return (pos, None);
            }

            match SerialFrame::decode(&rest[..total]) {
                Ok((header, payload)) => {
                    debug!("ccid rx {}", bytes_to_hex(&rest[..total]));
                    let message = CcidMessage::from_parts(header, payload);
                    return (pos + total, Some(CcidEvent::Message(message)));
                }
                Err(e) => {
                    warn!("ccid resync: {}", e);
                    pos += 1;
                }
            }
        }
    }
}

/// NotifySlotChange short form. The status byte only uses its low nibble;
/// with more data buffered the next byte must start a frame or another
/// notification, which keeps 0x50 inside line noise from matching.
fn is_slot_change(buf: &[u8]) -> bool {
    if buf.len() < 2 || buf[0] != CCID_NOTIFY_SLOT_CHANGE || buf[1] & 0xF0 != 0 {
        return false;
    }
    buf.len() == 2 || buf[2] == SYNC || buf[2] == CCID_NOTIFY_SLOT_CHANGE
}

/// Drain every complete unit from `buf`, handing each to `on_event`.
pub fn drain_events<F>(buf: &mut Vec<u8>, mut on_event: F) -> Result<()>
where
    F: FnMut(CcidEvent<'_>) -> Result<()>,
{
    loop {
        let (consumed, event) = Framer::feed(buf.as_slice());
        if let Some(event) = event {
            on_event(event)?;
        }
        if consumed == 0 {
            return Ok(());
        }
        buf.drain(..consumed);
    }
}

/// Validate a slot byte received from the reader
pub fn message_slot(message: &CcidMessage<'_>) -> Result<Slot> {
    Slot::try_from(message.slot)
}
