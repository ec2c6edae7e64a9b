// libseader-rs/libseader/src/protocol/frame.rs

use crate::constants::{CTRL, FRAME_HEADER_LEN, FRAME_OVERHEAD, MAX_MESSAGE_LEN, SYNC};
use crate::protocol::checksum::lrc;
use crate::protocol::parser::{byte_at, ensure_len, le_u32_at};
use crate::{Error, Result};

/// CCID header fields carried inside a serial frame. For reader replies the
/// three parameter bytes are bStatus, bError and the chain/clock byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcidHeader {
    pub message_type: u8,
    pub slot: u8,
    pub sequence: u8,
    pub params: [u8; 3],
}

/// Serial frame helper.
/// Format: [SYNC(1)] [CTRL(1)] [Type(1)] [Len(4, LE)] [Slot(1)] [Seq(1)]
/// [Param0..2(3)] [Payload(n)] [LRC(1)]
pub struct SerialFrame;

impl SerialFrame {
    /// Encode a CCID message into a full serial frame
    pub fn encode(header: &CcidHeader, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > MAX_MESSAGE_LEN {
            return Err(Error::InvalidLength {
                expected: MAX_MESSAGE_LEN,
                actual: payload.len(),
            });
        }

        let mut out = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
        out.push(SYNC);
        out.push(CTRL);
        out.push(header.message_type);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.push(header.slot);
        out.push(header.sequence);
        out.extend_from_slice(&header.params);
        out.extend_from_slice(payload);
        out.push(lrc(&out));
        Ok(out)
    }

    /// Total frame size announced by a buffered header
    pub fn expected_len(buf: &[u8]) -> Result<usize> {
        ensure_len(buf, FRAME_HEADER_LEN)?;
        let len = le_u32_at(buf, 3)? as usize;
        if len > MAX_MESSAGE_LEN {
            return Err(Error::InvalidLength {
                expected: MAX_MESSAGE_LEN,
                actual: len,
            });
        }
        Ok(FRAME_OVERHEAD + len)
    }

    /// Decode exactly one complete frame, returning the header and a
    /// borrowed payload.
    pub fn decode(frame: &[u8]) -> Result<(CcidHeader, &[u8])> {
        if byte_at(frame, 0)? != SYNC || byte_at(frame, 1)? != CTRL {
            return Err(Error::FrameFormat("invalid sync/control".into()));
        }

        let total = Self::expected_len(frame)?;
        if frame.len() != total {
            return Err(Error::InvalidLength {
                expected: total,
                actual: frame.len(),
            });
        }

        let expected = lrc(&frame[..total - 1]);
        let actual = frame[total - 1];
        if expected != actual {
            return Err(Error::ChecksumMismatch { expected, actual });
        }

        let header = CcidHeader {
            message_type: frame[2],
            slot: frame[7],
            sequence: frame[8],
            params: [frame[9], frame[10], frame[11]],
        };
        Ok((header, &frame[FRAME_HEADER_LEN..total - 1]))
    }
}
