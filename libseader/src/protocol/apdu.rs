// libseader-rs/libseader/src/protocol/apdu.rs

//! The APDU envelope between the host and the SAM. Encoded payloads travel
//! inside a proprietary `A0 DA 02 63` command; replies end in an ISO7816
//! status word.

use crate::constants::{APDU_HEADER_LEN, MAX_APDU_LEN, SAM_APDU_HEADER, SW1_MORE_DATA, SW1_SUCCESS};
use crate::protocol::parser::split_status_word;
use crate::{Error, Result};

/// Wrap an encoded payload (routing prefix included) in the SAM APDU.
pub fn encode_sam_apdu(body: &[u8]) -> Result<Vec<u8>> {
    if body.len() > u8::MAX as usize || APDU_HEADER_LEN + body.len() > MAX_APDU_LEN {
        return Err(Error::InvalidLength {
            expected: (MAX_APDU_LEN - APDU_HEADER_LEN).min(u8::MAX as usize),
            actual: body.len(),
        });
    }

    let mut apdu = Vec::with_capacity(APDU_HEADER_LEN + body.len());
    apdu.extend_from_slice(&SAM_APDU_HEADER);
    apdu.push(body.len() as u8);
    apdu.extend_from_slice(body);
    Ok(apdu)
}

/// GET RESPONSE for `available` pending bytes
pub fn get_response(available: u8) -> [u8; 5] {
    [0x00, 0xC0, 0x00, 0x00, available]
}

/// Classification of a SAM reply by its status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApduReply<'a> {
    /// `90 00` with a non-empty body
    Success(&'a [u8]),
    /// `61 xx`: `xx` more bytes wait behind a GET RESPONSE
    MoreData(u8),
    /// Anything else, including a bare `90 00`
    Status { sw1: u8, sw2: u8 },
}

impl<'a> ApduReply<'a> {
    pub fn parse(apdu: &'a [u8]) -> Result<Self> {
        let (body, sw1, sw2) = split_status_word(apdu)?;
        Ok(match (sw1, sw2) {
            (SW1_MORE_DATA, n) => Self::MoreData(n),
            (SW1_SUCCESS, 0x00) if !body.is_empty() => Self::Success(body),
            (sw1, sw2) => Self::Status { sw1, sw2 },
        })
    }
}
