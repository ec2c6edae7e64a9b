// libseader-rs/libseader/src/credential/pacs.rs

use log::debug;

use super::Credential;
use crate::payload::der::{parse_one, primitive_value};
use crate::payload::tags::BIT_STRING;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// Width of the credential value in bytes
pub const CREDENTIAL_WIDTH: usize = 8;

/// Decoded PACS bit string, before it is turned into a number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacsBits {
    pub bits_unused: u8,
    pub bytes: Vec<u8>,
}

impl PacsBits {
    /// Parse a DER BIT STRING. The universal tag and implicit
    /// context-specific tags are both accepted.
    pub fn parse(der: &[u8]) -> Result<Self> {
        let first = *der.first().ok_or(Error::InvalidLength {
            expected: 2,
            actual: 0,
        })?;
        if first != BIT_STRING && first & 0xE0 != 0x80 {
            return Err(Error::Decode(format!("PACS tag {:#04x}", first)));
        }

        let (tlv, _) = parse_one(der)?;
        match primitive_value(&tlv)?.split_first() {
            Some((&bits_unused, bytes)) if bits_unused <= 7 => {
                if bytes.is_empty() && bits_unused != 0 {
                    return Err(Error::Decode("empty bit string with unused bits".into()));
                }
                Ok(Self {
                    bits_unused,
                    bytes: bytes.to_vec(),
                })
            }
            Some((&bits_unused, _)) => Err(Error::Decode(format!(
                "{} unused bits in bit string",
                bits_unused
            ))),
            None => Err(Error::Decode("bit string without unused-bits octet".into())),
        }
    }

    pub fn bit_length(&self) -> usize {
        self.bytes.len() * 8 - self.bits_unused as usize
    }
}

/// Turn PACS bits into a right-justified number.
pub fn unpack_bits(bits: &PacsBits) -> Result<(u16, u64)> {
    let size = bits.bytes.len();
    if size > CREDENTIAL_WIDTH {
        return Err(Error::PacsTooLarge { size });
    }

    let bit_length = bits.bit_length();
    let mut buf = [0u8; CREDENTIAL_WIDTH];
    buf[..size].copy_from_slice(&bits.bytes);
    let value = u64::from_be_bytes(buf)
        .checked_shr((64 - bit_length) as u32)
        .unwrap_or(0);

    Ok((bit_length as u16, value))
}

/// Unpack the SAM's PACS answer into a bare credential.
pub fn unpack_pacs(der: &[u8]) -> Result<Credential> {
    let bits = PacsBits::parse(der)?;
    let (bit_length, value) = unpack_bits(&bits)?;
    debug!(
        "pacs [{}]: {} bits, {:016x}",
        bytes_to_hex(&bits.bytes),
        bit_length,
        value
    );
    Ok(Credential {
        bit_length,
        value,
        ..Credential::default()
    })
}
