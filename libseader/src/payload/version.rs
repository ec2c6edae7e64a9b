// libseader-rs/libseader/src/payload/version.rs

use derive_more::Display;

use super::der::{children, decode_integer, find, parse_one, primitive_value, require};
use super::tags::{SEQUENCE, VERSION_FIRMWARE, VERSION_TYPE, VERSION_VERSION};
use crate::{Error, Result};

/// Largest SAM answer that is still considered a version record
pub const MAX_VERSION_LEN: usize = 30;

/// Version record returned by the SAM for a `version` request
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "{}.{}", major, minor)]
pub struct SamVersion {
    pub major: u8,
    pub minor: u8,
    pub firmware: Vec<u8>,
    pub sam_type: Option<i64>,
}

impl SamVersion {
    /// Parse the raw SAM answer. The answer carries the fields of a
    /// SEQUENCE without the SEQUENCE header.
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.is_empty() || body.len() > MAX_VERSION_LEN {
            return Err(Error::InvalidLength {
                expected: MAX_VERSION_LEN,
                actual: body.len(),
            });
        }

        let mut wrapped = Vec::with_capacity(body.len() + 2);
        wrapped.push(SEQUENCE);
        wrapped.push(body.len() as u8);
        wrapped.extend_from_slice(body);

        let (tlv, _) = parse_one(&wrapped)?;
        let fields = children(&tlv)?;

        let (major, minor) = match primitive_value(require(fields, VERSION_VERSION, "version")?)? {
            [major, minor] => (*major, *minor),
            other => return Err(Error::Decode(format!("version of {} bytes", other.len()))),
        };
        let firmware = primitive_value(require(fields, VERSION_FIRMWARE, "firmware")?)?.to_vec();
        let sam_type = match find(fields, VERSION_TYPE) {
            Some(t) => Some(decode_integer(primitive_value(t)?)?),
            None => None,
        };

        Ok(Self {
            major,
            minor,
            firmware,
            sam_type,
        })
    }
}
