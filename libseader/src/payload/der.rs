// libseader-rs/libseader/src/payload/der.rs
//! Thin helpers over `iso7816_tlv::ber` for building and picking apart the
//! SAM's DER structures.

use iso7816_tlv::ber::{Tag, Tlv, Value};

use crate::{Error, Result};

pub(crate) fn tag(byte: u8) -> Result<Tag> {
    Ok(Tag::try_from(byte)?)
}

pub(crate) fn primitive(t: u8, bytes: &[u8]) -> Result<Tlv> {
    Ok(Tlv::new(tag(t)?, Value::Primitive(bytes.to_vec()))?)
}

pub(crate) fn null(t: u8) -> Result<Tlv> {
    primitive(t, &[])
}

pub(crate) fn constructed(t: u8, children: Vec<Tlv>) -> Result<Tlv> {
    Ok(Tlv::new(tag(t)?, Value::Constructed(children))?)
}

pub(crate) fn integer(t: u8, value: i64) -> Result<Tlv> {
    primitive(t, &encode_integer(value))
}

/// Minimal two's complement encoding of a DER INTEGER
pub fn encode_integer(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

pub fn decode_integer(bytes: &[u8]) -> Result<i64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(Error::Decode(format!("integer of {} bytes", bytes.len())));
    }
    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut buf = [fill; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(i64::from_be_bytes(buf))
}

/// Parse one TLV off the front of `bytes`.
pub(crate) fn parse_one(bytes: &[u8]) -> Result<(Tlv, &[u8])> {
    let (tlv, rest) = Tlv::parse(bytes);
    Ok((tlv?, rest))
}

pub(crate) fn is_tag(tlv: &Tlv, t: u8) -> bool {
    Tag::try_from(t).map(|t| tlv.tag() == &t).unwrap_or(false)
}

pub(crate) fn primitive_value(tlv: &Tlv) -> Result<&[u8]> {
    match tlv.value() {
        Value::Primitive(bytes) => Ok(bytes.as_slice()),
        Value::Constructed(_) => Err(Error::Decode("expected primitive value".into())),
    }
}

pub(crate) fn children(tlv: &Tlv) -> Result<&[Tlv]> {
    match tlv.value() {
        Value::Constructed(children) => Ok(children.as_slice()),
        Value::Primitive(_) => Err(Error::Decode("expected constructed value".into())),
    }
}

/// The single element inside an explicit CHOICE wrapper
pub(crate) fn single_child(tlv: &Tlv) -> Result<&Tlv> {
    match children(tlv)? {
        [only] => Ok(only),
        other => Err(Error::Decode(format!(
            "expected one choice element, got {}",
            other.len()
        ))),
    }
}

pub(crate) fn find(children: &[Tlv], t: u8) -> Option<&Tlv> {
    children.iter().find(|c| is_tag(c, t))
}

pub(crate) fn require<'a>(children: &'a [Tlv], t: u8, field: &str) -> Result<&'a Tlv> {
    find(children, t).ok_or_else(|| Error::Decode(format!("missing field {}", field)))
}
