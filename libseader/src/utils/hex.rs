//! Hex formatting for frame and payload logging.
//!
//! Log lines in this crate print raw wire bytes; `hex_preview` bounds the
//! length so a runaway buffer does not flood the log.

use std::fmt::Write;

/// Lowercase hex without separators.
///
/// Example: `&[0x03, 0x06]` -> `"0306"`
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // write! never fails writing to a String
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

/// Lowercase hex with a single space between bytes.
///
/// Example: `&[0x03, 0x06]` -> `"03 06"`
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            s.push(' ');
        }
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

/// Hex of at most `max` bytes, suffixed with the omitted count.
pub fn hex_preview(bytes: &[u8], max: usize) -> String {
    if bytes.len() <= max {
        return bytes_to_hex(bytes);
    }
    format!("{}..(+{})", bytes_to_hex(&bytes[..max]), bytes.len() - max)
}

/// Parse a hex string, ignoring ASCII whitespace.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = s.bytes().filter(|c| !c.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err("hex string has odd length".to_string());
    }

    digits
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).map_err(|e| e.to_string())?;
            u8::from_str_radix(text, 16).map_err(|e| format!("invalid hex pair '{}': {}", text, e))
        })
        .collect()
}
