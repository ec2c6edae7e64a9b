// libseader-rs/libseader/src/protocol/checksum.rs

/// Longitudinal redundancy check of a serial frame: XOR of every byte
/// preceding the checksum.
pub fn lrc(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Picopass preload for the ISO13239 CRC
const PICOPASS_CRC_PRELOAD: u16 = 0xE012;

/// ISO13239 CRC-16 with the Picopass preload and no final inversion.
pub fn crc16_picopass(data: &[u8]) -> u16 {
    data.iter().fold(PICOPASS_CRC_PRELOAD, |crc, &byte| {
        let mut dat = byte ^ (crc & 0xFF) as u8;
        dat ^= dat << 4;
        let dat = dat as u16;
        (crc >> 8) ^ (dat << 8) ^ (dat << 3) ^ (dat >> 4)
    })
}

/// Append the Picopass CRC little-endian, as it travels on the air.
pub fn append_crc16_picopass(buf: &mut Vec<u8>) {
    let crc = crc16_picopass(buf);
    buf.extend_from_slice(&crc.to_le_bytes());
}
