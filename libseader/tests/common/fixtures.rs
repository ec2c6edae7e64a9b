// fixtures.rs — provides commonly used test payloads/frames

use libseader::payload::{
    CardDetails, FrameProtocol, NfcCommand, NfcSend, Payload, Response,
};

/// Version answer captured from a real SAM
pub const VERSION_BODY: [u8; 15] = [
    0x80, 0x02, 0x01, 0x29, 0x81, 0x06, 0x68, 0x3D, 0x05, 0x20, 0x26, 0xB6, 0x82, 0x01, 0x01,
];

pub const SERIAL_BODY: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

/// 24-bit credential with value 26
pub const PACS_24_BIT: [u8; 6] = [0x03, 0x04, 0x00, 0x00, 0x00, 0x1A];

pub fn sample_csn() -> Vec<u8> {
    vec![0x6C, 0x2B, 0x5A, 0x01, 0xF7, 0xFF, 0x12, 0xE0]
}

pub fn sample_uid() -> Vec<u8> {
    vec![0x04, 0x51, 0x2A, 0x72, 0x6B, 0x5C, 0x80]
}

/// READ4 reply for block 6 carrying the head of an SIO
pub fn sio_head() -> Vec<u8> {
    let mut rx = vec![0x30, 0x2E];
    rx.extend((0..30u8).map(|i| 0xA0 ^ i));
    rx
}

pub fn sam_response(bytes: &[u8]) -> Payload {
    Payload::Response(Response::Sam(bytes.to_vec()))
}

pub fn nfc_send(data: &[u8], protocol: FrameProtocol, timeout: i64) -> Payload {
    Payload::NfcCommand(NfcCommand::Send(NfcSend {
        data: data.to_vec(),
        protocol,
        timeout,
        format: None,
    }))
}

pub fn nfc_off() -> Payload {
    Payload::NfcCommand(NfcCommand::Off)
}

pub fn iclass_details() -> CardDetails {
    CardDetails {
        csn: sample_csn(),
        protocol: FrameProtocol::Iclass,
        sak: None,
        atqa: None,
    }
}
