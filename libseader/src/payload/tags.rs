// libseader-rs/libseader/src/payload/tags.rs
//! DER tags of the SAM protocol. Context tags are implicit except where a
//! CHOICE is wrapped, which takes an explicit constructed tag.

/// Payload ::= CHOICE
pub const PAYLOAD_SAM_COMMAND: u8 = 0xA0;
pub const PAYLOAD_NFC_COMMAND: u8 = 0xA1;
pub const PAYLOAD_RESPONSE: u8 = 0xA2;
pub const PAYLOAD_ERROR_RESPONSE: u8 = 0xA3;

/// SamCommand ::= CHOICE
pub const SAM_REQUEST_PACS: u8 = 0xA1;
pub const SAM_SERIAL_NUMBER: u8 = 0x86;
pub const SAM_CARD_DETECTED: u8 = 0xAD;
pub const SAM_VERSION: u8 = 0x96;

/// RequestPacs ::= SEQUENCE
pub const REQUEST_PACS_CONTENT_ELEMENT: u8 = 0x80;
/// ContentElementTag implicitFormatPhysicalAccessBits
pub const CONTENT_ELEMENT_PACS_BITS: u8 = 0x04;

/// CardDetected ::= SEQUENCE
pub const CARD_DETECTED_DETAILS: u8 = 0xA0;

/// CardDetails ::= SEQUENCE
pub const CARD_CSN: u8 = 0x80;
pub const CARD_PROTOCOL: u8 = 0x81;
pub const CARD_SAK: u8 = 0x82;
pub const CARD_ATQA: u8 = 0x83;

/// NFCCommand ::= CHOICE
pub const NFC_SEND: u8 = 0xA1;
pub const NFC_OFF: u8 = 0x82;

/// NFCSend ::= SEQUENCE
pub const NFC_SEND_DATA: u8 = 0x80;
pub const NFC_SEND_PROTOCOL: u8 = 0x81;
pub const NFC_SEND_TIMEOUT: u8 = 0x82;
pub const NFC_SEND_FORMAT: u8 = 0x83;

/// Response ::= CHOICE
pub const RESPONSE_NFC: u8 = 0xA0;
pub const RESPONSE_SAM: u8 = 0x8A;

/// NFCResponse ::= CHOICE
pub const NFC_RESPONSE_RX: u8 = 0xA0;
pub const NFC_RESPONSE_ACK: u8 = 0x82;

/// NFCRx ::= SEQUENCE
pub const NFC_RX_DATA: u8 = 0x80;
pub const NFC_RX_STATUS: u8 = 0x81;

/// ErrorResponse ::= SEQUENCE
pub const ERROR_CODE: u8 = 0x80;
pub const ERROR_DATA: u8 = 0x81;

/// SamVersion ::= SEQUENCE
pub const SEQUENCE: u8 = 0x30;
pub const VERSION_VERSION: u8 = 0x80;
pub const VERSION_FIRMWARE: u8 = 0x81;
pub const VERSION_TYPE: u8 = 0x82;

/// PAC ::= BIT STRING
pub const BIT_STRING: u8 = 0x03;

/// FrameProtocol values carried in the second byte of `Protocol`
pub const FRAME_PROTOCOL_ICLASS: u8 = 0x01;
pub const FRAME_PROTOCOL_NFC: u8 = 0x02;
