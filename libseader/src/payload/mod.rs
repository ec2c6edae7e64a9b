// libseader-rs/libseader/src/payload/mod.rs

//! The structured SAM protocol carried inside CCID data blocks.
//!
//! Every message is a [`Payload`]: a command for the SAM, a command the SAM
//! issues for the card, a response travelling either way, or an error.
//! On the wire a payload is a 6-byte routing prefix followed by its DER
//! encoding; see [`codec`].

pub mod codec;
pub(crate) mod der;
pub mod tags;
pub mod version;

pub use codec::{decode, encode};
pub use version::SamVersion;

/// Frame protocol byte inside `Protocol ::= OCTET STRING (SIZE(2))`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameProtocol {
    Iclass,
    Nfc,
    Other(u8),
}

impl FrameProtocol {
    pub fn from_byte(b: u8) -> Self {
        match b {
            tags::FRAME_PROTOCOL_ICLASS => Self::Iclass,
            tags::FRAME_PROTOCOL_NFC => Self::Nfc,
            other => Self::Other(other),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Iclass => tags::FRAME_PROTOCOL_ICLASS,
            Self::Nfc => tags::FRAME_PROTOCOL_NFC,
            Self::Other(b) => *b,
        }
    }

    /// Two-byte `Protocol` octet string
    pub fn to_protocol_bytes(&self) -> [u8; 2] {
        [0x00, self.as_byte()]
    }
}

/// What the host reports about a freshly detected card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub csn: Vec<u8>,
    pub protocol: FrameProtocol,
    pub sak: Option<u8>,
    pub atqa: Option<[u8; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamCommand {
    /// Ask for the PACS bits (content element `implicitFormatPhysicalAccessBits`)
    RequestPacs,
    Version,
    SerialNumber,
    CardDetected(CardDetails),
}

/// Discriminant of a [`SamCommand`], used to remember what is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamCommandKind {
    RequestPacs,
    Version,
    SerialNumber,
    CardDetected,
}

impl SamCommand {
    pub fn kind(&self) -> SamCommandKind {
        match self {
            Self::RequestPacs => SamCommandKind::RequestPacs,
            Self::Version => SamCommandKind::Version,
            Self::SerialNumber => SamCommandKind::SerialNumber,
            Self::CardDetected(_) => SamCommandKind::CardDetected,
        }
    }
}

/// Transmit `data` to the card and report what comes back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcSend {
    pub data: Vec<u8>,
    pub protocol: FrameProtocol,
    /// Card timeout requested by the SAM, in milliseconds
    pub timeout: i64,
    pub format: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NfcCommand {
    Send(NfcSend),
    /// Field off: the conversation with the card is over
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcRx {
    pub data: Vec<u8>,
    pub rf_status: [u8; 2],
}

impl NfcRx {
    /// Card reply with a clean RF status
    pub fn ok(data: Vec<u8>) -> Self {
        Self {
            data,
            rf_status: [0x00, 0x00],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NfcResponse {
    Rx(NfcRx),
    Ack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Nfc(NfcResponse),
    /// Opaque SAM answer, interpreted by what was asked
    Sam(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: i64,
    pub data: Vec<u8>,
}

/// Top-level message exchanged with the SAM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    SamCommand(SamCommand),
    NfcCommand(NfcCommand),
    Response(Response),
    ErrorResponse(ErrorResponse),
}
