// libseader-rs/libseader/src/error.rs

use iso7816_tlv::TlvError;
use thiserror::Error;

use crate::bridge::TransceiveError;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[error("frame format error: {0}")]
    FrameFormat(String),

    #[error("invalid slot: {0}")]
    InvalidSlot(u8),

    #[error("no SAM bound to any slot")]
    SamNotPresent,

    #[error("payload decode error: {0}")]
    Decode(String),

    #[error("tlv error: {0}")]
    Tlv(TlvError),

    #[error("PACS too large: {size} bytes")]
    PacsTooLarge { size: usize },

    #[error("pending APDU queue full")]
    QueueFull,

    #[error("worker channel disconnected")]
    Disconnected,

    #[error("operation timed out")]
    Timeout,

    #[error("card transceive failed: {0}")]
    Transceive(TransceiveError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // シリアル実装を後から有効化できるように optional dependency にしている
    #[cfg(feature = "serial")]
    #[error("serial error: {0}")]
    Serial(#[from] serialport::Error),
}

impl From<TlvError> for Error {
    fn from(error: TlvError) -> Self {
        Error::Tlv(error)
    }
}

impl From<TransceiveError> for Error {
    fn from(error: TransceiveError) -> Self {
        Error::Transceive(error)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
