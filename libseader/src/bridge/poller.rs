// libseader-rs/libseader/src/bridge/poller.rs

use std::time::Duration;

use derive_more::Display;

/// Radio protocol the external poller is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerKind {
    Iso14443_4a,
    Picopass,
    MifareClassic,
}

/// ISO14443-A anticollision data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iso14443aInfo {
    pub atqa: [u8; 2],
    pub sak: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TransceiveError {
    #[display(fmt = "card timeout")]
    Timeout,
    /// Reply arrived with a bad CRC; the bytes are still available
    #[display(fmt = "incorrect CRC")]
    IncorrectCrc { data: Vec<u8> },
    #[display(fmt = "{}", _0)]
    Other(String),
}

/// The contactless reader driver, as seen from the bridge
pub trait CardPoller {
    fn kind(&self) -> PollerKind;

    fn uid(&self) -> Vec<u8>;

    fn iso14443a_info(&self) -> Option<Iso14443aInfo> {
        None
    }

    fn transceive(&mut self, tx: &[u8], timeout: Duration) -> Result<Vec<u8>, TransceiveError>;
}

/// Signals from the poller driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerEvent {
    /// A card is selected and ready
    CardReady,
    /// Periodic callback while the card stays in the field
    Tick,
}

/// Answer to the poller driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerCommand {
    Continue,
    Stop,
}
