// libseader-rs/libseader/src/sam/router.rs

use log::{debug, info, warn};

use crate::credential::{Credential, CredentialDraft, unpack_pacs};
use crate::payload::{SamCommand, SamCommandKind, SamVersion};
use crate::utils::bytes_to_hex;

/// What the SAM has told us about itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamInfo {
    pub version: Option<SamVersion>,
    pub serial: Option<Vec<u8>>,
}

/// Next step after a SAM answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterAction {
    /// Nothing more to do for this answer
    Done,
    Send(SamCommand),
    Success(Credential),
    Fail,
}

/// Interprets opaque SAM answers by the command that is outstanding.
#[derive(Debug, Default)]
pub struct SamResponseRouter {
    outstanding: Option<SamCommandKind>,
    info: SamInfo,
}

impl SamResponseRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the command just sent to the SAM.
    pub fn record(&mut self, command: &SamCommand) {
        self.outstanding = Some(command.kind());
    }

    pub fn outstanding(&self) -> Option<SamCommandKind> {
        self.outstanding
    }

    pub fn info(&self) -> &SamInfo {
        &self.info
    }

    pub fn route(&mut self, response: &[u8], draft: &CredentialDraft) -> RouterAction {
        if response.is_empty() {
            return match self.outstanding {
                Some(SamCommandKind::CardDetected) => {
                    debug!("card detected acknowledged, requesting PACS");
                    RouterAction::Send(SamCommand::RequestPacs)
                }
                other => {
                    warn!("empty SAM response while {:?} outstanding", other);
                    self.outstanding = None;
                    RouterAction::Fail
                }
            };
        }

        if self.outstanding == Some(SamCommandKind::SerialNumber) {
            info!("SAM serial number: {}", bytes_to_hex(response));
            self.info.serial = Some(response.to_vec());
            self.outstanding = None;
            return RouterAction::Done;
        }

        if let Ok(version) = SamVersion::parse(response) {
            info!(
                "SAM version {} firmware {}",
                version,
                bytes_to_hex(&version.firmware)
            );
            self.info.version = Some(version);
            return RouterAction::Send(SamCommand::SerialNumber);
        }

        self.outstanding = None;
        match unpack_pacs(response) {
            Ok(credential) => {
                let credential = draft.finish(credential);
                info!("credential read: {}", credential);
                RouterAction::Success(credential)
            }
            Err(e) => {
                warn!("bad PACS response [{}]: {}", bytes_to_hex(response), e);
                RouterAction::Fail
            }
        }
    }
}
