// libseader-rs/libseader/src/sam/link.rs

//! Shared handle to the SAM used by both the transport thread and the
//! poller callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::Sender;
use log::{debug, warn};

use super::router::{RouterAction, SamInfo, SamResponseRouter};
use crate::credential::CredentialDraft;
use crate::payload::{
    self, NfcCommand, NfcResponse, NfcRx, Payload, Response, SamCommand,
};
use crate::types::Routing;
use crate::utils::bytes_to_hex;
use crate::worker::events::WorkerEvent;
use crate::{Error, Result};

/// Work handed to the transport thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRequest {
    CheckForSam,
    /// Prefixed payload to wrap in an APDU and send
    Payload(Vec<u8>),
}

/// State shared between the SAM answer paths
#[derive(Debug, Default)]
pub struct SamContext {
    pub router: SamResponseRouter,
    pub draft: CredentialDraft,
}

/// How a SAM answer was dealt with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Pending,
    Success,
    Fail,
}

#[derive(Debug, Clone)]
pub struct SamLink {
    requests: Sender<LinkRequest>,
    context: Arc<Mutex<SamContext>>,
    events: Sender<WorkerEvent>,
    online: Arc<AtomicBool>,
    aborted: Arc<AtomicBool>,
}

impl SamLink {
    pub fn new(requests: Sender<LinkRequest>, events: Sender<WorkerEvent>) -> Self {
        Self {
            requests,
            context: Arc::new(Mutex::new(SamContext::default())),
            events,
            online: Arc::new(AtomicBool::new(false)),
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SamContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_context<R>(&self, f: impl FnOnce(&mut SamContext) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn sam_info(&self) -> SamInfo {
        self.lock().router.info().clone()
    }

    /// While online, SAM answers go to the poller queue.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Cut the running card conversation short. No-op while offline.
    pub fn abort(&self) {
        if self.online.swap(false, Ordering::SeqCst) {
            warn!("aborting card conversation");
            self.aborted.store(true, Ordering::SeqCst);
        }
    }

    /// True once after [`abort`](Self::abort) hit a running conversation.
    pub fn take_abort(&self) -> bool {
        self.aborted.swap(false, Ordering::SeqCst)
    }

    pub fn emit(&self, event: WorkerEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver gone");
        }
    }

    pub fn check_for_sam(&self) -> Result<()> {
        self.requests
            .send(LinkRequest::CheckForSam)
            .map_err(|_| Error::Disconnected)
    }

    pub fn send_payload(&self, payload: &Payload, routing: Routing) -> Result<()> {
        let bytes = payload::encode(payload, routing)?;
        debug!("payload to SAM ({}): [{}]", routing, bytes_to_hex(&bytes));
        self.requests
            .send(LinkRequest::Payload(bytes))
            .map_err(|_| Error::Disconnected)
    }

    pub fn send_sam_command(&self, command: SamCommand) -> Result<()> {
        self.lock().router.record(&command);
        self.send_payload(&Payload::SamCommand(command), Routing::SAM_COMMAND)
    }

    pub fn send_nfc_rx(&self, rx: NfcRx) -> Result<()> {
        self.send_payload(
            &Payload::Response(Response::Nfc(NfcResponse::Rx(rx))),
            Routing::NFC_RX,
        )
    }

    pub fn send_nfc_ack(&self) -> Result<()> {
        self.send_payload(
            &Payload::Response(Response::Nfc(NfcResponse::Ack)),
            Routing::NFC_ACK,
        )
    }

    /// Act on a response payload from the SAM.
    pub fn handle_response(&self, response: &Response) -> Handled {
        let bytes = match response {
            Response::Sam(bytes) => bytes,
            Response::Nfc(other) => {
                warn!("unexpected NFC response from SAM: {:?}", other);
                return Handled::Pending;
            }
        };

        let action = {
            let mut ctx = self.lock();
            let SamContext { router, draft } = &mut *ctx;
            router.route(bytes, draft)
        };

        match action {
            RouterAction::Done => Handled::Pending,
            RouterAction::Send(command) => match self.send_sam_command(command) {
                Ok(()) => Handled::Pending,
                Err(e) => {
                    warn!("could not send SAM command: {}", e);
                    self.emit(WorkerEvent::Fail);
                    Handled::Fail
                }
            },
            RouterAction::Success(credential) => {
                self.emit(WorkerEvent::Success(credential));
                Handled::Success
            }
            RouterAction::Fail => {
                self.emit(WorkerEvent::Fail);
                Handled::Fail
            }
        }
    }

    /// Handle a SAM answer that arrived while no card conversation runs.
    pub fn handle_offline(&self, body: &[u8]) -> Handled {
        match payload::decode(body) {
            Ok(Payload::Response(response)) => self.handle_response(&response),
            Ok(Payload::ErrorResponse(err)) => {
                warn!("SAM error {}: [{}]", err.code, bytes_to_hex(&err.data));
                self.emit(WorkerEvent::Fail);
                Handled::Fail
            }
            Ok(Payload::NfcCommand(NfcCommand::Off)) => {
                debug!("field off while offline");
                Handled::Pending
            }
            Ok(other) => {
                warn!("dropping payload with no card present: {:?}", other);
                Handled::Pending
            }
            Err(_) => {
                self.emit(WorkerEvent::Fail);
                Handled::Fail
            }
        }
    }
}
