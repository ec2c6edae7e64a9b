// libseader-rs/libseader/src/bridge/conversation.rs

use std::time::Duration;

use log::{debug, info, warn};

use super::poller::{CardPoller, PollerCommand, PollerEvent, PollerKind, TransceiveError};
use super::priority::{Priority, PriorityControl};
use super::queue::ApduConsumer;
use crate::constants::{DESFIRE_EV2_SELECT, SW_FILE_NOT_FOUND, UPDATE_BLOCK2};
use crate::credential::CardKind;
use crate::payload::{
    self, CardDetails, FrameProtocol, NfcCommand, NfcRx, NfcSend, Payload, SamCommand,
};
use crate::protocol::append_crc16_picopass;
use crate::sam::{Handled, SamLink};
use crate::utils::{bytes_to_hex, card_timeout};
use crate::worker::events::{StopSignal, WorkerEvent};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    CardDetect,
    Conversation,
    Complete,
    Fail,
}

/// Drives one card read from inside the poller callback.
pub struct CardPollerBridge {
    link: SamLink,
    queue: ApduConsumer,
    priority: Box<dyn PriorityControl>,
    current: Option<Priority>,
    stop: StopSignal,
    max_fwt: Duration,
    state: BridgeState,
    card: Option<CardKind>,
}

impl std::fmt::Debug for CardPollerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardPollerBridge")
            .field("state", &self.state)
            .field("card", &self.card)
            .field("priority", &self.current)
            .finish()
    }
}

impl CardPollerBridge {
    pub fn new(
        link: SamLink,
        queue: ApduConsumer,
        priority: Box<dyn PriorityControl>,
        stop: StopSignal,
        max_fwt: Duration,
    ) -> Self {
        queue.drain();
        link.take_abort();
        Self {
            link,
            queue,
            priority,
            current: None,
            stop,
            max_fwt,
            state: BridgeState::CardDetect,
            card: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Terminal state, once reached
    pub fn outcome(&self) -> Option<BridgeState> {
        match self.state {
            BridgeState::Complete | BridgeState::Fail => Some(self.state),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: PollerEvent, poller: &mut dyn CardPoller) -> PollerCommand {
        if self.stop.is_stopped() {
            self.queue.drain();
            return PollerCommand::Stop;
        }

        match self.state {
            BridgeState::CardDetect => match event {
                PollerEvent::CardReady => self.card_detected(poller),
                PollerEvent::Tick => PollerCommand::Continue,
            },
            BridgeState::Conversation => self.converse(poller),
            BridgeState::Complete | BridgeState::Fail => {
                self.queue.drain();
                PollerCommand::Stop
            }
        }
    }

    fn set_priority(&mut self, priority: Priority) {
        if self.current != Some(priority) {
            match priority {
                Priority::Background => self.priority.demote(),
                Priority::TimeCritical => self.priority.elevate(),
            }
            self.current = Some(priority);
        }
    }

    fn card_detected(&mut self, poller: &mut dyn CardPoller) -> PollerCommand {
        let uid = poller.uid();
        let (details, kind) = match poller.kind() {
            PollerKind::Picopass => (
                CardDetails {
                    csn: uid.clone(),
                    protocol: FrameProtocol::Iclass,
                    sak: None,
                    atqa: None,
                },
                CardKind::Picopass,
            ),
            PollerKind::Iso14443_4a | PollerKind::MifareClassic => {
                let info = poller.iso14443a_info();
                let kind = match (poller.kind(), info) {
                    (_, Some(info)) => CardKind::classify(info.atqa, info.sak),
                    (PollerKind::MifareClassic, None) => CardKind::MifareClassic,
                    _ => CardKind::Iso14443_4a,
                };
                (
                    CardDetails {
                        csn: uid.clone(),
                        protocol: FrameProtocol::Nfc,
                        sak: info.map(|i| i.sak),
                        atqa: info.map(|i| i.atqa),
                    },
                    kind,
                )
            }
        };
        info!("card detected: {} uid {}", kind, bytes_to_hex(&uid));

        let diversifier = match kind {
            CardKind::Picopass | CardKind::Desfire => Some(uid),
            _ => None,
        };
        self.link.with_context(|ctx| {
            ctx.draft.clear();
            ctx.draft.kind = Some(kind);
            ctx.draft.diversifier = diversifier;
        });
        self.card = Some(kind);

        self.link.set_online(true);
        if let Err(e) = self.link.send_sam_command(SamCommand::CardDetected(details)) {
            warn!("could not report card to SAM: {}", e);
            return self.fail();
        }

        self.set_priority(Priority::Background);
        self.state = BridgeState::Conversation;
        PollerCommand::Continue
    }

    fn converse(&mut self, poller: &mut dyn CardPoller) -> PollerCommand {
        if self.link.take_abort() {
            // reader error, SamMissing already reported
            self.state = BridgeState::Fail;
            self.queue.drain();
            return PollerCommand::Stop;
        }
        let Some(body) = self.queue.try_pop() else {
            self.set_priority(Priority::TimeCritical);
            return PollerCommand::Continue;
        };
        self.set_priority(Priority::Background);

        match payload::decode(&body) {
            Ok(Payload::NfcCommand(NfcCommand::Send(send))) => self.forward(&send, poller),
            Ok(Payload::NfcCommand(NfcCommand::Off)) => {
                debug!("field off");
                self.link.set_online(false);
                if let Err(e) = self.link.send_nfc_ack() {
                    warn!("could not acknowledge field off: {}", e);
                    return self.fail();
                }
                self.state = BridgeState::Complete;
                PollerCommand::Stop
            }
            Ok(Payload::Response(response)) => match self.link.handle_response(&response) {
                Handled::Fail => {
                    // already reported by the link
                    self.link.set_online(false);
                    self.state = BridgeState::Fail;
                    self.queue.drain();
                    PollerCommand::Stop
                }
                Handled::Pending | Handled::Success => PollerCommand::Continue,
            },
            Ok(Payload::ErrorResponse(err)) => {
                warn!("SAM error {}: [{}]", err.code, bytes_to_hex(&err.data));
                self.fail()
            }
            Ok(Payload::SamCommand(cmd)) => {
                warn!("unexpected SAM command from SAM: {:?}", cmd);
                PollerCommand::Continue
            }
            Err(_) => self.fail(),
        }
    }

    fn forward(&mut self, send: &NfcSend, poller: &mut dyn CardPoller) -> PollerCommand {
        let tx = send.data.as_slice();
        let rx = match self.exchange(send, poller) {
            Ok(rx) => rx,
            Err(e) => {
                warn!("transceive [{}] failed: {}", bytes_to_hex(tx), e);
                return self.fail();
            }
        };
        debug!("card [{}] -> [{}]", bytes_to_hex(tx), bytes_to_hex(&rx));

        self.link.with_context(|ctx| ctx.draft.capture_sio(tx, &rx));
        match self.link.send_nfc_rx(NfcRx::ok(rx)) {
            Ok(()) => PollerCommand::Continue,
            Err(e) => {
                warn!("could not forward card reply: {}", e);
                self.fail()
            }
        }
    }

    fn exchange(&mut self, send: &NfcSend, poller: &mut dyn CardPoller) -> Result<Vec<u8>> {
        let tx = send.data.as_slice();
        match self.card {
            Some(CardKind::Picopass) if tx.starts_with(&UPDATE_BLOCK2) => {
                if let Some(rx) = fake_epurse_update(tx) {
                    return Ok(rx);
                }
            }
            Some(CardKind::Desfire) if tx == DESFIRE_EV2_SELECT => {
                info!("answering DESFire EV2 select with file not found");
                return Ok(SW_FILE_NOT_FOUND.to_vec());
            }
            _ => {}
        }

        let timeout = card_timeout(send.timeout, self.max_fwt);
        match poller.transceive(tx, timeout) {
            Ok(rx) => Ok(rx),
            Err(TransceiveError::IncorrectCrc { data }) if self.card == Some(CardKind::Picopass) => {
                Ok(data)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn fail(&mut self) -> PollerCommand {
        self.link.set_online(false);
        self.link.emit(WorkerEvent::Fail);
        self.state = BridgeState::Fail;
        self.queue.drain();
        PollerCommand::Stop
    }
}

/// Local answer to a Picopass e-purse UPDATE: the new purse value echoed
/// back with its halves swapped, plus CRC. `None` when `tx` is too short.
fn fake_epurse_update(tx: &[u8]) -> Option<Vec<u8>> {
    let (head, tail) = (tx.get(2..6)?, tx.get(6..10)?);
    let mut rx = Vec::with_capacity(10);
    rx.extend_from_slice(tail);
    rx.extend_from_slice(head);
    append_crc16_picopass(&mut rx);
    debug!("fake e-purse update reply [{}]", bytes_to_hex(&rx));
    Some(rx)
}
