// libseader-rs/libseader/src/sam/session.rs

//! SAM discovery and power management.
//!
//! [`SamSession`] is a pure state machine: it consumes reader events and
//! answers with [`SessionAction`]s for the caller to carry out. It never
//! touches the transport or sleeps, so every transition can be driven
//! from a test.

use std::time::Duration;

use log::{debug, info, warn};

use crate::constants::*;
use crate::protocol::ccid::{
    CcidEvent, CcidMessage, Framer, SlotChange, SlotEvent, drain_events, message_slot,
};
use crate::types::Slot;
use crate::utils::{bytes_to_hex, ms, DEFAULT_RETRY_DELAY_MS};
use crate::{Error, Result};

/// Default number of SlotStatus probes before giving up on the SAM
pub const DEFAULT_RETRY_BUDGET: u8 = 3;

/// SAM presence outcome reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamEvent {
    Present,
    Missing,
    Wrong,
}

/// What the caller must do after feeding the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Write the frame now
    Send(Vec<u8>),
    /// Write the frame once the delay has passed
    SendAfter(Duration, Vec<u8>),
    Emit(SamEvent),
    /// Reply APDU from the SAM slot
    Apdu(Vec<u8>),
    /// A SAM was just bound; ask it for its version
    RequestVersion,
    /// The reader reported an error; drop the exchange in flight
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    PoweringOn,
    AwaitingSlotStatus,
    Powered,
    Retrying,
    SamMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub retry_budget: u8,
    pub retry_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
            retry_delay: ms(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

#[derive(Debug)]
pub struct SamSession {
    config: SessionConfig,
    framer: Framer,
    powered: [bool; SLOT_COUNT],
    retries: u8,
    sam_slot: Option<Slot>,
    phase: SessionPhase,
}

impl Default for SamSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SamSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            framer: Framer::new(),
            powered: [false; SLOT_COUNT],
            retries: config.retry_budget,
            sam_slot: None,
            phase: SessionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn has_sam(&self) -> bool {
        self.sam_slot.is_some()
    }

    pub fn sam_slot(&self) -> Option<Slot> {
        self.sam_slot
    }

    pub fn is_powered(&self, slot: Slot) -> bool {
        self.powered[slot.index()]
    }

    pub fn retries_remaining(&self) -> u8 {
        self.retries
    }

    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    /// Start a fresh discovery: forget any SAM and probe slot 0.
    pub fn check_for_sam(&mut self) -> Result<Vec<SessionAction>> {
        let config = self.config;
        *self = Self::new(config);
        self.phase = SessionPhase::AwaitingSlotStatus;
        info!("checking for SAM");
        Ok(vec![SessionAction::Send(
            self.framer.encode_get_slot_status(Slot::ZERO)?,
        )])
    }

    /// Wrap an APDU for the SAM slot.
    pub fn xfr_block(&mut self, apdu: &[u8]) -> Result<Vec<u8>> {
        let slot = self.sam_slot.ok_or(Error::SamNotPresent)?;
        self.framer.encode_xfr_block(slot, apdu)
    }

    /// Select T=1 on the SAM slot.
    pub fn set_parameters(&mut self) -> Result<Vec<u8>> {
        let slot = self.sam_slot.ok_or(Error::SamNotPresent)?;
        self.framer.encode_set_parameters(slot)
    }

    /// Parse every complete unit in `buf`. Returns the actions together
    /// with the number of reader replies seen.
    pub fn receive(&mut self, buf: &mut Vec<u8>) -> (Vec<SessionAction>, usize) {
        let mut actions = Vec::new();
        let mut replies = 0;
        let drained = drain_events(buf, |event| {
            if matches!(event, CcidEvent::Message(_)) {
                replies += 1;
            }
            actions.extend(self.handle_event(event));
            Ok(())
        });
        if let Err(e) = drained {
            warn!("reader stream: {}", e);
        }
        (actions, replies)
    }

    pub fn handle_event(&mut self, event: CcidEvent<'_>) -> Vec<SessionAction> {
        let result = match event {
            CcidEvent::SlotChange(change) => self.on_slot_change(change),
            CcidEvent::Message(message) => self.on_message(&message),
        };
        result.unwrap_or_else(|e| {
            warn!("session could not act on reader event: {}", e);
            Vec::new()
        })
    }

    fn on_slot_change(&mut self, change: SlotChange) -> Result<Vec<SessionAction>> {
        let mut actions = Vec::new();
        for (slot, event) in change.events() {
            match event {
                SlotEvent::CardIn => {
                    if self.sam_slot.is_some_and(|s| s != slot) {
                        debug!("card in {} ignored, SAM already bound", slot);
                        continue;
                    }
                    debug!("card in {}", slot);
                    self.retries = 0;
                    self.framer.reset_sequence(slot);
                    self.phase = SessionPhase::PoweringOn;
                    actions.push(SessionAction::Send(self.framer.encode_power_on(slot)?));
                }
                SlotEvent::CardOut => {
                    debug!("card out {}", slot);
                    if self.sam_slot == Some(slot) {
                        info!("SAM removed from {}", slot);
                        self.sam_slot = None;
                        self.powered[slot.index()] = false;
                        self.retries = self.config.retry_budget;
                        self.phase = SessionPhase::Idle;
                    }
                }
            }
        }
        Ok(actions)
    }

    fn on_message(&mut self, message: &CcidMessage<'_>) -> Result<Vec<SessionAction>> {
        let slot = message_slot(message)?;

        if (message.status == HW_FAULT_STATUS_A || message.status == HW_FAULT_STATUS_B)
            && message.error == HW_FAULT_ERROR
        {
            warn!("hardware fault on {} (status {:#04x})", slot, message.status);
            return Ok(self.abort());
        }
        if message.error != 0 {
            warn!(
                "reader error {:#04x} on {} (status {:#04x})",
                message.error, slot, message.status
            );
            return Ok(self.abort());
        }

        match message.message_type {
            CCID_SLOT_STATUS => self.on_slot_status(slot, message.status),
            CCID_DATA_BLOCK => Ok(self.on_data_block(slot, message.payload)),
            CCID_PARAMETERS => {
                debug!("parameters on {}: [{}]", slot, bytes_to_hex(message.payload));
                Ok(Vec::new())
            }
            other => {
                debug!("ignoring message type {:#04x}", other);
                Ok(Vec::new())
            }
        }
    }

    fn on_slot_status(&mut self, slot: Slot, status: u8) -> Result<Vec<SessionAction>> {
        match status & 0x03 {
            0 | 1 => {
                debug!("card present in {}, powering on", slot);
                self.phase = SessionPhase::PoweringOn;
                Ok(vec![SessionAction::Send(self.framer.encode_power_on(slot)?)])
            }
            2 if self.retries > 1 && self.sam_slot.is_none() => {
                self.retries -= 1;
                let next = Slot::try_from(self.retries % 2)?;
                debug!("no card in {}, probing {} ({} left)", slot, next, self.retries);
                self.phase = SessionPhase::Retrying;
                Ok(vec![SessionAction::SendAfter(
                    self.config.retry_delay,
                    self.framer.encode_get_slot_status(next)?,
                )])
            }
            2 => Ok(self.missing()),
            _ => {
                debug!("slot status {:#04x} on {}", status, slot);
                Ok(Vec::new())
            }
        }
    }

    fn on_data_block(&mut self, slot: Slot, payload: &[u8]) -> Vec<SessionAction> {
        match self.sam_slot {
            None if payload == SAM_ATR || payload == SAM_ATR2 => {
                info!("SAM found in {}", slot);
                self.sam_slot = Some(slot);
                self.powered[slot.index()] = true;
                self.phase = SessionPhase::Powered;
                vec![
                    SessionAction::RequestVersion,
                    SessionAction::Emit(SamEvent::Present),
                ]
            }
            None => {
                warn!("unknown ATR in {}: [{}]", slot, bytes_to_hex(payload));
                vec![SessionAction::Emit(SamEvent::Wrong)]
            }
            Some(sam) if sam == slot => vec![SessionAction::Apdu(payload.to_vec())],
            Some(_) => {
                debug!("discarding data block from {}", slot);
                Vec::new()
            }
        }
    }

    fn abort(&mut self) -> Vec<SessionAction> {
        let mut actions = vec![SessionAction::Abort];
        actions.extend(self.missing());
        actions
    }

    /// Report the SAM as missing once per discovery.
    fn missing(&mut self) -> Vec<SessionAction> {
        if self.phase == SessionPhase::SamMissing {
            debug!("SAM already reported missing");
            return Vec::new();
        }
        info!("SAM missing");
        self.phase = SessionPhase::SamMissing;
        vec![SessionAction::Emit(SamEvent::Missing)]
    }
}
