#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use crossbeam_channel::{Receiver, unbounded};
use libseader::bridge::{
    ApduProducer, BridgeState, CardPollerBridge, PollerCommand, PollerEvent, Priority,
    TransceiveError, pending_apdu,
};
use libseader::constants::*;
use libseader::credential::CardKind;
use libseader::payload::{
    self, FrameProtocol, NfcResponse, Payload, Response, SamCommand,
};
use libseader::sam::{LinkRequest, SamLink};
use libseader::test_support::{MockPoller, RecordingPriority, SAM_REPLY_ROUTING};
use libseader::worker::{StopHandle, WorkerEvent, stop_signal};
use libseader::ms;

struct Harness {
    bridge: CardPollerBridge,
    link: SamLink,
    producer: ApduProducer,
    requests: Receiver<LinkRequest>,
    events: Receiver<WorkerEvent>,
    priority: RecordingPriority,
    stop: StopHandle,
}

impl Harness {
    fn new() -> Self {
        common::init_logger();
        let (req_tx, requests) = unbounded();
        let (ev_tx, events) = unbounded();
        let link = SamLink::new(req_tx, ev_tx);
        let (producer, consumer) = pending_apdu(3, ms(10)).unwrap();
        let priority = RecordingPriority::new();
        let (stop, signal) = stop_signal();
        let bridge = CardPollerBridge::new(
            link.clone(),
            consumer,
            Box::new(priority.clone()),
            signal,
            ms(100),
        );
        Self {
            bridge,
            link,
            producer,
            requests,
            events,
            priority,
            stop,
        }
    }

    /// Queue a payload as if the transport thread had received it.
    fn from_sam(&self, payload: &Payload) {
        self.producer
            .push(payload::encode(payload, SAM_REPLY_ROUTING).unwrap())
            .unwrap();
    }

    /// Payloads the bridge asked to send to the SAM
    fn sent_to_sam(&self) -> Vec<Payload> {
        self.requests
            .try_iter()
            .map(|request| match request {
                LinkRequest::Payload(bytes) => payload::decode(&bytes).unwrap(),
                other => panic!("unexpected request: {:?}", other),
            })
            .collect()
    }
}

#[test]
fn picopass_read_relays_every_exchange() {
    let mut h = Harness::new();
    let mut card = MockPoller::picopass(&common::fixtures::sample_csn());

    assert_eq!(h.bridge.handle(PollerEvent::CardReady, &mut card), PollerCommand::Continue);
    assert_eq!(h.bridge.state(), BridgeState::Conversation);
    assert!(h.link.is_online());
    assert_eq!(
        h.sent_to_sam(),
        vec![Payload::SamCommand(SamCommand::CardDetected(
            common::fixtures::iclass_details()
        ))]
    );

    // nothing from the SAM yet: wait at full priority
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Continue);

    // SAM acknowledges the card; the PACS request follows
    h.from_sam(&common::fixtures::sam_response(&[]));
    h.bridge.handle(PollerEvent::Tick, &mut card);
    assert_eq!(h.sent_to_sam(), vec![Payload::SamCommand(SamCommand::RequestPacs)]);

    // SAM reads block 6 through us
    card.push_reply(Ok(common::fixtures::sio_head()));
    h.from_sam(&common::fixtures::nfc_send(&READ4_BLOCK6, FrameProtocol::Iclass, 50));
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Continue);
    assert_eq!(card.sent, vec![(READ4_BLOCK6.to_vec(), ms(50))]);
    match h.sent_to_sam().as_slice() {
        [Payload::Response(Response::Nfc(NfcResponse::Rx(rx)))] => {
            assert_eq!(rx.data, common::fixtures::sio_head());
            assert_eq!(rx.rf_status, [0x00, 0x00]);
        }
        other => panic!("expected NFC rx, got: {:?}", other),
    }

    h.from_sam(&common::fixtures::nfc_off());
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Stop);
    assert_eq!(h.bridge.outcome(), Some(BridgeState::Complete));
    assert!(!h.link.is_online());
    assert_eq!(
        h.sent_to_sam(),
        vec![Payload::Response(Response::Nfc(NfcResponse::Ack))]
    );

    // the PACS answer arrives after the field is off
    let pacs = payload::encode(
        &common::fixtures::sam_response(&common::fixtures::PACS_24_BIT),
        SAM_REPLY_ROUTING,
    )
    .unwrap();
    h.link.handle_offline(&pacs);
    match h.events.try_recv().unwrap() {
        WorkerEvent::Success(credential) => {
            assert_eq!(credential.bit_length, 24);
            assert_eq!(credential.value, 26);
            assert_eq!(credential.kind, Some(CardKind::Picopass));
            assert_eq!(credential.sio, Some(common::fixtures::sio_head()));
            assert_eq!(credential.diversifier, Some(common::fixtures::sample_csn()));
        }
        other => panic!("expected success, got: {:?}", other),
    }

    assert_eq!(
        h.priority.calls(),
        vec![
            Priority::Background,
            Priority::TimeCritical,
            Priority::Background,
        ]
    );
}

#[test]
fn priority_changes_only_on_transitions() {
    let mut h = Harness::new();
    let mut card = MockPoller::picopass(&common::fixtures::sample_csn());
    h.bridge.handle(PollerEvent::CardReady, &mut card);
    for _ in 0..5 {
        h.bridge.handle(PollerEvent::Tick, &mut card);
    }
    assert_eq!(
        h.priority.calls(),
        vec![Priority::Background, Priority::TimeCritical]
    );
}

#[test]
fn tick_before_card_is_ignored() {
    let mut h = Harness::new();
    let mut card = MockPoller::picopass(&common::fixtures::sample_csn());
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Continue);
    assert_eq!(h.bridge.state(), BridgeState::CardDetect);
    assert!(h.sent_to_sam().is_empty());
}

#[test]
fn epurse_update_is_answered_locally() {
    let mut h = Harness::new();
    let mut card = MockPoller::picopass(&common::fixtures::sample_csn());
    h.bridge.handle(PollerEvent::CardReady, &mut card);
    h.sent_to_sam();

    let update = [0x87, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0x12, 0x34, 0x56, 0x78, 0xAA, 0xBB, 0xCC, 0xDD];
    h.from_sam(&common::fixtures::nfc_send(&update, FrameProtocol::Iclass, 50));
    h.bridge.handle(PollerEvent::Tick, &mut card);

    assert!(card.sent.is_empty());
    match h.sent_to_sam().as_slice() {
        [Payload::Response(Response::Nfc(NfcResponse::Rx(rx)))] => {
            assert_eq!(&rx.data[..8], &[0x12, 0x34, 0x56, 0x78, 0xFF, 0xFF, 0xFF, 0xFF]);
            assert_eq!(rx.data.len(), 10);
        }
        other => panic!("expected NFC rx, got: {:?}", other),
    }
}

#[test]
fn desfire_ev2_select_gets_file_not_found() {
    let mut h = Harness::new();
    let mut card = MockPoller::iso14443a(&common::fixtures::sample_uid(), [0x44, 0x03], 0x20);
    h.bridge.handle(PollerEvent::CardReady, &mut card);
    match h.sent_to_sam().as_slice() {
        [Payload::SamCommand(SamCommand::CardDetected(details))] => {
            assert_eq!(details.protocol, FrameProtocol::Nfc);
            assert_eq!(details.sak, Some(0x20));
            assert_eq!(details.atqa, Some([0x44, 0x03]));
        }
        other => panic!("expected card detected, got: {:?}", other),
    }

    h.from_sam(&common::fixtures::nfc_send(&DESFIRE_EV2_SELECT, FrameProtocol::Nfc, 100));
    h.bridge.handle(PollerEvent::Tick, &mut card);

    assert!(card.sent.is_empty());
    match h.sent_to_sam().as_slice() {
        [Payload::Response(Response::Nfc(NfcResponse::Rx(rx)))] => {
            assert_eq!(rx.data, SW_FILE_NOT_FOUND.to_vec());
        }
        other => panic!("expected NFC rx, got: {:?}", other),
    }
}

#[test]
fn picopass_crc_error_still_forwards_bytes() {
    let mut h = Harness::new();
    let mut card = MockPoller::picopass(&common::fixtures::sample_csn());
    h.bridge.handle(PollerEvent::CardReady, &mut card);
    h.sent_to_sam();

    card.push_reply(Err(TransceiveError::IncorrectCrc {
        data: vec![0x01, 0x02],
    }));
    h.from_sam(&common::fixtures::nfc_send(&[0x0C], FrameProtocol::Iclass, 0));
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Continue);

    // no requested timeout: the ceiling applies
    assert_eq!(card.sent[0].1, ms(100));
    match h.sent_to_sam().as_slice() {
        [Payload::Response(Response::Nfc(NfcResponse::Rx(rx)))] => {
            assert_eq!(rx.data, vec![0x01, 0x02]);
        }
        other => panic!("expected NFC rx, got: {:?}", other),
    }
}

#[test]
fn card_timeout_fails_the_read() {
    let mut h = Harness::new();
    let mut card = MockPoller::iso14443a(&common::fixtures::sample_uid(), [0x04, 0x00], 0x20);
    h.bridge.handle(PollerEvent::CardReady, &mut card);
    h.sent_to_sam();

    h.from_sam(&common::fixtures::nfc_send(&[0x90, 0x60, 0x00, 0x00, 0x00], FrameProtocol::Nfc, 5000));
    h.from_sam(&common::fixtures::nfc_off());
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Stop);

    assert_eq!(card.sent[0].1, ms(100));
    assert_eq!(h.bridge.outcome(), Some(BridgeState::Fail));
    assert!(!h.link.is_online());
    assert_eq!(h.events.try_recv().unwrap(), WorkerEvent::Fail);
    assert!(h.sent_to_sam().is_empty());

    // the queued field-off was discarded with the failure
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Stop);
    assert!(h.events.try_recv().is_err());
}

#[test]
fn sam_error_fails_the_read() {
    let mut h = Harness::new();
    let mut card = MockPoller::picopass(&common::fixtures::sample_csn());
    h.bridge.handle(PollerEvent::CardReady, &mut card);

    h.from_sam(&Payload::ErrorResponse(payload::ErrorResponse {
        code: 7,
        data: vec![0xDE, 0xAD],
    }));
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Stop);
    assert_eq!(h.bridge.state(), BridgeState::Fail);
    assert_eq!(h.events.try_recv().unwrap(), WorkerEvent::Fail);
}

#[test]
fn stop_ends_the_conversation() {
    let mut h = Harness::new();
    let mut card = MockPoller::picopass(&common::fixtures::sample_csn());
    h.bridge.handle(PollerEvent::CardReady, &mut card);
    h.from_sam(&common::fixtures::nfc_off());

    h.stop.stop();
    assert_eq!(h.bridge.handle(PollerEvent::Tick, &mut card), PollerCommand::Stop);
    assert!(h.bridge.outcome().is_none());
}

#[test]
fn new_bridge_discards_stale_answers() {
    let (req_tx, _requests) = unbounded();
    let (ev_tx, _events) = unbounded();
    let link = SamLink::new(req_tx, ev_tx);
    let (producer, consumer) = pending_apdu(2, Duration::ZERO).unwrap();
    producer.push(vec![1]).unwrap();
    producer.push(vec![2]).unwrap();

    let (_stop, signal) = stop_signal();
    let _bridge = CardPollerBridge::new(
        link,
        consumer.clone(),
        Box::new(RecordingPriority::new()),
        signal,
        ms(100),
    );
    assert!(consumer.is_empty());
}
