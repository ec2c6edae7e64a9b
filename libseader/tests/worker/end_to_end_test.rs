#[path = "../common/mod.rs"]
mod common;

use std::thread;
use std::time::{Duration, Instant};

use libseader::bridge::{BridgeState, PollerCommand, PollerEvent};
use libseader::constants::{CCID_DATA_BLOCK, CCID_XFR_BLOCK, READ4_BLOCK6};
use libseader::credential::CardKind;
use libseader::payload::FrameProtocol;
use libseader::test_support::{
    MockPoller, RecordingPriority, reader_frame, sam_apdu_reply, sam_responder,
};
use libseader::transport::MockTransport;
use libseader::worker::{Running, SeaderWorker, WorkerBuilder, WorkerConfig, WorkerEvent};
use libseader::ms;
use serial_test::serial;

use common::fixtures::*;

const WAIT: Duration = Duration::from_secs(3);

fn start(apdu_replies: Vec<Vec<u8>>) -> (SeaderWorker<Running>, MockTransport) {
    common::init_logger();
    let transport = MockTransport::new();
    transport.set_responder(sam_responder(0, apdu_replies));
    let worker = WorkerBuilder::new()
        .with_transport(Box::new(transport.clone()))
        .with_config(WorkerConfig::new().with_retry_delay(ms(5)))
        .build()
        .unwrap()
        .start()
        .unwrap();
    (worker, transport)
}

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(ms(5));
    }
    false
}

#[test]
#[serial]
fn discovery_then_credential_read() {
    let (worker, _transport) = start(vec![
        sam_apdu_reply(&sam_response(&VERSION_BODY)),
        sam_apdu_reply(&sam_response(&SERIAL_BODY)),
        sam_apdu_reply(&sam_response(&[])),
        sam_apdu_reply(&nfc_send(&READ4_BLOCK6, FrameProtocol::Iclass, 50)),
        sam_apdu_reply(&nfc_off()),
        sam_apdu_reply(&sam_response(&PACS_24_BIT)),
    ]);

    worker.check_for_sam().unwrap();
    assert_eq!(worker.events().recv_timeout(WAIT).unwrap(), WorkerEvent::SamPresent);
    assert!(wait_until(|| worker.sam_info().serial.is_some()));

    let info = worker.sam_info();
    assert_eq!(info.version.map(|v| v.to_string()), Some("1.41".to_string()));
    assert_eq!(info.serial, Some(SERIAL_BODY.to_vec()));

    let priority = RecordingPriority::new();
    let mut bridge = worker.bridge(Box::new(priority.clone()));
    let mut card = MockPoller::picopass(&sample_csn());
    card.push_reply(Ok(sio_head()));

    let mut command = bridge.handle(PollerEvent::CardReady, &mut card);
    let deadline = Instant::now() + WAIT;
    while command == PollerCommand::Continue && Instant::now() < deadline {
        thread::sleep(ms(1));
        command = bridge.handle(PollerEvent::Tick, &mut card);
    }
    assert_eq!(command, PollerCommand::Stop);
    assert_eq!(bridge.outcome(), Some(BridgeState::Complete));
    assert_eq!(card.sent.len(), 1);

    match worker.events().recv_timeout(WAIT).unwrap() {
        WorkerEvent::Success(credential) => {
            assert_eq!(credential.bit_length, 24);
            assert_eq!(credential.value, 26);
            assert_eq!(credential.kind, Some(CardKind::Picopass));
            assert_eq!(credential.sio, Some(sio_head()));
        }
        other => panic!("expected success, got: {:?}", other),
    }
    assert!(!priority.calls().is_empty());

    worker.stop();
}

#[test]
#[serial]
fn long_reply_is_fetched_with_get_response() {
    let version = sam_apdu_reply(&sam_response(&VERSION_BODY));
    let (worker, transport) = start(vec![
        vec![0x61, version.len() as u8],
        version,
        sam_apdu_reply(&sam_response(&SERIAL_BODY)),
    ]);

    worker.check_for_sam().unwrap();
    assert_eq!(worker.events().recv_timeout(WAIT).unwrap(), WorkerEvent::SamPresent);
    assert!(wait_until(|| worker.sam_info().serial.is_some()));
    assert!(worker.sam_info().version.is_some());

    // the GET RESPONSE went out as the payload of an XfrBlock
    let get_response = transport
        .sent()
        .iter()
        .any(|frame| frame.len() == 18 && frame[12..16] == [0x00, 0xC0, 0x00, 0x00]);
    assert!(get_response);

    worker.stop();
}

#[test]
#[serial]
fn late_pacs_answer_is_still_delivered() {
    // PACS arrives after field off; the worker is offline by then
    let (worker, _transport) = start(vec![
        sam_apdu_reply(&sam_response(&VERSION_BODY)),
        sam_apdu_reply(&sam_response(&SERIAL_BODY)),
        sam_apdu_reply(&sam_response(&[])),
        sam_apdu_reply(&nfc_off()),
        sam_apdu_reply(&sam_response(&PACS_24_BIT)),
    ]);
    worker.check_for_sam().unwrap();
    assert_eq!(worker.events().recv_timeout(WAIT).unwrap(), WorkerEvent::SamPresent);
    assert!(wait_until(|| worker.sam_info().serial.is_some()));

    let mut bridge = worker.bridge(Box::new(RecordingPriority::new()));
    let mut card = MockPoller::picopass(&sample_csn());
    let mut command = bridge.handle(PollerEvent::CardReady, &mut card);
    let deadline = Instant::now() + WAIT;
    while command == PollerCommand::Continue && Instant::now() < deadline {
        thread::sleep(ms(1));
        command = bridge.handle(PollerEvent::Tick, &mut card);
    }
    assert_eq!(bridge.outcome(), Some(BridgeState::Complete));
    assert!(card.sent.is_empty());

    match worker.events().recv_timeout(WAIT).unwrap() {
        WorkerEvent::Success(credential) => {
            assert_eq!(credential.value, 26);
            assert_eq!(credential.sio, None);
        }
        other => panic!("expected success, got: {:?}", other),
    }
    worker.stop();
}

#[test]
#[serial]
fn reader_error_mid_conversation_fails_the_read() {
    common::init_logger();
    let mut sam = sam_responder(
        0,
        vec![
            sam_apdu_reply(&sam_response(&VERSION_BODY)),
            sam_apdu_reply(&sam_response(&SERIAL_BODY)),
        ],
    );
    // the third XfrBlock (CardDetected) comes back with a reader error
    let mut xfr_blocks = 0;
    let transport = MockTransport::new();
    transport.set_responder(move |frame: &[u8]| {
        if frame.len() > 8 && frame[2] == CCID_XFR_BLOCK {
            xfr_blocks += 1;
            if xfr_blocks == 3 {
                return vec![reader_frame(CCID_DATA_BLOCK, frame[7], frame[8], 0x40, 0x05, &[])];
            }
        }
        sam(frame)
    });
    let worker = WorkerBuilder::new()
        .with_transport(Box::new(transport.clone()))
        .with_config(WorkerConfig::new().with_retry_delay(ms(5)))
        .build()
        .unwrap()
        .start()
        .unwrap();

    worker.check_for_sam().unwrap();
    assert_eq!(worker.events().recv_timeout(WAIT).unwrap(), WorkerEvent::SamPresent);
    assert!(wait_until(|| worker.sam_info().serial.is_some()));

    let mut bridge = worker.bridge(Box::new(RecordingPriority::new()));
    let mut card = MockPoller::picopass(&sample_csn());
    let mut command = bridge.handle(PollerEvent::CardReady, &mut card);
    let deadline = Instant::now() + WAIT;
    while command == PollerCommand::Continue && Instant::now() < deadline {
        thread::sleep(ms(1));
        command = bridge.handle(PollerEvent::Tick, &mut card);
    }

    assert_eq!(command, PollerCommand::Stop);
    assert_eq!(bridge.outcome(), Some(BridgeState::Fail));
    assert!(!worker.link().is_online());
    assert!(card.sent.is_empty());
    assert_eq!(worker.events().recv_timeout(WAIT).unwrap(), WorkerEvent::SamMissing);
    assert!(worker.events().recv_timeout(ms(100)).is_err());

    worker.stop();
}
