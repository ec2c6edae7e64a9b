#[path = "../common/mod.rs"]
mod common;

use std::thread;
use std::time::{Duration, Instant};

use libseader::Error;
use libseader::constants::*;
use libseader::protocol::SerialFrame;
use libseader::test_support::sam_responder;
use libseader::transport::{MockTransport, Transport};

#[test]
fn mock_transport_send_and_receive() {
    let mut m = MockTransport::new();
    m.push_response(vec![0x01]);
    m.send(&[0xAA]).unwrap();
    assert_eq!(m.sent(), vec![vec![0xAA]]);
    assert_eq!(m.receive(1000).unwrap(), vec![0x01]);
    assert_eq!(m.take_sent().len(), 1);
    assert!(m.sent().is_empty());
}

#[test]
fn receive_wakes_when_another_handle_pushes() {
    let m = MockTransport::new();
    let mut reader = m.try_clone().unwrap();
    let pusher = m.clone();

    let t = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        pusher.push_response(vec![0x42]);
    });
    let start = Instant::now();
    assert_eq!(reader.receive(2000).unwrap(), vec![0x42]);
    assert!(start.elapsed() < Duration::from_secs(2));
    t.join().unwrap();
}

#[test]
fn close_unblocks_receive() {
    let m = MockTransport::new();
    let mut reader = m.try_clone().unwrap();
    let mut closer = m.try_clone().unwrap();

    let t = thread::spawn(move || reader.receive(5000));
    thread::sleep(Duration::from_millis(20));
    closer.close().unwrap();
    assert!(matches!(t.join().unwrap(), Err(Error::Disconnected)));
    assert!(m.is_closed());
}

#[test]
fn responder_simulates_the_reader() {
    let mut m = MockTransport::new();
    m.set_responder(sam_responder(1, Vec::new()));

    let mut framer = libseader::protocol::Framer::new();
    m.send(&framer.encode_power_on(libseader::Slot::ONE).unwrap()).unwrap();
    let reply = m.receive(100).unwrap();
    let (header, payload) = SerialFrame::decode(&reply).unwrap();
    assert_eq!(header.message_type, CCID_DATA_BLOCK);
    assert_eq!(header.slot, 1);
    assert_eq!(payload, &SAM_ATR);

    // unscripted XfrBlock: the reader stays silent
    m.send(&framer.encode_xfr_block(libseader::Slot::ONE, &[0x00]).unwrap()).unwrap();
    assert!(matches!(m.receive(10), Err(Error::Timeout)));
}
