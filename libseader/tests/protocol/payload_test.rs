#[path = "../common/mod.rs"]
mod common;

use libseader::payload::{self, FrameProtocol, NfcCommand, Payload, SamCommand, SamVersion};
use libseader::protocol::{ApduReply, encode_sam_apdu};
use libseader::{Error, Routing};

#[test]
fn version_request_on_the_wire() {
    let body = payload::encode(&Payload::SamCommand(SamCommand::Version), Routing::SAM_COMMAND).unwrap();
    let apdu = encode_sam_apdu(&body).unwrap();
    assert_eq!(apdu, hex::decode("a0da02630a440a44000000a0029600").unwrap());
}

#[test]
fn card_detected_for_iclass() {
    let payload = Payload::SamCommand(SamCommand::CardDetected(common::fixtures::iclass_details()));
    let body = payload::encode(&payload, Routing::SAM_COMMAND).unwrap();
    assert_eq!(&body[..6], &Routing::SAM_COMMAND.prefix());
    // a0 { ad { a0 { 80 csn, 81 protocol } } }
    assert_eq!(body[6], 0xA0);
    assert_eq!(body[8], 0xAD);
    assert_eq!(body[10], 0xA0);
    assert_eq!(&body[12..14], &[0x80, 0x08]);
    assert_eq!(&body[22..26], &[0x81, 0x02, 0x00, 0x01]);
    assert_eq!(payload::decode(&body).unwrap(), payload);
}

#[test]
fn sam_reply_with_status_word() {
    let mut apdu = payload::encode(
        &common::fixtures::nfc_send(&[0x0C], FrameProtocol::Iclass, 50),
        Routing::new(0x0A, 0x44, 0x0A),
    )
    .unwrap();
    apdu.extend_from_slice(&[0x90, 0x00]);

    let body = match ApduReply::parse(&apdu).unwrap() {
        ApduReply::Success(body) => body,
        other => panic!("expected success, got: {:?}", other),
    };
    match payload::decode(body).unwrap() {
        Payload::NfcCommand(NfcCommand::Send(send)) => {
            assert_eq!(send.data, vec![0x0C]);
            assert_eq!(send.timeout, 50);
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[test]
fn garbage_body_fails_closed() {
    match payload::decode(&[0x0A, 0x44, 0x0A, 0, 0, 0, 0x30, 0x02, 0x05, 0x00]) {
        Err(Error::Decode(_)) => {}
        other => panic!("expected decode error, got: {:?}", other),
    }
    assert!(payload::decode(&[0x0A, 0x44]).is_err());
}

#[test]
fn version_record_parses() {
    let v = SamVersion::parse(&common::fixtures::VERSION_BODY).unwrap();
    assert_eq!(v.to_string(), "1.41");
    assert_eq!(v.sam_type, Some(1));
}
