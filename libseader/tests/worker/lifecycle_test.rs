#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use libseader::payload::SamCommand;
use libseader::test_support::sam_responder;
use libseader::transport::MockTransport;
use libseader::worker::{WorkerBuilder, WorkerConfig, WorkerEvent};
use libseader::{Error, ms};
use serial_test::serial;

const WAIT: Duration = Duration::from_secs(3);

#[test]
#[serial]
fn empty_reader_reports_sam_missing_once() {
    common::init_logger();
    let transport = MockTransport::new();
    transport.set_responder(sam_responder(7, Vec::new()));
    let worker = WorkerBuilder::new()
        .with_transport(Box::new(transport.clone()))
        .with_config(WorkerConfig::new().with_retry_delay(ms(5)))
        .build()
        .unwrap()
        .start()
        .unwrap();

    worker.check_for_sam().unwrap();
    assert_eq!(worker.events().recv_timeout(WAIT).unwrap(), WorkerEvent::SamMissing);
    assert!(worker.events().recv_timeout(ms(100)).is_err());
    assert_eq!(transport.sent().len(), 3);

    worker.stop();
    assert!(transport.is_closed());
}

#[test]
#[serial]
fn payload_without_sam_fails() {
    common::init_logger();
    let worker = WorkerBuilder::new()
        .with_transport(Box::new(MockTransport::new()))
        .build()
        .unwrap()
        .start()
        .unwrap();

    worker.link().send_sam_command(SamCommand::Version).unwrap();
    assert_eq!(worker.events().recv_timeout(WAIT).unwrap(), WorkerEvent::Fail);
    worker.stop();
}

#[test]
#[serial]
fn stop_closes_the_transport() {
    let transport = MockTransport::new();
    let worker = WorkerBuilder::new()
        .with_transport(Box::new(transport.clone()))
        .build()
        .unwrap()
        .start()
        .unwrap();
    assert!(!worker.is_stopped());

    let link = worker.link().clone();
    worker.stop();
    assert!(transport.is_closed());
    // the transport thread is gone, requests have nowhere to go
    assert!(matches!(link.check_for_sam(), Err(Error::Disconnected)));
}

#[test]
fn invalid_config_is_rejected() {
    let result = WorkerBuilder::new()
        .with_transport(Box::new(MockTransport::new()))
        .with_config(WorkerConfig::new().with_receive_poll(Duration::ZERO))
        .build();
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}
