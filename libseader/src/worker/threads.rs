// libseader-rs/libseader/src/worker/threads.rs

//! The transport thread owns the receive side and the session; the
//! transmit thread writes frames one at a time, waiting for the reader's
//! reply before the next.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, warn};

use super::config::WorkerConfig;
use super::events::{StopHandle, StopSignal, WorkerEvent};
use crate::bridge::queue::ApduProducer;
use crate::payload::SamCommand;
use crate::protocol::{ApduReply, encode_sam_apdu, get_response};
use crate::sam::{LinkRequest, SamLink, SamSession, SessionAction};
use crate::transport::Transport;
use crate::utils::{bytes_to_hex, hex_preview};
use crate::{Error, Result};

/// Frame queued for the transmit thread
#[derive(Debug)]
enum Outgoing {
    Now(Vec<u8>),
    After(Duration, Vec<u8>),
}

pub(crate) struct RunningThreads {
    stop: StopHandle,
    transport: Box<dyn Transport>,
    handles: Vec<JoinHandle<()>>,
}

/// Everything the transport thread needs
pub(crate) struct UartParts {
    pub transport: Box<dyn Transport>,
    pub config: WorkerConfig,
    pub link: SamLink,
    pub requests: Receiver<LinkRequest>,
    pub producer: ApduProducer,
    pub stop: StopHandle,
    pub signal: StopSignal,
}

impl RunningThreads {
    pub fn spawn(parts: UartParts) -> Result<Self> {
        let UartParts {
            transport,
            config,
            link,
            requests,
            producer,
            stop,
            signal,
        } = parts;

        let writer = transport.try_clone()?;
        let closer = transport.try_clone()?;
        let (frames_tx, frames_rx) = unbounded();
        let (replies_tx, replies_rx) = unbounded();

        let mut uart = UartLoop {
            transport,
            session: SamSession::new(config.session()),
            requests,
            producer,
            link,
            frames: frames_tx,
            replies: replies_tx,
            signal: signal.clone(),
            poll: config.receive_poll,
        };
        let uart_handle = std::thread::Builder::new()
            .name("seader-uart".into())
            .spawn(move || uart.run())?;

        let tx_signal = signal;
        let reply_timeout = config.reply_timeout;
        let poll = config.receive_poll;
        let tx_handle = std::thread::Builder::new()
            .name("seader-tx".into())
            .spawn(move || tx_loop(writer, frames_rx, replies_rx, tx_signal, reply_timeout, poll))?;

        Ok(Self {
            stop,
            transport: closer,
            handles: vec![uart_handle, tx_handle],
        })
    }

    pub fn shutdown(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        self.stop.stop();
        if let Err(e) = self.transport.close() {
            warn!("closing transport: {}", e);
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread panicked");
            }
        }
        debug!("worker stopped");
    }
}

impl Drop for RunningThreads {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct UartLoop {
    transport: Box<dyn Transport>,
    session: SamSession,
    requests: Receiver<LinkRequest>,
    producer: ApduProducer,
    link: SamLink,
    frames: Sender<Outgoing>,
    replies: Sender<()>,
    signal: StopSignal,
    poll: Duration,
}

impl UartLoop {
    fn run(&mut self) {
        let mut buf = Vec::new();
        while !self.signal.is_stopped() {
            let requests: Vec<LinkRequest> = self.requests.try_iter().collect();
            for request in requests {
                self.on_request(request);
            }

            match self.transport.receive(self.poll.as_millis() as u64) {
                Ok(bytes) => {
                    debug!("uart rx [{}]", bytes_to_hex(&bytes));
                    buf.extend_from_slice(&bytes);
                    let (actions, replies) = self.session.receive(&mut buf);
                    for _ in 0..replies {
                        let _ = self.replies.send(());
                    }
                    for action in actions {
                        self.on_action(action);
                    }
                }
                Err(Error::Timeout) => {}
                Err(Error::Disconnected) => break,
                Err(e) => {
                    warn!("uart receive failed: {}", e);
                    if self.signal.sleep(self.poll) {
                        break;
                    }
                }
            }
        }
        debug!("uart thread exiting");
    }

    fn send(&self, outgoing: Outgoing) {
        if self.frames.send(outgoing).is_err() {
            debug!("transmit thread gone");
        }
    }

    fn on_request(&mut self, request: LinkRequest) {
        match request {
            LinkRequest::CheckForSam => match self.session.check_for_sam() {
                Ok(actions) => actions.into_iter().for_each(|a| self.on_action(a)),
                Err(e) => warn!("cannot start SAM discovery: {}", e),
            },
            LinkRequest::Payload(bytes) => {
                let frame = encode_sam_apdu(&bytes).and_then(|apdu| self.session.xfr_block(&apdu));
                match frame {
                    Ok(frame) => self.send(Outgoing::Now(frame)),
                    Err(e) => {
                        warn!("cannot send payload [{}]: {}", hex_preview(&bytes, 16), e);
                        self.link.emit(WorkerEvent::Fail);
                    }
                }
            }
        }
    }

    fn on_action(&mut self, action: SessionAction) {
        match action {
            SessionAction::Send(frame) => self.send(Outgoing::Now(frame)),
            SessionAction::SendAfter(delay, frame) => self.send(Outgoing::After(delay, frame)),
            SessionAction::Emit(event) => self.link.emit(event.into()),
            SessionAction::Apdu(apdu) => self.on_apdu(&apdu),
            SessionAction::RequestVersion => {
                if let Err(e) = self.link.send_sam_command(SamCommand::Version) {
                    warn!("cannot request SAM version: {}", e);
                }
            }
            SessionAction::Abort => self.link.abort(),
        }
    }

    fn on_apdu(&mut self, apdu: &[u8]) {
        match ApduReply::parse(apdu) {
            Ok(ApduReply::MoreData(available)) => {
                match self.session.xfr_block(&get_response(available)) {
                    Ok(frame) => self.send(Outgoing::Now(frame)),
                    Err(e) => warn!("cannot fetch {} pending bytes: {}", available, e),
                }
            }
            Ok(ApduReply::Success(body)) => {
                if self.link.is_online() {
                    // QueueFull is logged by the producer
                    if let Err(Error::Disconnected) = self.producer.push(body.to_vec()) {
                        debug!("poller queue closed, dropping SAM answer");
                    }
                } else {
                    self.link.handle_offline(body);
                }
            }
            Ok(ApduReply::Status { sw1, sw2 }) => debug!("SAM status {:02x}{:02x}", sw1, sw2),
            Err(e) => warn!("bad APDU from SAM [{}]: {}", bytes_to_hex(apdu), e),
        }
    }
}

fn tx_loop(
    mut transport: Box<dyn Transport>,
    frames: Receiver<Outgoing>,
    replies: Receiver<()>,
    signal: StopSignal,
    reply_timeout: Duration,
    poll: Duration,
) {
    loop {
        if signal.is_stopped() {
            break;
        }
        let frame = match frames.recv_timeout(poll) {
            Ok(Outgoing::Now(frame)) => frame,
            Ok(Outgoing::After(delay, frame)) => {
                if signal.sleep(delay) {
                    break;
                }
                frame
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        while replies.try_recv().is_ok() {}

        debug!("uart tx [{}]", bytes_to_hex(&frame));
        if let Err(e) = transport.send(&frame) {
            warn!("uart send failed: {}", e);
            continue;
        }

        match replies.recv_timeout(reply_timeout) {
            Ok(()) => {}
            Err(RecvTimeoutError::Timeout) => debug!("no reply within {:?}", reply_timeout),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("transmit thread exiting");
}
