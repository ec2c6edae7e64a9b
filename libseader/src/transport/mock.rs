// libseader-rs/libseader/src/transport/mock.rs

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::transport::traits::Transport;
use crate::{Error, Result};

/// Produces the reader's replies to one written frame
pub type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

#[derive(Default)]
struct MockState {
    sent: Vec<Vec<u8>>,
    responses: VecDeque<Vec<u8>>,
    responder: Option<Responder>,
    closed: bool,
}

/// Mock transport for tests. Records written frames and returns queued
/// responses; clones share the same link, like a cloned serial port.
#[derive(Clone, Default)]
pub struct MockTransport {
    shared: Arc<(Mutex<MockState>, Condvar)>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("MockTransport")
            .field("sent", &state.sent.len())
            .field("responses", &state.responses.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.shared.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue bytes for a later `receive`.
    pub fn push_response(&self, resp: Vec<u8>) {
        self.state().responses.push_back(resp);
        self.shared.1.notify_all();
    }

    /// Answer every written frame with the responder's output.
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        self.state().responder = Some(Box::new(responder));
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state().sent.clone()
    }

    pub fn take_sent(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.state().sent)
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        if state.closed {
            return Err(Error::Disconnected);
        }
        state.sent.push(data.to_vec());
        let replies = match state.responder.as_mut() {
            Some(responder) => responder(data),
            None => Vec::new(),
        };
        if !replies.is_empty() {
            state.responses.extend(replies);
            self.shared.1.notify_all();
        }
        Ok(())
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let mut state = self.state();
        loop {
            if state.closed {
                return Err(Error::Disconnected);
            }
            if let Some(resp) = state.responses.pop_front() {
                return Ok(resp);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout);
            }
            state = self
                .shared
                .1
                .wait_timeout(state, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }

    fn try_clone(&self) -> Result<Box<dyn Transport>> {
        Ok(Box::new(self.clone()))
    }

    fn close(&mut self) -> Result<()> {
        self.state().closed = true;
        self.shared.1.notify_all();
        Ok(())
    }
}
