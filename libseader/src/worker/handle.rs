// libseader-rs/libseader/src/worker/handle.rs

use crossbeam_channel::{Receiver, unbounded};
use log::info;

use super::config::WorkerConfig;
use super::events::{StopHandle, StopSignal, WorkerEvent, stop_signal};
use super::threads::{RunningThreads, UartParts};
use crate::bridge::priority::PriorityControl;
use crate::bridge::queue::{ApduConsumer, ApduProducer, pending_apdu};
use crate::bridge::CardPollerBridge;
use crate::sam::{LinkRequest, SamInfo, SamLink};
use crate::transport::Transport;
use crate::Result;

/// Type-state: threads not started yet
pub struct Idle {
    transport: Box<dyn Transport>,
    requests: Receiver<LinkRequest>,
    producer: ApduProducer,
    stop: StopHandle,
}

/// Type-state: transport and transmit threads running
pub struct Running {
    threads: RunningThreads,
}

/// Handle to the SAM worker. Threads are only reachable in the
/// `Running` state.
pub struct SeaderWorker<State = Idle> {
    config: WorkerConfig,
    link: SamLink,
    events: Receiver<WorkerEvent>,
    queue: ApduConsumer,
    signal: StopSignal,
    state: State,
}

impl<State> SeaderWorker<State> {
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Outcomes reported by the worker
    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.events
    }

    pub fn link(&self) -> &SamLink {
        &self.link
    }

    pub fn sam_info(&self) -> SamInfo {
        self.link.sam_info()
    }
}

impl SeaderWorker<Idle> {
    pub fn new_with_transport(transport: Box<dyn Transport>, config: WorkerConfig) -> Result<Self> {
        config.validate()?;
        let (requests_tx, requests) = unbounded();
        let (events_tx, events) = unbounded();
        let (producer, queue) = pending_apdu(config.queue_capacity, config.queue_push_timeout)?;
        let (stop, signal) = stop_signal();

        Ok(Self {
            config,
            link: SamLink::new(requests_tx, events_tx),
            events,
            queue,
            signal,
            state: Idle {
                transport,
                requests,
                producer,
                stop,
            },
        })
    }

    /// Spawn the worker threads.
    pub fn start(self) -> Result<SeaderWorker<Running>> {
        let Idle {
            transport,
            requests,
            producer,
            stop,
        } = self.state;

        let threads = RunningThreads::spawn(UartParts {
            transport,
            config: self.config,
            link: self.link.clone(),
            requests,
            producer,
            stop,
            signal: self.signal.clone(),
        })?;
        info!("worker started");

        Ok(SeaderWorker {
            config: self.config,
            link: self.link,
            events: self.events,
            queue: self.queue,
            signal: self.signal,
            state: Running { threads },
        })
    }
}

impl SeaderWorker<Running> {
    /// Start a fresh SAM discovery. The outcome arrives on [`events`](Self::events).
    pub fn check_for_sam(&self) -> Result<()> {
        self.link.check_for_sam()
    }

    /// Bridge for one card read, to be driven from the poller callback.
    pub fn bridge(&self, priority: Box<dyn PriorityControl>) -> CardPollerBridge {
        CardPollerBridge::new(
            self.link.clone(),
            self.queue.clone(),
            priority,
            self.signal.clone(),
            self.config.max_fwt,
        )
    }

    pub fn is_stopped(&self) -> bool {
        self.signal.is_stopped()
    }

    /// Stop and join the threads and close the transport.
    pub fn stop(mut self) {
        self.state.threads.shutdown();
    }
}
