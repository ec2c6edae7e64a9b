// libseader-rs/libseader/src/bridge/priority.rs

/// Scheduling level of the thread driving the card poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Contactless timing matters
    TimeCritical,
    /// Waiting on the SAM
    Background,
}

/// Hook into the platform scheduler for the poller thread.
pub trait PriorityControl: Send {
    fn set_priority(&mut self, priority: Priority);

    fn demote(&mut self) {
        self.set_priority(Priority::Background);
    }

    fn elevate(&mut self) {
        self.set_priority(Priority::TimeCritical);
    }
}

/// For platforms without a priority API
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPriority;

impl PriorityControl for NoopPriority {
    fn set_priority(&mut self, _priority: Priority) {}
}
