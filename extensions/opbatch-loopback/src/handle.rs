use crate::shared_state::{SharedState, lock};
use std::sync::{Arc, Mutex};

/// Control surface of a loopback call, shared by both of its ends.
#[derive(Clone)]
pub struct LoopbackHandle {
    shared: Arc<Mutex<SharedState>>,
}

impl LoopbackHandle {
    pub(crate) fn new(shared: Arc<Mutex<SharedState>>) -> Self {
        Self { shared }
    }

    /// Cancels the call. Every queued batch completes with failure right
    /// away, and so does every batch submitted afterwards.
    pub fn cancel(&self) {
        let deliveries = lock(&self.shared).cancel();

        tracing::debug!(failed = deliveries.len(), "loopback call cancelled");

        for delivery in deliveries {
            delivery.post();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        lock(&self.shared).is_cancelled()
    }

    /// While set, every newly submitted batch completes with failure and
    /// none of its sends are applied.
    pub fn set_fail_batches(&self, fail: bool) {
        lock(&self.shared).set_fail_batches(fail);
    }

    /// Batches accepted but still waiting for data.
    pub fn pending_batches(&self) -> usize {
        lock(&self.shared).pending_batches()
    }
}
