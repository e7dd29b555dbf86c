use crate::shared_state::{PendingBatch, SharedState, lock};
use crate::validate_batch;
use opbatch::call::{Call, CallError, CallTransport, CompletionTag, TransportOp};
use std::sync::{Arc, Mutex};

/// Which end of a loopback call a transport serves.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Client,
    Server,
}

/// One end of a loopback call.
///
/// Sends are applied to the shared state as soon as a batch is accepted.
/// A batch completes once every receive it carries can be satisfied, and
/// batches of the same end complete in the order they were submitted.
pub struct LoopbackTransport {
    side: Side,
    shared: Arc<Mutex<SharedState>>,
}

impl LoopbackTransport {
    pub(crate) fn new(side: Side, shared: Arc<Mutex<SharedState>>) -> Self {
        Self { side, shared }
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

impl CallTransport for LoopbackTransport {
    fn start_batch(
        &self,
        call: &Call,
        ops: &[TransportOp<'_>],
        tag: CompletionTag,
    ) -> Result<(), CallError> {
        if let Err(e) = validate_batch(self.side, ops) {
            tracing::warn!(call_id = call.id(), side = ?self.side, "batch rejected: {}", e);
            return Err(e);
        }

        let batch = PendingBatch::new(self.side, tag, call.completion_sender().clone(), ops);

        let deliveries = lock(&self.shared).submit(batch, ops).inspect_err(|e| {
            tracing::warn!(call_id = call.id(), side = ?self.side, "batch rejected: {}", e);
        })?;

        tracing::trace!(
            call_id = call.id(),
            side = ?self.side,
            tag = tag.value(),
            ops = ops.len(),
            completed = deliveries.len(),
            "loopback batch accepted"
        );

        for delivery in deliveries {
            delivery.post();
        }

        Ok(())
    }
}
