use crate::batch::{CallOpSet, CompletedBatch};
use crate::call::{BatchCompletion, Call, CompletionTag};
use crate::utils::fatal;
use futures::StreamExt;
use futures::channel::mpsc;
use std::collections::HashMap;
use std::fmt;

/// Handle transports use to post batch completions back to a queue.
#[derive(Clone)]
pub struct CompletionSender {
    tx: mpsc::UnboundedSender<(CompletionTag, BatchCompletion)>,
}

impl CompletionSender {
    /// Posts `completion` for `tag`. Returns `false` if the queue is gone.
    pub fn send(&self, tag: CompletionTag, completion: BatchCompletion) -> bool {
        self.tx.unbounded_send((tag, completion)).is_ok()
    }
}

impl fmt::Debug for CompletionSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Routes transport completions to the op sets that are waiting on them.
///
/// Op sets started through the queue are owned by it until their attempt
/// finishes, keyed by transport tag. Completions for tags the queue does
/// not know are logged and dropped.
pub struct CompletionQueue {
    sender: CompletionSender,
    receiver: mpsc::UnboundedReceiver<(CompletionTag, BatchCompletion)>,
    pending: HashMap<CompletionTag, CallOpSet>,
}

impl CompletionQueue {
    pub fn new() -> Self {
        let (tx, receiver) = mpsc::unbounded();

        Self {
            sender: CompletionSender { tx },
            receiver,
            pending: HashMap::new(),
        }
    }

    /// Sender to hand to calls whose completions this queue receives.
    pub fn sender(&self) -> CompletionSender {
        self.sender.clone()
    }

    /// Fills `ops` on `call` and tracks it until its attempt finishes.
    /// Returns the transport tag the op set was submitted under.
    pub fn start_batch(&mut self, mut ops: CallOpSet, call: &Call) -> CompletionTag {
        let tag = ops.cq_tag();
        if self.pending.contains_key(&tag) {
            fatal(format!("tag {} already has a batch in flight", tag.value()));
        }

        ops.fill_ops(call);
        self.pending.insert(tag, ops);
        tag
    }

    /// Number of op sets still waiting for a completion.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Waits for the next finished attempt. Returns `None` once nothing is
    /// in flight.
    pub async fn next(&mut self) -> Option<CompletedBatch> {
        loop {
            if self.pending.is_empty() {
                return None;
            }

            let (tag, completion) = self.receiver.next().await?;
            if let Some(done) = self.dispatch(tag, completion) {
                return Some(done);
            }
        }
    }

    /// Non-blocking form of `next`: drains queued completions until one
    /// finishes an attempt.
    pub fn try_next(&mut self) -> Option<CompletedBatch> {
        while let Ok(Some((tag, completion))) = self.receiver.try_next() {
            if let Some(done) = self.dispatch(tag, completion) {
                return Some(done);
            }
        }
        None
    }

    fn dispatch(&mut self, tag: CompletionTag, completion: BatchCompletion) -> Option<CompletedBatch> {
        let Some(mut ops) = self.pending.remove(&tag) else {
            tracing::warn!(tag = tag.value(), "completion for unknown tag dropped");
            return None;
        };

        match ops.finalize_result(completion) {
            Some(event) => Some(CompletedBatch {
                tag: event.tag,
                ok: event.ok,
                ops,
            }),
            None => {
                self.pending.insert(tag, ops);
                None
            }
        }
    }
}

impl Default for CompletionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompletionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}
