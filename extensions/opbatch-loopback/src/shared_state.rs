use crate::Side;
use bytes::Bytes;
use opbatch::call::{BatchCompletion, CallError, CompletionTag, TrailingStatus, TransportOp};
use opbatch::codec::ByteBuffer;
use opbatch::metadata::MetadataMap;
use opbatch::{CompletionSender, StatusCode};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A batch waiting until the data its receive operations need is there.
pub(crate) struct PendingBatch {
    side: Side,
    tag: CompletionTag,
    sender: CompletionSender,
    recv_initial_metadata: bool,
    recv_message: bool,
    recv_status: bool,
}

impl PendingBatch {
    pub(crate) fn new(
        side: Side,
        tag: CompletionTag,
        sender: CompletionSender,
        ops: &[TransportOp<'_>],
    ) -> Self {
        let mut batch = Self {
            side,
            tag,
            sender,
            recv_initial_metadata: false,
            recv_message: false,
            recv_status: false,
        };

        for op in ops {
            match op {
                TransportOp::RecvInitialMetadata => batch.recv_initial_metadata = true,
                TransportOp::RecvMessage => batch.recv_message = true,
                TransportOp::RecvStatusOnClient => batch.recv_status = true,
                _ => {}
            }
        }

        batch
    }

    fn deliver(self, completion: BatchCompletion) -> Delivery {
        Delivery {
            sender: self.sender,
            tag: self.tag,
            completion,
        }
    }
}

/// A completion ready to be posted once the shared state is unlocked.
pub(crate) struct Delivery {
    sender: CompletionSender,
    tag: CompletionTag,
    completion: BatchCompletion,
}

impl Delivery {
    pub(crate) fn post(self) {
        if !self.sender.send(self.tag, self.completion) {
            tracing::warn!(tag = self.tag.value(), "completion queue gone, completion dropped");
        }
    }
}

/// Everything both ends of one loopback call can see.
#[derive(Default)]
pub(crate) struct SharedState {
    to_server: VecDeque<Bytes>,
    to_client: VecDeque<Bytes>,
    client_initial_metadata: Option<MetadataMap>,
    server_initial_metadata: Option<MetadataMap>,
    client_closed: bool,
    status: Option<TrailingStatus>,
    cancelled: bool,
    fail_batches: bool,
    client_pending: VecDeque<PendingBatch>,
    server_pending: VecDeque<PendingBatch>,
}

impl SharedState {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub(crate) fn set_fail_batches(&mut self, fail: bool) {
        self.fail_batches = fail;
    }

    pub(crate) fn pending_batches(&self) -> usize {
        self.client_pending.len() + self.server_pending.len()
    }

    /// Accepts one batch: applies its sends, queues it, and returns every
    /// batch that can now complete, in submission order per side.
    pub(crate) fn submit(
        &mut self,
        batch: PendingBatch,
        ops: &[TransportOp<'_>],
    ) -> Result<Vec<Delivery>, CallError> {
        if self.cancelled {
            let completion = Self::failed_completion(&batch, StatusCode::Cancelled, "Cancelled");
            return Ok(vec![batch.deliver(completion)]);
        }

        if self.fail_batches {
            let completion = Self::failed_completion(
                &batch,
                StatusCode::Unavailable,
                "injected transport failure",
            );
            return Ok(vec![batch.deliver(completion)]);
        }

        self.check_open(batch.side, ops)?;
        self.apply_sends(batch.side, ops);
        self.queue_mut(batch.side).push_back(batch);

        Ok(self.drain_ready())
    }

    /// Fails every queued batch and every batch submitted from now on.
    pub(crate) fn cancel(&mut self) -> Vec<Delivery> {
        self.cancelled = true;

        self.client_pending
            .drain(..)
            .chain(self.server_pending.drain(..))
            .map(|batch| {
                let completion =
                    Self::failed_completion(&batch, StatusCode::Cancelled, "Cancelled");
                batch.deliver(completion)
            })
            .collect()
    }

    fn failed_completion(batch: &PendingBatch, code: StatusCode, details: &str) -> BatchCompletion {
        let mut completion = BatchCompletion::failed();
        if batch.recv_status {
            completion.status = Some(TrailingStatus {
                code: code.value(),
                details: Bytes::copy_from_slice(details.as_bytes()),
                trailing_metadata: MetadataMap::new(),
                debug_error_string: Some(format!("loopback: {}", details)),
            });
        }
        completion
    }

    fn check_open(&self, side: Side, ops: &[TransportOp<'_>]) -> Result<(), CallError> {
        let sends = ops.iter().any(|op| {
            matches!(
                op,
                TransportOp::SendInitialMetadata { .. }
                    | TransportOp::SendMessage { .. }
                    | TransportOp::SendCloseFromClient
                    | TransportOp::SendStatusFromServer { .. }
            )
        });

        let closed = match side {
            Side::Client => self.client_closed,
            Side::Server => self.status.is_some(),
        };

        if sends && closed {
            return Err(CallError::Closed);
        }
        Ok(())
    }

    fn apply_sends(&mut self, side: Side, ops: &[TransportOp<'_>]) {
        for op in ops {
            match op {
                TransportOp::SendInitialMetadata { metadata, .. } => {
                    let metadata = metadata.to_metadata_map();
                    match side {
                        Side::Client => self.client_initial_metadata = Some(metadata),
                        Side::Server => self.server_initial_metadata = Some(metadata),
                    }
                }
                TransportOp::SendMessage { message, .. } => {
                    let payload = message.bytes().unwrap_or_default();
                    match side {
                        Side::Client => self.to_server.push_back(payload),
                        Side::Server => self.to_client.push_back(payload),
                    }
                }
                TransportOp::SendCloseFromClient => self.client_closed = true,
                TransportOp::SendStatusFromServer {
                    trailing_metadata,
                    code,
                    details,
                } => {
                    self.status = Some(TrailingStatus {
                        code: code.value(),
                        details: details
                            .map(|details| Bytes::copy_from_slice(details.as_bytes()))
                            .unwrap_or_default(),
                        trailing_metadata: trailing_metadata.to_metadata_map(),
                        debug_error_string: None,
                    });
                }
                TransportOp::RecvInitialMetadata
                | TransportOp::RecvMessage
                | TransportOp::RecvStatusOnClient => {}
            }
        }
    }

    fn queue(&self, side: Side) -> &VecDeque<PendingBatch> {
        match side {
            Side::Client => &self.client_pending,
            Side::Server => &self.server_pending,
        }
    }

    fn queue_mut(&mut self, side: Side) -> &mut VecDeque<PendingBatch> {
        match side {
            Side::Client => &mut self.client_pending,
            Side::Server => &mut self.server_pending,
        }
    }

    fn ready(&self, batch: &PendingBatch) -> bool {
        match batch.side {
            Side::Client => {
                let finished = self.status.is_some();
                (!batch.recv_initial_metadata || self.server_initial_metadata.is_some() || finished)
                    && (!batch.recv_message || !self.to_client.is_empty() || finished)
                    && (!batch.recv_status || finished)
            }
            Side::Server => {
                (!batch.recv_initial_metadata || self.client_initial_metadata.is_some())
                    && (!batch.recv_message || !self.to_server.is_empty() || self.client_closed)
            }
        }
    }

    fn complete(&mut self, batch: &PendingBatch) -> BatchCompletion {
        let mut completion = BatchCompletion::succeeded();

        match batch.side {
            Side::Client => {
                if batch.recv_initial_metadata {
                    completion.initial_metadata =
                        Some(self.server_initial_metadata.take().unwrap_or_default());
                }
                if batch.recv_message {
                    completion.message = self.to_client.pop_front().map(ByteBuffer::from_bytes);
                }
                if batch.recv_status {
                    completion.status = self.status.clone();
                }
            }
            Side::Server => {
                if batch.recv_initial_metadata {
                    completion.initial_metadata = self.client_initial_metadata.take();
                }
                if batch.recv_message {
                    completion.message = self.to_server.pop_front().map(ByteBuffer::from_bytes);
                }
            }
        }

        completion
    }

    fn drain_ready(&mut self) -> Vec<Delivery> {
        let mut deliveries = Vec::new();

        for side in [Side::Client, Side::Server] {
            while self.queue(side).front().is_some_and(|batch| self.ready(batch)) {
                let Some(batch) = self.queue_mut(side).pop_front() else {
                    break;
                };
                let completion = self.complete(&batch);
                deliveries.push(batch.deliver(completion));
            }
        }

        deliveries
    }
}
