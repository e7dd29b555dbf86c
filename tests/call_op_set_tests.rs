use bytes::Bytes;
use opbatch::call::{BatchCompletion, TrailingStatus, TransportOp, TransportOpKind};
use opbatch::codec::MessageCodec;
use opbatch::metadata::MetadataMap;
use opbatch::ops::{
    ClientRecvStatusOp, ClientSendCloseOp, RecvInitialMetadataOp, RecvMessageOp,
    SendInitialMetadataOp, SendMessageOp,
};
use opbatch::{
    Call, CallError, CallOpSet, CallTransport, CompletionQueue, CompletionTag, WriteOptions,
};
use std::sync::{Arc, Mutex};

// --- Test Setup: Mock Transport ---

#[derive(Debug, Clone)]
struct RecordedBatch {
    tag: CompletionTag,
    kinds: Vec<TransportOpKind>,
    initial_metadata: Option<MetadataMap>,
    message: Option<Bytes>,
}

/// Records every batch and leaves completing them to the test.
#[derive(Default)]
struct RecordingTransport {
    batches: Mutex<Vec<RecordedBatch>>,
    reject: bool,
}

impl RecordingTransport {
    fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    fn batches(&self) -> Vec<RecordedBatch> {
        self.batches.lock().unwrap().clone()
    }
}

impl CallTransport for RecordingTransport {
    fn start_batch(
        &self,
        _call: &Call,
        ops: &[TransportOp<'_>],
        tag: CompletionTag,
    ) -> Result<(), CallError> {
        if self.reject {
            return Err(CallError::Closed);
        }

        let mut batch = RecordedBatch {
            tag,
            kinds: ops.iter().map(TransportOp::kind).collect(),
            initial_metadata: None,
            message: None,
        };
        for op in ops {
            match op {
                TransportOp::SendInitialMetadata { metadata, .. } => {
                    batch.initial_metadata = Some(metadata.to_metadata_map());
                }
                TransportOp::SendMessage { message, .. } => batch.message = message.bytes(),
                _ => {}
            }
        }

        self.batches.lock().unwrap().push(batch);
        Ok(())
    }
}

fn unary_ops(request: &str) -> CallOpSet {
    let mut metadata = MetadataMap::new();
    metadata.insert("x-request-id", "1");

    let mut send_metadata = SendInitialMetadataOp::new();
    send_metadata.send_initial_metadata(metadata, 0);

    let mut send_message = SendMessageOp::new();
    send_message
        .send_message(&request.to_string(), WriteOptions::new())
        .unwrap();

    let mut close = ClientSendCloseOp::new();
    close.client_send_close();

    let mut recv_metadata = RecvInitialMetadataOp::new();
    recv_metadata.recv_initial_metadata();

    let mut recv_message = RecvMessageOp::<String>::new();
    recv_message.recv_message();

    let mut recv_status = ClientRecvStatusOp::new();
    recv_status.client_recv_status();

    CallOpSet::new()
        .with_op(send_metadata)
        .with_op(send_message)
        .with_op(close)
        .with_op(recv_metadata)
        .with_op(recv_message)
        .with_op(recv_status)
}

fn unary_completion(response: &str) -> BatchCompletion {
    let (buffer, _) = response.to_string().serialize().unwrap();

    BatchCompletion {
        success: true,
        initial_metadata: Some(MetadataMap::new()),
        message: Some(buffer),
        status: Some(TrailingStatus::default()),
    }
}

// --- Tests ---

#[test]
fn test_descriptors_follow_slot_order() {
    let transport = Arc::new(RecordingTransport::default());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());

    let tag = cq.start_batch(unary_ops("ping"), &call);

    let batches = transport.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].tag, tag);
    assert_eq!(
        batches[0].kinds,
        vec![
            TransportOpKind::SendInitialMetadata,
            TransportOpKind::SendMessage,
            TransportOpKind::SendCloseFromClient,
            TransportOpKind::RecvInitialMetadata,
            TransportOpKind::RecvMessage,
            TransportOpKind::RecvStatusOnClient,
        ]
    );
    assert_eq!(
        batches[0]
            .initial_metadata
            .as_ref()
            .and_then(|metadata| metadata.get_str("x-request-id")),
        Some("1")
    );
    assert_eq!(
        batches[0]
            .message
            .clone()
            .map(|bytes| String::deserialize(&bytes.into())),
        Some(Ok("ping".to_string()))
    );
}

#[test]
fn test_exactly_one_event_per_attempt() {
    let transport = Arc::new(RecordingTransport::default());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());

    let ops = unary_ops("ping");
    let return_tag = ops.return_tag();
    let tag = cq.start_batch(ops, &call);
    assert_eq!(cq.pending_count(), 1);

    assert!(call.completion_sender().send(tag, unary_completion("pong")));

    let mut done = cq.try_next().expect("attempt finished");
    assert!(done.ok);
    assert_eq!(done.tag, return_tag);
    assert_eq!(
        done.ops
            .op_mut::<RecvMessageOp<String>>()
            .and_then(|op| op.take_message())
            .as_deref(),
        Some("pong")
    );

    assert_eq!(cq.pending_count(), 0);
    assert!(cq.try_next().is_none());
}

#[test]
fn test_failed_batch_reports_not_ok() {
    let transport = Arc::new(RecordingTransport::default());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());

    let tag = cq.start_batch(unary_ops("ping"), &call);
    call.completion_sender().send(tag, BatchCompletion::failed());

    let done = cq.try_next().expect("attempt finished");
    assert!(!done.ok);
}

#[test]
fn test_call_is_held_while_batch_outstanding() {
    let transport = Arc::new(RecordingTransport::default());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());
    assert_eq!(call.ref_count(), 1);

    let tag = cq.start_batch(unary_ops("ping"), &call);
    assert_eq!(call.ref_count(), 2);

    call.completion_sender().send(tag, unary_completion("pong"));
    let done = cq.try_next().expect("attempt finished");

    assert_eq!(call.ref_count(), 1);
    assert!(done.ops.call().is_none());
}

#[test]
fn test_tag_overrides() {
    let transport = Arc::new(RecordingTransport::default());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());

    let transport_tag = CompletionTag::next();
    let output_tag = CompletionTag::next();

    let mut ops = unary_ops("ping");
    ops.set_cq_tag(transport_tag);
    ops.set_output_tag(output_tag);

    assert_eq!(cq.start_batch(ops, &call), transport_tag);
    assert_eq!(transport.batches()[0].tag, transport_tag);

    call.completion_sender()
        .send(transport_tag, unary_completion("pong"));
    let done = cq.try_next().expect("attempt finished");
    assert_eq!(done.tag, output_tag);
}

#[test]
fn test_default_tags_are_unique() {
    let a = CallOpSet::new();
    let b = CallOpSet::new();

    assert_ne!(a.cq_tag(), b.cq_tag());
    assert_ne!(a.return_tag(), b.return_tag());
    assert_ne!(a.cq_tag(), a.return_tag());
}

#[test]
fn test_clone_starts_a_fresh_attempt() {
    let transport = Arc::new(RecordingTransport::default());
    let cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());

    let mut ops = unary_ops("ping");
    ops.fill_ops(&call);

    let copy = ops.clone();

    assert!(copy.is_empty());
    assert!(copy.call().is_none());
    assert!(!copy.is_done_intercepting());
    assert_ne!(copy.cq_tag(), ops.cq_tag());
    assert_ne!(copy.return_tag(), ops.return_tag());
    assert!(copy.op::<SendMessageOp>().is_none());
    assert_eq!(ops.len(), 6);
}

#[test]
fn test_finalize_without_queue() {
    let transport = Arc::new(RecordingTransport::default());
    let cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());

    let mut ops = unary_ops("ping");
    ops.fill_ops(&call);
    let event = ops
        .finalize_result(unary_completion("pong"))
        .expect("no interceptors, no second round trip");

    assert!(event.ok);
    assert_eq!(event.tag, ops.return_tag());
    assert!(
        ops.op::<ClientRecvStatusOp>()
            .expect("status slot")
            .status()
            .is_ok()
    );
}

#[test]
fn test_unknown_tags_are_dropped() {
    let transport = Arc::new(RecordingTransport::default());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());

    cq.start_batch(unary_ops("ping"), &call);
    cq.sender()
        .send(CompletionTag::next(), BatchCompletion::succeeded());

    assert!(cq.try_next().is_none());
    assert_eq!(cq.pending_count(), 1);
}

#[tokio::test]
async fn test_next_waits_for_completion() {
    let transport = Arc::new(RecordingTransport::default());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport.clone(), cq.sender());

    assert!(cq.next().await.is_none());

    let tag = cq.start_batch(unary_ops("ping"), &call);
    let sender = call.completion_sender().clone();
    tokio::spawn(async move {
        sender.send(tag, unary_completion("pong"));
    });

    let done = cq.next().await.expect("attempt finished");
    assert!(done.ok);
}

#[test]
#[should_panic(expected = "transport rejected batch")]
fn test_transport_rejection_is_fatal() {
    let transport = Arc::new(RecordingTransport::rejecting());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport, cq.sender());

    cq.start_batch(unary_ops("ping"), &call);
}

#[test]
#[should_panic(expected = "at most 6 operations")]
fn test_seventh_slot_is_fatal() {
    let mut ops = CallOpSet::new();
    for _ in 0..7 {
        ops.push_op(RecvMessageOp::<String>::new());
    }
}

#[test]
#[should_panic(expected = "no batch in flight")]
fn test_finalize_without_fill_is_fatal() {
    let mut ops = unary_ops("ping");
    ops.finalize_result(BatchCompletion::succeeded());
}

#[test]
#[should_panic(expected = "already has a batch in flight")]
fn test_duplicate_transport_tag_is_fatal() {
    let transport = Arc::new(RecordingTransport::default());
    let mut cq = CompletionQueue::new();
    let call = Call::new(transport, cq.sender());

    let tag = CompletionTag::next();
    let mut first = unary_ops("one");
    first.set_cq_tag(tag);
    let mut second = unary_ops("two");
    second.set_cq_tag(tag);

    cq.start_batch(first, &call);
    cq.start_batch(second, &call);
}
