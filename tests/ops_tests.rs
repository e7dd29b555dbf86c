use bytes::Bytes;
use opbatch::call::{BatchCompletion, CompressionLevel, TrailingStatus, TransportOp};
use opbatch::codec::{ByteBuffer, MessageCodec};
use opbatch::constants::{
    BINARY_ERROR_DETAILS_KEY, INITIAL_METADATA_WAIT_FOR_READY, WRITE_BUFFER_HINT, WRITE_NO_COMPRESS,
};
use opbatch::interceptor::{HookPointSet, InterceptionHookPoint};
use opbatch::metadata::MetadataMap;
use opbatch::ops::{
    CallOp, ClientRecvStatusOp, GenericRecvMessageOp, RecvInitialMetadataOp, RecvMessageOp,
    SendInitialMetadataOp, SendMessageOp, ServerSendStatusOp,
};
use opbatch::{Status, StatusCode, WriteOptions};

/// A message whose serialization always fails.
struct Unserializable;

impl MessageCodec for Unserializable {
    fn serialize(&self) -> Result<(ByteBuffer, bool), Status> {
        Err(Status::new(StatusCode::Internal, "cannot serialize"))
    }

    fn deserialize(_buffer: &ByteBuffer) -> Result<Self, Status> {
        Err(Status::new(StatusCode::Internal, "cannot deserialize"))
    }
}

fn finish(op: &mut dyn CallOp, completion: &mut BatchCompletion) -> bool {
    let mut status = completion.success;
    op.finish_op(completion, &mut status);
    status
}

// --- Send side ---

#[test]
fn test_send_message_copies_then_clears_flags() {
    let mut options = WriteOptions::new();
    options.set_buffer_hint().set_no_compression().set_last_message();

    let mut op = SendMessageOp::new();
    op.send_message(&"payload".to_string(), options)
        .expect("strings encode");
    assert_eq!(op.write_options().flags(), WRITE_BUFFER_HINT | WRITE_NO_COMPRESS);

    let (flags, last_message, payload) = {
        let mut ops = Vec::new();
        op.add_op(&mut ops);
        match &ops[..] {
            [TransportOp::SendMessage {
                message,
                flags,
                last_message,
            }] => (*flags, *last_message, message.bytes()),
            other => panic!("unexpected descriptors: {:?}", other),
        }
    };

    assert_eq!(flags, WRITE_BUFFER_HINT | WRITE_NO_COMPRESS);
    assert!(last_message);
    assert_eq!(
        String::deserialize(&ByteBuffer::from_bytes(payload.expect("payload present"))),
        Ok("payload".to_string())
    );

    // Flags are single-use; the buffer survives until the batch finishes.
    assert_eq!(op.write_options().flags(), 0);
    assert!(op.buffer().valid());

    assert!(finish(&mut op, &mut BatchCompletion::succeeded()));
    assert!(!op.buffer().valid());
}

#[test]
fn test_failed_serialization_clears_options_and_buffer() {
    let mut options = WriteOptions::new();
    options.set_write_through();

    let mut op = SendMessageOp::new();
    let result = op.send_message(&Unserializable, options);

    assert_eq!(
        result,
        Err(Status::new(StatusCode::Internal, "cannot serialize"))
    );
    assert_eq!(op.write_options().flags(), 0);
    assert!(!op.buffer().valid());

    let mut ops = Vec::new();
    op.add_op(&mut ops);
    assert!(ops.is_empty());
}

#[test]
fn test_shared_buffer_is_copied_before_sending() {
    let original = ByteBuffer::from(vec![1u8, 2, 3]);

    let mut op = SendMessageOp::new();
    op.send_message(&original, WriteOptions::new())
        .expect("buffers pass through");

    assert_eq!(op.buffer().as_slice(), original.as_slice());
    assert_ne!(op.buffer().as_slice().as_ptr(), original.as_slice().as_ptr());
}

#[test]
fn test_initial_metadata_descriptor_carries_flags_and_compression() {
    let mut metadata = MetadataMap::new();
    metadata.insert("x-a", "1");

    let mut op = SendInitialMetadataOp::new();
    op.send_initial_metadata(metadata, INITIAL_METADATA_WAIT_FOR_READY);
    op.set_compression_level(CompressionLevel::High);

    {
        let mut ops = Vec::new();
        op.add_op(&mut ops);
        match &ops[..] {
            [TransportOp::SendInitialMetadata {
                metadata,
                flags,
                compression_level,
            }] => {
                assert_eq!(metadata.len(), 1);
                assert_eq!(*flags, INITIAL_METADATA_WAIT_FOR_READY);
                assert_eq!(*compression_level, Some(CompressionLevel::High));
            }
            other => panic!("unexpected descriptors: {:?}", other),
        }
    }

    assert!(finish(&mut op, &mut BatchCompletion::succeeded()));
    assert!(!op.is_pending());

    // A new send forgets the previous compression level.
    op.send_initial_metadata(MetadataMap::new(), 0);
    let mut ops = Vec::new();
    op.add_op(&mut ops);
    match &ops[..] {
        [TransportOp::SendInitialMetadata {
            metadata,
            compression_level,
            ..
        }] => {
            assert!(metadata.is_absent());
            assert_eq!(*compression_level, None);
        }
        other => panic!("unexpected descriptors: {:?}", other),
    }
}

#[test]
fn test_server_status_descriptor() {
    let mut trailing = MetadataMap::new();
    trailing.insert("x-trace", "abc");

    let mut op = ServerSendStatusOp::new();
    op.server_send_status(
        trailing,
        Status::with_details(StatusCode::NotFound, "not found", vec![1u8, 2]),
    );

    let mut ops = Vec::new();
    op.add_op(&mut ops);
    match &ops[..] {
        [TransportOp::SendStatusFromServer {
            trailing_metadata,
            code,
            details,
        }] => {
            assert_eq!(*code, StatusCode::NotFound);
            assert_eq!(*details, Some("not found"));
            assert_eq!(trailing_metadata.len(), 2);
            let last = trailing_metadata.entries().last().expect("two entries");
            assert_eq!(last.key, BINARY_ERROR_DETAILS_KEY);
            assert_eq!(last.value, &[1u8, 2]);
        }
        other => panic!("unexpected descriptors: {:?}", other),
    }
}

#[test]
fn test_ok_status_sends_no_details() {
    let mut op = ServerSendStatusOp::new();
    op.server_send_status(MetadataMap::new(), Status::ok());

    let mut ops = Vec::new();
    op.add_op(&mut ops);
    match &ops[..] {
        [TransportOp::SendStatusFromServer {
            trailing_metadata,
            code,
            details,
        }] => {
            assert_eq!(*code, StatusCode::Ok);
            assert_eq!(*details, None);
            assert!(trailing_metadata.is_absent());
        }
        other => panic!("unexpected descriptors: {:?}", other),
    }
}

// --- Receive side ---

#[test]
fn test_unrequested_receive_leaves_status_alone() {
    let mut op = RecvMessageOp::<String>::new();

    let mut ops = Vec::new();
    op.add_op(&mut ops);
    assert!(ops.is_empty());

    assert!(finish(&mut op, &mut BatchCompletion::succeeded()));
    assert!(!finish(&mut op, &mut BatchCompletion::failed()));
}

#[test]
fn test_missing_message_fails_unless_allowed() {
    let mut op = RecvMessageOp::<String>::new();
    op.recv_message();
    assert!(!finish(&mut op, &mut BatchCompletion::succeeded()));
    assert!(!op.got_message());

    let mut op = RecvMessageOp::<String>::new();
    op.recv_message();
    op.allow_no_message();
    assert!(finish(&mut op, &mut BatchCompletion::succeeded()));
    assert!(!op.got_message());
}

#[test]
fn test_received_message_is_decoded() {
    let (buffer, _) = "hello".to_string().serialize().expect("strings encode");

    let mut op = RecvMessageOp::<String>::new();
    op.recv_message();

    let mut completion = BatchCompletion::succeeded();
    completion.message = Some(buffer);

    assert!(finish(&mut op, &mut completion));
    assert!(op.got_message());
    assert_eq!(op.take_message().as_deref(), Some("hello"));
    assert!(completion.message.is_none());
}

#[test]
fn test_decode_failure_fails_batch() {
    let mut op = RecvMessageOp::<u64>::new();
    op.recv_message();

    let mut completion = BatchCompletion::succeeded();
    completion.message = Some(ByteBuffer::from(Vec::new()));

    assert!(!finish(&mut op, &mut completion));
    assert!(!op.got_message());
    assert!(op.message().is_none());
}

#[test]
fn test_message_on_failed_batch_is_ignored() {
    let (buffer, _) = 7u64.serialize().expect("integers encode");

    let mut op = RecvMessageOp::<u64>::new();
    op.recv_message();

    let mut completion = BatchCompletion::failed();
    completion.message = Some(buffer);

    assert!(!finish(&mut op, &mut completion));
    assert!(!op.got_message());
    assert!(op.message().is_none());
}

#[test]
fn test_generic_receive_reports_bytes_even_when_decoding_fails() {
    let mut op = GenericRecvMessageOp::new();
    op.recv_message::<u64>();

    let mut completion = BatchCompletion::succeeded();
    completion.message = Some(ByteBuffer::from(Vec::new()));

    assert!(!finish(&mut op, &mut completion));
    assert!(op.got_message());
    assert!(op.message::<u64>().is_none());
}

#[test]
fn test_generic_receive_decodes_requested_type() {
    let (buffer, _) = 42u64.serialize().expect("integers encode");

    let mut op = GenericRecvMessageOp::new();
    op.recv_message::<u64>();

    let mut completion = BatchCompletion::succeeded();
    completion.message = Some(buffer);

    assert!(finish(&mut op, &mut completion));
    assert_eq!(op.message::<u64>(), Some(&42));
    assert!(op.message::<String>().is_none());
    assert_eq!(op.take_message::<u64>(), Some(42));
}

fn armed_after_finish(op: &mut dyn CallOp) -> bool {
    let mut hooks = HookPointSet::new();
    op.arm_finish_hook_points(&mut hooks);
    hooks.contains(InterceptionHookPoint::PostRecvMessage)
}

#[test]
fn test_receive_hook_arms_only_for_requesting_attempt() {
    let (buffer, _) = "pong".to_string().serialize().expect("strings encode");

    let mut op = RecvMessageOp::<String>::new();
    op.recv_message();
    let mut completion = BatchCompletion::succeeded();
    completion.message = Some(buffer);
    assert!(finish(&mut op, &mut completion));

    assert!(armed_after_finish(&mut op));
    assert!(!armed_after_finish(&mut op));

    // Reused without asking for a message this time.
    assert!(finish(&mut op, &mut BatchCompletion::succeeded()));
    assert!(!armed_after_finish(&mut op));
    assert!(!op.got_message());
    assert!(op.message().is_none());
}

#[test]
fn test_generic_receive_hook_arms_only_for_requesting_attempt() {
    let (buffer, _) = 7u64.serialize().expect("integers encode");

    let mut op = GenericRecvMessageOp::new();
    op.recv_message::<u64>();
    let mut completion = BatchCompletion::succeeded();
    completion.message = Some(buffer);
    assert!(finish(&mut op, &mut completion));

    assert!(armed_after_finish(&mut op));
    assert!(!armed_after_finish(&mut op));

    assert!(finish(&mut op, &mut BatchCompletion::succeeded()));
    assert!(!armed_after_finish(&mut op));
    assert!(!op.got_message());
    assert!(op.message::<u64>().is_none());
}

#[test]
fn test_initial_metadata_receive() {
    let mut op = RecvInitialMetadataOp::new();
    op.recv_initial_metadata();

    let mut ops = Vec::new();
    op.add_op(&mut ops);
    assert!(matches!(ops[..], [TransportOp::RecvInitialMetadata]));
    drop(ops);

    let mut completion = BatchCompletion::succeeded();
    completion.initial_metadata = Some([("x-server", "a")].into_iter().collect());

    assert!(finish(&mut op, &mut completion));
    assert_eq!(op.metadata().get_str("x-server"), Some("a"));
}

#[test]
fn test_client_status_is_rebuilt_from_wire() {
    let mut trailing = MetadataMap::new();
    trailing.insert("x-trace", "abc");
    trailing.insert(BINARY_ERROR_DETAILS_KEY, Bytes::from_static(&[1, 2]));

    let mut op = ClientRecvStatusOp::new();
    op.client_recv_status();

    let mut completion = BatchCompletion::succeeded();
    completion.status = Some(TrailingStatus {
        code: 5,
        details: Bytes::from_static(b"not found"),
        trailing_metadata: trailing,
        debug_error_string: Some("peer said so".to_string()),
    });

    // A non-OK status does not fail the batch.
    assert!(finish(&mut op, &mut completion));

    let status = op.status();
    assert_eq!(status.error_code(), StatusCode::NotFound);
    assert_eq!(status.error_message(), "not found");
    assert_eq!(&status.error_details()[..], &[1u8, 2]);
    assert_eq!(op.trailing_metadata().get_str("x-trace"), Some("abc"));
    assert_eq!(op.debug_error_string(), "peer said so");
}

#[test]
fn test_unknown_wire_code_becomes_unknown() {
    let mut op = ClientRecvStatusOp::new();
    op.client_recv_status();

    let mut completion = BatchCompletion::succeeded();
    completion.status = Some(TrailingStatus {
        code: 99,
        ..TrailingStatus::default()
    });
    finish(&mut op, &mut completion);

    assert_eq!(op.status().error_code(), StatusCode::Unknown);
}

#[test]
fn test_missing_status_becomes_unknown() {
    let mut op = ClientRecvStatusOp::new();
    op.client_recv_status();

    finish(&mut op, &mut BatchCompletion::failed());

    assert_eq!(op.status().error_code(), StatusCode::Unknown);
    assert!(!op.status().is_ok());
}
