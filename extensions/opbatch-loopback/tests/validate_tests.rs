use opbatch::CallError;
use opbatch::call::TransportOp;
use opbatch::codec::ByteBuffer;
use opbatch::constants::{INITIAL_METADATA_WAIT_FOR_READY, WRITE_BUFFER_HINT};
use opbatch::metadata::MetadataArray;
use opbatch::StatusCode;
use opbatch_loopback::{Side, validate_batch};

fn send_message(message: &ByteBuffer, flags: u32) -> TransportOp<'_> {
    TransportOp::SendMessage {
        message,
        flags,
        last_message: false,
    }
}

fn send_initial_metadata(flags: u32) -> TransportOp<'static> {
    TransportOp::SendInitialMetadata {
        metadata: MetadataArray::default(),
        flags,
        compression_level: None,
    }
}

fn send_status() -> TransportOp<'static> {
    TransportOp::SendStatusFromServer {
        trailing_metadata: MetadataArray::default(),
        code: StatusCode::Ok,
        details: None,
    }
}

#[test]
fn test_empty_batch_is_valid_on_both_sides() {
    assert_eq!(validate_batch(Side::Client, &[]), Ok(()));
    assert_eq!(validate_batch(Side::Server, &[]), Ok(()));
}

#[test]
fn test_full_client_batch_is_valid() {
    let message = ByteBuffer::from(vec![1, 2, 3]);
    let ops = [
        send_initial_metadata(INITIAL_METADATA_WAIT_FOR_READY),
        send_message(&message, WRITE_BUFFER_HINT),
        TransportOp::SendCloseFromClient,
        TransportOp::RecvInitialMetadata,
        TransportOp::RecvMessage,
        TransportOp::RecvStatusOnClient,
    ];

    assert_eq!(validate_batch(Side::Client, &ops), Ok(()));
}

#[test]
fn test_duplicate_kind_is_rejected() {
    let ops = [TransportOp::RecvMessage, TransportOp::RecvMessage];

    assert_eq!(
        validate_batch(Side::Client, &ops),
        Err(CallError::DuplicateOperation)
    );
}

#[test]
fn test_more_than_six_ops_is_rejected() {
    let ops = [
        send_initial_metadata(0),
        TransportOp::SendCloseFromClient,
        TransportOp::RecvInitialMetadata,
        TransportOp::RecvMessage,
        TransportOp::RecvStatusOnClient,
        TransportOp::RecvMessage,
        TransportOp::RecvMessage,
    ];

    assert_eq!(
        validate_batch(Side::Client, &ops),
        Err(CallError::TooManyOperations)
    );
}

#[test]
fn test_side_specific_ops() {
    assert_eq!(
        validate_batch(Side::Client, &[send_status()]),
        Err(CallError::NotOnClient)
    );
    assert_eq!(
        validate_batch(Side::Server, &[TransportOp::SendCloseFromClient]),
        Err(CallError::NotOnServer)
    );
    assert_eq!(
        validate_batch(Side::Server, &[TransportOp::RecvStatusOnClient]),
        Err(CallError::NotOnServer)
    );
    assert_eq!(validate_batch(Side::Server, &[send_status()]), Ok(()));
}

#[test]
fn test_unknown_flag_bits_are_rejected() {
    let message = ByteBuffer::from(vec![0]);

    assert_eq!(
        validate_batch(Side::Client, &[send_message(&message, 0x8000)]),
        Err(CallError::InvalidFlags { flags: 0x8000 })
    );
    assert_eq!(
        validate_batch(Side::Client, &[send_initial_metadata(WRITE_BUFFER_HINT)]),
        Err(CallError::InvalidFlags {
            flags: WRITE_BUFFER_HINT
        })
    );
}
