use crate::error::CallerError;
use opbatch::codec::MessageCodec;
use opbatch::metadata::MetadataMap;
use opbatch::ops::{
    RecvInitialMetadataOp, RecvMessageOp, SendInitialMetadataOp, SendMessageOp, ServerSendStatusOp,
};
use opbatch::{Call, CallOpSet, CompletionQueue, Status, StatusCode, WriteOptions};
use std::future::Future;

/// Serves one unary exchange on an accepted server call.
///
/// Reads the request and the client's initial metadata in one batch, runs
/// `handler`, then sends initial metadata, the response (when the handler
/// succeeded) and the status in a second batch. `cq` must be the queue the
/// call posts to, with no other batch in flight.
pub async fn serve_unary_once<Req, Resp, F, Fut>(
    call: &Call,
    cq: &mut CompletionQueue,
    handler: F,
) -> Result<(), CallerError>
where
    Req: MessageCodec + Send + 'static,
    Resp: MessageCodec,
    F: FnOnce(Req, MetadataMap) -> Fut,
    Fut: Future<Output = Result<Resp, Status>>,
{
    let mut recv_metadata = RecvInitialMetadataOp::new();
    recv_metadata.recv_initial_metadata();

    let mut recv_message = RecvMessageOp::<Req>::new();
    recv_message.recv_message();

    cq.start_batch(
        CallOpSet::new().with_op(recv_metadata).with_op(recv_message),
        call,
    );
    let mut request = cq.next().await.ok_or(CallerError::QueueShutdown)?;

    let metadata = request
        .ops
        .op_mut::<RecvInitialMetadataOp>()
        .map(|op| op.take_metadata())
        .unwrap_or_default();
    let message = request
        .ops
        .op_mut::<RecvMessageOp<Req>>()
        .and_then(|op| op.take_message());

    let result = match message {
        Some(message) if request.ok => handler(message, metadata).await,
        _ if request.ok => Err(Status::new(StatusCode::Internal, "request message missing")),
        _ => {
            tracing::debug!(call_id = call.id(), "request batch failed");
            return Err(CallerError::BatchFailed);
        }
    };

    let mut send_metadata = SendInitialMetadataOp::new();
    send_metadata.send_initial_metadata(MetadataMap::new(), 0);
    let mut ops = CallOpSet::new().with_op(send_metadata);

    let status = match result {
        Ok(response) => {
            let mut send_message = SendMessageOp::new();
            match send_message.send_message(&response, WriteOptions::new()) {
                Ok(()) => {
                    ops.push_op(send_message);
                    Status::ok()
                }
                Err(status) => status,
            }
        }
        Err(status) => status,
    };

    tracing::debug!(
        call_id = call.id(),
        code = ?status.error_code(),
        "sending unary response"
    );

    let mut send_status = ServerSendStatusOp::new();
    send_status.server_send_status(MetadataMap::new(), status);
    ops.push_op(send_status);

    cq.start_batch(ops, call);
    let reply = cq.next().await.ok_or(CallerError::QueueShutdown)?;

    if !reply.ok {
        return Err(CallerError::BatchFailed);
    }
    Ok(())
}
