use crate::UnaryResponse;
use crate::error::CallerError;
use opbatch::codec::MessageCodec;
use opbatch::interceptor::{ClientRpcInfo, Interceptor, RpcMethodType};
use opbatch::metadata::MetadataMap;
use opbatch::ops::{
    ClientRecvStatusOp, ClientSendCloseOp, RecvInitialMetadataOp, RecvMessageOp,
    SendInitialMetadataOp, SendMessageOp,
};
use opbatch::{Call, CallOpSet, CompletedBatch, CompletionQueue, CompletionSender, Status};
use opbatch::{StatusCode, WriteOptions};
use std::sync::Arc;

/// Issues unary calls over whatever transport the implementor opens calls
/// on.
///
/// Implementors supply the two getters; `call_unary` is provided.
#[async_trait::async_trait]
pub trait UnaryCallerInterface: Send + Sync {
    // --- Required ---

    /// Opens a call whose completions are posted to `completion_sender`.
    fn open_call(
        &self,
        rpc_info: ClientRpcInfo,
        completion_sender: CompletionSender,
    ) -> Result<Call, CallerError>;

    /// Interceptors registered on every call this caller opens.
    fn get_interceptors(&self) -> Vec<Arc<dyn Interceptor>>;

    // --- Provided ---

    /// Sends `request` with `metadata` and waits for the single response.
    ///
    /// The whole exchange is one six-slot batch run on a private completion
    /// queue. A non-OK status from the server is returned as
    /// `CallerError::Status`.
    async fn call_unary<Req, Resp>(
        &self,
        method: &str,
        request: &Req,
        metadata: MetadataMap,
    ) -> Result<UnaryResponse<Resp>, CallerError>
    where
        Req: MessageCodec + Sync,
        Resp: MessageCodec + Send + 'static,
    {
        let mut cq = CompletionQueue::new();
        let rpc_info = ClientRpcInfo::new(method, RpcMethodType::NormalRpc, self.get_interceptors());
        let method_id = rpc_info.method_id();
        let call = self.open_call(rpc_info, cq.sender())?;

        let ops = unary_call_ops::<Req, Resp>(request, metadata)?;

        tracing::debug!(call_id = call.id(), method, method_id, "starting unary call");

        cq.start_batch(ops, &call);
        let done = cq.next().await.ok_or(CallerError::QueueShutdown)?;

        into_unary_response(done)
    }
}

fn unary_call_ops<Req, Resp>(request: &Req, metadata: MetadataMap) -> Result<CallOpSet, Status>
where
    Req: MessageCodec,
    Resp: MessageCodec + Send + 'static,
{
    let mut send_metadata = SendInitialMetadataOp::new();
    send_metadata.send_initial_metadata(metadata, 0);

    let mut send_message = SendMessageOp::new();
    send_message.send_message(request, WriteOptions::new())?;

    let mut close = ClientSendCloseOp::new();
    close.client_send_close();

    let mut recv_metadata = RecvInitialMetadataOp::new();
    recv_metadata.recv_initial_metadata();

    // A failed call carries no message; the status says why.
    let mut recv_message = RecvMessageOp::<Resp>::new();
    recv_message.recv_message();
    recv_message.allow_no_message();

    let mut recv_status = ClientRecvStatusOp::new();
    recv_status.client_recv_status();

    Ok(CallOpSet::new()
        .with_op(send_metadata)
        .with_op(send_message)
        .with_op(close)
        .with_op(recv_metadata)
        .with_op(recv_message)
        .with_op(recv_status))
}

fn into_unary_response<Resp>(mut done: CompletedBatch) -> Result<UnaryResponse<Resp>, CallerError>
where
    Resp: MessageCodec + Send + 'static,
{
    let (status, trailing_metadata) = match done.ops.op_mut::<ClientRecvStatusOp>() {
        Some(op) => (op.status().clone(), op.take_trailing_metadata()),
        None => return Err(CallerError::BatchFailed),
    };

    if !status.is_ok() {
        return Err(CallerError::Status(status));
    }

    if !done.ok {
        return Err(CallerError::BatchFailed);
    }

    let message = done
        .ops
        .op_mut::<RecvMessageOp<Resp>>()
        .and_then(|op| op.take_message())
        .ok_or_else(|| {
            Status::new(
                StatusCode::Internal,
                "no message returned for unary request",
            )
        })?;

    let initial_metadata = done
        .ops
        .op_mut::<RecvInitialMetadataOp>()
        .map(|op| op.take_metadata())
        .unwrap_or_default();

    Ok(UnaryResponse {
        message,
        initial_metadata,
        trailing_metadata,
    })
}
