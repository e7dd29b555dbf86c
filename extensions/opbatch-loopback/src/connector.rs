use crate::error::LoopbackError;
use crate::shared_state::SharedState;
use crate::{LoopbackHandle, LoopbackTransport, Side};
use futures::StreamExt;
use futures::channel::mpsc;
use opbatch::interceptor::{ClientRpcInfo, Interceptor, RpcInfo, RpcMethodType, ServerRpcInfo};
use opbatch::{Call, CompletionSender};
use std::sync::{Arc, Mutex};

/// Creates a connected connector/listener pair.
pub fn loopback() -> (LoopbackConnector, LoopbackListener) {
    let (tx, rx) = mpsc::unbounded();
    (LoopbackConnector { tx }, LoopbackListener { rx })
}

/// Client side of a loopback pair: opens calls.
#[derive(Clone)]
pub struct LoopbackConnector {
    tx: mpsc::UnboundedSender<IncomingCall>,
}

impl LoopbackConnector {
    /// Opens a call described by `rpc_info`. The server end is queued on
    /// the listener; the client end reports completions to
    /// `completion_sender`.
    pub fn connect(
        &self,
        rpc_info: ClientRpcInfo,
        completion_sender: CompletionSender,
    ) -> Result<(Call, LoopbackHandle), LoopbackError> {
        let shared = Arc::new(Mutex::new(SharedState::default()));

        let incoming = IncomingCall {
            method: rpc_info.method().to_string(),
            method_type: rpc_info.method_type(),
            shared: Arc::clone(&shared),
        };
        self.tx
            .unbounded_send(incoming)
            .map_err(|_| LoopbackError::ListenerClosed)?;

        let transport = Arc::new(LoopbackTransport::new(Side::Client, Arc::clone(&shared)));
        let call = Call::with_rpc_info(transport, completion_sender, RpcInfo::Client(rpc_info));

        tracing::debug!(call_id = call.id(), "loopback call opened");

        Ok((call, LoopbackHandle::new(shared)))
    }
}

/// Server side of a loopback pair: accepts calls in the order they were
/// opened.
pub struct LoopbackListener {
    rx: mpsc::UnboundedReceiver<IncomingCall>,
}

impl LoopbackListener {
    /// Waits for the next call. Returns `None` once every connector is
    /// dropped and no call is left.
    pub async fn accept(&mut self) -> Option<IncomingCall> {
        self.rx.next().await
    }

    pub fn try_accept(&mut self) -> Option<IncomingCall> {
        self.rx.try_next().ok().flatten()
    }
}

/// A call opened by a connector and not yet bound to a server registry.
pub struct IncomingCall {
    method: String,
    method_type: RpcMethodType,
    shared: Arc<Mutex<SharedState>>,
}

impl IncomingCall {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn method_type(&self) -> RpcMethodType {
        self.method_type
    }

    /// Binds the server end to `interceptors` and a completion queue.
    pub fn into_call(
        self,
        interceptors: Vec<Arc<dyn Interceptor>>,
        completion_sender: CompletionSender,
    ) -> (Call, LoopbackHandle) {
        let rpc_info = ServerRpcInfo::new(self.method, self.method_type, interceptors);
        let transport = Arc::new(LoopbackTransport::new(Side::Server, Arc::clone(&self.shared)));
        let call = Call::with_rpc_info(transport, completion_sender, RpcInfo::Server(rpc_info));

        tracing::debug!(call_id = call.id(), "loopback call accepted");

        (call, LoopbackHandle::new(self.shared))
    }
}
