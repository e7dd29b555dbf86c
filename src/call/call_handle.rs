use crate::batch::CompletionSender;
use crate::call::{CallError, CallTransport, CompletionTag, TransportOp};
use crate::interceptor::{ClientRpcInfo, RpcInfo, ServerRpcInfo};
use crate::utils::increment_u32_id;
use std::fmt;
use std::sync::Arc;

struct CallInner {
    id: u32,
    transport: Arc<dyn CallTransport>,
    completion_sender: CompletionSender,
    rpc_info: Option<RpcInfo>,
}

/// Shared handle to one RPC.
///
/// Clones share the same call. An op set keeps a clone for as long as it
/// has a batch outstanding, which is what holds the call alive until the
/// completion is delivered; `ref_count` exposes the current holder count.
#[derive(Clone)]
pub struct Call {
    inner: Arc<CallInner>,
}

impl Call {
    /// Creates a call without interceptor registry.
    pub fn new(transport: Arc<dyn CallTransport>, completion_sender: CompletionSender) -> Self {
        Self::build(transport, completion_sender, None)
    }

    /// Creates a call bound to a client or server interceptor registry.
    pub fn with_rpc_info(
        transport: Arc<dyn CallTransport>,
        completion_sender: CompletionSender,
        rpc_info: RpcInfo,
    ) -> Self {
        Self::build(transport, completion_sender, Some(rpc_info))
    }

    fn build(
        transport: Arc<dyn CallTransport>,
        completion_sender: CompletionSender,
        rpc_info: Option<RpcInfo>,
    ) -> Self {
        let id = increment_u32_id();
        tracing::trace!(call_id = id, "call created");

        Call {
            inner: Arc::new(CallInner {
                id,
                transport,
                completion_sender,
                rpc_info,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.inner.id
    }

    pub fn rpc_info(&self) -> Option<&RpcInfo> {
        self.inner.rpc_info.as_ref()
    }

    pub fn client_rpc_info(&self) -> Option<&ClientRpcInfo> {
        match self.inner.rpc_info.as_ref() {
            Some(RpcInfo::Client(info)) => Some(info),
            _ => None,
        }
    }

    pub fn server_rpc_info(&self) -> Option<&ServerRpcInfo> {
        match self.inner.rpc_info.as_ref() {
            Some(RpcInfo::Server(info)) => Some(info),
            _ => None,
        }
    }

    pub fn completion_sender(&self) -> &CompletionSender {
        &self.inner.completion_sender
    }

    /// Number of live handles to this call.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Forwards one attempt to the transport.
    pub fn start_batch(&self, ops: &[TransportOp<'_>], tag: CompletionTag) -> Result<(), CallError> {
        self.inner.transport.start_batch(self, ops, tag)
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("id", &self.inner.id)
            .field("ref_count", &self.ref_count())
            .field("rpc_info", &self.inner.rpc_info)
            .finish()
    }
}
