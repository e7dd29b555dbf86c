use crate::error::CallerError;
use crate::handler_table::{HandlerTable, HandlerTableLock};
use crate::serve_unary_once;
use futures::FutureExt;
use futures::future::BoxFuture;
use opbatch::codec::{ByteBuffer, MessageCodec};
use opbatch::interceptor::method_id_hash;
use opbatch::metadata::MetadataMap;
use opbatch::{Call, CompletionQueue, Status, StatusCode};
use std::future::Future;
use std::sync::Arc;

/// A registered unary handler, working on serialized messages.
pub type UnaryHandler = Arc<
    dyn Fn(ByteBuffer, MetadataMap) -> BoxFuture<'static, Result<ByteBuffer, Status>> + Send + Sync,
>;

#[cfg(feature = "tokio_support")]
type HandlersMutex = tokio::sync::Mutex<HandlerTable>;

#[cfg(not(feature = "tokio_support"))]
type HandlersMutex = std::sync::Mutex<HandlerTable>;

/// Routes accepted server calls to handlers registered by method name.
#[async_trait::async_trait]
pub trait UnaryEndpointInterface: Send + Sync {
    type HandlersLock: HandlerTableLock;

    fn get_handlers(&self) -> Arc<Self::HandlersLock>;

    /// Registers a typed handler for `method`. Fails if one is already
    /// registered.
    async fn register_unary<Req, Resp, F, Fut>(
        &self,
        method: &str,
        handler: F,
    ) -> Result<(), CallerError>
    where
        Req: MessageCodec + Send + 'static,
        Resp: MessageCodec + Send + 'static,
        F: Fn(Req, MetadataMap) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, Status>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let wrapped: UnaryHandler = Arc::new(move |request: ByteBuffer, metadata: MetadataMap| {
            dispatch::<Req, Resp, F, Fut>(Arc::clone(&handler), request, metadata).boxed()
        });

        let inserted = self
            .get_handlers()
            .insert_handler(method_id_hash(method), wrapped)
            .await;

        if !inserted {
            return Err(CallerError::AlreadyRegistered(method.to_string()));
        }
        Ok(())
    }

    /// Serves one unary exchange on `call`, answering `Unimplemented` when
    /// no handler matches its method.
    async fn serve_call(&self, call: &Call, cq: &mut CompletionQueue) -> Result<(), CallerError> {
        let (method, method_id) = match call.server_rpc_info() {
            Some(info) => (info.method().to_string(), info.method_id()),
            None => (String::new(), method_id_hash("")),
        };

        let handler = self.get_handlers().find_handler(method_id).await;

        if handler.is_none() {
            tracing::warn!(call_id = call.id(), method = %method, "no handler registered");
        }

        serve_unary_once(call, cq, move |request: ByteBuffer, metadata| async move {
            match handler {
                Some(handler) => handler(request, metadata).await,
                None => Err(Status::new(
                    StatusCode::Unimplemented,
                    format!("method {} is not registered", method),
                )),
            }
        })
        .await
    }
}

async fn dispatch<Req, Resp, F, Fut>(
    handler: Arc<F>,
    request: ByteBuffer,
    metadata: MetadataMap,
) -> Result<ByteBuffer, Status>
where
    Req: MessageCodec,
    Resp: MessageCodec,
    F: Fn(Req, MetadataMap) -> Fut,
    Fut: Future<Output = Result<Resp, Status>>,
{
    let request = Req::deserialize(&request)
        .map_err(|status| Status::new(StatusCode::InvalidArgument, status.error_message()))?;
    let response = handler(request, metadata).await?;
    let (buffer, _) = response.serialize()?;
    Ok(buffer)
}

/// Handler table shared by every call the endpoint serves.
///
/// With the `tokio_support` feature the table sits behind a
/// `tokio::sync::Mutex`, otherwise behind `std::sync::Mutex`.
#[derive(Clone, Default)]
pub struct UnaryEndpoint {
    handlers: Arc<HandlersMutex>,
}

impl UnaryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UnaryEndpointInterface for UnaryEndpoint {
    type HandlersLock = HandlersMutex;

    fn get_handlers(&self) -> Arc<Self::HandlersLock> {
        Arc::clone(&self.handlers)
    }
}
