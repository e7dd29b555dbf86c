use crate::interceptor::{Interceptor, RpcMethodType};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

/// Stable identifier for a method name.
#[inline]
pub fn method_id_hash(method: &str) -> u64 {
    xxh3_64(method.as_bytes())
}

/// Interceptor registry of a call. A call is either client-side or
/// server-side, never both.
#[derive(Debug)]
pub enum RpcInfo {
    Client(ClientRpcInfo),
    Server(ServerRpcInfo),
}

impl RpcInfo {
    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        match self {
            RpcInfo::Client(info) => info.interceptors(),
            RpcInfo::Server(info) => info.interceptors(),
        }
    }

    pub fn has_interceptors(&self) -> bool {
        !self.interceptors().is_empty()
    }

    pub fn is_client(&self) -> bool {
        matches!(self, RpcInfo::Client(_))
    }
}

/// Client-side registry: the ordered interceptors of one logical call plus
/// its hijack state.
///
/// The registry outlives individual attempts. Once an interceptor hijacks,
/// every later batch on the same call is routed through that interceptor's
/// hijacked path.
pub struct ClientRpcInfo {
    method: String,
    method_id: u64,
    method_type: RpcMethodType,
    interceptors: Vec<Arc<dyn Interceptor>>,
    hijacked_interceptor: OnceCell<usize>,
}

impl ClientRpcInfo {
    pub fn new(
        method: impl Into<String>,
        method_type: RpcMethodType,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> Self {
        let method = method.into();
        let method_id = method_id_hash(&method);

        Self {
            method,
            method_id,
            method_type,
            interceptors,
            hijacked_interceptor: OnceCell::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn method_id(&self) -> u64 {
        self.method_id
    }

    pub fn method_type(&self) -> RpcMethodType {
        self.method_type
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    pub fn hijacked(&self) -> bool {
        self.hijacked_interceptor.get().is_some()
    }

    /// Index of the interceptor that hijacked the call, if any.
    pub fn hijacked_interceptor(&self) -> Option<usize> {
        self.hijacked_interceptor.get().copied()
    }

    /// Returns `false` when the call was already hijacked.
    pub(crate) fn record_hijack(&self, index: usize) -> bool {
        self.hijacked_interceptor.set(index).is_ok()
    }
}

impl fmt::Debug for ClientRpcInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRpcInfo")
            .field("method", &self.method)
            .field("method_id", &self.method_id)
            .field("method_type", &self.method_type)
            .field("interceptors", &self.interceptors.len())
            .field("hijacked_interceptor", &self.hijacked_interceptor.get())
            .finish()
    }
}

/// Server-side registry. Servers never hijack.
pub struct ServerRpcInfo {
    method: String,
    method_id: u64,
    method_type: RpcMethodType,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ServerRpcInfo {
    pub fn new(
        method: impl Into<String>,
        method_type: RpcMethodType,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> Self {
        let method = method.into();
        let method_id = method_id_hash(&method);

        Self {
            method,
            method_id,
            method_type,
            interceptors,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn method_id(&self) -> u64 {
        self.method_id
    }

    pub fn method_type(&self) -> RpcMethodType {
        self.method_type
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }
}

impl fmt::Debug for ServerRpcInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRpcInfo")
            .field("method", &self.method)
            .field("method_id", &self.method_id)
            .field("method_type", &self.method_type)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}
