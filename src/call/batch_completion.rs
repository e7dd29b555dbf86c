use crate::codec::ByteBuffer;
use crate::metadata::MetadataMap;
use bytes::Bytes;

/// Terminal status as reported by the transport for a `RecvStatusOnClient`
/// operation, before it is folded back into a `Status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrailingStatus {
    /// Raw wire code.
    pub code: i32,

    /// Status message bytes; empty when the peer sent none.
    pub details: Bytes,

    /// Trailing metadata, including the reserved binary error-details entry
    /// when the peer attached one.
    pub trailing_metadata: MetadataMap,

    /// Transport-level debug description, if the transport produced one.
    pub debug_error_string: Option<String>,
}

/// Everything a transport hands back when a batch finishes.
///
/// `success` is the overall outcome of the batch. The remaining fields carry
/// the results of the batch's receive operations; each receive slot takes
/// its own field during `finish_op`, leaving `None` behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchCompletion {
    pub success: bool,
    pub initial_metadata: Option<MetadataMap>,
    pub message: Option<ByteBuffer>,
    pub status: Option<TrailingStatus>,
}

impl BatchCompletion {
    /// A successful completion with no received data.
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A failed completion with no received data. Cancellation surfaces
    /// this way too.
    pub fn failed() -> Self {
        Self::default()
    }
}
