mod batch_completion;
mod call_error;
mod call_handle;
mod call_transport;
mod completion_tag;
mod compression_level;
mod transport_op;

pub use batch_completion::{BatchCompletion, TrailingStatus};
pub use call_error::CallError;
pub use call_handle::Call;
pub use call_transport::CallTransport;
pub use completion_tag::CompletionTag;
pub use compression_level::CompressionLevel;
pub use transport_op::{TransportOp, TransportOpKind};
