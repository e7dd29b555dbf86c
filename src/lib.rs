#[cfg(doctest)]
doc_comment::doctest!("../README.md");

pub mod batch;
pub mod call;
pub mod codec;
pub mod constants;
pub mod interceptor;
pub mod metadata;
pub mod ops;
pub mod status;
pub mod utils;
mod write_options;

pub use batch::{CallOpSet, CompletedBatch, CompletionEvent, CompletionQueue, CompletionSender};
pub use call::{Call, CallError, CallTransport, CompletionTag};
pub use status::{Status, StatusCode};
pub use write_options::WriteOptions;
