mod call_op_set;
mod completion_event;
mod completion_queue;

pub use call_op_set::CallOpSet;
pub use completion_event::{CompletedBatch, CompletionEvent};
pub use completion_queue::{CompletionQueue, CompletionSender};
