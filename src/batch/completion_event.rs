use crate::batch::CallOpSet;
use crate::call::CompletionTag;

/// The single notification an attempt produces: its externally visible tag
/// and the overall status of the batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    pub tag: CompletionTag,
    pub ok: bool,
}

/// A finished attempt as handed out by a `CompletionQueue`. The op set is
/// returned so its receive slots can be read.
#[derive(Debug)]
pub struct CompletedBatch {
    pub tag: CompletionTag,
    pub ok: bool,
    pub ops: CallOpSet,
}
