use crate::utils::increment_u64_id;

/// Opaque identity a transport echoes back when a batch completes.
///
/// Every `CallOpSet` allocates its own tags, so a tag names exactly one op
/// set for as long as it has a batch outstanding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompletionTag(u64);

impl CompletionTag {
    /// Allocates a process-unique tag.
    pub fn next() -> Self {
        CompletionTag(increment_u64_id())
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}
