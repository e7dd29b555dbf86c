use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter backing completion tags.
///
/// Tags only need to be unique for as long as a batch is in flight, but a
/// 64-bit counter never wraps in practice, so a tag is never reused.
static GLOBAL_TAG_COUNTER: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

#[inline]
pub fn increment_u64_id() -> u64 {
    GLOBAL_TAG_COUNTER.fetch_add(1, Ordering::Relaxed)
}
