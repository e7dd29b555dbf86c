use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU32, Ordering};

/// Process-wide counter used for call ids. Starts at 1 so 0 never names a call.
static GLOBAL_CALL_ID_COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(1));

#[inline]
pub fn increment_u32_id() -> u32 {
    GLOBAL_CALL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}
