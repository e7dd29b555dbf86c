/// Returns the current timestamp in microseconds since the UNIX epoch.
///
/// Used to stamp batch submissions so the completion path can log how long
/// the transport held a batch. A clock before the epoch yields `0`.
///
/// # Example:
/// ```rust
/// use opbatch::utils::now;
/// let timestamp = now(); // Gets the current time in microseconds
/// assert!(timestamp > 0);
/// ```
pub fn now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_micros()).unwrap_or(0)
}
