use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Canonical RPC status codes, as carried on the wire.
#[repr(i32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum StatusCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl StatusCode {
    /// Maps a wire code to a `StatusCode`. Codes outside the canonical range
    /// become `Unknown` rather than an error, since the peer already
    /// considered the call finished.
    pub fn from_wire(code: i32) -> Self {
        StatusCode::try_from(code).unwrap_or(StatusCode::Unknown)
    }

    #[inline]
    pub fn value(self) -> i32 {
        self.into()
    }
}
