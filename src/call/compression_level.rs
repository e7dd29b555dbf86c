use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Compression level requested for the messages of a call.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum CompressionLevel {
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}
