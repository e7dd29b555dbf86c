/// Maximum number of operation slots a single `CallOpSet` can carry.
///
/// Every batch handed to a transport is bounded by this value, so a
/// transport can size its descriptor storage up front.
pub const MAX_OPS: usize = 6;

/// Reserved metadata key carrying the binary error details of a status.
///
/// The key is never produced from ordinary header maps; it is appended by
/// the metadata array builder when a status carries a detail blob.
pub const BINARY_ERROR_DETAILS_KEY: &str = "grpc-status-details-bin";

// Per-message write flags
pub const WRITE_BUFFER_HINT: u32 = 0x0000_0001;
pub const WRITE_NO_COMPRESS: u32 = 0x0000_0002;
pub const WRITE_THROUGH: u32 = 0x0000_0004;

/// Mask of every bit a transport should accept on a `SendMessage` descriptor.
pub const WRITE_USED_MASK: u32 = WRITE_BUFFER_HINT | WRITE_NO_COMPRESS | WRITE_THROUGH;

// Initial metadata flags
pub const INITIAL_METADATA_IDEMPOTENT_REQUEST: u32 = 0x0000_0010;
pub const INITIAL_METADATA_WAIT_FOR_READY: u32 = 0x0000_0020;
pub const INITIAL_METADATA_CACHEABLE_REQUEST: u32 = 0x0000_0040;

/// Mask of every bit a transport should accept on a `SendInitialMetadata` descriptor.
pub const INITIAL_METADATA_USED_MASK: u32 = INITIAL_METADATA_IDEMPOTENT_REQUEST
    | INITIAL_METADATA_WAIT_FOR_READY
    | INITIAL_METADATA_CACHEABLE_REQUEST;
