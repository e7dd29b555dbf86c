use std::fmt;

/// Reasons a transport refuses a batch in `start_batch`.
///
/// A refusal means the batch itself was malformed, so the op set treats any
/// of these as a fatal invariant violation rather than a call failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// More descriptors than `MAX_OPS`.
    TooManyOperations,

    /// The same kind of operation appears twice in one batch.
    DuplicateOperation,

    /// A client-only operation was submitted on a server call.
    NotOnServer,

    /// A server-only operation was submitted on a client call.
    NotOnClient,

    /// A descriptor carried flag bits the transport does not understand.
    InvalidFlags { flags: u32 },

    /// The call was already shut down by the transport.
    Closed,
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::TooManyOperations => write!(f, "too many operations in batch"),
            CallError::DuplicateOperation => write!(f, "duplicate operation in batch"),
            CallError::NotOnServer => write!(f, "client-only operation used on a server call"),
            CallError::NotOnClient => write!(f, "server-only operation used on a client call"),
            CallError::InvalidFlags { flags } => write!(f, "invalid flags: {:#x}", flags),
            CallError::Closed => write!(f, "call is closed"),
        }
    }
}

impl std::error::Error for CallError {}
