use std::fmt;

/// Errors raised while setting up loopback calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopbackError {
    /// The listener side was dropped; nobody can accept the call.
    ListenerClosed,
}

impl fmt::Display for LoopbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopbackError::ListenerClosed => write!(f, "loopback listener closed"),
        }
    }
}

impl std::error::Error for LoopbackError {}
