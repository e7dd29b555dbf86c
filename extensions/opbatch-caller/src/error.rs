use opbatch::Status;
use std::fmt;

/// Errors surfaced by the unary helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerError {
    /// The call finished with a non-OK status, or the response could not
    /// be produced.
    Status(Status),
    /// The completion queue stopped before the batch finished.
    QueueShutdown,
    /// The batch completed with failure and no status explains why.
    BatchFailed,
    /// A handler is already registered for the method.
    AlreadyRegistered(String),
}

impl fmt::Display for CallerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerError::Status(status) => write!(f, "call failed: {}", status),
            CallerError::QueueShutdown => write!(f, "completion queue shut down"),
            CallerError::BatchFailed => write!(f, "batch completed with failure"),
            CallerError::AlreadyRegistered(method) => {
                write!(f, "a handler for {} is already registered", method)
            }
        }
    }
}

impl std::error::Error for CallerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallerError::Status(status) => Some(status),
            _ => None,
        }
    }
}

impl From<Status> for CallerError {
    fn from(status: Status) -> Self {
        CallerError::Status(status)
    }
}
