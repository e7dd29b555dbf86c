use crate::status::StatusCode;
use bytes::Bytes;
use std::fmt;

/// Terminal result of an RPC: a code, a human-readable message and an
/// optional binary detail blob.
///
/// On the wire the detail blob travels in trailing metadata under
/// `BINARY_ERROR_DETAILS_KEY`; the code and message travel in the
/// transport's status fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: StatusCode,
    message: String,
    details: Bytes,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Bytes::new(),
        }
    }

    pub fn with_details(
        code: StatusCode,
        message: impl Into<String>,
        details: impl Into<Bytes>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: details.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::Ok, "")
    }

    pub fn cancelled() -> Self {
        Self::new(StatusCode::Cancelled, "Cancelled")
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }

    pub fn error_code(&self) -> StatusCode {
        self.code
    }

    pub fn error_message(&self) -> &str {
        &self.message
    }

    pub fn error_details(&self) -> &Bytes {
        &self.details
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "status {:?}", self.code)
        } else {
            write!(f, "status {:?}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Status {}
