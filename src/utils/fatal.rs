use std::fmt::Display;

/// Reports a broken engine invariant and aborts the current thread.
#[track_caller]
pub(crate) fn fatal(message: impl Display) -> ! {
    tracing::error!("{}", message);
    panic!("{}", message);
}
