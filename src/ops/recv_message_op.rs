use crate::call::{BatchCompletion, TransportOp};
use crate::codec::MessageCodec;
use crate::interceptor::{HookPointSet, InterceptedData, InterceptionHookPoint};
use crate::ops::CallOp;
use std::any::Any;
use std::fmt;

/// Receives one message and decodes it as `T`.
///
/// Outcome rules on completion:
///
/// - nothing requested: the overall status is untouched;
/// - requested, but no message arrived: the overall status fails unless
///   `allow_no_message` was called;
/// - requested and a message arrived on a successful batch: the overall
///   status is the decode result, so a decode error fails the batch even
///   though the bytes arrived intact.
pub struct RecvMessageOp<T> {
    message: Option<T>,
    requested: bool,
    got_message: bool,
    completed: bool,
    allow_no_message: bool,
    hijacked: bool,
}

impl<T> RecvMessageOp<T> {
    pub fn new() -> Self {
        Self {
            message: None,
            requested: false,
            got_message: false,
            completed: false,
            allow_no_message: false,
            hijacked: false,
        }
    }

    /// Requests a message in the next batch.
    pub fn recv_message(&mut self) {
        self.message = None;
        self.got_message = false;
        self.requested = true;
    }

    /// Absence of a message no longer fails the batch.
    pub fn allow_no_message(&mut self) {
        self.allow_no_message = true;
    }

    pub fn got_message(&self) -> bool {
        self.got_message
    }

    pub fn message(&self) -> Option<&T> {
        self.message.as_ref()
    }

    pub fn take_message(&mut self) -> Option<T> {
        self.message.take()
    }
}

impl<T> Default for RecvMessageOp<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RecvMessageOp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecvMessageOp")
            .field("requested", &self.requested)
            .field("got_message", &self.got_message)
            .field("completed", &self.completed)
            .field("allow_no_message", &self.allow_no_message)
            .field("hijacked", &self.hijacked)
            .finish()
    }
}

impl<T> CallOp for RecvMessageOp<T>
where
    T: MessageCodec + Send + 'static,
{
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>) {
        if !self.requested || self.hijacked {
            return;
        }
        ops.push(TransportOp::RecvMessage);
    }

    fn finish_op(&mut self, completion: &mut BatchCompletion, status: &mut bool) {
        if !self.requested {
            self.message = None;
            self.got_message = false;
            self.completed = false;
            return;
        }
        self.requested = false;
        self.completed = true;
        if self.hijacked {
            return;
        }

        match completion.message.take() {
            Some(buffer) if buffer.valid() => {
                if *status {
                    match T::deserialize(&buffer) {
                        Ok(message) => {
                            self.message = Some(message);
                            self.got_message = true;
                        }
                        Err(e) => {
                            tracing::debug!("failed to decode received message: {}", e);
                            self.got_message = false;
                            *status = false;
                        }
                    }
                } else {
                    self.got_message = false;
                }
            }
            _ => {
                self.got_message = false;
                if !self.allow_no_message {
                    *status = false;
                }
            }
        }
    }

    fn arm_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn arm_finish_hook_points(&mut self, hooks: &mut HookPointSet) {
        if !std::mem::take(&mut self.completed) || !self.got_message {
            return;
        }
        hooks.add(InterceptionHookPoint::PostRecvMessage);
    }

    fn mark_hijacked(&mut self, hooks: &mut HookPointSet) {
        self.hijacked = true;
        if !self.requested {
            return;
        }
        hooks.add(InterceptionHookPoint::PreRecvMessage);
        self.got_message = true;
    }

    fn intercepted_data(&mut self) -> InterceptedData<'_> {
        InterceptedData::RecvMessage(&mut self.message)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
