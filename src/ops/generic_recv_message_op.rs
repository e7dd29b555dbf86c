use crate::call::{BatchCompletion, TransportOp};
use crate::codec::{ByteBuffer, MessageCodec};
use crate::interceptor::{HookPointSet, InterceptedData, InterceptionHookPoint};
use crate::ops::CallOp;
use crate::status::{Status, StatusCode};
use std::any::Any;
use std::fmt;

type DeserializeFn = fn(&ByteBuffer, &mut dyn Any) -> Result<(), Status>;

fn deserialize_into<T>(buffer: &ByteBuffer, destination: &mut dyn Any) -> Result<(), Status>
where
    T: MessageCodec + 'static,
{
    let slot = destination.downcast_mut::<Option<T>>().ok_or_else(|| {
        Status::new(StatusCode::Internal, "receive destination has the wrong type")
    })?;
    *slot = Some(T::deserialize(buffer)?);
    Ok(())
}

/// Receives one message whose type is picked per request rather than per
/// slot. The destination is an `Option<T>` erased behind `Any`.
///
/// Unlike `RecvMessageOp`, `got_message` reports that bytes arrived on a
/// successful batch even when decoding them failed.
#[derive(Default)]
pub struct GenericRecvMessageOp {
    message: Option<Box<dyn Any + Send>>,
    deserialize: Option<DeserializeFn>,
    got_message: bool,
    completed: bool,
    allow_no_message: bool,
    hijacked: bool,
}

impl GenericRecvMessageOp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a message of type `T` in the next batch.
    pub fn recv_message<T>(&mut self)
    where
        T: MessageCodec + Send + 'static,
    {
        self.message = Some(Box::new(None::<T>));
        self.deserialize = Some(deserialize_into::<T>);
        self.got_message = false;
    }

    pub fn allow_no_message(&mut self) {
        self.allow_no_message = true;
    }

    pub fn got_message(&self) -> bool {
        self.got_message
    }

    /// The decoded message, if one arrived and `T` is the requested type.
    pub fn message<T: 'static>(&self) -> Option<&T> {
        self.message
            .as_deref()?
            .downcast_ref::<Option<T>>()?
            .as_ref()
    }

    pub fn take_message<T: 'static>(&mut self) -> Option<T> {
        self.message
            .as_deref_mut()?
            .downcast_mut::<Option<T>>()?
            .take()
    }
}

impl fmt::Debug for GenericRecvMessageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericRecvMessageOp")
            .field("requested", &self.deserialize.is_some())
            .field("got_message", &self.got_message)
            .field("allow_no_message", &self.allow_no_message)
            .field("hijacked", &self.hijacked)
            .finish()
    }
}

impl CallOp for GenericRecvMessageOp {
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>) {
        if self.deserialize.is_none() || self.hijacked {
            return;
        }
        ops.push(TransportOp::RecvMessage);
    }

    fn finish_op(&mut self, completion: &mut BatchCompletion, status: &mut bool) {
        let Some(deserialize) = self.deserialize.take() else {
            self.message = None;
            self.got_message = false;
            self.completed = false;
            return;
        };
        self.completed = true;
        if self.hijacked {
            return;
        }

        match completion.message.take() {
            Some(buffer) if buffer.valid() => {
                if *status {
                    self.got_message = true;
                    let decoded = match self.message.as_deref_mut() {
                        Some(destination) => deserialize(&buffer, destination),
                        None => Err(Status::new(
                            StatusCode::Internal,
                            "receive destination missing",
                        )),
                    };
                    if let Err(e) = decoded {
                        tracing::debug!("failed to decode received message: {}", e);
                        *status = false;
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
        if self.deserialize.is_none() {
            return;
        }
        hooks.add(InterceptionHookPoint::PreRecvMessage);
        self.got_message = true;
    }

    fn intercepted_data(&mut self) -> InterceptedData<'_> {
        match self.message.as_deref_mut() {
            Some(message) => InterceptedData::RecvMessage(message),
            None => InterceptedData::None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
