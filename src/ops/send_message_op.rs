use crate::call::{BatchCompletion, TransportOp};
use crate::codec::{ByteBuffer, MessageCodec};
use crate::interceptor::{HookPointSet, InterceptedData, InterceptionHookPoint};
use crate::ops::CallOp;
use crate::status::Status;
use crate::write_options::WriteOptions;
use std::any::Any;

#[derive(Debug, Default)]
pub struct SendMessageOp {
    hijacked: bool,
    send_buf: ByteBuffer,
    write_options: WriteOptions,
}

impl SendMessageOp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `message` for the next batch.
    ///
    /// `options` apply to this message only: their flags are cleared once
    /// copied into the batch, and immediately if serialization fails. A
    /// buffer the codec reports as not owned is duplicated so the slot never
    /// depends on storage it does not control.
    pub fn send_message<M: MessageCodec>(
        &mut self,
        message: &M,
        options: WriteOptions,
    ) -> Result<(), Status> {
        self.write_options = options;

        match message.serialize() {
            Ok((buffer, owned)) => {
                self.send_buf = buffer;
                if !owned {
                    self.send_buf.duplicate();
                }
                Ok(())
            }
            Err(status) => {
                self.write_options.clear();
                self.send_buf.clear();
                Err(status)
            }
        }
    }

    pub fn write_options(&self) -> &WriteOptions {
        &self.write_options
    }

    pub fn buffer(&self) -> &ByteBuffer {
        &self.send_buf
    }
}

impl CallOp for SendMessageOp {
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>) {
        if !self.send_buf.valid() || self.hijacked {
            return;
        }

        let flags = self.write_options.flags();
        let last_message = self.write_options.is_last_message();

        // Flags are per message.
        self.write_options.clear();

        ops.push(TransportOp::SendMessage {
            message: &self.send_buf,
            flags,
            last_message,
        });
    }

    fn finish_op(&mut self, _completion: &mut BatchCompletion, _status: &mut bool) {
        self.send_buf.clear();
        self.write_options.clear();
    }

    fn arm_hook_points(&mut self, hooks: &mut HookPointSet) {
        if !self.send_buf.valid() {
            return;
        }
        hooks.add(InterceptionHookPoint::PreSendMessage);
    }

    fn arm_finish_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn mark_hijacked(&mut self, _hooks: &mut HookPointSet) {
        self.hijacked = true;
    }

    fn intercepted_data(&mut self) -> InterceptedData<'_> {
        if !self.send_buf.valid() {
            return InterceptedData::None;
        }
        InterceptedData::SendMessage(&mut self.send_buf)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
