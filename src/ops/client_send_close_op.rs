use crate::call::{BatchCompletion, TransportOp};
use crate::interceptor::{HookPointSet, InterceptionHookPoint};
use crate::ops::CallOp;
use std::any::Any;

/// Client half-close.
#[derive(Debug, Default)]
pub struct ClientSendCloseOp {
    send: bool,
    hijacked: bool,
}

impl ClientSendCloseOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_send_close(&mut self) {
        self.send = true;
    }
}

impl CallOp for ClientSendCloseOp {
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>) {
        if !self.send || self.hijacked {
            return;
        }
        ops.push(TransportOp::SendCloseFromClient);
    }

    fn finish_op(&mut self, _completion: &mut BatchCompletion, _status: &mut bool) {
        self.send = false;
    }

    fn arm_hook_points(&mut self, hooks: &mut HookPointSet) {
        if !self.send {
            return;
        }
        hooks.add(InterceptionHookPoint::PreSendClose);
    }

    fn arm_finish_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn mark_hijacked(&mut self, _hooks: &mut HookPointSet) {
        self.hijacked = true;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
