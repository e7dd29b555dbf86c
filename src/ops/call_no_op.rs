use crate::call::{BatchCompletion, TransportOp};
use crate::interceptor::HookPointSet;
use crate::ops::CallOp;
use std::any::Any;

/// Placeholder for an unused slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallNoOp;

impl CallOp for CallNoOp {
    fn add_op<'a>(&'a mut self, _ops: &mut Vec<TransportOp<'a>>) {}

    fn finish_op(&mut self, _completion: &mut BatchCompletion, _status: &mut bool) {}

    fn arm_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn arm_finish_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn mark_hijacked(&mut self, _hooks: &mut HookPointSet) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
