use crate::call::{BatchCompletion, TransportOp};
use crate::interceptor::{HookPointSet, InterceptedData};
use std::any::Any;

/// One unit of send or receive work inside a `CallOpSet`.
///
/// A slot goes through the same steps on every attempt:
///
/// 1. `arm_hook_points` registers the `Pre*` hooks that apply (skipped when
///    the call has no interceptors).
/// 2. `mark_hijacked` runs instead of the transport path if an interceptor
///    hijacks the call.
/// 3. `add_op` appends at most one descriptor to the batch.
/// 4. `finish_op` consumes the slot's share of the `BatchCompletion` and
///    folds its outcome into the overall status.
/// 5. `arm_finish_hook_points` registers the matching `Post*` hook if the
///    data actually arrived.
pub trait CallOp: Any + Send {
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>);

    fn finish_op(&mut self, completion: &mut BatchCompletion, status: &mut bool);

    fn arm_hook_points(&mut self, hooks: &mut HookPointSet);

    fn arm_finish_hook_points(&mut self, hooks: &mut HookPointSet);

    fn mark_hijacked(&mut self, hooks: &mut HookPointSet);

    fn intercepted_data(&mut self) -> InterceptedData<'_> {
        InterceptedData::None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
