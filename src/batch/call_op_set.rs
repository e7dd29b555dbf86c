use crate::batch::CompletionEvent;
use crate::call::{BatchCompletion, Call, CompletionTag};
use crate::constants::MAX_OPS;
use crate::interceptor::{ChainOutcome, InterceptorBatchState, RpcInfo};
use crate::ops::{CallNoOp, CallOp};
use crate::utils::{fatal, now};
use std::fmt;

fn empty_slots() -> [Box<dyn CallOp>; MAX_OPS] {
    std::array::from_fn(|_| Box::new(CallNoOp) as Box<dyn CallOp>)
}

/// The operations of one attempt, submitted to the transport as a single
/// batch and reconciled into exactly one `CompletionEvent`.
///
/// An op set has two tags. The transport tag (`cq_tag`) identifies the op
/// set to the transport and the completion queue; the output tag
/// (`return_tag`) is what the finished attempt reports to its owner. Both
/// default to fresh, per-instance values.
///
/// ## Attempt lifecycle
///
/// `fill_ops` keeps a handle on the call, runs the forward interceptor pass
/// and submits the descriptors of every slot. Each transport completion is
/// fed to `finalize_result`, which finishes the slots, runs the reverse
/// pass and returns the event. On a hijacked call the reverse pass is
/// followed by one more empty round trip through the transport, and the
/// event is only returned when that second completion arrives.
pub struct CallOpSet {
    slots: [Box<dyn CallOp>; MAX_OPS],
    len: usize,
    call: Option<Call>,
    cq_tag: CompletionTag,
    return_tag: CompletionTag,
    done_intercepting: bool,
    hijacked: bool,
    pending_status: bool,
    submitted_at: u64,
    interceptor_state: InterceptorBatchState,
}

impl CallOpSet {
    pub fn new() -> Self {
        Self {
            slots: empty_slots(),
            len: 0,
            call: None,
            cq_tag: CompletionTag::next(),
            return_tag: CompletionTag::next(),
            done_intercepting: false,
            hijacked: false,
            pending_status: false,
            submitted_at: 0,
            interceptor_state: InterceptorBatchState::new(),
        }
    }

    /// Builder form of `push_op`.
    pub fn with_op<T: CallOp>(mut self, op: T) -> Self {
        self.push_op(op);
        self
    }

    /// Places `op` in the next free slot. Slots finish in the order they
    /// were added.
    pub fn push_op<T: CallOp>(&mut self, op: T) {
        if self.len == MAX_OPS {
            fatal(format!("an op set holds at most {} operations", MAX_OPS));
        }
        self.slots[self.len] = Box::new(op);
        self.len += 1;
    }

    /// The first slot of type `T`.
    pub fn op<T: CallOp>(&self) -> Option<&T> {
        self.slots[..self.len]
            .iter()
            .find_map(|slot| slot.as_any().downcast_ref::<T>())
    }

    pub fn op_mut<T: CallOp>(&mut self) -> Option<&mut T> {
        self.slots[..self.len]
            .iter_mut()
            .find_map(|slot| slot.as_any_mut().downcast_mut::<T>())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cq_tag(&self) -> CompletionTag {
        self.cq_tag
    }

    /// Overrides the tag the transport reports completions under.
    pub fn set_cq_tag(&mut self, cq_tag: CompletionTag) {
        self.cq_tag = cq_tag;
    }

    pub fn return_tag(&self) -> CompletionTag {
        self.return_tag
    }

    /// Overrides the tag reported in the finished attempt's event.
    pub fn set_output_tag(&mut self, return_tag: CompletionTag) {
        self.return_tag = return_tag;
    }

    /// The call this op set holds while a batch is outstanding.
    pub fn call(&self) -> Option<&Call> {
        self.call.as_ref()
    }

    pub fn is_done_intercepting(&self) -> bool {
        self.done_intercepting
    }

    /// Starts an attempt on `call`.
    ///
    /// Panics if the transport rejects the batch: a rejection means the
    /// descriptors or tags were built incorrectly.
    pub fn fill_ops(&mut self, call: &Call) {
        self.done_intercepting = false;
        self.hijacked = false;
        self.pending_status = false;
        self.interceptor_state.reset();
        self.call = Some(call.clone());
        self.submitted_at = now();

        if call.rpc_info().is_some_and(RpcInfo::has_interceptors) {
            for slot in self.slots.iter_mut() {
                slot.arm_hook_points(self.interceptor_state.hooks_mut());
            }

            let outcome = self
                .interceptor_state
                .run_interceptors(call.rpc_info(), &mut self.slots);

            if let ChainOutcome::Hijacked { index } = outcome {
                tracing::debug!(
                    call_id = call.id(),
                    interceptor = index,
                    "batch taken over by hijacking interceptor"
                );
                self.hijacked = true;
            }
        }

        self.continue_fill_ops_after_interception(call);
    }

    fn continue_fill_ops_after_interception(&mut self, call: &Call) {
        let mut ops = Vec::with_capacity(MAX_OPS);
        for slot in self.slots.iter_mut() {
            slot.add_op(&mut ops);
        }

        tracing::debug!(
            call_id = call.id(),
            tag = self.cq_tag.value(),
            ops = ops.len(),
            "submitting batch"
        );

        if let Err(e) = call.start_batch(&ops, self.cq_tag) {
            fatal(format!("transport rejected batch: {}", e));
        }
    }

    /// Feeds one transport completion for this op set's `cq_tag`.
    ///
    /// Returns the event once the attempt is complete. `None` means the
    /// attempt needed another round trip through the transport and the
    /// next completion for the same tag finishes it.
    pub fn finalize_result(&mut self, mut completion: BatchCompletion) -> Option<CompletionEvent> {
        if self.done_intercepting {
            return Some(self.deliver(self.pending_status));
        }

        let Some(call) = self.call.clone() else {
            fatal("finalize_result called with no batch in flight");
        };

        let mut status = completion.success;
        for slot in self.slots.iter_mut() {
            slot.finish_op(&mut completion, &mut status);
        }

        if call.rpc_info().is_some_and(RpcInfo::has_interceptors) {
            self.interceptor_state.set_reverse();
            for slot in self.slots.iter_mut() {
                slot.arm_finish_hook_points(self.interceptor_state.hooks_mut());
            }

            self.interceptor_state
                .run_interceptors(call.rpc_info(), &mut self.slots);

            if self.hijacked {
                self.pending_status = status;
                self.continue_finalize_result_after_interception(&call);
                return None;
            }
        }

        Some(self.deliver(status))
    }

    fn continue_finalize_result_after_interception(&mut self, call: &Call) {
        self.done_intercepting = true;

        tracing::debug!(
            call_id = call.id(),
            tag = self.cq_tag.value(),
            "submitting empty batch to finish hijacked attempt"
        );

        if let Err(e) = call.start_batch(&[], self.cq_tag) {
            fatal(format!("transport rejected batch: {}", e));
        }
    }

    fn deliver(&mut self, ok: bool) -> CompletionEvent {
        let call_id = self.call.take().map(|call| call.id());
        let latency_us = now().saturating_sub(self.submitted_at);

        tracing::debug!(
            call_id,
            tag = self.return_tag.value(),
            ok,
            latency_us,
            "batch complete"
        );

        CompletionEvent {
            tag: self.return_tag,
            ok,
        }
    }
}

impl Default for CallOpSet {
    fn default() -> Self {
        Self::new()
    }
}

/// A copy starts a new attempt: it gets its own tags and empty slots, and
/// no call or interception state carries over.
impl Clone for CallOpSet {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallOpSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOpSet")
            .field("len", &self.len)
            .field("call", &self.call)
            .field("cq_tag", &self.cq_tag)
            .field("return_tag", &self.return_tag)
            .field("done_intercepting", &self.done_intercepting)
            .field("hijacked", &self.hijacked)
            .finish()
    }
}
