use crate::interceptor::{HookPointSet, InterceptorBatchMethods, RpcInfo};
use crate::ops::CallOp;
use crate::utils::fatal;

/// How an interceptor handed control back to the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ChainEvent {
    Proceed,
    Hijack,
}

/// Result of running one pass of the chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// The call has no interceptors; nothing ran.
    Skipped,

    /// Every interceptor of the pass ran and proceeded.
    Completed,

    /// The forward pass finished on a hijacked call. The slots no longer
    /// talk to the transport.
    Hijacked { index: usize },
}

/// Traversal state of the interceptor chain for one attempt.
///
/// Interceptors do not call back into the chain. Each invocation records a
/// single `Proceed` or `Hijack` on its `InterceptorBatchMethods`, and the
/// engine loop acts on it after the interceptor returns. Traversal state is
/// per attempt, so concurrent attempts never share it.
#[derive(Debug, Default, Clone)]
pub struct InterceptorBatchState {
    hooks: HookPointSet,
    curr_iteration: usize,
    reverse: bool,
    ran_hijacking_interceptor: bool,
}

impl InterceptorBatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hooks(&self) -> &HookPointSet {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookPointSet {
        &mut self.hooks
    }

    pub fn interceptor_index(&self) -> usize {
        self.curr_iteration
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn ran_hijacking_interceptor(&self) -> bool {
        self.ran_hijacking_interceptor
    }

    /// Prepares for the post-receive pass.
    pub fn set_reverse(&mut self) {
        self.reverse = true;
        self.ran_hijacking_interceptor = false;
        self.hooks.clear();
    }

    /// Back to the state of a fresh attempt.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Runs the current pass over every interceptor registered on the call.
    ///
    /// Returns `ChainOutcome::Skipped` without touching any state when the
    /// call has no registry or an empty one.
    pub fn run_interceptors(
        &mut self,
        rpc_info: Option<&RpcInfo>,
        slots: &mut [Box<dyn CallOp>],
    ) -> ChainOutcome {
        match rpc_info {
            Some(info) if info.has_interceptors() => self.drive(info, slots),
            _ => ChainOutcome::Skipped,
        }
    }

    /// Reverse-only run for server calls driven from request acceptance
    /// rather than from an op set. `continuation` runs exactly once, after
    /// the last interceptor proceeded or right away when there are none.
    pub fn run_interceptors_with_continuation<F>(
        &mut self,
        rpc_info: Option<&RpcInfo>,
        slots: &mut [Box<dyn CallOp>],
        continuation: F,
    ) -> ChainOutcome
    where
        F: FnOnce(),
    {
        if !self.reverse {
            fatal("continuation runs are only available on the reverse pass");
        }

        if rpc_info.is_some_and(RpcInfo::is_client) {
            fatal("continuation runs are only available on server calls");
        }

        let outcome = self.run_interceptors(rpc_info, slots);
        continuation();
        outcome
    }

    fn drive(&mut self, info: &RpcInfo, slots: &mut [Box<dyn CallOp>]) -> ChainOutcome {
        let count = info.interceptors().len();
        let client = match info {
            RpcInfo::Client(client) => Some(client),
            RpcInfo::Server(_) => None,
        };

        self.curr_iteration = if self.reverse { count - 1 } else { 0 };

        tracing::trace!(
            reverse = self.reverse,
            interceptors = count,
            "running interceptor chain"
        );

        loop {
            match self.invoke(info, slots) {
                ChainEvent::Hijack => {
                    let recorded = client.is_some_and(|c| c.record_hijack(self.curr_iteration));
                    if !recorded {
                        fatal("call was already hijacked");
                    }

                    tracing::debug!(interceptor = self.curr_iteration, "call hijacked");
                    self.apply_hijacking_state(slots);
                }
                ChainEvent::Proceed => {
                    let hijacked_here = client.and_then(|c| c.hijacked_interceptor())
                        == Some(self.curr_iteration);

                    // A call hijacked on an earlier batch replays the hijack
                    // for this one.
                    if !self.reverse && hijacked_here && !self.ran_hijacking_interceptor {
                        self.apply_hijacking_state(slots);
                        continue;
                    }

                    if self.reverse {
                        if self.curr_iteration == 0 {
                            return ChainOutcome::Completed;
                        }
                        self.curr_iteration -= 1;
                    } else {
                        self.curr_iteration += 1;
                        if self.curr_iteration >= count {
                            return match client.and_then(|c| c.hijacked_interceptor()) {
                                Some(index) => ChainOutcome::Hijacked { index },
                                None => ChainOutcome::Completed,
                            };
                        }
                    }
                }
            }
        }
    }

    fn invoke(&mut self, info: &RpcInfo, slots: &mut [Box<dyn CallOp>]) -> ChainEvent {
        let index = self.curr_iteration;
        let interceptor = &info.interceptors()[index];

        tracing::trace!(interceptor = index, hooks = ?self.hooks, "invoking interceptor");

        let mut methods = InterceptorBatchMethods::new(self, info, slots);
        interceptor.intercept(&mut methods);

        match methods.into_event() {
            Some(event) => event,
            None => fatal(format!(
                "interceptor {} returned without calling proceed or hijack",
                index
            )),
        }
    }

    fn apply_hijacking_state(&mut self, slots: &mut [Box<dyn CallOp>]) {
        self.hooks.clear();
        for slot in slots.iter_mut() {
            slot.mark_hijacked(&mut self.hooks);
        }
        self.ran_hijacking_interceptor = true;
    }
}
