use crate::call::{BatchCompletion, TransportOp};
use crate::interceptor::{HookPointSet, InterceptedData, InterceptionHookPoint};
use crate::metadata::MetadataMap;
use crate::ops::CallOp;
use std::any::Any;

#[derive(Debug, Default)]
pub struct RecvInitialMetadataOp {
    requested: bool,
    completed: bool,
    hijacked: bool,
    metadata: MetadataMap,
}

impl RecvInitialMetadataOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recv_initial_metadata(&mut self) {
        self.metadata.clear();
        self.completed = false;
        self.requested = true;
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn take_metadata(&mut self) -> MetadataMap {
        std::mem::take(&mut self.metadata)
    }
}

impl CallOp for RecvInitialMetadataOp {
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>) {
        if !self.requested || self.hijacked {
            return;
        }
        ops.push(TransportOp::RecvInitialMetadata);
    }

    fn finish_op(&mut self, completion: &mut BatchCompletion, _status: &mut bool) {
        if !self.requested {
            return;
        }
        self.requested = false;
        if self.hijacked {
            return;
        }

        if let Some(metadata) = completion.initial_metadata.take() {
            self.metadata = metadata;
        }
        self.completed = true;
    }

    fn arm_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn arm_finish_hook_points(&mut self, hooks: &mut HookPointSet) {
        if !self.completed {
            return;
        }
        hooks.add(InterceptionHookPoint::PostRecvInitialMetadata);
        self.completed = false;
    }

    fn mark_hijacked(&mut self, hooks: &mut HookPointSet) {
        self.hijacked = true;
        if !self.requested {
            return;
        }
        hooks.add(InterceptionHookPoint::PreRecvInitialMetadata);
        self.completed = true;
    }

    fn intercepted_data(&mut self) -> InterceptedData<'_> {
        InterceptedData::RecvInitialMetadata(&mut self.metadata)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
