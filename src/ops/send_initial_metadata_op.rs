use crate::call::{BatchCompletion, CompressionLevel, TransportOp};
use crate::interceptor::{HookPointSet, InterceptedData, InterceptionHookPoint};
use crate::metadata::{MetadataArray, MetadataMap};
use crate::ops::CallOp;
use std::any::Any;

#[derive(Debug, Default)]
pub struct SendInitialMetadataOp {
    send: bool,
    hijacked: bool,
    fill_failed: bool,
    flags: u32,
    metadata: MetadataMap,
    compression_level: Option<CompressionLevel>,
}

impl SendInitialMetadataOp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `metadata` for the next batch. Resets any compression level
    /// set for a previous batch.
    pub fn send_initial_metadata(&mut self, metadata: MetadataMap, flags: u32) {
        self.compression_level = None;
        self.send = true;
        self.flags = flags;
        self.metadata = metadata;
    }

    pub fn set_compression_level(&mut self, level: CompressionLevel) {
        self.compression_level = Some(level);
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn is_pending(&self) -> bool {
        self.send
    }
}

impl CallOp for SendInitialMetadataOp {
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>) {
        if !self.send || self.hijacked {
            return;
        }

        match MetadataArray::fill(&self.metadata, &[]) {
            Ok(metadata) => ops.push(TransportOp::SendInitialMetadata {
                metadata,
                flags: self.flags,
                compression_level: self.compression_level,
            }),
            Err(e) => {
                tracing::warn!("dropping initial metadata from batch: {}", e);
                self.fill_failed = true;
            }
        }
    }

    fn finish_op(&mut self, _completion: &mut BatchCompletion, status: &mut bool) {
        if !self.send || self.hijacked {
            return;
        }
        if self.fill_failed {
            self.fill_failed = false;
            *status = false;
        }
        self.send = false;
    }

    fn arm_hook_points(&mut self, hooks: &mut HookPointSet) {
        if !self.send {
            return;
        }
        hooks.add(InterceptionHookPoint::PreSendInitialMetadata);
    }

    fn arm_finish_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn mark_hijacked(&mut self, _hooks: &mut HookPointSet) {
        self.hijacked = true;
    }

    fn intercepted_data(&mut self) -> InterceptedData<'_> {
        InterceptedData::SendInitialMetadata(&mut self.metadata)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
