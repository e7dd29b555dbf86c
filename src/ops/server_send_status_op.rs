use crate::call::{BatchCompletion, TransportOp};
use crate::interceptor::{HookPointSet, InterceptedData, InterceptionHookPoint};
use crate::metadata::{MetadataArray, MetadataMap};
use crate::ops::CallOp;
use crate::status::Status;
use std::any::Any;

/// Terminal status of a server response. The status message travels as
/// the descriptor's details, and the binary error details are appended to
/// the trailing metadata under the reserved key.
#[derive(Debug, Default)]
pub struct ServerSendStatusOp {
    send_status_available: bool,
    hijacked: bool,
    fill_failed: bool,
    trailing_metadata: MetadataMap,
    status: Status,
}

impl ServerSendStatusOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_send_status(&mut self, trailing_metadata: MetadataMap, status: Status) {
        self.trailing_metadata = trailing_metadata;
        self.status = status;
        self.send_status_available = true;
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn trailing_metadata(&self) -> &MetadataMap {
        &self.trailing_metadata
    }
}

impl CallOp for ServerSendStatusOp {
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>) {
        if !self.send_status_available || self.hijacked {
            return;
        }

        let details = self.status.error_message();

        match MetadataArray::fill(&self.trailing_metadata, self.status.error_details()) {
            Ok(trailing_metadata) => ops.push(TransportOp::SendStatusFromServer {
                trailing_metadata,
                code: self.status.error_code(),
                details: (!details.is_empty()).then_some(details),
            }),
            Err(e) => {
                tracing::warn!("dropping status from batch: {}", e);
                self.fill_failed = true;
            }
        }
    }

    fn finish_op(&mut self, _completion: &mut BatchCompletion, status: &mut bool) {
        if !self.send_status_available || self.hijacked {
            return;
        }
        if self.fill_failed {
            self.fill_failed = false;
            *status = false;
        }
        self.send_status_available = false;
    }

    fn arm_hook_points(&mut self, hooks: &mut HookPointSet) {
        if !self.send_status_available {
            return;
        }
        hooks.add(InterceptionHookPoint::PreSendStatus);
    }

    fn arm_finish_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn mark_hijacked(&mut self, _hooks: &mut HookPointSet) {
        self.hijacked = true;
    }

    fn intercepted_data(&mut self) -> InterceptedData<'_> {
        InterceptedData::SendStatus {
            trailing_metadata: &mut self.trailing_metadata,
            status: &mut self.status,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
