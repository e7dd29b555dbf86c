use crate::call::{BatchCompletion, TransportOp};
use crate::interceptor::{HookPointSet, InterceptedData, InterceptionHookPoint};
use crate::metadata::MetadataMap;
use crate::ops::CallOp;
use crate::status::{Status, StatusCode};
use std::any::Any;

/// Receives the terminal status of a client call and rebuilds it from the
/// wire code, the status message bytes and the binary error details found
/// in the trailing metadata.
#[derive(Debug, Default)]
pub struct ClientRecvStatusOp {
    requested: bool,
    completed: bool,
    hijacked: bool,
    status: Status,
    trailing_metadata: MetadataMap,
    debug_error_string: String,
}

impl ClientRecvStatusOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_recv_status(&mut self) {
        self.status = Status::default();
        self.trailing_metadata.clear();
        self.debug_error_string.clear();
        self.completed = false;
        self.requested = true;
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn trailing_metadata(&self) -> &MetadataMap {
        &self.trailing_metadata
    }

    pub fn take_trailing_metadata(&mut self) -> MetadataMap {
        std::mem::take(&mut self.trailing_metadata)
    }

    /// Transport-level description of the failure; empty when the transport
    /// reported none.
    pub fn debug_error_string(&self) -> &str {
        &self.debug_error_string
    }
}

impl CallOp for ClientRecvStatusOp {
    fn add_op<'a>(&'a mut self, ops: &mut Vec<TransportOp<'a>>) {
        if !self.requested || self.hijacked {
            return;
        }
        ops.push(TransportOp::RecvStatusOnClient);
    }

    fn finish_op(&mut self, completion: &mut BatchCompletion, _status: &mut bool) {
        if !self.requested {
            return;
        }
        self.requested = false;
        if self.hijacked {
            return;
        }

        match completion.status.take() {
            Some(received) => {
                let details = received.trailing_metadata.binary_error_details();
                let message = String::from_utf8_lossy(&received.details).into_owned();

                self.status =
                    Status::with_details(StatusCode::from_wire(received.code), message, details);
                self.trailing_metadata = received.trailing_metadata;
                self.debug_error_string = received.debug_error_string.unwrap_or_default();
            }
            None => {
                self.status = Status::new(StatusCode::Unknown, "no status received");
            }
        }
        self.completed = true;
    }

    fn arm_hook_points(&mut self, _hooks: &mut HookPointSet) {}

    fn arm_finish_hook_points(&mut self, hooks: &mut HookPointSet) {
        if !self.completed {
            return;
        }
        hooks.add(InterceptionHookPoint::PostRecvStatus);
        self.completed = false;
    }

    fn mark_hijacked(&mut self, hooks: &mut HookPointSet) {
        self.hijacked = true;
        if !self.requested {
            return;
        }
        hooks.add(InterceptionHookPoint::PreRecvStatus);
        self.completed = true;
    }

    fn intercepted_data(&mut self) -> InterceptedData<'_> {
        InterceptedData::RecvStatus {
            status: &mut self.status,
            trailing_metadata: &mut self.trailing_metadata,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
