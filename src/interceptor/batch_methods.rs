use crate::codec::ByteBuffer;
use crate::interceptor::batch_state::ChainEvent;
use crate::interceptor::{
    InterceptedData, InterceptionHookPoint, InterceptorBatchState, RpcInfo,
};
use crate::metadata::MetadataMap;
use crate::ops::CallOp;
use crate::status::Status;
use crate::utils::fatal;

/// What an interceptor sees while it runs: the armed hook points of the
/// current pass, the slot data, and the two ways of handing control back.
pub struct InterceptorBatchMethods<'a> {
    state: &'a mut InterceptorBatchState,
    rpc_info: &'a RpcInfo,
    slots: &'a mut [Box<dyn CallOp>],
    event: Option<ChainEvent>,
}

impl<'a> InterceptorBatchMethods<'a> {
    pub(crate) fn new(
        state: &'a mut InterceptorBatchState,
        rpc_info: &'a RpcInfo,
        slots: &'a mut [Box<dyn CallOp>],
    ) -> Self {
        Self {
            state,
            rpc_info,
            slots,
            event: None,
        }
    }

    pub(crate) fn into_event(self) -> Option<ChainEvent> {
        self.event
    }

    fn record(&mut self, event: ChainEvent) {
        if let Some(previous) = self.event {
            fatal(format!(
                "interceptor {} resumed the chain twice ({:?} after {:?})",
                self.state.interceptor_index(),
                event,
                previous
            ));
        }
        self.event = Some(event);
    }

    /// Hands control to the next interceptor of the current pass, or back
    /// to the op set once the pass is exhausted.
    pub fn proceed(&mut self) {
        self.record(ChainEvent::Proceed);
    }

    /// Takes the batch away from the transport.
    ///
    /// Only the first interceptor of a client call may hijack, only on the
    /// forward pass of a batch that sends initial metadata, and only once
    /// per call. The engine then re-invokes this interceptor with the
    /// receive hook points armed so it can supply the results itself.
    pub fn hijack(&mut self) {
        let client = match self.rpc_info {
            RpcInfo::Client(client) => client,
            RpcInfo::Server(_) => fatal("hijack is only available on client calls"),
        };

        if self.state.is_reverse() {
            fatal("hijack is only available on the forward pass");
        }

        if self.state.interceptor_index() != 0 {
            fatal("hijack is only available to the first interceptor");
        }

        if client.hijacked() || self.state.ran_hijacking_interceptor() {
            fatal("call was already hijacked");
        }

        if !self
            .state
            .hooks()
            .contains(InterceptionHookPoint::PreSendInitialMetadata)
        {
            fatal("hijack requires a batch that sends initial metadata");
        }

        self.record(ChainEvent::Hijack);
    }

    pub fn query_interception_hook_point(&self, point: InterceptionHookPoint) -> bool {
        self.state.hooks().contains(point)
    }

    /// Position of the running interceptor in the registry.
    pub fn interceptor_index(&self) -> usize {
        self.state.interceptor_index()
    }

    pub fn is_reverse(&self) -> bool {
        self.state.is_reverse()
    }

    pub fn rpc_info(&self) -> &RpcInfo {
        self.rpc_info
    }

    // --- Send side ---

    pub fn get_send_initial_metadata(&mut self) -> Option<&mut MetadataMap> {
        self.slots
            .iter_mut()
            .find_map(|slot| match slot.intercepted_data() {
                InterceptedData::SendInitialMetadata(metadata) => Some(metadata),
                _ => None,
            })
    }

    /// The serialized outgoing message.
    pub fn get_send_message(&mut self) -> Option<&mut ByteBuffer> {
        self.slots
            .iter_mut()
            .find_map(|slot| match slot.intercepted_data() {
                InterceptedData::SendMessage(buffer) => Some(buffer),
                _ => None,
            })
    }

    pub fn get_send_status(&mut self) -> Option<Status> {
        self.send_status_mut().map(|status| status.clone())
    }

    /// Replaces the status a server is about to send. Does nothing when the
    /// batch carries no status.
    pub fn modify_send_status(&mut self, status: Status) {
        if let Some(current) = self.send_status_mut() {
            *current = status;
        }
    }

    fn send_status_mut(&mut self) -> Option<&mut Status> {
        self.slots
            .iter_mut()
            .find_map(|slot| match slot.intercepted_data() {
                InterceptedData::SendStatus { status, .. } => Some(status),
                _ => None,
            })
    }

    pub fn get_send_trailing_metadata(&mut self) -> Option<&mut MetadataMap> {
        self.slots
            .iter_mut()
            .find_map(|slot| match slot.intercepted_data() {
                InterceptedData::SendStatus {
                    trailing_metadata, ..
                } => Some(trailing_metadata),
                _ => None,
            })
    }

    // --- Receive side ---

    /// Destination of the receive-message slot, if the batch has one whose
    /// message type is `T`.
    pub fn get_recv_message<T: 'static>(&mut self) -> Option<&mut Option<T>> {
        self.slots
            .iter_mut()
            .find_map(|slot| match slot.intercepted_data() {
                InterceptedData::RecvMessage(message) => message.downcast_mut::<Option<T>>(),
                _ => None,
            })
    }

    pub fn get_recv_initial_metadata(&mut self) -> Option<&mut MetadataMap> {
        self.slots
            .iter_mut()
            .find_map(|slot| match slot.intercepted_data() {
                InterceptedData::RecvInitialMetadata(metadata) => Some(metadata),
                _ => None,
            })
    }

    pub fn get_recv_status(&mut self) -> Option<&mut Status> {
        self.slots
            .iter_mut()
            .find_map(|slot| match slot.intercepted_data() {
                InterceptedData::RecvStatus { status, .. } => Some(status),
                _ => None,
            })
    }

    pub fn get_recv_trailing_metadata(&mut self) -> Option<&mut MetadataMap> {
        self.slots
            .iter_mut()
            .find_map(|slot| match slot.intercepted_data() {
                InterceptedData::RecvStatus {
                    trailing_metadata, ..
                } => Some(trailing_metadata),
                _ => None,
            })
    }
}
