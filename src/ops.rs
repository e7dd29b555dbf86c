mod call_no_op;
mod call_op;
mod client_recv_status_op;
mod client_send_close_op;
mod generic_recv_message_op;
mod recv_initial_metadata_op;
mod recv_message_op;
mod send_initial_metadata_op;
mod send_message_op;
mod server_send_status_op;

pub use call_no_op::CallNoOp;
pub use call_op::CallOp;
pub use client_recv_status_op::ClientRecvStatusOp;
pub use client_send_close_op::ClientSendCloseOp;
pub use generic_recv_message_op::GenericRecvMessageOp;
pub use recv_initial_metadata_op::RecvInitialMetadataOp;
pub use recv_message_op::RecvMessageOp;
pub use send_initial_metadata_op::SendInitialMetadataOp;
pub use send_message_op::SendMessageOp;
pub use server_send_status_op::ServerSendStatusOp;
