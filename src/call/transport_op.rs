use crate::call::CompressionLevel;
use crate::codec::ByteBuffer;
use crate::metadata::MetadataArray;
use crate::status::StatusCode;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// One entry of the flat operation array submitted to a transport.
///
/// Send descriptors borrow the data owned by their operation slot. The
/// borrow ends when `start_batch` returns, so a transport that needs the
/// data later has to copy it (header bytes, message `Bytes` handles) while
/// it still holds the descriptor.
#[derive(Debug)]
pub enum TransportOp<'a> {
    SendInitialMetadata {
        metadata: MetadataArray<'a>,
        flags: u32,
        compression_level: Option<CompressionLevel>,
    },
    SendMessage {
        message: &'a ByteBuffer,
        flags: u32,
        last_message: bool,
    },
    SendCloseFromClient,
    SendStatusFromServer {
        trailing_metadata: MetadataArray<'a>,
        code: StatusCode,
        details: Option<&'a str>,
    },
    RecvInitialMetadata,
    RecvMessage,
    RecvStatusOnClient,
}

impl TransportOp<'_> {
    pub fn kind(&self) -> TransportOpKind {
        match self {
            TransportOp::SendInitialMetadata { .. } => TransportOpKind::SendInitialMetadata,
            TransportOp::SendMessage { .. } => TransportOpKind::SendMessage,
            TransportOp::SendCloseFromClient => TransportOpKind::SendCloseFromClient,
            TransportOp::SendStatusFromServer { .. } => TransportOpKind::SendStatusFromServer,
            TransportOp::RecvInitialMetadata => TransportOpKind::RecvInitialMetadata,
            TransportOp::RecvMessage => TransportOpKind::RecvMessage,
            TransportOp::RecvStatusOnClient => TransportOpKind::RecvStatusOnClient,
        }
    }
}

/// Discriminant of a `TransportOp`, used by transports to validate batches.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum TransportOpKind {
    SendInitialMetadata = 0,
    SendMessage = 1,
    SendCloseFromClient = 2,
    SendStatusFromServer = 3,
    RecvInitialMetadata = 4,
    RecvMessage = 5,
    RecvStatusOnClient = 6,
}

impl TransportOpKind {
    /// Operations only a client may submit.
    pub fn is_client_only(self) -> bool {
        matches!(
            self,
            TransportOpKind::SendCloseFromClient | TransportOpKind::RecvStatusOnClient
        )
    }

    /// Operations only a server may submit.
    pub fn is_server_only(self) -> bool {
        matches!(self, TransportOpKind::SendStatusFromServer)
    }
}
