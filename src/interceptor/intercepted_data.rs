use crate::codec::ByteBuffer;
use crate::metadata::MetadataMap;
use crate::status::Status;
use std::any::Any;

/// Mutable view of the data one operation slot exposes to interceptors.
pub enum InterceptedData<'a> {
    None,
    SendInitialMetadata(&'a mut MetadataMap),
    SendMessage(&'a mut ByteBuffer),
    SendStatus {
        trailing_metadata: &'a mut MetadataMap,
        status: &'a mut Status,
    },
    RecvInitialMetadata(&'a mut MetadataMap),
    /// Destination of a receive slot: always an `Option<T>` of the slot's
    /// message type.
    RecvMessage(&'a mut dyn Any),
    RecvStatus {
        status: &'a mut Status,
        trailing_metadata: &'a mut MetadataMap,
    },
}
