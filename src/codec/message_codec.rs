use crate::codec::ByteBuffer;
use crate::status::{Status, StatusCode};

/// Serialization contract between typed messages and the byte buffers that
/// travel through operation slots.
///
/// `serialize` returns the buffer together with an ownership flag. When the
/// flag is `false` the buffer shares storage the codec does not hand over,
/// and the send slot takes a private copy before the batch is built.
pub trait MessageCodec: Sized {
    fn serialize(&self) -> Result<(ByteBuffer, bool), Status>;

    fn deserialize(buffer: &ByteBuffer) -> Result<Self, Status>;
}

/// Any `bitcode` type is a message.
impl<T> MessageCodec for T
where
    T: bitcode::Encode + for<'de> bitcode::Decode<'de>,
{
    fn serialize(&self) -> Result<(ByteBuffer, bool), Status> {
        Ok((ByteBuffer::from(bitcode::encode(self)), true))
    }

    fn deserialize(buffer: &ByteBuffer) -> Result<Self, Status> {
        bitcode::decode(buffer.as_slice()).map_err(|e| {
            Status::new(
                StatusCode::Internal,
                format!("failed to decode message: {}", e),
            )
        })
    }
}

/// Pre-serialized payloads pass through untouched. The returned buffer
/// shares storage with `self`, so it is reported as not owned.
impl MessageCodec for ByteBuffer {
    fn serialize(&self) -> Result<(ByteBuffer, bool), Status> {
        Ok((self.clone(), false))
    }

    fn deserialize(buffer: &ByteBuffer) -> Result<Self, Status> {
        Ok(buffer.clone())
    }
}
