mod byte_buffer;
mod message_codec;

pub use byte_buffer::ByteBuffer;
pub use message_codec::MessageCodec;
