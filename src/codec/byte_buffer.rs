use bytes::Bytes;

/// Opaque buffer holding one serialized message.
///
/// A buffer is either empty ("invalid") or holds a `Bytes` payload. Whether
/// that payload is exclusively ours is tracked by the codec at serialization
/// time; `duplicate` turns a shared payload into a private copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Option<Bytes>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            data: Some(bytes.into()),
        }
    }

    /// `true` when the buffer holds a payload (possibly zero-length).
    pub fn valid(&self) -> bool {
        self.data.is_some()
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Bytes::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Cheap handle to the payload; shares storage with this buffer.
    pub fn bytes(&self) -> Option<Bytes> {
        self.data.clone()
    }

    /// Replaces a possibly shared payload with a private copy of its bytes.
    pub fn duplicate(&mut self) {
        if let Some(data) = self.data.take() {
            self.data = Some(Bytes::copy_from_slice(&data));
        }
    }

    /// Drops the payload.
    pub fn clear(&mut self) {
        self.data = None;
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        ByteBuffer::from_bytes(bytes)
    }
}

impl From<Bytes> for ByteBuffer {
    fn from(bytes: Bytes) -> Self {
        ByteBuffer::from_bytes(bytes)
    }
}
