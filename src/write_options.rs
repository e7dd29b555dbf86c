use crate::constants::{WRITE_BUFFER_HINT, WRITE_NO_COMPRESS, WRITE_THROUGH};

/// Per-message write options.
///
/// The flag bits are single-use: a `SendMessageOp` copies them into the
/// descriptor it hands to the transport and then clears them. The
/// last-message marker is tracked separately from the flag bits and is not
/// touched by `clear`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    flags: u32,
    last_message: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all flag bits.
    #[inline]
    pub fn clear(&mut self) {
        self.flags = 0;
    }

    /// Raw flags bitset.
    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Disables compression for the next message write.
    pub fn set_no_compression(&mut self) -> &mut Self {
        self.set_bit(WRITE_NO_COMPRESS)
    }

    pub fn clear_no_compression(&mut self) -> &mut Self {
        self.clear_bit(WRITE_NO_COMPRESS)
    }

    pub fn get_no_compression(&self) -> bool {
        self.get_bit(WRITE_NO_COMPRESS)
    }

    /// Marks the write as bufferable: it need not go out on the wire
    /// immediately.
    pub fn set_buffer_hint(&mut self) -> &mut Self {
        self.set_bit(WRITE_BUFFER_HINT)
    }

    pub fn clear_buffer_hint(&mut self) -> &mut Self {
        self.clear_bit(WRITE_BUFFER_HINT)
    }

    pub fn get_buffer_hint(&self) -> bool {
        self.get_bit(WRITE_BUFFER_HINT)
    }

    /// Corked writes share the buffer-hint bit.
    pub fn set_corked(&mut self) -> &mut Self {
        self.set_bit(WRITE_BUFFER_HINT)
    }

    pub fn clear_corked(&mut self) -> &mut Self {
        self.clear_bit(WRITE_BUFFER_HINT)
    }

    pub fn is_corked(&self) -> bool {
        self.get_bit(WRITE_BUFFER_HINT)
    }

    /// Requires every byte to reach the socket before the write completes.
    pub fn set_write_through(&mut self) -> &mut Self {
        self.set_bit(WRITE_THROUGH)
    }

    pub fn clear_write_through(&mut self) -> &mut Self {
        self.clear_bit(WRITE_THROUGH)
    }

    pub fn is_write_through(&self) -> bool {
        self.get_bit(WRITE_THROUGH)
    }

    /// Marks the message as the last one of the stream.
    ///
    /// On a client this makes the write equivalent to a write followed by a
    /// half-close. On a server the write is held back until the status goes
    /// out.
    pub fn set_last_message(&mut self) -> &mut Self {
        self.last_message = true;
        self
    }

    pub fn clear_last_message(&mut self) -> &mut Self {
        self.last_message = false;
        self
    }

    pub fn is_last_message(&self) -> bool {
        self.last_message
    }

    fn set_bit(&mut self, mask: u32) -> &mut Self {
        self.flags |= mask;
        self
    }

    fn clear_bit(&mut self, mask: u32) -> &mut Self {
        self.flags &= !mask;
        self
    }

    fn get_bit(&self, mask: u32) -> bool {
        (self.flags & mask) != 0
    }
}
