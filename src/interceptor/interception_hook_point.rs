use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Named moments at which armed interceptors are invoked.
///
/// `Pre*` points fire on the forward pass before a batch is submitted (or,
/// for the receive points, when a hijacking interceptor has to supply the
/// results itself). `Post*` points fire on the reverse pass once results
/// are available.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum InterceptionHookPoint {
    PreSendInitialMetadata = 0,
    PreSendMessage = 1,
    PreSendStatus = 2,
    PreSendClose = 3,
    PreRecvInitialMetadata = 4,
    PreRecvMessage = 5,
    PreRecvStatus = 6,
    PostRecvInitialMetadata = 7,
    PostRecvMessage = 8,
    PostRecvStatus = 9,
}

impl InterceptionHookPoint {
    pub const COUNT: usize = 10;

    pub const ALL: [InterceptionHookPoint; Self::COUNT] = [
        InterceptionHookPoint::PreSendInitialMetadata,
        InterceptionHookPoint::PreSendMessage,
        InterceptionHookPoint::PreSendStatus,
        InterceptionHookPoint::PreSendClose,
        InterceptionHookPoint::PreRecvInitialMetadata,
        InterceptionHookPoint::PreRecvMessage,
        InterceptionHookPoint::PreRecvStatus,
        InterceptionHookPoint::PostRecvInitialMetadata,
        InterceptionHookPoint::PostRecvMessage,
        InterceptionHookPoint::PostRecvStatus,
    ];

    #[inline]
    pub fn index(self) -> usize {
        u8::from(self) as usize
    }
}
