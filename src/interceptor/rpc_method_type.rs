use num_enum::{IntoPrimitive, TryFromPrimitive};

#[repr(u8)]
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum RpcMethodType {
    #[default]
    NormalRpc = 0,
    ClientStreaming = 1,
    ServerStreaming = 2,
    BidiStreaming = 3,
}
