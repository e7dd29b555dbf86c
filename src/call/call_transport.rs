use crate::call::{Call, CallError, CompletionTag, TransportOp};

/// The wire-facing collaborator of a call.
///
/// `start_batch` receives the flat operation array of one attempt together
/// with the op set's transport tag. The transport must later post exactly
/// one `BatchCompletion` for that tag to `call.completion_sender()`,
/// including for an empty batch. Refusing a batch is reserved for batches
/// that are malformed; the caller treats a refusal as fatal.
pub trait CallTransport: Send + Sync {
    fn start_batch(
        &self,
        call: &Call,
        ops: &[TransportOp<'_>],
        tag: CompletionTag,
    ) -> Result<(), CallError>;
}
