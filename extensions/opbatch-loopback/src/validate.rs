use crate::Side;
use opbatch::call::{CallError, TransportOp};
use opbatch::constants::{INITIAL_METADATA_USED_MASK, MAX_OPS, WRITE_USED_MASK};

// One flag per `TransportOpKind`.
const OP_KIND_COUNT: usize = 7;

/// Checks a batch the way a real transport would before accepting it:
/// bounded size, one operation of each kind, operations legal for the
/// side submitting them, and only known flag bits.
pub fn validate_batch(side: Side, ops: &[TransportOp<'_>]) -> Result<(), CallError> {
    if ops.len() > MAX_OPS {
        return Err(CallError::TooManyOperations);
    }

    let mut seen = [false; OP_KIND_COUNT];

    for op in ops {
        let kind = op.kind();

        let seen_kind = &mut seen[u8::from(kind) as usize];
        if *seen_kind {
            return Err(CallError::DuplicateOperation);
        }
        *seen_kind = true;

        match side {
            Side::Client if kind.is_server_only() => return Err(CallError::NotOnClient),
            Side::Server if kind.is_client_only() => return Err(CallError::NotOnServer),
            _ => {}
        }

        match op {
            TransportOp::SendInitialMetadata { flags, .. }
                if flags & !INITIAL_METADATA_USED_MASK != 0 =>
            {
                return Err(CallError::InvalidFlags { flags: *flags });
            }
            TransportOp::SendMessage { flags, .. } if flags & !WRITE_USED_MASK != 0 => {
                return Err(CallError::InvalidFlags { flags: *flags });
            }
            _ => {}
        }
    }

    Ok(())
}
