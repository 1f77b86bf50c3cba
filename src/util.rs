//! Internal helpers shared by codec implementations.

use crate::error::UnmarshalError;
use bytes::Buf;

/// Ensures at least `len` readable bytes remain in `buf`.
pub fn at_least<B: Buf + ?Sized>(buf: &B, len: usize) -> Result<(), UnmarshalError> {
    if buf.remaining() < len {
        return Err(UnmarshalError::EndOfBuffer);
    }
    Ok(())
}
