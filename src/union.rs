//! Tagged unions: a varint discriminant followed by the active alternative's
//! payload.
//!
//! Rust enums are the natural closed union — implementing [`Write`]/[`Read`]
//! with a `match` over the variants *is* the compile-time dispatch table, and
//! [`read_index`] does the range-checked discriminant plumbing:
//!
//! ```
//! use bytes::{Buf, BufMut};
//! use ferrite_codec::{union, Read, UnmarshalError, Write};
//!
//! enum Command {
//!     Ping,
//!     Store(u64),
//! }
//!
//! impl Write for Command {
//!     fn write(&self, buf: &mut impl BufMut) {
//!         match self {
//!             Command::Ping => union::write_index(0, buf),
//!             Command::Store(slot) => {
//!                 union::write_index(1, buf);
//!                 slot.write(buf);
//!             }
//!         }
//!     }
//! }
//!
//! impl Read for Command {
//!     type Cfg = ();
//!     fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
//!         Ok(match union::read_index(buf, 2)? {
//!             0 => Command::Ping,
//!             1 => Command::Store(u64::read_cfg(buf, &())?),
//!             _ => unreachable!(),
//!         })
//!     }
//! }
//! ```
//!
//! [`Either`] ships with impls as the canonical two-alternative union.

use crate::{varint, EncodeSize, Read, UnmarshalError, Write};
use bytes::{Buf, BufMut};
use either::Either;

/// Writes a union discriminant (the zero-based alternative index).
pub fn write_index(index: u64, buf: &mut impl BufMut) {
    varint::write(index, buf);
}

/// Bytes [`write_index`] will emit for `index`.
pub fn index_size(index: u64) -> usize {
    varint::size(index)
}

/// Reads a union discriminant, failing with
/// [`UnmarshalError::UnionIndexOutOfRange`] unless it is below `limit` (the
/// number of alternatives).
pub fn read_index(buf: &mut impl Buf, limit: u64) -> Result<u64, UnmarshalError> {
    let index = varint::read::<u64>(buf)?;
    if index >= limit {
        return Err(UnmarshalError::UnionIndexOutOfRange { index, limit });
    }
    Ok(index)
}

impl<L: Write, R: Write> Write for Either<L, R> {
    fn write(&self, buf: &mut impl BufMut) {
        match self {
            Either::Left(left) => {
                write_index(0, buf);
                left.write(buf);
            }
            Either::Right(right) => {
                write_index(1, buf);
                right.write(buf);
            }
        }
    }
}

impl<L: EncodeSize, R: EncodeSize> EncodeSize for Either<L, R> {
    fn encode_size(&self) -> usize {
        1 + match self {
            Either::Left(left) => left.encode_size(),
            Either::Right(right) => right.encode_size(),
        }
    }
}

impl<L: Read, R: Read> Read for Either<L, R> {
    type Cfg = (L::Cfg, R::Cfg);

    fn read_cfg(buf: &mut impl Buf, cfg: &Self::Cfg) -> Result<Self, UnmarshalError> {
        Ok(match read_index(buf, 2)? {
            0 => Either::Left(L::read_cfg(buf, &cfg.0)?),
            1 => Either::Right(R::read_cfg(buf, &cfg.1)?),
            _ => unreachable!("read_index bounds the discriminant"),
        })
    }
}
