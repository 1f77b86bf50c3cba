//! Codec implementations for Rust primitive types.
//!
//! # Fixed-width vs variable-width
//!
//! Single-byte values (`bool`, `u8`, `i8`) and IEEE floats are written as
//! their raw little-endian representation and always occupy `size_of` bytes.
//! The 16/32/64-bit integers default to varint encoding (see
//! [`crate::varint`]); wrap one in [`Fixed`] to force the full-width
//! little-endian form instead, e.g. for fields that are patched in place or
//! compared byte-wise.
//!
//! `usize` encodes as a `u32` varint so the on-wire format is identical
//! across 32-bit and 64-bit architectures. Decoding a `usize` takes a
//! [`RangeCfg`] bound, protecting against untrusted lengths that would
//! allocate oversized buffers.

use crate::{
    util::at_least, varint, EncodeSize, FixedSize, RangeCfg, Read, ReadExt, UnmarshalError, Write,
};
use bytes::{Buf, BufMut};

// Single-byte and float types: raw little-endian, always fixed.
macro_rules! impl_fixed_scalar {
    ($type:ty, $read_method:ident, $write_method:ident) => {
        impl Write for $type {
            #[inline]
            fn write(&self, buf: &mut impl BufMut) {
                buf.$write_method(*self);
            }
        }

        impl Read for $type {
            type Cfg = ();

            #[inline]
            fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
                at_least(buf, std::mem::size_of::<$type>())?;
                Ok(buf.$read_method())
            }
        }

        impl EncodeSize for $type {
            #[inline]
            fn encode_size(&self) -> usize {
                Self::SIZE
            }
        }

        impl FixedSize for $type {
            const SIZE: usize = std::mem::size_of::<$type>();
        }
    };
}
impl_fixed_scalar!(u8, get_u8, put_u8);
impl_fixed_scalar!(i8, get_i8, put_i8);
impl_fixed_scalar!(f32, get_f32_le, put_f32_le);
impl_fixed_scalar!(f64, get_f64_le, put_f64_le);

// Unsigned 16/32/64-bit integers: varint by default.
macro_rules! impl_varint_unsigned {
    ($type:ty) => {
        impl Write for $type {
            #[inline]
            fn write(&self, buf: &mut impl BufMut) {
                varint::write(*self, buf);
            }
        }

        impl Read for $type {
            type Cfg = ();

            #[inline]
            fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
                varint::read(buf)
            }
        }

        impl EncodeSize for $type {
            #[inline]
            fn encode_size(&self) -> usize {
                varint::size(*self)
            }
        }
    };
}
impl_varint_unsigned!(u16);
impl_varint_unsigned!(u32);
impl_varint_unsigned!(u64);

// Signed 16/32/64-bit integers: zig-zag varint by default.
macro_rules! impl_varint_signed {
    ($type:ty, $utype:ty) => {
        impl Write for $type {
            #[inline]
            fn write(&self, buf: &mut impl BufMut) {
                varint::write_signed::<$utype, $type>(*self, buf);
            }
        }

        impl Read for $type {
            type Cfg = ();

            #[inline]
            fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
                varint::read_signed::<$utype, $type>(buf)
            }
        }

        impl EncodeSize for $type {
            #[inline]
            fn encode_size(&self) -> usize {
                varint::size_signed::<$utype, $type>(*self)
            }
        }
    };
}
impl_varint_signed!(i16, u16);
impl_varint_signed!(i32, u32);
impl_varint_signed!(i64, u64);

// Bool implementation
impl Write for bool {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u8(if *self { 1 } else { 0 });
    }
}

impl Read for bool {
    type Cfg = ();

    #[inline]
    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
        match u8::read(buf)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(UnmarshalError::InvalidBool),
        }
    }
}

impl EncodeSize for bool {
    #[inline]
    fn encode_size(&self) -> usize {
        Self::SIZE
    }
}

impl FixedSize for bool {
    const SIZE: usize = 1;
}

// Usize implementation
impl Write for usize {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        let value = u32::try_from(*self).expect("write: usize value is larger than u32");
        varint::write(value, buf);
    }
}

impl Read for usize {
    type Cfg = RangeCfg;

    #[inline]
    fn read_cfg(buf: &mut impl Buf, range: &Self::Cfg) -> Result<Self, UnmarshalError> {
        let value = varint::read::<u32>(buf)? as usize;
        if !range.contains(value) {
            return Err(UnmarshalError::LengthOutOfRange(value));
        }
        Ok(value)
    }
}

impl EncodeSize for usize {
    #[inline]
    fn encode_size(&self) -> usize {
        let value = u32::try_from(*self).expect("encode_size: usize value is larger than u32");
        varint::size(value)
    }
}

/// Forces fixed-width little-endian encoding for an integer that would
/// otherwise be varint encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed<T>(pub T);

macro_rules! impl_fixed_wrapper {
    ($type:ty, $read_method:ident, $write_method:ident) => {
        impl Write for Fixed<$type> {
            #[inline]
            fn write(&self, buf: &mut impl BufMut) {
                buf.$write_method(self.0);
            }
        }

        impl Read for Fixed<$type> {
            type Cfg = ();

            #[inline]
            fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
                at_least(buf, std::mem::size_of::<$type>())?;
                Ok(Fixed(buf.$read_method()))
            }
        }

        impl EncodeSize for Fixed<$type> {
            #[inline]
            fn encode_size(&self) -> usize {
                Self::SIZE
            }
        }

        impl FixedSize for Fixed<$type> {
            const SIZE: usize = std::mem::size_of::<$type>();
        }

        impl From<$type> for Fixed<$type> {
            fn from(value: $type) -> Self {
                Fixed(value)
            }
        }
    };
}
impl_fixed_wrapper!(u16, get_u16_le, put_u16_le);
impl_fixed_wrapper!(u32, get_u32_le, put_u32_le);
impl_fixed_wrapper!(u64, get_u64_le, put_u64_le);
impl_fixed_wrapper!(i16, get_i16_le, put_i16_le);
impl_fixed_wrapper!(i32, get_i32_le, put_i32_le);
impl_fixed_wrapper!(i64, get_i64_le, put_i64_le);

// Constant-size byte array implementation
impl<const N: usize> Write for [u8; N] {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self[..]);
    }
}

impl<const N: usize> Read for [u8; N] {
    type Cfg = ();

    #[inline]
    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
        at_least(buf, N)?;
        let mut dst = [0; N];
        buf.copy_to_slice(&mut dst);
        Ok(dst)
    }
}

impl<const N: usize> EncodeSize for [u8; N] {
    #[inline]
    fn encode_size(&self) -> usize {
        N
    }
}

impl<const N: usize> FixedSize for [u8; N] {
    const SIZE: usize = N;
}

// Option implementation
impl<T: Write> Write for Option<T> {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.is_some().write(buf);
        if let Some(inner) = self {
            inner.write(buf);
        }
    }
}

impl<T: EncodeSize> EncodeSize for Option<T> {
    #[inline]
    fn encode_size(&self) -> usize {
        match self {
            Some(inner) => 1 + inner.encode_size(),
            None => 1,
        }
    }
}

impl<T: Read> Read for Option<T> {
    type Cfg = T::Cfg;

    #[inline]
    fn read_cfg(buf: &mut impl Buf, cfg: &Self::Cfg) -> Result<Self, UnmarshalError> {
        if bool::read(buf)? {
            Ok(Some(T::read_cfg(buf, cfg)?))
        } else {
            Ok(None)
        }
    }
}
