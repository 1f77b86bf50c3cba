//! Core encoding and decoding traits.
//!
//! Every wire-visible type implements some subset of these traits, resolved
//! by category at compile time: fixed scalars implement [`FixedSize`], varint
//! scalars and variable-length containers implement [`EncodeSize`], and
//! everything implements [`Write`] and [`Read`]. The generic entry points
//! (`value.write(buf)`, `T::read_cfg(buf, cfg)`) monomorphize to the right
//! implementation with no runtime type inspection.

use crate::error::UnmarshalError;
use bytes::{Buf, BufMut, BytesMut};

/// Trait for types that can be written (encoded) to a buffer.
pub trait Write {
    /// Encodes this value by appending it to a buffer.
    fn write(&self, buf: &mut impl BufMut);
}

/// Trait for types that know the exact byte length of their encoding.
pub trait EncodeSize {
    /// Returns the exact number of bytes `write()` will produce.
    fn encode_size(&self) -> usize;
}

/// Trait for types whose encoding always occupies the same number of bytes.
pub trait FixedSize: EncodeSize {
    /// The length of the encoded value.
    const SIZE: usize;
}

/// Trait for types that can be read (decoded) from a buffer.
///
/// The `Cfg` associated type carries decode-time configuration, typically a
/// [`crate::RangeCfg`] bounding the lengths an untrusted peer may make us
/// allocate. Types that need no configuration use `()`.
pub trait Read: Sized {
    /// Decode-time configuration.
    type Cfg;

    /// Reads a value from the buffer, consuming exactly the bytes it uses.
    fn read_cfg(buf: &mut impl Buf, cfg: &Self::Cfg) -> Result<Self, UnmarshalError>;
}

/// Trait for types that can be encoded into a standalone buffer.
pub trait Encode: Write + EncodeSize {
    /// Encodes a value to a fresh `BytesMut`.
    ///
    /// Panics if `write()` does not produce exactly `encode_size()` bytes.
    ///
    /// (Provided method).
    fn encode(&self) -> BytesMut {
        let size = self.encode_size();
        let mut buf = BytesMut::with_capacity(size);
        self.write(&mut buf);
        assert_eq!(buf.len(), size, "write() did not write expected bytes");
        buf
    }
}

impl<T: Write + EncodeSize + ?Sized> Encode for T {}

/// Trait for types that can be decoded from a buffer, ensuring the entire
/// buffer is consumed.
pub trait Decode: Read {
    /// Decodes a value and fails with [`UnmarshalError::ExtraData`] if any
    /// input remains.
    ///
    /// (Provided method).
    fn decode_cfg(mut buf: impl Buf, cfg: &Self::Cfg) -> Result<Self, UnmarshalError> {
        let value = Self::read_cfg(&mut buf, cfg)?;
        let remaining = buf.remaining();
        if remaining > 0 {
            return Err(UnmarshalError::ExtraData(remaining));
        }
        Ok(value)
    }
}

impl<T: Read> Decode for T {}

/// Extension trait providing an ergonomic read method for types requiring no
/// configuration.
pub trait ReadExt: Read<Cfg = ()> {
    /// Reads a value using the default `()` config.
    fn read(buf: &mut impl Buf) -> Result<Self, UnmarshalError> {
        Self::read_cfg(buf, &())
    }
}

impl<T: Read<Cfg = ()>> ReadExt for T {}

/// Extension trait providing an ergonomic decode method for types requiring
/// no configuration.
pub trait DecodeExt: Decode<Cfg = ()> {
    /// Decodes a value using the default `()` config.
    fn decode(buf: impl Buf) -> Result<Self, UnmarshalError> {
        Self::decode_cfg(buf, &())
    }
}

impl<T: Decode<Cfg = ()>> DecodeExt for T {}
