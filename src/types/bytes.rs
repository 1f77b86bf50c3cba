//! Codec implementations for length-prefixed byte and text types.
//!
//! Raw byte payloads are written with a single bulk copy after the varint
//! count rather than per-element dispatch; the wire format is identical to a
//! sequence of `u8`.

use crate::{util::at_least, EncodeSize, RangeCfg, Read, UnmarshalError, Write};
use bytes::{Buf, BufMut, Bytes};

impl Write for Bytes {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.len().write(buf);
        buf.put_slice(self);
    }
}

impl EncodeSize for Bytes {
    #[inline]
    fn encode_size(&self) -> usize {
        self.len().encode_size() + self.len()
    }
}

impl Read for Bytes {
    type Cfg = RangeCfg;

    #[inline]
    fn read_cfg(buf: &mut impl Buf, range: &Self::Cfg) -> Result<Self, UnmarshalError> {
        let len = usize::read_cfg(buf, range)?;
        at_least(buf, len)?;
        Ok(buf.copy_to_bytes(len))
    }
}

impl Write for str {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.len().write(buf);
        buf.put_slice(self.as_bytes());
    }
}

impl EncodeSize for str {
    #[inline]
    fn encode_size(&self) -> usize {
        self.len().encode_size() + self.len()
    }
}

impl Write for String {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.as_str().write(buf);
    }
}

impl EncodeSize for String {
    #[inline]
    fn encode_size(&self) -> usize {
        self.as_str().encode_size()
    }
}

impl Read for String {
    type Cfg = RangeCfg;

    #[inline]
    fn read_cfg(buf: &mut impl Buf, range: &Self::Cfg) -> Result<Self, UnmarshalError> {
        let len = usize::read_cfg(buf, range)?;
        at_least(buf, len)?;
        let bytes = buf.copy_to_bytes(len);
        String::from_utf8(bytes.to_vec()).map_err(|_| UnmarshalError::InvalidUtf8)
    }
}
