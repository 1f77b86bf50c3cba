//! Codec implementation for ordered sequences.

use crate::{EncodeSize, RangeCfg, Read, UnmarshalError, Write};
use bytes::{Buf, BufMut};

impl<T: Write> Write for Vec<T> {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.len().write(buf);
        for item in self {
            item.write(buf);
        }
    }
}

impl<T: EncodeSize> EncodeSize for Vec<T> {
    #[inline]
    fn encode_size(&self) -> usize {
        self.len().encode_size() + self.iter().map(EncodeSize::encode_size).sum::<usize>()
    }
}

impl<T: Read> Read for Vec<T> {
    type Cfg = (RangeCfg, T::Cfg);

    #[inline]
    fn read_cfg(buf: &mut impl Buf, (range, inner): &Self::Cfg) -> Result<Self, UnmarshalError> {
        let len = usize::read_cfg(buf, range)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(T::read_cfg(buf, inner)?);
        }
        Ok(items)
    }
}
