//! Codec implementations for sets of unique elements.

use crate::{EncodeSize, RangeCfg, Read, UnmarshalError, Write};
use bytes::{Buf, BufMut};
use std::{
    collections::{BTreeSet, HashSet},
    hash::Hash,
};

impl<T: Write> Write for BTreeSet<T> {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.len().write(buf);
        for item in self {
            item.write(buf);
        }
    }
}

impl<T: EncodeSize> EncodeSize for BTreeSet<T> {
    #[inline]
    fn encode_size(&self) -> usize {
        self.len().encode_size() + self.iter().map(EncodeSize::encode_size).sum::<usize>()
    }
}

impl<T: Read + Ord> Read for BTreeSet<T> {
    type Cfg = (RangeCfg, T::Cfg);

    fn read_cfg(buf: &mut impl Buf, (range, inner): &Self::Cfg) -> Result<Self, UnmarshalError> {
        let len = usize::read_cfg(buf, range)?;
        let mut set = BTreeSet::new();
        for _ in 0..len {
            set.insert(T::read_cfg(buf, inner)?);
        }
        Ok(set)
    }
}

impl<T: Write> Write for HashSet<T> {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.len().write(buf);
        for item in self {
            item.write(buf);
        }
    }
}

impl<T: EncodeSize> EncodeSize for HashSet<T> {
    #[inline]
    fn encode_size(&self) -> usize {
        self.len().encode_size() + self.iter().map(EncodeSize::encode_size).sum::<usize>()
    }
}

impl<T: Read + Eq + Hash> Read for HashSet<T> {
    type Cfg = (RangeCfg, T::Cfg);

    fn read_cfg(buf: &mut impl Buf, (range, inner): &Self::Cfg) -> Result<Self, UnmarshalError> {
        let len = usize::read_cfg(buf, range)?;
        let mut set = HashSet::with_capacity(len);
        for _ in 0..len {
            set.insert(T::read_cfg(buf, inner)?);
        }
        Ok(set)
    }
}
