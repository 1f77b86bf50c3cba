//! Codec implementations for key-value maps.
//!
//! Pairs are written in the container's natural iteration order (sorted for
//! `BTreeMap`, unspecified for `HashMap`). Decoding inserts with the target's
//! native semantics, so a duplicate key from the wire silently collapses to
//! the last occurrence, mirroring in-memory behavior.

use crate::{EncodeSize, RangeCfg, Read, UnmarshalError, Write};
use bytes::{Buf, BufMut};
use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

impl<K: Write, V: Write> Write for BTreeMap<K, V> {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.len().write(buf);
        for (key, value) in self {
            key.write(buf);
            value.write(buf);
        }
    }
}

impl<K: EncodeSize, V: EncodeSize> EncodeSize for BTreeMap<K, V> {
    #[inline]
    fn encode_size(&self) -> usize {
        self.len().encode_size()
            + self
                .iter()
                .map(|(key, value)| key.encode_size() + value.encode_size())
                .sum::<usize>()
    }
}

impl<K: Read + Ord, V: Read> Read for BTreeMap<K, V> {
    type Cfg = (RangeCfg, (K::Cfg, V::Cfg));

    fn read_cfg(
        buf: &mut impl Buf,
        (range, (key_cfg, value_cfg)): &Self::Cfg,
    ) -> Result<Self, UnmarshalError> {
        let len = usize::read_cfg(buf, range)?;
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = K::read_cfg(buf, key_cfg)?;
            let value = V::read_cfg(buf, value_cfg)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<K: Write, V: Write> Write for HashMap<K, V> {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        self.len().write(buf);
        for (key, value) in self {
            key.write(buf);
            value.write(buf);
        }
    }
}

impl<K: EncodeSize, V: EncodeSize> EncodeSize for HashMap<K, V> {
    #[inline]
    fn encode_size(&self) -> usize {
        self.len().encode_size()
            + self
                .iter()
                .map(|(key, value)| key.encode_size() + value.encode_size())
                .sum::<usize>()
    }
}

impl<K: Read + Eq + Hash, V: Read> Read for HashMap<K, V> {
    type Cfg = (RangeCfg, (K::Cfg, V::Cfg));

    fn read_cfg(
        buf: &mut impl Buf,
        (range, (key_cfg, value_cfg)): &Self::Cfg,
    ) -> Result<Self, UnmarshalError> {
        let len = usize::read_cfg(buf, range)?;
        let mut map = HashMap::with_capacity(len);
        for _ in 0..len {
            let key = K::read_cfg(buf, key_cfg)?;
            let value = V::read_cfg(buf, value_cfg)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}
