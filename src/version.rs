//! Protocol and encoding version identifiers.

use crate::{util::at_least, EncodeSize, FixedSize, Read, UnmarshalError, Write};
use bytes::{Buf, BufMut};
use std::fmt;

/// A major/minor version pair, one byte each on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

/// Protocol version spoken by this crate.
pub const PROTOCOL: Version = Version::new(1, 0);

/// Encoding version produced by this crate.
pub const ENCODING: Version = Version::new(1, 0);

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Write for Version {
    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.major);
        buf.put_u8(self.minor);
    }
}

impl Read for Version {
    type Cfg = ();

    #[inline]
    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
        at_least(buf, Self::SIZE)?;
        Ok(Self {
            major: buf.get_u8(),
            minor: buf.get_u8(),
        })
    }
}

impl EncodeSize for Version {
    #[inline]
    fn encode_size(&self) -> usize {
        Self::SIZE
    }
}

impl FixedSize for Version {
    const SIZE: usize = 2;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodeExt, Encode};

    #[test]
    fn test_version_round_trip() {
        let version = Version::new(1, 3);
        let encoded = version.encode();
        assert_eq!(encoded, &[0x01, 0x03][..]);
        assert_eq!(Version::decode(encoded).unwrap(), version);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(PROTOCOL.to_string(), "1.0");
    }
}
