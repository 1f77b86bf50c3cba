//! Message framing: the outermost envelope around one encapsulation.
//!
//! Wire layout, fixed multi-byte fields little-endian:
//!
//! ```text
//! [magic:4][proto_major:1][proto_minor:1][enc_major:1][enc_minor:1][kind:1][size:varint]
//! ```
//!
//! `size` counts the body bytes that follow the header — exactly one
//! encapsulation, except for [`Kind::ValidateConnection`] and [`Kind::Close`]
//! which carry none.

use crate::{
    buffer::ByteSequence,
    codec::FixedSize,
    util::at_least,
    varint,
    version::{Version, ENCODING, PROTOCOL},
    EncodeSize, MarshalError, Read, ReadExt, UnmarshalError, Write,
};
use bytes::{Buf, BufMut, Bytes};

/// First four bytes of every message.
pub const MAGIC: [u8; 4] = *b"FeRP";

/// Message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Request = 0,
    Reply = 1,
    ValidateConnection = 2,
    Close = 3,
}

impl TryFrom<u8> for Kind {
    type Error = UnmarshalError;

    fn try_from(value: u8) -> Result<Self, UnmarshalError> {
        match value {
            0 => Ok(Kind::Request),
            1 => Ok(Kind::Reply),
            2 => Ok(Kind::ValidateConnection),
            3 => Ok(Kind::Close),
            other => Err(UnmarshalError::InvalidMessageKind(other)),
        }
    }
}

/// Parsed message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub protocol: Version,
    pub encoding: Version,
    pub kind: Kind,
    pub size: usize,
}

impl Header {
    /// Header for a message of `kind` whose body is `size` bytes.
    pub fn new(kind: Kind, size: usize) -> Self {
        Self {
            protocol: PROTOCOL,
            encoding: ENCODING,
            kind,
            size,
        }
    }
}

impl Write for Header {
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&MAGIC);
        self.protocol.write(buf);
        self.encoding.write(buf);
        buf.put_u8(self.kind as u8);
        let size = u32::try_from(self.size).expect("message size exceeds u32");
        varint::write(size, buf);
    }
}

impl EncodeSize for Header {
    fn encode_size(&self) -> usize {
        let size = u32::try_from(self.size).expect("message size exceeds u32");
        MAGIC.len() + 2 * Version::SIZE + 1 + varint::size(size)
    }
}

impl Read for Header {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
        at_least(buf, MAGIC.len())?;
        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(UnmarshalError::InvalidMagicNumber(magic));
        }

        let protocol = Version::read(buf)?;
        if protocol.major != PROTOCOL.major {
            return Err(UnmarshalError::UnsupportedProtocol(
                protocol.major,
                protocol.minor,
            ));
        }
        let encoding = Version::read(buf)?;
        if encoding.major != ENCODING.major {
            return Err(UnmarshalError::UnsupportedEncoding(
                encoding.major,
                encoding.minor,
            ));
        }

        let kind = Kind::try_from(u8::read(buf)?)?;
        let size = varint::read::<u32>(buf)? as usize;
        Ok(Self {
            protocol,
            encoding,
            kind,
            size,
        })
    }
}

/// Frames `body` as one message of `kind`, moving the body's chunks into
/// `out` without copying payload bytes.
pub fn write_message(
    out: &mut ByteSequence,
    kind: Kind,
    body: ByteSequence,
) -> Result<(), MarshalError> {
    let size = body.len();
    if u32::try_from(size).is_err() {
        return Err(MarshalError::LengthOverflow(size));
    }
    Header::new(kind, size).write(out);
    out.append(body);
    Ok(())
}

/// Reads one message: the verified header, then exactly `size` body bytes.
pub fn read_message(buf: &mut impl Buf) -> Result<(Header, Bytes), UnmarshalError> {
    let header = Header::read(buf)?;
    at_least(buf, header.size)?;
    let body = buf.copy_to_bytes(header.size);
    Ok((header, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodeExt, Encode};

    #[test]
    fn test_header_round_trip() {
        for kind in [
            Kind::Request,
            Kind::Reply,
            Kind::ValidateConnection,
            Kind::Close,
        ] {
            let header = Header::new(kind, 300);
            let encoded = header.encode();
            assert_eq!(encoded.len(), header.encode_size());
            assert_eq!(Header::decode(encoded).unwrap(), header);
        }
    }

    #[test]
    fn test_header_conformity() {
        let encoded = Header::new(Kind::Reply, 5).encode();
        assert_eq!(
            &encoded[..],
            &[b'F', b'e', b'R', b'P', 1, 0, 1, 0, 1, 5]
        );
    }

    #[test]
    fn test_bad_magic() {
        let mut encoded = Header::new(Kind::Request, 0).encode();
        encoded[0] ^= 0xFF;
        assert!(matches!(
            Header::decode(encoded),
            Err(UnmarshalError::InvalidMagicNumber(_))
        ));
    }

    #[test]
    fn test_bad_kind() {
        let mut encoded = Header::new(Kind::Request, 0).encode();
        encoded[8] = 9;
        assert!(matches!(
            Header::decode(encoded),
            Err(UnmarshalError::InvalidMessageKind(9))
        ));
    }

    #[test]
    fn test_unsupported_versions() {
        let mut encoded = Header::new(Kind::Request, 0).encode();
        encoded[4] = 2;
        assert!(matches!(
            Header::decode(encoded.clone()),
            Err(UnmarshalError::UnsupportedProtocol(2, 0))
        ));

        let mut encoded = Header::new(Kind::Request, 0).encode();
        encoded[6] = 3;
        assert!(matches!(
            Header::decode(encoded),
            Err(UnmarshalError::UnsupportedEncoding(3, 0))
        ));
    }

    #[test]
    fn test_minor_version_ignored() {
        let mut encoded = Header::new(Kind::Request, 0).encode();
        encoded[5] = 7;
        encoded[7] = 9;
        let header = Header::decode(encoded).unwrap();
        assert_eq!(header.protocol, Version::new(1, 7));
        assert_eq!(header.encoding, Version::new(1, 9));
    }

    #[test]
    fn test_message_round_trip() {
        let mut body = ByteSequence::new();
        {
            let mut encap = body.begin_encapsulation();
            encap.put_slice(&[1, 2, 3]);
            encap.end();
        }

        let mut out = ByteSequence::new();
        write_message(&mut out, Kind::Request, body).unwrap();
        let bytes = out.into_bytes();

        let mut buf = &bytes[..];
        let (header, body) = read_message(&mut buf).unwrap();
        assert_eq!(header.kind, Kind::Request);
        assert_eq!(header.size, body.len());
        assert_eq!(buf.remaining(), 0);
        assert_eq!(&body[..], &[1, 0, 3, 1, 2, 3]);
    }

    #[test]
    fn test_validate_connection_empty_body() {
        let mut out = ByteSequence::new();
        write_message(&mut out, Kind::ValidateConnection, ByteSequence::new()).unwrap();
        let bytes = out.into_bytes();

        let (header, body) = read_message(&mut &bytes[..]).unwrap();
        assert_eq!(header.kind, Kind::ValidateConnection);
        assert_eq!(header.size, 0);
        assert!(body.is_empty());
    }

    #[test]
    fn test_truncated_body() {
        let mut out = ByteSequence::new();
        let mut body = ByteSequence::new();
        body.put_slice(&[1, 2, 3, 4]);
        write_message(&mut out, Kind::Reply, body).unwrap();
        let bytes = out.into_bytes();

        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(
            read_message(&mut &truncated[..]),
            Err(UnmarshalError::EndOfBuffer)
        ));
    }
}
