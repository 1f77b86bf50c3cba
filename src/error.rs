//! Error types for wire encoding and decoding.

use thiserror::Error;

/// Error raised while decoding untrusted input.
///
/// Every variant is detected synchronously at the point of failure and
/// propagates without partially mutating the caller's output.
#[derive(Error, Debug)]
pub enum UnmarshalError {
    // Buffer errors
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("extra data after value: {0} bytes")]
    ExtraData(usize),

    // Scalar errors
    #[error("invalid varint")]
    InvalidVarint,
    #[error("invalid bool")]
    InvalidBool,
    #[error("invalid utf-8")]
    InvalidUtf8,
    #[error("length out of range: {0}")]
    LengthOutOfRange(usize),

    // Union errors
    #[error("union index out of range: {index} >= {limit}")]
    UnionIndexOutOfRange { index: u64, limit: u64 },

    // Segment errors
    #[error("unknown type id: {0}")]
    UnknownTypeId(String),
    #[error("invalid segment flags: {0:#04x}")]
    InvalidSegmentFlags(u8),
    #[error("type id index out of range: {0}")]
    TypeIdIndexOutOfRange(u64),
    #[error("segment chain mismatch")]
    SegmentChainMismatch,
    #[error("instance graph nesting too deep")]
    NestingTooDeep,
    #[error("unexpected null instance")]
    UnexpectedNullInstance,
    #[error("bad instance reference: {0}")]
    BadInstanceReference(u64),
    #[error("bad indirection table")]
    BadIndirectionTable,

    // Framing errors
    #[error("invalid magic number: {0:02x?}")]
    InvalidMagicNumber([u8; 4]),
    #[error("invalid message kind: {0}")]
    InvalidMessageKind(u8),
    #[error("unsupported protocol version: {0}.{1}")]
    UnsupportedProtocol(u8, u8),
    #[error("unsupported encoding version: {0}.{1}")]
    UnsupportedEncoding(u8, u8),
}

/// Error raised when in-memory state cannot be marshaled.
///
/// Cursor/sequence identity violations and unbalanced encapsulation nesting
/// are programming errors and assert instead of returning an error.
#[derive(Error, Debug)]
pub enum MarshalError {
    #[error("null instance where a value is required")]
    NullInstance,
    #[error("length exceeds u32: {0}")]
    LengthOverflow(usize),
}
