//! Binary wire protocol engine for the Ferrite RPC runtime.
//!
//! # Overview
//!
//! This crate turns typed in-memory values into the byte stream Ferrite puts
//! on the network, and reconstructs them from untrusted input on the other
//! side:
//!
//! - Scalars use a compact variable-length encoding ([`varint`]); floats,
//!   single-byte values, and [`Fixed`]-wrapped integers are raw
//!   little-endian.
//! - Containers (`Vec`, sets, maps, `Bytes`, `String`) are count-prefixed,
//!   with decode-time length bounds ([`RangeCfg`]) guarding allocations.
//! - Tagged unions write a varint discriminant then the active alternative
//!   ([`union`]).
//! - [`buffer::ByteSequence`] is a growable chunked store whose
//!   encapsulations (nested, retroactively sized sub-regions) close without
//!   copying already-written bytes.
//! - Polymorphic object and exception graphs travel as self-describing
//!   segment chains with per-encapsulation deduplication and cycle support
//!   ([`class`]).
//! - [`frame`] wraps exactly one encapsulation in the message envelope.
//!
//! The engine is synchronous and owns no I/O; the transport layer moves
//! [`buffer::ByteSequence`] values in and out.
//!
//! # Example
//!
//! ```
//! use bytes::{Buf, BufMut};
//! use ferrite_codec::{
//!     DecodeExt, Encode, EncodeSize, Read, ReadExt, UnmarshalError, Write,
//! };
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Span {
//!     start: u64,
//!     len: u32,
//!     open: bool,
//! }
//!
//! impl Write for Span {
//!     fn write(&self, buf: &mut impl BufMut) {
//!         self.start.write(buf);
//!         self.len.write(buf);
//!         self.open.write(buf);
//!     }
//! }
//!
//! impl EncodeSize for Span {
//!     fn encode_size(&self) -> usize {
//!         self.start.encode_size() + self.len.encode_size() + self.open.encode_size()
//!     }
//! }
//!
//! impl Read for Span {
//!     type Cfg = ();
//!
//!     fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
//!         let start = u64::read(buf)?;
//!         let len = u32::read(buf)?;
//!         let open = bool::read(buf)?;
//!         Ok(Self { start, len, open })
//!     }
//! }
//!
//! let span = Span { start: 7, len: 2, open: true };
//! let encoded = span.encode();
//! assert_eq!(Span::decode(encoded).unwrap(), span);
//! ```

pub mod buffer;
pub mod class;
pub mod codec;
pub mod config;
pub mod error;
pub mod frame;
pub mod types;
pub mod union;
pub mod util;
pub mod varint;
pub mod version;

// Re-export main types and traits
pub use codec::{Decode, DecodeExt, Encode, EncodeSize, FixedSize, Read, ReadExt, Write};
pub use config::RangeCfg;
pub use error::{MarshalError, UnmarshalError};
pub use types::primitives::Fixed;
