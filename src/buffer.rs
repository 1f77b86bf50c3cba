//! Chunked byte sequences with cursors and retroactively-sized
//! encapsulations.
//!
//! A [`ByteSequence`] is an ordered list of contiguous chunks; appends always
//! go to the tail chunk. Chunk boundaries exist so a nested region can be
//! closed by inserting its header *before* the bytes already written, without
//! copying them: [`ByteSequence::begin_encapsulation`] starts a fresh chunk
//! and returns a guard that, on every exit path, inserts the
//! `[encoding version][size]` header chunk in front of the region and starts
//! a new tail.
//!
//! [`Cursor`] addresses a logical position as (chunk, offset) plus the
//! *before-first* and *after-last* sentinels, which keep stepping and
//! arithmetic well-defined on an empty sequence. [`Reader`] spans a cursor
//! range and implements [`Buf`], so decoding never copies chunks to make
//! them contiguous.

use crate::{
    class::ClassState,
    varint,
    version::{Version, ENCODING},
    EncodeSize, FixedSize, Read, ReadExt, UnmarshalError, Write,
};
use bytes::{buf::UninitSlice, Buf, BufMut, Bytes, BytesMut};
use std::{
    fmt,
    ops::{Deref, DerefMut},
};

/// A growable, chunked octet store.
///
/// Sequences are move-only: one is created per outgoing or incoming message
/// and handed across the transport boundary by value.
#[derive(Debug)]
pub struct ByteSequence {
    chunks: Vec<BytesMut>,
    len: usize,
    encaps: Vec<EncapState>,
}

#[derive(Debug)]
struct EncapState {
    start_chunk: usize,
    start_len: usize,
    classes: ClassState,
}

impl ByteSequence {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self {
            chunks: vec![BytesMut::new()],
            len: 0,
            encaps: Vec::new(),
        }
    }

    /// Creates an empty sequence whose tail chunk has `capacity` bytes
    /// reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chunks: vec![BytesMut::with_capacity(capacity)],
            len: 0,
            encaps: Vec::new(),
        }
    }

    /// Total bytes stored across all chunks.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a single byte to the tail chunk.
    pub fn push_back(&mut self, byte: u8) {
        let tail = self.tail();
        tail.put_u8(byte);
        self.len += 1;
    }

    /// Moves every chunk of `other` to the end of this sequence without
    /// copying payload bytes.
    pub fn append(&mut self, other: ByteSequence) {
        assert!(
            other.encaps.is_empty(),
            "appended sequence has an open encapsulation"
        );
        self.len += other.len;
        self.chunks.extend(other.chunks);
    }

    /// Flattens the sequence into a single [`Bytes`] for transport handoff.
    pub fn into_bytes(mut self) -> Bytes {
        assert!(self.encaps.is_empty(), "open encapsulation at handoff");
        if self.chunks.len() == 1 {
            return self.chunks.pop().unwrap().freeze();
        }
        let mut combined = BytesMut::with_capacity(self.len);
        for chunk in &self.chunks {
            combined.extend_from_slice(chunk);
        }
        combined.freeze()
    }

    /// Iterates the non-empty chunks in order, e.g. for vectored writes.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.chunks
            .iter()
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| chunk.as_ref())
    }

    /// Opens a nested region. The returned guard finalizes the region's
    /// header on `end()` or drop, including early-error exits.
    pub fn begin_encapsulation(&mut self) -> Encapsulation<'_> {
        self.start_chunk();
        self.encaps.push(EncapState {
            start_chunk: self.chunks.len() - 1,
            start_len: self.len,
            classes: ClassState::default(),
        });
        let depth = self.encaps.len();
        Encapsulation {
            seq: self,
            depth,
            size: None,
        }
    }

    /// Segment-protocol state of the innermost open encapsulation.
    pub(crate) fn current_classes(&mut self) -> &mut ClassState {
        &mut self
            .encaps
            .last_mut()
            .expect("segment protocol requires an open encapsulation")
            .classes
    }

    pub(crate) fn start_chunk(&mut self) {
        self.chunks.push(BytesMut::new());
    }

    fn tail(&mut self) -> &mut BytesMut {
        self.chunks
            .last_mut()
            .expect("sequence always has a tail chunk")
    }

    // Cursor constructors

    /// Cursor at the first byte, or at *after-last* when empty.
    pub fn start(&self) -> Cursor<'_> {
        Cursor {
            seq: self,
            spot: self.first_spot(),
        }
    }

    /// Cursor at the *after-last* sentinel.
    pub fn end(&self) -> Cursor<'_> {
        Cursor {
            seq: self,
            spot: Spot::AfterLast,
        }
    }

    /// Cursor at logical byte `index` (`index == len()` yields *after-last*).
    pub fn cursor_at(&self, index: usize) -> Cursor<'_> {
        Cursor {
            seq: self,
            spot: self.spot_at(index as isize),
        }
    }

    /// Reader over the whole sequence.
    pub fn reader(&self) -> Reader<'_> {
        let mut reader = Reader {
            seq: self,
            chunk: 0,
            offset: 0,
            remaining: self.len,
        };
        reader.normalize();
        reader
    }

    /// Reader over `[start, end)`.
    ///
    /// Both cursors must belong to this sequence and neither may be
    /// *before-first*; violations are programming errors and assert.
    pub fn reader_between<'a>(&'a self, start: &Cursor<'a>, end: &Cursor<'a>) -> Reader<'a> {
        assert!(
            std::ptr::eq(self, start.seq) && std::ptr::eq(self, end.seq),
            "cursors belong to a different sequence"
        );
        assert!(
            !start.is_before_first() && !end.is_before_first(),
            "reader bounds must address bytes"
        );
        let from = self.spot_index(start.spot);
        let to = self.spot_index(end.spot);
        assert!(from <= to, "reader start is past its end");

        let (chunk, offset) = match start.spot {
            Spot::At { chunk, offset } => (chunk, offset),
            _ => (self.chunks.len(), 0),
        };
        let mut reader = Reader {
            seq: self,
            chunk,
            offset,
            remaining: (to - from) as usize,
        };
        reader.normalize();
        reader
    }

    // Spot arithmetic

    fn first_spot(&self) -> Spot {
        for (index, chunk) in self.chunks.iter().enumerate() {
            if !chunk.is_empty() {
                return Spot::At {
                    chunk: index,
                    offset: 0,
                };
            }
        }
        Spot::AfterLast
    }

    fn last_spot(&self) -> Spot {
        for (index, chunk) in self.chunks.iter().enumerate().rev() {
            if !chunk.is_empty() {
                return Spot::At {
                    chunk: index,
                    offset: chunk.len() - 1,
                };
            }
        }
        Spot::BeforeFirst
    }

    fn next_spot(&self, chunk: usize, offset: usize) -> Spot {
        if offset + 1 < self.chunks[chunk].len() {
            return Spot::At {
                chunk,
                offset: offset + 1,
            };
        }
        for index in chunk + 1..self.chunks.len() {
            if !self.chunks[index].is_empty() {
                return Spot::At {
                    chunk: index,
                    offset: 0,
                };
            }
        }
        Spot::AfterLast
    }

    fn prev_spot(&self, chunk: usize, offset: usize) -> Spot {
        if offset > 0 {
            return Spot::At {
                chunk,
                offset: offset - 1,
            };
        }
        for index in (0..chunk).rev() {
            if !self.chunks[index].is_empty() {
                return Spot::At {
                    chunk: index,
                    offset: self.chunks[index].len() - 1,
                };
            }
        }
        Spot::BeforeFirst
    }

    fn spot_index(&self, spot: Spot) -> isize {
        match spot {
            Spot::BeforeFirst => -1,
            Spot::At { chunk, offset } => {
                let preceding: usize = self.chunks[..chunk].iter().map(BytesMut::len).sum();
                (preceding + offset) as isize
            }
            Spot::AfterLast => self.len as isize,
        }
    }

    fn spot_at(&self, index: isize) -> Spot {
        assert!(
            (-1..=self.len as isize).contains(&index),
            "cursor advanced out of bounds"
        );
        if index < 0 {
            return Spot::BeforeFirst;
        }
        if index == self.len as isize {
            return Spot::AfterLast;
        }
        let mut remaining = index as usize;
        for (chunk_index, chunk) in self.chunks.iter().enumerate() {
            if remaining < chunk.len() {
                return Spot::At {
                    chunk: chunk_index,
                    offset: remaining,
                };
            }
            remaining -= chunk.len();
        }
        unreachable!("index within len but past all chunks");
    }
}

impl Default for ByteSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Bytes> for ByteSequence {
    fn from(bytes: Bytes) -> Self {
        let len = bytes.len();
        Self {
            chunks: vec![BytesMut::from(&bytes[..])],
            len,
            encaps: Vec::new(),
        }
    }
}

// SAFETY: `remaining_mut()` never under-reports, `chunk_mut()` hands out the
// tail chunk's writable region (reserving when full), and `advance_mut()`
// commits exactly `cnt` bytes of it while keeping `len` in sync.
unsafe impl BufMut for ByteSequence {
    #[inline]
    fn remaining_mut(&self) -> usize {
        usize::MAX - self.len
    }

    #[inline]
    unsafe fn advance_mut(&mut self, cnt: usize) {
        let tail = self.tail();
        // SAFETY: forwarded contract; the caller initialized `cnt` bytes of
        // the slice returned by `chunk_mut()`, which came from this tail.
        unsafe { tail.advance_mut(cnt) };
        self.len += cnt;
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut UninitSlice {
        self.tail().chunk_mut()
    }

    #[inline]
    fn put_slice(&mut self, src: &[u8]) {
        self.tail().extend_from_slice(src);
        self.len += src.len();
    }
}

/// Logical position within a [`ByteSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spot {
    BeforeFirst,
    At { chunk: usize, offset: usize },
    AfterLast,
}

/// A position in a [`ByteSequence`], able to step across chunk boundaries.
///
/// The *before-first* and *after-last* sentinels make end-of-sequence and
/// reverse-from-end operations well-defined without a dereferenceable byte.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    seq: &'a ByteSequence,
    spot: Spot,
}

impl Cursor<'_> {
    /// The byte under the cursor, or `None` at a sentinel.
    pub fn get(&self) -> Option<u8> {
        match self.spot {
            Spot::At { chunk, offset } => Some(self.seq.chunks[chunk][offset]),
            _ => None,
        }
    }

    pub fn is_before_first(&self) -> bool {
        self.spot == Spot::BeforeFirst
    }

    pub fn is_after_last(&self) -> bool {
        self.spot == Spot::AfterLast
    }

    /// Steps to the next byte; returns false once at *after-last*.
    pub fn step_forward(&mut self) -> bool {
        self.spot = match self.spot {
            Spot::BeforeFirst => self.seq.first_spot(),
            Spot::At { chunk, offset } => self.seq.next_spot(chunk, offset),
            Spot::AfterLast => Spot::AfterLast,
        };
        !self.is_after_last()
    }

    /// Steps to the previous byte; returns false once at *before-first*.
    pub fn step_back(&mut self) -> bool {
        self.spot = match self.spot {
            Spot::BeforeFirst => Spot::BeforeFirst,
            Spot::At { chunk, offset } => self.seq.prev_spot(chunk, offset),
            Spot::AfterLast => self.seq.last_spot(),
        };
        !self.is_before_first()
    }

    /// Moves by `n` logical positions (negative steps back). Moving past a
    /// sentinel is a programming error and asserts.
    pub fn advance(&mut self, n: isize) {
        let index = self.seq.spot_index(self.spot) + n;
        self.spot = self.seq.spot_at(index);
    }

    /// Signed distance `self - other`.
    ///
    /// Both cursors must belong to the same sequence; comparing cursors of
    /// different sequences is a programming error and asserts.
    pub fn distance(&self, other: &Self) -> isize {
        assert!(
            std::ptr::eq(self.seq, other.seq),
            "cursors belong to different sequences"
        );
        if let (
            Spot::At {
                chunk: self_chunk,
                offset: self_offset,
            },
            Spot::At {
                chunk: other_chunk,
                offset: other_offset,
            },
        ) = (self.spot, other.spot)
        {
            // Same-chunk fast path: plain offset subtraction.
            if self_chunk == other_chunk {
                return self_offset as isize - other_offset as isize;
            }
        }
        self.seq.spot_index(self.spot) - self.seq.spot_index(other.spot)
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.spot).finish()
    }
}

/// A [`Buf`] view over a cursor range of a [`ByteSequence`].
pub struct Reader<'a> {
    seq: &'a ByteSequence,
    chunk: usize,
    offset: usize,
    remaining: usize,
}

impl Reader<'_> {
    fn normalize(&mut self) {
        while self.remaining > 0
            && self.chunk < self.seq.chunks.len()
            && self.offset >= self.seq.chunks[self.chunk].len()
        {
            self.chunk += 1;
            self.offset = 0;
        }
    }
}

impl Buf for Reader<'_> {
    #[inline]
    fn remaining(&self) -> usize {
        self.remaining
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        if self.remaining == 0 {
            return &[];
        }
        let chunk = &self.seq.chunks[self.chunk];
        let available = (chunk.len() - self.offset).min(self.remaining);
        &chunk[self.offset..self.offset + available]
    }

    fn advance(&mut self, cnt: usize) {
        assert!(cnt <= self.remaining, "cannot advance past end of reader");
        self.remaining -= cnt;
        let mut cnt = cnt;
        while cnt > 0 {
            let available = self.seq.chunks[self.chunk].len() - self.offset;
            if cnt < available {
                self.offset += cnt;
                break;
            }
            cnt -= available;
            self.chunk += 1;
            self.offset = 0;
        }
        self.normalize();
    }
}

/// RAII guard for an open encapsulation.
///
/// Dereferences to the underlying [`ByteSequence`], so writes and nested
/// `begin_encapsulation()` calls go through the guard; the borrow checker
/// enforces LIFO closing of nested regions.
pub struct Encapsulation<'a> {
    seq: &'a mut ByteSequence,
    depth: usize,
    size: Option<usize>,
}

impl Encapsulation<'_> {
    /// Closes the region and returns the number of payload bytes it holds
    /// (inner encapsulation headers count as payload; this region's own
    /// header does not).
    pub fn end(mut self) -> usize {
        self.finalize();
        self.size.unwrap()
    }

    fn finalize(&mut self) {
        if self.size.is_some() {
            return;
        }
        assert_eq!(
            self.depth,
            self.seq.encaps.len(),
            "unbalanced encapsulation nesting"
        );

        // Settle the segment-protocol indirection table into the region.
        let classes = std::mem::take(&mut self.seq.encaps.last_mut().unwrap().classes);
        classes.settle(self.seq);

        let state = self.seq.encaps.pop().unwrap();
        let size = self.seq.len - state.start_len;

        // The header chunk lands immediately before the region's first
        // chunk, so no already-written byte moves.
        let size32 = u32::try_from(size).expect("encapsulation exceeds u32");
        let mut header = BytesMut::with_capacity(Version::SIZE + varint::size(size32));
        ENCODING.write(&mut header);
        varint::write(size32, &mut header);
        self.seq.len += header.len();
        self.seq.chunks.insert(state.start_chunk, header);

        // Fresh tail so later writes are not mistaken for part of the
        // closed region.
        self.seq.start_chunk();

        self.size = Some(size);
    }
}

impl Drop for Encapsulation<'_> {
    fn drop(&mut self) {
        self.finalize();
    }
}

impl Deref for Encapsulation<'_> {
    type Target = ByteSequence;

    fn deref(&self) -> &ByteSequence {
        self.seq
    }
}

impl DerefMut for Encapsulation<'_> {
    fn deref_mut(&mut self) -> &mut ByteSequence {
        self.seq
    }
}

/// Parsed form of an encapsulation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncapHeader {
    pub encoding: Version,
    pub size: usize,
}

impl Write for EncapHeader {
    fn write(&self, buf: &mut impl BufMut) {
        self.encoding.write(buf);
        let size = u32::try_from(self.size).expect("encapsulation exceeds u32");
        varint::write(size, buf);
    }
}

impl EncodeSize for EncapHeader {
    fn encode_size(&self) -> usize {
        let size = u32::try_from(self.size).expect("encapsulation exceeds u32");
        Version::SIZE + varint::size(size)
    }
}

impl Read for EncapHeader {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, UnmarshalError> {
        let encoding = Version::read(buf)?;
        if encoding.major != ENCODING.major {
            return Err(UnmarshalError::UnsupportedEncoding(
                encoding.major,
                encoding.minor,
            ));
        }
        let size = varint::read::<u32>(buf)? as usize;
        Ok(Self { encoding, size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeExt;

    fn chunked(parts: &[&[u8]]) -> ByteSequence {
        let mut seq = ByteSequence::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                seq.start_chunk();
            }
            seq.put_slice(part);
        }
        seq
    }

    #[test]
    fn test_push_back_and_reader() {
        let mut seq = ByteSequence::new();
        for byte in [1u8, 2, 3] {
            seq.push_back(byte);
        }
        assert_eq!(seq.len(), 3);

        let mut reader = seq.reader();
        assert_eq!(reader.remaining(), 3);
        assert_eq!(reader.get_u8(), 1);
        assert_eq!(reader.get_u8(), 2);
        assert_eq!(reader.get_u8(), 3);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reader_spans_chunks() {
        let seq = chunked(&[&[1, 2], &[], &[3], &[4, 5, 6]]);
        assert_eq!(seq.len(), 6);

        let mut reader = seq.reader();
        let mut out = [0u8; 6];
        reader.copy_to_slice(&mut out);
        assert_eq!(out, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_reader_between() {
        let seq = chunked(&[&[1, 2], &[3, 4], &[5]]);
        let start = seq.cursor_at(1);
        let end = seq.cursor_at(4);
        let mut reader = seq.reader_between(&start, &end);
        assert_eq!(reader.remaining(), 3);
        let mut out = [0u8; 3];
        reader.copy_to_slice(&mut out);
        assert_eq!(out, [2, 3, 4]);
    }

    #[test]
    fn test_cursor_steps_across_chunks() {
        let seq = chunked(&[&[10], &[], &[20, 30]]);
        let mut cursor = seq.start();
        assert_eq!(cursor.get(), Some(10));
        assert!(cursor.step_forward());
        assert_eq!(cursor.get(), Some(20));
        assert!(cursor.step_forward());
        assert_eq!(cursor.get(), Some(30));
        assert!(!cursor.step_forward());
        assert!(cursor.is_after_last());

        assert!(cursor.step_back());
        assert_eq!(cursor.get(), Some(30));
        assert!(cursor.step_back());
        assert!(cursor.step_back());
        assert_eq!(cursor.get(), Some(10));
        assert!(!cursor.step_back());
        assert!(cursor.is_before_first());
    }

    #[test]
    fn test_cursor_sentinels_on_empty() {
        let seq = ByteSequence::new();
        let mut cursor = seq.start();
        assert!(cursor.is_after_last());
        assert_eq!(cursor.get(), None);
        assert!(!cursor.step_forward());
        assert!(!cursor.step_back());
        assert!(cursor.is_before_first());

        let end = seq.end();
        let mut before = seq.start();
        before.step_back();
        assert_eq!(end.distance(&before), 1);
    }

    #[test]
    fn test_cursor_advance_and_distance() {
        let seq = chunked(&[&[0, 1, 2], &[3, 4], &[5, 6, 7]]);
        let mut cursor = seq.start();
        cursor.advance(5);
        assert_eq!(cursor.get(), Some(5));
        cursor.advance(-4);
        assert_eq!(cursor.get(), Some(1));

        // Same chunk: offset subtraction.
        let mut other = seq.start();
        other.advance(2);
        assert_eq!(other.distance(&cursor), 1);
        assert_eq!(cursor.distance(&other), -1);

        // Across chunks: chunk-length summation.
        let mut far = seq.start();
        far.advance(7);
        assert_eq!(far.distance(&cursor), 6);

        // To and from sentinels.
        assert_eq!(seq.end().distance(&seq.start()), 8);
        cursor.advance(-2);
        assert!(cursor.is_before_first());
        assert_eq!(seq.end().distance(&cursor), 9);
    }

    #[test]
    #[should_panic(expected = "cursors belong to different sequences")]
    fn test_cursor_sequence_identity() {
        let left = chunked(&[&[1, 2]]);
        let right = chunked(&[&[1, 2]]);
        let _ = left.start().distance(&right.start());
    }

    #[test]
    #[should_panic(expected = "cursor advanced out of bounds")]
    fn test_cursor_advance_out_of_bounds() {
        let seq = chunked(&[&[1, 2]]);
        let mut cursor = seq.start();
        cursor.advance(4);
    }

    #[test]
    fn test_encapsulation_bytes() {
        let mut seq = ByteSequence::new();
        {
            let mut encap = seq.begin_encapsulation();
            encap.put_slice(&[0xAA, 0xBB, 0xCC]);
            assert_eq!(encap.end(), 3);
        }
        let bytes = seq.into_bytes();
        // Header (encoding 1.0, size 3) precedes the payload.
        assert_eq!(&bytes[..], &[0x01, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_encapsulation_nested_sizes() {
        let mut seq = ByteSequence::new();
        let mut outer = seq.begin_encapsulation();
        outer.put_slice(&[1, 1, 1]);
        {
            let mut inner = outer.begin_encapsulation();
            inner.put_slice(&[2, 2, 2, 2, 2]);
            assert_eq!(inner.end(), 5);
        }
        outer.put_slice(&[3, 3]);
        // 3 payload + (3 inner header + 5 inner payload) + 2 payload.
        assert_eq!(outer.end(), 13);

        let bytes = seq.into_bytes();
        assert_eq!(
            &bytes[..],
            &[
                0x01, 0x00, 0x0D, // outer header
                1, 1, 1, // outer payload
                0x01, 0x00, 0x05, // inner header
                2, 2, 2, 2, 2, // inner payload
                3, 3, // outer payload after the inner region
            ]
        );
    }

    #[test]
    fn test_encapsulation_finalizes_on_drop() {
        let mut seq = ByteSequence::new();
        {
            let mut encap = seq.begin_encapsulation();
            encap.put_slice(&[9, 9]);
            // Dropped without end(), e.g. on an error path.
        }
        let bytes = seq.into_bytes();
        assert_eq!(&bytes[..], &[0x01, 0x00, 0x02, 9, 9]);
    }

    #[test]
    fn test_encapsulation_header_round_trip() {
        let mut seq = ByteSequence::new();
        {
            let mut encap = seq.begin_encapsulation();
            encap.put_slice(&[7; 200]);
            encap.end();
        }
        let bytes = seq.into_bytes();
        let mut buf = &bytes[..];
        let header = EncapHeader::read(&mut buf).unwrap();
        assert_eq!(header.encoding, ENCODING);
        assert_eq!(header.size, 200);
        assert_eq!(buf.remaining(), 200);
    }

    #[test]
    fn test_encapsulation_unsupported_encoding() {
        let mut raw = Vec::new();
        Version::new(2, 0).write(&mut raw);
        varint::write(0u32, &mut raw);
        assert!(matches!(
            EncapHeader::decode(&raw[..]),
            Err(UnmarshalError::UnsupportedEncoding(2, 0))
        ));
    }

    #[test]
    fn test_write_through_bufmut() {
        let mut seq = ByteSequence::new();
        42u64.write(&mut seq);
        "hello".write(&mut seq);
        let bytes = seq.into_bytes();
        assert_eq!(&bytes[..], &[42, 5, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_append_moves_chunks() {
        let mut body = ByteSequence::new();
        body.put_slice(&[4, 5, 6]);

        let mut seq = ByteSequence::new();
        seq.put_slice(&[1, 2, 3]);
        seq.append(body);
        assert_eq!(seq.len(), 6);
        assert_eq!(&seq.into_bytes()[..], &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_from_bytes_reader() {
        let seq = ByteSequence::from(Bytes::from_static(&[1, 2, 3]));
        assert_eq!(seq.len(), 3);
        let mut reader = seq.reader();
        assert_eq!(reader.get_u8(), 1);
    }

    #[test]
    fn test_chunks_iterator() {
        let seq = chunked(&[&[1], &[], &[2, 3]]);
        let parts: Vec<&[u8]> = seq.chunks().collect();
        assert_eq!(parts, vec![&[1][..], &[2, 3][..]]);
    }
}
