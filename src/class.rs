//! Polymorphic instance marshaling.
//!
//! A polymorphic value travels as a chain of *segments*, one per level of its
//! type hierarchy, most-derived first. Each segment is self-describing —
//! `[flags][type id]` then that level's own fields — and the base level
//! carries the *last* flag, so a reader can apply the levels it understands
//! top-down and knows exactly where the chain ends.
//!
//! Concrete types register a zero-argument factory under their string id and
//! 64-bit hash id once at startup ([`register_factory`]); reading looks the
//! first segment's id up in that registry to instantiate the right concrete
//! type before any segment is applied.
//!
//! Shared and cyclic graphs are handled per encapsulation: the first write
//! of an instance (by `Rc` identity) emits the full chain and claims the
//! next slot in the indirection table, every later write emits only the slot
//! index, and the table itself — `(index, type id)` pairs — is appended once
//! when the encapsulation closes. Type ids are deduplicated the same way,
//! so a hundred instances of one type spell its id out once.

use crate::{
    buffer::ByteSequence, util::at_least, varint, MarshalError, RangeCfg, Read, UnmarshalError,
    Write,
};
use bytes::{Buf, BufMut};
use sha2::{Digest, Sha256};
use std::{
    any::Any,
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::Rc,
    sync::{LazyLock, RwLock},
};
use tracing::trace;

// Segment flags byte.
const FLAG_HASH_ID: u8 = 0x01;
const FLAG_INDEX_ID: u8 = 0x02;
const FLAG_LAST: u8 = 0x04;
const FLAG_KNOWN: u8 = FLAG_HASH_ID | FLAG_INDEX_ID | FLAG_LAST;

// Instance reference markers: 0 is null, 1 prefixes an inline segment chain,
// anything above is an indirection-table slot plus two.
const REF_NULL: u64 = 0;
const REF_INLINE: u64 = 1;
const REF_BASE: u64 = 2;

/// Longest accepted type id string.
const MAX_TYPE_ID_LEN: usize = 1024;

/// Deepest accepted chain of nested inline instances; bounds decode
/// recursion on hostile input.
const MAX_INSTANCE_DEPTH: usize = 100;

/// Identity of a polymorphic type on the wire: a string id plus the 64-bit
/// hash derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    pub id: &'static str,
    pub hash: u64,
}

impl TypeInfo {
    /// Builds the info for `id`, deriving its hash id.
    pub fn of(id: &'static str) -> Self {
        Self {
            id,
            hash: type_hash(id),
        }
    }
}

/// 64-bit content hash of a type id: the first eight bytes of its SHA-256
/// digest, little-endian.
pub fn type_hash(id: &str) -> u64 {
    let digest = Sha256::digest(id.as_bytes());
    u64::from_le_bytes(digest[..8].try_into().expect("digest shorter than 8 bytes"))
}

/// A type identifier as found on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireId {
    Name(String),
    Hash(u64),
}

impl WireId {
    fn matches(&self, info: TypeInfo) -> bool {
        match self {
            WireId::Name(name) => name == info.id,
            WireId::Hash(hash) => *hash == info.hash,
        }
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Name(name) => f.write_str(name),
            WireId::Hash(hash) => write!(f, "{hash:#018x}"),
        }
    }
}

/// A polymorphic value marshaled as a chain of per-level segments.
///
/// `marshal` must emit one segment per wire-visible type level, most-derived
/// first, passing `last = true` only on the base level. `unmarshal` mirrors
/// it, claiming each segment with [`SegmentReader::segment`] before reading
/// that level's fields.
pub trait Instance: Any {
    /// Most-derived type identity.
    fn type_info(&self) -> TypeInfo;

    /// Writes every level of this instance as segments.
    fn marshal(&self, writer: &mut SegmentWriter<'_>) -> Result<(), MarshalError>;

    /// Reads every level of this instance from segments.
    fn unmarshal(&mut self, reader: &mut SegmentReader<'_>) -> Result<(), UnmarshalError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shared handle to a polymorphic instance. Identity (the `Rc` pointer) is
/// what the indirection table deduplicates on.
pub type SharedInstance = Rc<RefCell<dyn Instance>>;

/// Produces a default-constructed instance of one concrete type.
pub type Factory = fn() -> SharedInstance;

#[derive(Default)]
struct Registry {
    by_id: HashMap<&'static str, Factory>,
    by_hash: HashMap<u64, Factory>,
}

static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::default()));

/// Registers a factory for a concrete polymorphic type under both its string
/// and hash ids. Call once per type at process startup, before any decoding;
/// the registry is read-only on the decode path.
pub fn register_factory(info: TypeInfo, factory: Factory) {
    let mut registry = REGISTRY.write().expect("type registry poisoned");
    let replaced = registry.by_id.insert(info.id, factory).is_some();
    registry.by_hash.insert(info.hash, factory);
    trace!(id = info.id, hash = info.hash, replaced, "registered factory");
}

fn lookup(id: &WireId) -> Option<Factory> {
    let registry = REGISTRY.read().expect("type registry poisoned");
    match id {
        WireId::Name(name) => registry.by_id.get(name.as_str()).copied(),
        WireId::Hash(hash) => registry.by_hash.get(hash).copied(),
    }
}

/// Per-encapsulation write-side state: type-id and instance dedup tables.
#[derive(Default)]
pub(crate) struct ClassState {
    /// Wire index of each type id already spelled out in this encapsulation.
    type_ids: HashMap<&'static str, u64>,
    /// Instance identity (thin `Rc` pointer) to indirection-table slot.
    instances: HashMap<usize, u64>,
    /// Table entries in slot order; the handle keeps each written-once
    /// instance alive until the encapsulation closes.
    table: Vec<(TypeInfo, SharedInstance)>,
    /// Spell new type ids as 64-bit hashes instead of strings.
    hash_ids: bool,
}

impl ClassState {
    /// Appends the indirection table at the end of the region, if any
    /// instance was written.
    pub(crate) fn settle(self, seq: &mut ByteSequence) {
        if self.table.is_empty() {
            return;
        }
        varint::write(self.table.len() as u64, seq);
        for (index, (info, _instance)) in self.table.iter().enumerate() {
            varint::write(index as u64, seq);
            write_table_id(*info, self.hash_ids, seq);
        }
    }
}

impl fmt::Debug for ClassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassState")
            .field("type_ids", &self.type_ids.len())
            .field("instances", &self.instances.len())
            .field("hash_ids", &self.hash_ids)
            .finish()
    }
}

fn write_table_id(info: TypeInfo, hashed: bool, buf: &mut impl BufMut) {
    if hashed {
        buf.put_u8(FLAG_HASH_ID);
        buf.put_u64_le(info.hash);
    } else {
        buf.put_u8(0);
        info.id.write(buf);
    }
}

fn read_table_id(buf: &mut impl Buf) -> Result<WireId, UnmarshalError> {
    at_least(buf, 1)?;
    let flags = buf.get_u8();
    match flags {
        0 => Ok(WireId::Name(String::read_cfg(
            buf,
            &RangeCfg::new(..=MAX_TYPE_ID_LEN),
        )?)),
        FLAG_HASH_ID => {
            at_least(buf, 8)?;
            Ok(WireId::Hash(buf.get_u64_le()))
        }
        _ => Err(UnmarshalError::InvalidSegmentFlags(flags)),
    }
}

impl ByteSequence {
    /// Spell type ids in the innermost open encapsulation as 64-bit hashes
    /// instead of strings.
    pub fn use_hash_type_ids(&mut self) {
        self.current_classes().hash_ids = true;
    }

    /// Writes an optional instance reference: null, an indirection-table
    /// index for an already-written instance, or the full segment chain.
    ///
    /// Requires an open encapsulation.
    pub fn write_instance(&mut self, instance: Option<&SharedInstance>) -> Result<(), MarshalError> {
        let Some(instance) = instance else {
            varint::write(REF_NULL, self);
            return Ok(());
        };

        let key = Rc::as_ptr(instance) as *const () as usize;
        if let Some(slot) = self.current_classes().instances.get(&key).copied() {
            varint::write(REF_BASE + slot, self);
            return Ok(());
        }

        // Claim a table slot before marshaling any field, so a cyclic
        // back-reference to this instance resolves to the slot instead of
        // recursing forever.
        let value = instance.borrow();
        {
            let state = self.current_classes();
            let slot = state.table.len() as u64;
            state.instances.insert(key, slot);
            state.table.push((value.type_info(), Rc::clone(instance)));
        }

        varint::write(REF_INLINE, self);
        let mut writer = SegmentWriter {
            seq: self,
            closed: false,
        };
        value.marshal(&mut writer)?;
        debug_assert!(writer.closed, "marshal must end with a last segment");
        Ok(())
    }

    /// Like [`ByteSequence::write_instance`] but rejects null.
    pub fn write_required_instance(
        &mut self,
        instance: Option<&SharedInstance>,
    ) -> Result<(), MarshalError> {
        match instance {
            Some(instance) => self.write_instance(Some(instance)),
            None => Err(MarshalError::NullInstance),
        }
    }

    /// Writes an exception as a bare segment chain. Exceptions are never
    /// shared, so no indirection marker precedes the chain.
    pub fn write_exception(&mut self, exception: &dyn Instance) -> Result<(), MarshalError> {
        let mut writer = SegmentWriter {
            seq: self,
            closed: false,
        };
        exception.marshal(&mut writer)?;
        debug_assert!(writer.closed, "marshal must end with a last segment");
        Ok(())
    }
}

/// Writes one instance's segment chain; handed to [`Instance::marshal`].
pub struct SegmentWriter<'a> {
    seq: &'a mut ByteSequence,
    closed: bool,
}

impl SegmentWriter<'_> {
    /// Writes one segment: its header, then whatever `fields` appends.
    /// `last` must be true exactly on the final (base) level.
    pub fn segment(
        &mut self,
        info: TypeInfo,
        last: bool,
        fields: impl FnOnce(&mut ByteSequence) -> Result<(), MarshalError>,
    ) -> Result<(), MarshalError> {
        debug_assert!(!self.closed, "segment after the last segment");
        self.write_header(info, last);
        if last {
            self.closed = true;
        }
        fields(self.seq)
    }

    fn write_header(&mut self, info: TypeInfo, last: bool) {
        let last_flag = if last { FLAG_LAST } else { 0 };
        let (hashed, existing) = {
            let state = self.seq.current_classes();
            let existing = state.type_ids.get(info.id).copied();
            if existing.is_none() {
                let index = state.type_ids.len() as u64;
                state.type_ids.insert(info.id, index);
            }
            (state.hash_ids, existing)
        };
        match existing {
            Some(index) => {
                self.seq.put_u8(last_flag | FLAG_INDEX_ID);
                varint::write(index, self.seq);
            }
            None if hashed => {
                self.seq.put_u8(last_flag | FLAG_HASH_ID);
                self.seq.put_u64_le(info.hash);
            }
            None => {
                self.seq.put_u8(last_flag);
                info.id.write(self.seq);
            }
        }
    }
}

/// Read-side state for one encapsulation: the type ids and instances
/// materialized so far, in wire order.
#[derive(Default)]
pub struct Decoder {
    types: Vec<WireId>,
    instances: Vec<SharedInstance>,
    depth: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads an optional instance reference.
    pub fn read_instance(
        &mut self,
        buf: &mut impl Buf,
    ) -> Result<Option<SharedInstance>, UnmarshalError> {
        read_instance_inner(buf, self)
    }

    /// Like [`Decoder::read_instance`] but rejects null.
    pub fn read_required_instance(
        &mut self,
        buf: &mut impl Buf,
    ) -> Result<SharedInstance, UnmarshalError> {
        self.read_instance(buf)?
            .ok_or(UnmarshalError::UnexpectedNullInstance)
    }

    /// Reads an exception's bare segment chain.
    pub fn read_exception(
        &mut self,
        buf: &mut impl Buf,
    ) -> Result<SharedInstance, UnmarshalError> {
        let buf: &mut dyn Buf = buf;
        read_chain(buf, self, false)
    }

    /// Consumes the trailing indirection table and verifies it against the
    /// instances materialized from the segment data.
    ///
    /// Call after all segment data of the encapsulation has been read; the
    /// returned handles are the deduplicated instances in slot order.
    pub fn finish(self, buf: &mut impl Buf) -> Result<Vec<SharedInstance>, UnmarshalError> {
        if self.instances.is_empty() {
            return Ok(self.instances);
        }
        let count = varint::read::<u64>(buf)? as usize;
        if count != self.instances.len() {
            return Err(UnmarshalError::BadIndirectionTable);
        }
        for expected in 0..count {
            let slot = varint::read::<u64>(buf)? as usize;
            if slot != expected {
                return Err(UnmarshalError::BadIndirectionTable);
            }
            let id = read_table_id(buf)?;
            let info = self.instances[slot].borrow().type_info();
            if !id.matches(info) {
                return Err(UnmarshalError::BadIndirectionTable);
            }
        }
        Ok(self.instances)
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("types", &self.types)
            .field("instances", &self.instances.len())
            .finish()
    }
}

fn read_instance_inner(
    mut buf: &mut dyn Buf,
    decoder: &mut Decoder,
) -> Result<Option<SharedInstance>, UnmarshalError> {
    let marker = varint::read::<u64>(&mut buf)?;
    match marker {
        REF_NULL => Ok(None),
        REF_INLINE => Ok(Some(read_chain(buf, decoder, true)?)),
        reference => {
            let slot = (reference - REF_BASE) as usize;
            decoder
                .instances
                .get(slot)
                .cloned()
                .map(Some)
                .ok_or(UnmarshalError::BadInstanceReference(reference))
        }
    }
}

fn read_chain(
    buf: &mut dyn Buf,
    decoder: &mut Decoder,
    shared: bool,
) -> Result<SharedInstance, UnmarshalError> {
    if decoder.depth >= MAX_INSTANCE_DEPTH {
        return Err(UnmarshalError::NestingTooDeep);
    }
    decoder.depth += 1;

    let header = read_segment_header(buf, decoder)?;
    let factory =
        lookup(&header.0).ok_or_else(|| UnmarshalError::UnknownTypeId(header.0.to_string()))?;
    let instance = factory();

    // Shared instances claim their slot before any field is read, mirroring
    // the writer, so cyclic back-references resolve mid-chain.
    if shared {
        decoder.instances.push(Rc::clone(&instance));
    }

    let mut reader = SegmentReader {
        buf,
        decoder,
        pending: Some(header),
        finished: false,
    };
    instance.borrow_mut().unmarshal(&mut reader)?;
    if !reader.finished {
        return Err(UnmarshalError::SegmentChainMismatch);
    }
    reader.decoder.depth -= 1;
    Ok(instance)
}

fn read_segment_header(
    mut buf: &mut dyn Buf,
    decoder: &mut Decoder,
) -> Result<(WireId, bool), UnmarshalError> {
    at_least(buf, 1)?;
    let flags = buf.get_u8();
    let id_flags = flags & (FLAG_HASH_ID | FLAG_INDEX_ID);
    if flags & !FLAG_KNOWN != 0 || id_flags == FLAG_HASH_ID | FLAG_INDEX_ID {
        return Err(UnmarshalError::InvalidSegmentFlags(flags));
    }
    let last = flags & FLAG_LAST != 0;

    let id = if id_flags == FLAG_INDEX_ID {
        let index = varint::read::<u64>(&mut buf)?;
        decoder
            .types
            .get(index as usize)
            .cloned()
            .ok_or(UnmarshalError::TypeIdIndexOutOfRange(index))?
    } else if id_flags == FLAG_HASH_ID {
        at_least(buf, 8)?;
        let id = WireId::Hash(buf.get_u64_le());
        decoder.types.push(id.clone());
        id
    } else {
        let name = String::read_cfg(&mut buf, &RangeCfg::new(..=MAX_TYPE_ID_LEN))?;
        let id = WireId::Name(name);
        decoder.types.push(id.clone());
        id
    };
    Ok((id, last))
}

/// Reads one instance's segment chain; handed to [`Instance::unmarshal`].
///
/// Implements [`Buf`], so field codecs read from it directly.
pub struct SegmentReader<'a> {
    buf: &'a mut dyn Buf,
    decoder: &'a mut Decoder,
    pending: Option<(WireId, bool)>,
    finished: bool,
}

impl SegmentReader<'_> {
    /// Claims the next segment header, returning its type id and whether it
    /// is the last of the chain.
    pub fn segment(&mut self) -> Result<(WireId, bool), UnmarshalError> {
        if let Some(header) = self.pending.take() {
            self.finished = header.1;
            return Ok(header);
        }
        if self.finished {
            return Err(UnmarshalError::SegmentChainMismatch);
        }
        let header = read_segment_header(self.buf, self.decoder)?;
        self.finished = header.1;
        Ok(header)
    }

    /// Reads a nested optional instance reference from the current segment's
    /// fields.
    pub fn read_instance(&mut self) -> Result<Option<SharedInstance>, UnmarshalError> {
        read_instance_inner(&mut *self.buf, &mut *self.decoder)
    }

    /// Like [`SegmentReader::read_instance`] but rejects null.
    pub fn read_required_instance(&mut self) -> Result<SharedInstance, UnmarshalError> {
        self.read_instance()?
            .ok_or(UnmarshalError::UnexpectedNullInstance)
    }
}

impl Buf for SegmentReader<'_> {
    #[inline]
    fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        self.buf.chunk()
    }

    #[inline]
    fn advance(&mut self, cnt: usize) {
        self.buf.advance(cnt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::EncapHeader, ReadExt};
    use bytes::Bytes;
    use std::sync::LazyLock;

    const POINT_ID: &str = "::test::Point";
    static POINT_INFO: LazyLock<TypeInfo> = LazyLock::new(|| TypeInfo::of(POINT_ID));

    #[derive(Default)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Instance for Point {
        fn type_info(&self) -> TypeInfo {
            *POINT_INFO
        }

        fn marshal(&self, writer: &mut SegmentWriter<'_>) -> Result<(), MarshalError> {
            writer.segment(*POINT_INFO, true, |buf| {
                self.x.write(buf);
                self.y.write(buf);
                Ok(())
            })
        }

        fn unmarshal(&mut self, reader: &mut SegmentReader<'_>) -> Result<(), UnmarshalError> {
            reader.segment()?;
            self.x = i32::read(reader)?;
            self.y = i32::read(reader)?;
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn register_point() {
        register_factory(*POINT_INFO, || Rc::new(RefCell::new(Point::default())));
    }

    fn point(x: i32, y: i32) -> SharedInstance {
        Rc::new(RefCell::new(Point { x, y }))
    }

    fn encode_with(f: impl FnOnce(&mut ByteSequence)) -> Bytes {
        let mut seq = ByteSequence::new();
        {
            let mut encap = seq.begin_encapsulation();
            f(&mut encap);
            encap.end();
        }
        seq.into_bytes()
    }

    fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle)
            .count()
    }

    #[test]
    fn test_type_hash_stable() {
        assert_eq!(type_hash(POINT_ID), type_hash(POINT_ID));
        assert_ne!(type_hash(POINT_ID), type_hash("::test::Other"));
        assert_eq!(POINT_INFO.hash, type_hash(POINT_ID));
    }

    #[test]
    fn test_round_trip() {
        register_point();
        let bytes = encode_with(|seq| {
            seq.write_instance(Some(&point(3, -4))).unwrap();
        });

        let mut buf = &bytes[..];
        EncapHeader::read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        let decoded = decoder.read_instance(&mut buf).unwrap().unwrap();
        decoder.finish(&mut buf).unwrap();
        assert_eq!(buf.remaining(), 0);

        let decoded = decoded.borrow();
        let decoded = decoded.as_any().downcast_ref::<Point>().unwrap();
        assert_eq!((decoded.x, decoded.y), (3, -4));
    }

    #[test]
    fn test_null_and_required() {
        register_point();
        let bytes = encode_with(|seq| {
            seq.write_instance(None).unwrap();
        });
        let mut buf = &bytes[..];
        EncapHeader::read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        assert!(decoder.read_instance(&mut buf).unwrap().is_none());

        let mut buf = &bytes[..];
        EncapHeader::read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        assert!(matches!(
            decoder.read_required_instance(&mut buf),
            Err(UnmarshalError::UnexpectedNullInstance)
        ));

        let mut seq = ByteSequence::new();
        let mut encap = seq.begin_encapsulation();
        assert!(matches!(
            encap.write_required_instance(None),
            Err(MarshalError::NullInstance)
        ));
    }

    #[test]
    fn test_type_id_written_once() {
        register_point();
        let bytes = encode_with(|seq| {
            seq.write_instance(Some(&point(1, 1))).unwrap();
            seq.write_instance(Some(&point(2, 2))).unwrap();
        });

        // Two distinct instances of one type: the id is spelled out in the
        // first segment header, indexed in the second, and spelled again
        // only by the trailing indirection table.
        assert_eq!(count_occurrences(&bytes, POINT_ID.as_bytes()), 3);

        let mut buf = &bytes[..];
        EncapHeader::read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        let first = decoder.read_instance(&mut buf).unwrap().unwrap();
        let second = decoder.read_instance(&mut buf).unwrap().unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        let instances = decoder.finish(&mut buf).unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_instance_dedup() {
        register_point();
        let shared = point(7, 8);
        let bytes = encode_with(|seq| {
            seq.write_instance(Some(&shared)).unwrap();
            seq.write_instance(Some(&shared)).unwrap();
        });

        // One full chain; the second reference is only a slot index.
        assert_eq!(count_occurrences(&bytes, POINT_ID.as_bytes()), 2);

        let mut buf = &bytes[..];
        EncapHeader::read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        let first = decoder.read_instance(&mut buf).unwrap().unwrap();
        let second = decoder.read_instance(&mut buf).unwrap().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(decoder.finish(&mut buf).unwrap().len(), 1);
    }

    #[test]
    fn test_hash_type_ids() {
        register_point();
        let bytes = encode_with(|seq| {
            seq.use_hash_type_ids();
            seq.write_instance(Some(&point(5, 6))).unwrap();
        });
        assert_eq!(count_occurrences(&bytes, POINT_ID.as_bytes()), 0);

        let mut buf = &bytes[..];
        EncapHeader::read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        let decoded = decoder.read_instance(&mut buf).unwrap().unwrap();
        decoder.finish(&mut buf).unwrap();
        assert_eq!(buf.remaining(), 0);

        let decoded = decoded.borrow();
        let decoded = decoded.as_any().downcast_ref::<Point>().unwrap();
        assert_eq!((decoded.x, decoded.y), (5, 6));
    }

    #[test]
    fn test_unknown_type_id() {
        struct Ghost;
        impl Instance for Ghost {
            fn type_info(&self) -> TypeInfo {
                TypeInfo::of("::test::Ghost")
            }
            fn marshal(&self, writer: &mut SegmentWriter<'_>) -> Result<(), MarshalError> {
                writer.segment(self.type_info(), true, |_| Ok(()))
            }
            fn unmarshal(&mut self, _: &mut SegmentReader<'_>) -> Result<(), UnmarshalError> {
                unreachable!("never registered")
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let ghost: SharedInstance = Rc::new(RefCell::new(Ghost));
        let bytes = encode_with(|seq| {
            seq.write_instance(Some(&ghost)).unwrap();
        });

        let mut buf = &bytes[..];
        EncapHeader::read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        match decoder.read_instance(&mut buf) {
            Err(UnmarshalError::UnknownTypeId(id)) => assert_eq!(id, "::test::Ghost"),
            other => panic!("expected UnknownTypeId, got {other:?}"),
        }
    }

    #[test]
    fn test_exception_round_trip() {
        register_point();
        let bytes = encode_with(|seq| {
            seq.write_exception(&Point { x: 1, y: 2 }).unwrap();
        });

        let mut buf = &bytes[..];
        EncapHeader::read(&mut buf).unwrap();
        let mut decoder = Decoder::new();
        let decoded = decoder.read_exception(&mut buf).unwrap();
        // Exceptions do not join the indirection table.
        assert_eq!(decoder.finish(&mut buf).unwrap().len(), 0);
        assert_eq!(buf.remaining(), 0);

        let decoded = decoded.borrow();
        let decoded = decoded.as_any().downcast_ref::<Point>().unwrap();
        assert_eq!((decoded.x, decoded.y), (1, 2));
    }

    #[test]
    fn test_bad_instance_reference() {
        let mut raw = Vec::new();
        varint::write(REF_BASE + 5, &mut raw);
        let mut decoder = Decoder::new();
        assert!(matches!(
            decoder.read_instance(&mut &raw[..]),
            Err(UnmarshalError::BadInstanceReference(7))
        ));
    }

    #[test]
    fn test_invalid_segment_flags() {
        let mut raw = Vec::new();
        varint::write(REF_INLINE, &mut raw);
        raw.push(0x40);
        let mut decoder = Decoder::new();
        assert!(matches!(
            decoder.read_instance(&mut &raw[..]),
            Err(UnmarshalError::InvalidSegmentFlags(0x40))
        ));
    }
}
