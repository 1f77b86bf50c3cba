#![no_main]

use arbitrary::Arbitrary;
use bytes::{BufMut, Bytes};
use ferrite_codec::{
    buffer::{ByteSequence, EncapHeader},
    frame, Decode, DecodeExt, Encode, EncodeSize, RangeCfg, Read, UnmarshalError,
};
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;

fn roundtrip_no_cfg<T>(value: T)
where
    T: Encode + Decode<Cfg = ()> + PartialEq + std::fmt::Debug,
{
    let encoded = value.encode();
    assert_eq!(encoded.len(), value.encode_size());
    let decoded = T::decode(encoded).expect("failed to decode a successfully encoded value");
    assert_eq!(value, decoded);
}

#[derive(Arbitrary, Debug)]
enum Input {
    Scalars(u16, u32, u64, i16, i32, i64, bool),
    Floats(f32, f64),
    Sequence(Vec<u32>),
    Text(String),
    Raw(Vec<u8>),
    Map(BTreeMap<u16, String>),
    Garbage(Vec<u8>),
}

fuzz_target!(|input: Input| {
    match input {
        Input::Scalars(a, b, c, d, e, f, g) => {
            roundtrip_no_cfg(a);
            roundtrip_no_cfg(b);
            roundtrip_no_cfg(c);
            roundtrip_no_cfg(d);
            roundtrip_no_cfg(e);
            roundtrip_no_cfg(f);
            roundtrip_no_cfg(g);
        }
        Input::Floats(a, b) => {
            if !a.is_nan() {
                roundtrip_no_cfg(a);
            }
            if !b.is_nan() {
                roundtrip_no_cfg(b);
            }
        }
        Input::Sequence(items) => {
            let encoded = items.encode();
            let decoded =
                Vec::<u32>::decode_cfg(encoded, &(RangeCfg::new(..), ())).unwrap();
            assert_eq!(items, decoded);
        }
        Input::Text(text) => {
            let encoded = text.encode();
            let decoded = String::decode_cfg(encoded, &RangeCfg::new(..)).unwrap();
            assert_eq!(text, decoded);
        }
        Input::Raw(raw) => {
            let bytes = Bytes::from(raw);
            let encoded = bytes.encode();
            let decoded = Bytes::decode_cfg(encoded, &RangeCfg::new(..)).unwrap();
            assert_eq!(bytes, decoded);
        }
        Input::Map(map) => {
            let encoded = map.encode();
            let decoded = BTreeMap::<u16, String>::decode_cfg(
                encoded,
                &(RangeCfg::new(..), ((), RangeCfg::new(..))),
            )
            .unwrap();
            assert_eq!(map, decoded);
        }
        Input::Garbage(raw) => {
            // Arbitrary bytes must never panic the decoders, only error.
            let mut buf = &raw[..];
            let _ = frame::read_message(&mut buf);
            let mut buf = &raw[..];
            let _: Result<EncapHeader, UnmarshalError> = EncapHeader::read_cfg(&mut buf, &());
            let mut buf = &raw[..];
            let _ = Vec::<String>::read_cfg(
                &mut buf,
                &(RangeCfg::new(..=1024), RangeCfg::new(..=1024)),
            );

            // And whatever we framed must parse back.
            let mut body = ByteSequence::new();
            {
                let mut encap = body.begin_encapsulation();
                encap.put_slice(&raw);
                encap.end();
            }
            let mut message = ByteSequence::new();
            frame::write_message(&mut message, frame::Kind::Request, body).unwrap();
            let bytes = message.into_bytes();
            let (header, body) = frame::read_message(&mut &bytes[..]).unwrap();
            assert_eq!(header.kind, frame::Kind::Request);
            assert_eq!(header.size, body.len());
        }
    }
});
