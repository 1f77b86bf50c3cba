//! Codec implementations for tuples.
//!
//! Elements are written in order with no count prefix; each element carries
//! its own decode configuration.

use crate::{EncodeSize, Read, UnmarshalError, Write};
use bytes::{Buf, BufMut};
use paste::paste;

macro_rules! impl_tuple_codec {
    ($($index:literal),*) => {
        paste! {
            impl<$( [<T $index>]: Write ),*> Write for ( $( [<T $index>], )* ) {
                #[inline]
                fn write(&self, buf: &mut impl BufMut) {
                    $( self.$index.write(buf); )*
                }
            }

            impl<$( [<T $index>]: EncodeSize ),*> EncodeSize for ( $( [<T $index>], )* ) {
                #[inline]
                fn encode_size(&self) -> usize {
                    0 $( + self.$index.encode_size() )*
                }
            }

            impl<$( [<T $index>]: Read ),*> Read for ( $( [<T $index>], )* ) {
                type Cfg = ( $( [<T $index>]::Cfg, )* );

                #[inline]
                fn read_cfg(buf: &mut impl Buf, cfg: &Self::Cfg) -> Result<Self, UnmarshalError> {
                    Ok(( $( [<T $index>]::read_cfg(buf, &cfg.$index)?, )* ))
                }
            }
        }
    };
}

impl_tuple_codec!(0);
impl_tuple_codec!(0, 1);
impl_tuple_codec!(0, 1, 2);
impl_tuple_codec!(0, 1, 2, 3);
impl_tuple_codec!(0, 1, 2, 3, 4);
impl_tuple_codec!(0, 1, 2, 3, 4, 5);
