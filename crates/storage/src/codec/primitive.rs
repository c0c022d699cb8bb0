//! The module contains the implementation of the `Primitive` codec.
//! The codec is used for integers that form keys or counters, encoded as
//! fixed-size big-endian arrays so the keys keep their numeric order.

use crate::codec::{
    Decode,
    Encode,
};

/// The codec is used for types that can be represented by an array.
/// The `SIZE` const specifies the size of the array used to represent the type.
pub struct Primitive<const SIZE: usize>;

macro_rules! impl_codec {
    ($($ty:ty, $size:expr),*) => {
        $(
            impl Encode<$ty> for Primitive<{ $size }> {
                type Encoder<'a> = [u8; { $size }];

                fn encode(t: &$ty) -> anyhow::Result<Self::Encoder<'_>> {
                    Ok(t.to_be_bytes())
                }
            }

            impl Decode<$ty> for Primitive<{ $size }> {
                fn decode(bytes: &[u8]) -> anyhow::Result<$ty> {
                    Ok(<$ty>::from_be_bytes(<[u8; { $size }]>::try_from(bytes)?))
                }
            }
        )*
    };
}

impl_codec! {
    u32, 4,
    u64, 8
}
