//! The module contains the implementation of the `Postcard` codec.
//! Any type that implements `serde::Serialize` and `serde::Deserialize`
//! can use the `Postcard` codec to be encoded/decoded into/from bytes.

use crate::codec::{
    Decode,
    Encode,
};
use std::borrow::Cow;

/// The codec is used to serialized/deserialized types that supports `serde::Serialize` and `serde::Deserialize`.
pub struct Postcard;

impl<T> Encode<T> for Postcard
where
    T: ?Sized + serde::Serialize,
{
    type Encoder<'a> = Cow<'a, [u8]> where T: 'a;

    fn encode(value: &T) -> anyhow::Result<Self::Encoder<'_>> {
        Ok(Cow::Owned(postcard::to_allocvec(value)?))
    }
}

impl<T> Decode<T> for Postcard
where
    T: serde::de::DeserializeOwned,
{
    fn decode(bytes: &[u8]) -> anyhow::Result<T> {
        Ok(postcard::from_bytes(bytes)?)
    }
}
