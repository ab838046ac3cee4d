//! The [`Element`] trait: what a type needs to live in a column.

use std::fmt::Debug;
use std::io::{self, Read, Write};

use crate::codec;

/// A value type storable in a chunked column.
///
/// The type tag is persisted alongside every column and is the key used to
/// rebuild the column on load, so it must be unique across all element
/// types registered with one registry and must never change once data has
/// been written with it.
pub trait Element: Clone + Default + Debug + 'static {
    /// Serializable type name, e.g. `"f32"` or `"[f64; 3]"`.
    const TYPE_TAG: &'static str;

    /// Append the little-endian encoding of `self` to `w`.
    fn encode(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Decode one value previously written by [`Element::encode`].
    fn decode(r: &mut dyn Read) -> io::Result<Self>;
}

macro_rules! impl_numeric_element {
    ($($ty:ty => $tag:literal),* $(,)?) => {
        $(
            impl Element for $ty {
                const TYPE_TAG: &'static str = $tag;

                #[inline]
                fn encode(&self, w: &mut dyn Write) -> io::Result<()> {
                    w.write_all(&self.to_le_bytes())
                }

                #[inline]
                fn decode(r: &mut dyn Read) -> io::Result<Self> {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    r.read_exact(&mut buf)?;
                    Ok(<$ty>::from_le_bytes(buf))
                }
            }
        )*
    };
}

impl_numeric_element! {
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    f32 => "f32",
    f64 => "f64",
}

macro_rules! impl_array_element {
    ($($ty:ty => $tag:literal),* $(,)?) => {
        $(
            impl Element for $ty {
                const TYPE_TAG: &'static str = $tag;

                fn encode(&self, w: &mut dyn Write) -> io::Result<()> {
                    for v in self {
                        v.encode(w)?;
                    }
                    Ok(())
                }

                fn decode(r: &mut dyn Read) -> io::Result<Self> {
                    let mut out = <$ty>::default();
                    for v in out.iter_mut() {
                        *v = Element::decode(r)?;
                    }
                    Ok(out)
                }
            }
        )*
    };
}

impl_array_element! {
    [f32; 2] => "[f32; 2]",
    [f32; 3] => "[f32; 3]",
    [f64; 2] => "[f64; 2]",
    [f64; 3] => "[f64; 3]",
    [u32; 2] => "[u32; 2]",
    [u32; 3] => "[u32; 3]",
}

impl Element for bool {
    const TYPE_TAG: &'static str = "bool";

    fn encode(&self, w: &mut dyn Write) -> io::Result<()> {
        codec::write_u8(w, u8::from(*self))
    }

    fn decode(r: &mut dyn Read) -> io::Result<Self> {
        match codec::read_u8(r)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid bool byte {other}"),
            )),
        }
    }
}

impl Element for String {
    const TYPE_TAG: &'static str = "String";

    fn encode(&self, w: &mut dyn Write) -> io::Result<()> {
        codec::write_length_prefixed_str(w, self)
    }

    fn decode(r: &mut dyn Read) -> io::Result<Self> {
        codec::read_length_prefixed_str(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Element + PartialEq>(v: T) {
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        let back = T::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(back, v, "tag {}", T::TYPE_TAG);
    }

    #[test]
    fn builtin_values_survive_encoding() {
        roundtrip(true);
        roundtrip(0xABu8);
        roundtrip(-7i32);
        roundtrip(u64::MAX);
        roundtrip(1.5f32);
        roundtrip(-0.25f64);
        roundtrip([1.0f32, 2.0, 3.0]);
        roundtrip([1.0f64, -2.0, 3.5]);
        roundtrip(String::from("vertex"));
    }

    #[test]
    fn array_encoding_is_component_major() {
        let mut buf = Vec::new();
        [1u32, 2, 3].encode(&mut buf).unwrap();
        assert_eq!(buf, [1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
    }

    #[test]
    fn bool_rejects_non_binary_byte() {
        let err = bool::decode(&mut &[2u8][..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn tags_are_distinct() {
        let tags = [
            bool::TYPE_TAG,
            u8::TYPE_TAG,
            u16::TYPE_TAG,
            u32::TYPE_TAG,
            u64::TYPE_TAG,
            i8::TYPE_TAG,
            i16::TYPE_TAG,
            i32::TYPE_TAG,
            i64::TYPE_TAG,
            f32::TYPE_TAG,
            f64::TYPE_TAG,
            <[f32; 2]>::TYPE_TAG,
            <[f32; 3]>::TYPE_TAG,
            <[f64; 2]>::TYPE_TAG,
            <[f64; 3]>::TYPE_TAG,
            <[u32; 2]>::TYPE_TAG,
            <[u32; 3]>::TYPE_TAG,
            String::TYPE_TAG,
        ];
        let distinct: std::collections::HashSet<_> = tags.iter().collect();
        assert_eq!(distinct.len(), tags.len());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn f64_bits_preserved(bits in any::<u64>()) {
                let v = f64::from_bits(bits);
                let mut buf = Vec::new();
                v.encode(&mut buf).unwrap();
                let back = f64::decode(&mut buf.as_slice()).unwrap();
                prop_assert_eq!(back.to_bits(), bits);
            }

            #[test]
            fn strings_preserved(s in ".{0,40}") {
                let mut buf = Vec::new();
                s.encode(&mut buf).unwrap();
                let back = String::decode(&mut buf.as_slice()).unwrap();
                prop_assert_eq!(back, s);
            }
        }
    }
}
