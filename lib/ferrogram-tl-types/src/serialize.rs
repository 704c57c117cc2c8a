// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// The identifier of the boxed `Vector` type.
pub(crate) const VECTOR_ID: u32 = 0x1cb5c415;
pub(crate) const BOOL_TRUE_ID: u32 = 0x997275b5;
pub(crate) const BOOL_FALSE_ID: u32 = 0xbc799737;

/// This trait allows for concrete instances to be serialized into
/// binary data as specified by the [Binary Data Serialization].
///
/// [Binary Data Serialization]: https://core.telegram.org/mtproto/serialize
pub trait Serializable {
    /// Serializes the instance into the given buffer.
    fn serialize(&self, buf: &mut impl Extend<u8>);

    /// Convenience function to serialize the object into a new buffer.
    ///
    /// Reusing an existing buffer with [`Serializable::serialize`] avoids
    /// the allocation.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.serialize(&mut buffer);
        buffer
    }
}

/// Numbers are written in little-endian order with no framing.
macro_rules! impl_little_endian {
    ($($ty:ty),*) => {
        $(
            impl Serializable for $ty {
                fn serialize(&self, buf: &mut impl Extend<u8>) {
                    buf.extend(self.to_le_bytes());
                }
            }
        )*
    };
}

impl_little_endian!(i32, u32, i64, f64);

impl Serializable for bool {
    /// Booleans are boxed, written as either `boolTrue` or `boolFalse`.
    ///
    /// ```
    /// use ferrogram_tl_types::Serializable;
    ///
    /// assert_eq!(true.to_bytes(), [0xb5, 0x75, 0x72, 0x99]);
    /// assert_eq!(false.to_bytes(), [0x37, 0x97, 0x79, 0xbc]);
    /// ```
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        if *self { BOOL_TRUE_ID } else { BOOL_FALSE_ID }.serialize(buf)
    }
}

impl<const N: usize> Serializable for [u8; N] {
    /// `int128` and `int256` are written as-is.
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.iter().copied())
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    /// ```
    /// use ferrogram_tl_types::Serializable;
    ///
    /// assert_eq!(vec![0x7f_i32].to_bytes(),
    ///            [0x15, 0xc4, 0xb5, 0x1c, 0x1, 0x0, 0x0, 0x0, 0x7f, 0x0, 0x0, 0x0]);
    /// ```
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        VECTOR_ID.serialize(buf);
        crate::RawVec::<T>::serialize_items(self, buf);
    }
}

impl<T: Serializable> crate::RawVec<T> {
    fn serialize_items(items: &[T], buf: &mut impl Extend<u8>) {
        (items.len() as i32).serialize(buf);
        items.iter().for_each(|item| item.serialize(buf));
    }
}

impl<T: Serializable> Serializable for crate::RawVec<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::serialize_items(&self.0, buf);
    }
}

impl Serializable for crate::Blob {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.0.iter().copied())
    }
}

impl Serializable for String {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_bytes().serialize(buf)
    }
}

impl Serializable for Vec<u8> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_slice().serialize(buf)
    }
}

impl Serializable for &[u8] {
    /// Byte strings up to 253 bytes long use a single length byte.
    /// Longer ones use the marker 254 followed by a 24-bit length.
    /// Either way the total is padded with zeros to a multiple of four.
    ///
    /// ```
    /// use ferrogram_tl_types::Serializable;
    ///
    /// assert_eq!((&b"Hi"[..]).to_bytes(), [0x02, b'H', b'i', 0x00]);
    /// assert_eq!((&[0u8; 300][..]).to_bytes()[..4], [0xfe, 0x2c, 0x01, 0x00]);
    /// ```
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let header_len = if self.len() <= 253 {
            buf.extend([self.len() as u8]);
            1
        } else {
            let len = (self.len() as u32).to_le_bytes();
            buf.extend([254, len[0], len[1], len[2]]);
            4
        };

        buf.extend(self.iter().copied());
        let padding = (4 - (header_len + self.len()) % 4) % 4;
        buf.extend(std::iter::repeat_n(0, padding));
    }
}
