// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading of data following the [Binary Data Serialization].
//!
//! [Binary Data Serialization]: https://core.telegram.org/mtproto/serialize
use crate::serialize::{BOOL_FALSE_ID, BOOL_TRUE_ID, VECTOR_ID};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The end of the buffer was reached earlier than anticipated, which
    /// implies there is not enough data to complete the deserialization.
    UnexpectedEof,

    /// A boxed value had a constructor other than the ones its type allows.
    ///
    /// Bare types lack the constructor information, so they are never
    /// validated this way.
    UnexpectedConstructor {
        /// The unexpected constructor identifier.
        id: u32,
    },

    /// [`crate::Object::read`] found a constructor which is not part of the
    /// known schema at all.
    SchemaMismatch {
        /// The unknown constructor identifier.
        id: u32,
        /// Hexadecimal dump of the data starting at the constructor.
        dump: String,
    },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected eof"),
            Self::UnexpectedConstructor { id } => write!(f, "unexpected constructor: {id:08x}"),
            Self::SchemaMismatch { id, dump } => {
                write!(f, "constructor {id:08x} is not in the schema: {dump}")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A read-only cursor over an in-memory buffer.
///
/// Data is always deserialized from memory, so the only failure mode of
/// reading is running out of bytes.
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// How many bytes have been consumed so far.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = *self.buf.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.pos + buf.len();
        let src = self.buf.get(self.pos..end).ok_or(Error::UnexpectedEof)?;
        buf.copy_from_slice(src);
        self.pos = end;
        Ok(())
    }

    pub fn read_to_end(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let rest = self.remaining();
        buf.extend_from_slice(rest);
        self.pos = self.buf.len();
        Ok(rest.len())
    }

    /// Reads the next constructor identifier without consuming it.
    pub fn peek_u32(&self) -> Result<u32> {
        let bytes = self.buf.get(self.pos..self.pos + 4).ok_or(Error::UnexpectedEof)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if self.pos + n > self.buf.len() {
            return Err(Error::UnexpectedEof);
        }
        self.pos += n;
        Ok(())
    }
}

pub type Buffer<'a, 'b> = &'a mut Cursor<'b>;

/// This trait allows for data serialized according to the
/// [Binary Data Serialization] to be deserialized into concrete instances.
///
/// [Binary Data Serialization]: https://core.telegram.org/mtproto/serialize
pub trait Deserializable {
    /// Deserializes an instance of the type from a given buffer.
    fn deserialize(buf: Buffer) -> Result<Self>
    where
        Self: Sized;

    /// Convenience function to deserialize an instance from a given buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrogram_tl_types::Deserializable;
    ///
    /// assert_eq!(bool::from_bytes(&[0x37, 0x97, 0x79, 0xbc]).unwrap(), false);
    /// ```
    fn from_bytes(buf: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        Self::deserialize(&mut Cursor::from_slice(buf))
    }
}

macro_rules! impl_little_endian {
    ($($ty:ty),*) => {
        $(
            impl Deserializable for $ty {
                fn deserialize(buf: Buffer) -> Result<Self> {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    buf.read_exact(&mut bytes)?;
                    Ok(Self::from_le_bytes(bytes))
                }
            }
        )*
    };
}

impl_little_endian!(i32, u32, i64, f64);

impl Deserializable for bool {
    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            BOOL_TRUE_ID => Ok(true),
            BOOL_FALSE_ID => Ok(false),
            id => Err(Error::UnexpectedConstructor { id }),
        }
    }
}

impl<const N: usize> Deserializable for [u8; N] {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let mut bytes = [0u8; N];
        buf.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

impl<T: Deserializable> Deserializable for Vec<T> {
    /// ```
    /// use ferrogram_tl_types::Deserializable;
    ///
    /// assert_eq!(
    ///     Vec::<i32>::from_bytes(&[0x15, 0xc4, 0xb5, 0x1c, 0x1, 0x0, 0x0, 0x0, 0x7f, 0x0, 0x0, 0x0]).unwrap(),
    ///     vec![0x7f_i32],
    /// );
    /// ```
    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            VECTOR_ID => Ok(crate::RawVec::<T>::deserialize(buf)?.0),
            id => Err(Error::UnexpectedConstructor { id }),
        }
    }
}

impl<T: Deserializable> Deserializable for crate::RawVec<T> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let len = u32::deserialize(buf)?;
        (0..len)
            .map(|_| T::deserialize(buf))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl Deserializable for crate::Blob {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let mut data = Vec::new();
        buf.read_to_end(&mut data)?;
        Ok(Self(data))
    }
}

impl Deserializable for String {
    /// Invalid UTF-8 is replaced rather than rejected.
    fn deserialize(buf: Buffer) -> Result<Self> {
        Ok(String::from_utf8_lossy(&Vec::<u8>::deserialize(buf)?).into())
    }
}

impl Deserializable for Vec<u8> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let (header_len, len) = match buf.read_byte()? {
            254 => {
                let mut len = [0u8; 4];
                buf.read_exact(&mut len[..3])?;
                (4, u32::from_le_bytes(len) as usize)
            }
            len => (1, len as usize),
        };

        let mut data = vec![0u8; len];
        buf.read_exact(&mut data)?;
        buf.skip((4 - (header_len + len) % 4) % 4)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Serializable;

    #[test]
    fn check_byte_strings() {
        for len in [0, 1, 3, 4, 253, 254, 255, 1000] {
            let data = vec![0xab; len];
            let bytes = data.to_bytes();
            let mut cursor = Cursor::from_slice(&bytes);
            assert_eq!(Vec::<u8>::deserialize(&mut cursor), Ok(data));
            assert_eq!(cursor.pos(), bytes.len(), "padding not consumed for {len}");
        }
    }

    #[test]
    fn check_truncated_input() {
        assert_eq!(i64::from_bytes(&[1, 2, 3]), Err(Error::UnexpectedEof));
        assert_eq!(Vec::<u8>::from_bytes(&[5, 1, 2]), Err(Error::UnexpectedEof));
        assert_eq!(
            Vec::<i32>::from_bytes(&[0x15, 0xc4, 0xb5, 0x1c, 2, 0, 0, 0, 1, 0, 0, 0]),
            Err(Error::UnexpectedEof)
        );
    }

    #[test]
    fn check_wrong_constructor() {
        assert_eq!(
            bool::from_bytes(&[1, 0, 0, 0]),
            Err(Error::UnexpectedConstructor { id: 1 })
        );
        assert_eq!(
            Vec::<i32>::from_bytes(&[0, 0, 0, 0, 0, 0, 0, 0]),
            Err(Error::UnexpectedConstructor { id: 0 })
        );
    }

    #[test]
    fn check_peek_does_not_consume() {
        let cursor = Cursor::from_slice(&[0x15, 0xc4, 0xb5, 0x1c]);
        assert_eq!(cursor.peek_u32(), Ok(VECTOR_ID));
        assert_eq!(cursor.pos(), 0);
    }
}
