// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Framings used to carry MTP payloads over a byte stream.
//!
//! Packing works on a [`DequeBuffer`] so headers can be prepended without
//! moving the payload. Unpacking never copies either: it reports the range
//! of the first complete packet inside whatever has been read so far, and
//! the caller drains up to `next_offset` once it is done with it.
mod abridged;
mod full;
mod intermediate;
mod obfuscated;

pub use abridged::Abridged;
use ferrogram_crypto::DequeBuffer;
pub use full::Full;
pub use intermediate::{Intermediate, PaddedIntermediate};
pub use obfuscated::Obfuscated;
use std::fmt;

/// Framing failure.
///
/// Only [`Error::MissingBytes`] is recoverable, by reading more. Anything
/// else means the stream is out of sync and the connection must be closed.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    MissingBytes,
    BadLen { got: i32 },
    /// Only produced by [`Full`].
    BadSeq { expected: i32, got: i32 },
    /// Only produced by [`Full`].
    BadCrc { expected: u32, got: u32 },
    /// The server sent a lone negative length instead of a packet.
    ///
    /// 404 means it does not know our auth key, 429 that too many
    /// connections were opened from this address.
    BadStatus { status: u32 },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBytes => f.write_str("incomplete packet"),
            Self::BadLen { got } => write!(f, "packet length {got} is invalid"),
            Self::BadSeq { expected, got } => {
                write!(f, "packet seq {got} out of order, wanted {expected}")
            }
            Self::BadCrc { expected, got } => {
                write!(f, "packet crc {got:08x} does not match {expected:08x}")
            }
            Self::BadStatus { status } => write!(f, "server closed with status {status}"),
        }
    }
}

/// Position of one packet's payload in the receive buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct UnpackedOffset {
    pub data_start: usize,
    pub data_end: usize,
    /// Where the following packet begins.
    pub next_offset: usize,
}

pub trait Transport {
    /// Frames the payload currently held by `buffer`, whose length must be
    /// a multiple of 4.
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>);

    /// Locates the first packet in `buffer`.
    ///
    /// Stateful framings (obfuscation, sequence numbers) assume every byte
    /// before `next_offset` is never passed again.
    fn unpack(&mut self, buffer: &mut [u8]) -> Result<UnpackedOffset, Error>;

    /// Forgets all state so the framing can be used on a fresh connection.
    fn reset(&mut self);
}

/// Framings that announce themselves with a tag, which obfuscation needs to
/// embed in its header instead of sending in the clear.
pub trait Tagged {
    /// Hands out the tag and marks it as sent.
    fn init_tag(&mut self) -> [u8; 4];
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        T::pack(self, buffer)
    }

    fn unpack(&mut self, buffer: &mut [u8]) -> Result<UnpackedOffset, Error> {
        T::unpack(self, buffer)
    }

    fn reset(&mut self) {
        T::reset(self)
    }
}

fn read_i32(buffer: &[u8], pos: usize) -> i32 {
    i32::from_le_bytes([buffer[pos], buffer[pos + 1], buffer[pos + 2], buffer[pos + 3]])
}
