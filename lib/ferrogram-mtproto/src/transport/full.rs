// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::{Error, Transport, UnpackedOffset, read_i32};
use ferrogram_crypto::DequeBuffer;

/// Length prefix, sequence number and trailing checksum.
const OVERHEAD: usize = 4 + 4 + 4;

/// The [full] framing: every packet carries its own length, a sequence
/// number per direction and a CRC32 of everything before it.
///
/// ```text
/// | len: i32 | seq: i32 | payload ... | crc32: u32 |
/// ```
///
/// `len` counts the whole packet. There is no obfuscation tag for this
/// framing, so it cannot be wrapped in [`super::Obfuscated`].
///
/// [full]: https://core.telegram.org/mtproto/mtproto-transports#full
pub struct Full {
    sent: i32,
    received: i32,
}

#[allow(clippy::new_without_default)]
impl Full {
    pub fn new() -> Self {
        Self {
            sent: 0,
            received: 0,
        }
    }
}

impl Transport for Full {
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        assert!(buffer.len() % 4 == 0, "payload must be 4-byte aligned");

        let total = (buffer.len() + OVERHEAD) as i32;
        buffer.extend_front(&self.sent.to_le_bytes());
        buffer.extend_front(&total.to_le_bytes());
        let crc = crc32fast::hash(&buffer[..]);
        buffer.extend(crc.to_le_bytes());
        self.sent += 1;
    }

    fn unpack(&mut self, buffer: &mut [u8]) -> Result<UnpackedOffset, Error> {
        if buffer.len() < 4 {
            return Err(Error::MissingBytes);
        }
        let total = read_i32(buffer, 0);
        let len = match usize::try_from(total) {
            Ok(len) if len >= OVERHEAD => len,
            _ => return Err(Error::BadLen { got: total }),
        };
        if buffer.len() < len {
            return Err(Error::MissingBytes);
        }

        let seq = read_i32(buffer, 4);
        if seq != self.received {
            return Err(Error::BadSeq {
                expected: self.received,
                got: seq,
            });
        }

        let crc_at = len - 4;
        let got = read_i32(buffer, crc_at) as u32;
        let expected = crc32fast::hash(&buffer[..crc_at]);
        if got != expected {
            return Err(Error::BadCrc { expected, got });
        }

        self.received += 1;
        Ok(UnpackedOffset {
            data_start: 8,
            data_end: crc_at,
            next_offset: len,
        })
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
