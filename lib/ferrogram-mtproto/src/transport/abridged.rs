// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::{Error, Tagged, Transport, UnpackedOffset, read_i32};
use ferrogram_crypto::DequeBuffer;

/// Word counts from this value up need the four byte header.
const LONG_MARKER: u8 = 0x7f;

const INIT_BYTE: u8 = 0xef;

/// The [abridged] framing, with the smallest overhead of all.
///
/// The payload length is sent in 4-byte words, in a single byte when it
/// is below `0x7f` or otherwise as `0x7f` followed by the count in three
/// little-endian bytes. The first packet of a connection is preceded by
/// `0xef`.
///
/// [abridged]: https://core.telegram.org/mtproto/mtproto-transports#abridged
pub struct Abridged {
    tag_sent: bool,
}

#[allow(clippy::new_without_default)]
impl Abridged {
    pub fn new() -> Self {
        Self { tag_sent: false }
    }
}

impl Transport for Abridged {
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        assert!(buffer.len() % 4 == 0, "payload must be 4-byte aligned");

        let words = buffer.len() / 4;
        match u8::try_from(words) {
            Ok(short) if short < LONG_MARKER => buffer.extend_front(&[short]),
            _ => {
                let header = (words as u32) << 8 | u32::from(LONG_MARKER);
                buffer.extend_front(&header.to_le_bytes());
            }
        }

        if !self.tag_sent {
            buffer.extend_front(&[INIT_BYTE]);
            self.tag_sent = true;
        }
    }

    fn unpack(&mut self, buffer: &mut [u8]) -> Result<UnpackedOffset, Error> {
        let header_len = match buffer.first() {
            None => return Err(Error::MissingBytes),
            Some(&first) if first < LONG_MARKER => 1,
            Some(_) if buffer.len() < 4 => return Err(Error::MissingBytes),
            Some(_) => 4,
        };
        let words = match header_len {
            1 => usize::from(buffer[0]),
            _ => (read_i32(buffer, 0) as u32 >> 8) as usize,
        };

        let end = header_len + words * 4;
        if buffer.len() < end {
            return Err(Error::MissingBytes);
        }

        // A lone negative integer is a transport error code.
        if end == 5 && header_len == 1 {
            let status = read_i32(buffer, 1);
            if status < 0 {
                return Err(Error::BadStatus {
                    status: status.unsigned_abs(),
                });
            }
        }

        Ok(UnpackedOffset {
            data_start: header_len,
            data_end: end,
            next_offset: end,
        })
    }

    fn reset(&mut self) {
        self.tag_sent = false;
    }
}

impl Tagged for Abridged {
    fn init_tag(&mut self) -> [u8; 4] {
        self.tag_sent = true;
        [INIT_BYTE; 4]
    }
}
