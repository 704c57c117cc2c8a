// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::{Error, Tagged, Transport, UnpackedOffset, read_i32};
use ferrogram_crypto::DequeBuffer;

/// State shared by both intermediate framings: which tag to open the
/// connection with, and whether it went out already.
struct LengthPrefix {
    tag: [u8; 4],
    tag_sent: bool,
}

impl LengthPrefix {
    const fn new(byte: u8) -> Self {
        Self {
            tag: [byte; 4],
            tag_sent: false,
        }
    }

    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        buffer.extend_front(&(buffer.len() as i32).to_le_bytes());
        if !std::mem::replace(&mut self.tag_sent, true) {
            buffer.extend_front(&self.tag);
        }
    }

    fn unpack(&self, buffer: &[u8]) -> Result<UnpackedOffset, Error> {
        if buffer.len() < 4 {
            return Err(Error::MissingBytes);
        }
        let got = read_i32(buffer, 0);
        let Ok(len) = usize::try_from(got) else {
            return Err(Error::BadLen { got });
        };
        let end = 4 + len;
        if buffer.len() < end {
            return Err(Error::MissingBytes);
        }

        match len {
            // A lone negative integer is a transport error code.
            4 if read_i32(buffer, 4) < 0 => Err(Error::BadStatus {
                status: read_i32(buffer, 4).unsigned_abs(),
            }),
            0..=4 => Err(Error::BadLen { got }),
            _ => Ok(UnpackedOffset {
                data_start: 4,
                data_end: end,
                next_offset: end,
            }),
        }
    }

    fn tag(&mut self) -> [u8; 4] {
        self.tag_sent = true;
        self.tag
    }
}

/// The [intermediate] framing: a 4-byte little-endian length, then the
/// payload. Opened with `0xeeeeeeee`.
///
/// [intermediate]: https://core.telegram.org/mtproto/mtproto-transports#intermediate
pub struct Intermediate(LengthPrefix);

/// The [padded intermediate] framing: like [`Intermediate`], but up to 15
/// random bytes follow each payload to hide its real length. Opened with
/// `0xdddddddd`.
///
/// The length counts the padding. Whoever reads the payload must know where
/// it ends from its contents.
///
/// [padded intermediate]: https://core.telegram.org/mtproto/mtproto-transports#padded-intermediate
pub struct PaddedIntermediate(LengthPrefix);

#[allow(clippy::new_without_default)]
impl Intermediate {
    pub fn new() -> Self {
        Self(LengthPrefix::new(0xee))
    }
}

#[allow(clippy::new_without_default)]
impl PaddedIntermediate {
    pub fn new() -> Self {
        Self(LengthPrefix::new(0xdd))
    }
}

impl Transport for Intermediate {
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        assert!(buffer.len() % 4 == 0, "payload must be 4-byte aligned");
        self.0.pack(buffer);
    }

    fn unpack(&mut self, buffer: &mut [u8]) -> Result<UnpackedOffset, Error> {
        self.0.unpack(buffer)
    }

    fn reset(&mut self) {
        self.0.tag_sent = false;
    }
}

impl Tagged for Intermediate {
    fn init_tag(&mut self) -> [u8; 4] {
        self.0.tag()
    }
}

impl Transport for PaddedIntermediate {
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        assert!(buffer.len() % 4 == 0, "payload must be 4-byte aligned");

        let mut random = [0; 16];
        getrandom::fill(&mut random).expect("os random source unavailable");
        let padding = usize::from(random[0] % 16);
        buffer.extend(&random[1..=padding]);
        self.0.pack(buffer);
    }

    fn unpack(&mut self, buffer: &mut [u8]) -> Result<UnpackedOffset, Error> {
        self.0.unpack(buffer)
    }

    fn reset(&mut self) {
        self.0.tag_sent = false;
    }
}

impl Tagged for PaddedIntermediate {
    fn init_tag(&mut self) -> [u8; 4] {
        self.0.tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(n: usize) -> DequeBuffer<u8> {
        let mut buffer = DequeBuffer::with_capacity(n, 0);
        buffer.extend((0..n).map(|x| x as u8));
        buffer
    }

    #[test]
    fn tag_then_length() {
        let mut buffer = payload(0);
        Intermediate::new().pack(&mut buffer);
        assert_eq!(&buffer[..], &[0xee, 0xee, 0xee, 0xee, 0, 0, 0, 0]);

        let mut buffer = payload(128);
        Intermediate::new().pack(&mut buffer);
        assert_eq!(&buffer[..8], &[0xee, 0xee, 0xee, 0xee, 128, 0, 0, 0]);
        assert_eq!(&buffer[8..], &payload(128)[..]);
    }

    #[test]
    #[should_panic]
    fn unaligned_payload_panics() {
        Intermediate::new().pack(&mut payload(7));
    }

    #[test]
    fn incomplete_packets() {
        let mut transport = Intermediate::new();
        assert_eq!(transport.unpack(&mut [1, 0]), Err(Error::MissingBytes));
        assert_eq!(
            transport.unpack(&mut [8, 0, 0, 0, 1, 2, 3, 4]),
            Err(Error::MissingBytes)
        );
    }

    #[test]
    fn back_to_back_packets() {
        let mut transport = Intermediate::new();
        let mut buffer = payload(128);
        transport.pack(&mut buffer);
        let packet = &buffer[4..];
        let mut two = [packet, packet].concat();

        let first = transport.unpack(&mut two).unwrap();
        assert_eq!(&two[first.data_start..first.data_end], &payload(128)[..]);
        assert_eq!(first.next_offset, packet.len());

        let rest = &mut two[first.next_offset..];
        let second = transport.unpack(rest).unwrap();
        assert_eq!(&rest[second.data_start..second.data_end], &payload(128)[..]);
    }

    #[test]
    fn negative_status_is_an_error() {
        let mut buffer = [4_i32.to_le_bytes(), (-404_i32).to_le_bytes()].concat();
        assert_eq!(
            Intermediate::new().unpack(&mut buffer),
            Err(Error::BadStatus { status: 404 })
        );
    }

    #[test]
    fn padding_is_below_sixteen_bytes() {
        for _ in 0..32 {
            let mut transport = PaddedIntermediate::new();
            let mut buffer = payload(64);
            transport.pack(&mut buffer);

            assert_eq!(&buffer[..4], &[0xdd; 4]);
            let packet = &mut buffer[4..];
            let offset = transport.unpack(packet).unwrap();
            let len = offset.data_end - offset.data_start;
            assert!((64..64 + 16).contains(&len), "{len}");
            assert_eq!(&packet[offset.data_start..offset.data_start + 64], &payload(64)[..]);
        }
    }
}
