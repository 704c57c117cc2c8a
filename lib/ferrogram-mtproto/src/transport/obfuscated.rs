// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::{Error, Tagged, Transport, UnpackedOffset};
use ferrogram_crypto::{DequeBuffer, ObfuscatedCipher};
use log::debug;

/// [Transport obfuscation]: wraps a [`Tagged`] framing in AES-256-CTR so
/// the traffic does not look like MTProto.
///
/// The keys come from a random 64-byte header sent unencrypted before the
/// first packet, except for its last 8 bytes which carry the inner
/// transport's tag. [`Transport::reset`] generates a new header, so no
/// key is used on two connections.
///
/// [Transport obfuscation]: https://core.telegram.org/mtproto/mtproto-transports#transport-obfuscation
pub struct Obfuscated<T: Transport + Tagged> {
    inner: T,
    /// Pending until the first packet goes out.
    header: Option<[u8; 64]>,
    cipher: ObfuscatedCipher,
    /// Bytes at the start of the read buffer that were already decrypted.
    decrypted: usize,
}

/// Prefixes the server would take for some other protocol.
const RESERVED_PREFIXES: [[u8; 4]; 7] = [
    *b"HEAD",
    *b"POST",
    *b"GET ",
    *b"OPTI",
    [0x16, 0x03, 0x01, 0x02],
    [0xdd; 4],
    [0xee; 4],
];

fn is_forbidden(header: &[u8; 64]) -> bool {
    let abridged = header[0] == 0xef;
    let full = header[4..8] == [0; 4];
    abridged || full || RESERVED_PREFIXES.iter().any(|p| header.starts_with(p))
}

/// A new header carrying `tag`, and the cipher it keys.
fn new_header(tag: [u8; 4]) -> ([u8; 64], ObfuscatedCipher) {
    let mut header = [0; 64];
    while is_forbidden(&header) {
        getrandom::fill(&mut header).expect("os random source unavailable");
    }
    header[56..60].copy_from_slice(&tag);

    let mut cipher = ObfuscatedCipher::new(&header);
    // The whole header goes through the cipher to advance its counter, but
    // only the tail is sent encrypted.
    let mut encrypted = header;
    cipher.encrypt(&mut encrypted);
    header[56..].copy_from_slice(&encrypted[56..]);
    (header, cipher)
}

impl<T: Transport + Tagged> Obfuscated<T> {
    pub fn new(mut inner: T) -> Self {
        let (header, cipher) = new_header(inner.init_tag());
        Self {
            inner,
            header: Some(header),
            cipher,
            decrypted: 0,
        }
    }
}

impl<T: Transport + Tagged> Transport for Obfuscated<T> {
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        self.inner.pack(buffer);
        self.cipher.encrypt(buffer.as_mut());
        if let Some(header) = self.header.take() {
            buffer.extend_front(&header);
        }
    }

    fn unpack(&mut self, buffer: &mut [u8]) -> Result<UnpackedOffset, Error> {
        // The stream cipher must see every byte exactly once, even when a
        // packet arrives over several reads.
        assert!(buffer.len() >= self.decrypted, "read buffer shrank");
        self.cipher.decrypt(&mut buffer[self.decrypted..]);
        self.decrypted = buffer.len();

        let offset = self.inner.unpack(buffer)?;
        self.decrypted -= offset.next_offset;
        Ok(offset)
    }

    fn reset(&mut self) {
        debug!("new obfuscation keys for the next connection");
        self.inner.reset();
        let (header, cipher) = new_header(self.inner.init_tag());
        self.header = Some(header);
        self.cipher = cipher;
        self.decrypted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Abridged, Intermediate, PaddedIntermediate};

    fn payload(n: usize) -> DequeBuffer<u8> {
        let mut buffer = DequeBuffer::with_capacity(n, 0);
        buffer.extend((0..n).map(|x| (x & 0xff) as u8));
        buffer
    }

    /// Decrypts the header the way a server would, returning its cipher and tag.
    fn accept(packet: &[u8]) -> (ObfuscatedCipher, [u8; 4]) {
        let mut init = [0; 64];
        init.copy_from_slice(&packet[..64]);
        let mut cipher = ObfuscatedCipher::new_server_side(&init);
        let mut decrypted = init;
        cipher.decrypt(&mut decrypted);
        let mut tag = [0; 4];
        tag.copy_from_slice(&decrypted[56..60]);
        (cipher, tag)
    }

    #[test]
    fn header_is_not_mistaken_for_other_protocols() {
        let mut transport = Obfuscated::new(Intermediate::new());
        let mut buffer = payload(16);
        transport.pack(&mut buffer);

        let mut head = [0; 64];
        head.copy_from_slice(&buffer[..64]);
        assert!(!is_forbidden(&head));
        assert_eq!(buffer.len(), 64 + 4 + 16);
    }

    #[test]
    fn server_sees_tag_and_payload() {
        let mut transport = Obfuscated::new(Abridged::new());
        let mut buffer = payload(8);
        transport.pack(&mut buffer);

        let (mut server, tag) = accept(&buffer[..]);
        assert_eq!(tag, [0xef; 4]);

        let mut rest = buffer[64..].to_vec();
        server.decrypt(&mut rest);
        assert_eq!(rest, [2, 0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn unpack_stitches_partial_reads() {
        let mut transport = Obfuscated::new(PaddedIntermediate::new());
        let mut buffer = payload(8);
        transport.pack(&mut buffer);
        let (mut server, tag) = accept(&buffer[..]);
        assert_eq!(tag, [0xdd; 4]);

        // Server replies with an intermediate packet of 12 bytes.
        let mut reply = vec![12, 0, 0, 0];
        reply.extend(1..=12);
        server.encrypt(&mut reply);

        let mut received = reply[..6].to_vec();
        assert_eq!(transport.unpack(&mut received), Err(Error::MissingBytes));
        received.extend_from_slice(&reply[6..]);
        let offset = transport.unpack(&mut received).unwrap();
        assert_eq!(&received[offset.data_start..offset.data_end], &(1..=12).collect::<Vec<u8>>()[..]);
    }

    #[test]
    fn reset_uses_fresh_keys() {
        let mut transport = Obfuscated::new(Intermediate::new());
        let mut first = payload(4);
        transport.pack(&mut first);
        transport.reset();
        let mut second = payload(4);
        transport.pack(&mut second);

        assert_eq!(second.len(), first.len());
        assert_ne!(&first[..64], &second[..64]);
    }
}
