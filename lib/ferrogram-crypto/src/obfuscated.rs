// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![allow(deprecated)] // see https://github.com/RustCrypto/block-ciphers/issues/509
use aes::cipher::{KeyIvInit, StreamCipher, generic_array::GenericArray};

type Ctr = ctr::Ctr128BE<aes::Aes256>;

/// The pair of AES-256-CTR streams used by the obfuscated transport.
///
/// Both are derived from the 64-byte random header the client sends first:
/// the outgoing stream from bytes `8..56`, the incoming one from the same
/// range of the reversed header.
pub struct ObfuscatedCipher {
    rx: Ctr,
    tx: Ctr,
}

impl ObfuscatedCipher {
    pub fn new(init: &[u8; 64]) -> Self {
        let mut reversed = *init;
        reversed.reverse();
        Self {
            rx: Self::stream(&reversed),
            tx: Self::stream(init),
        }
    }

    /// Builds the cipher a server would use for the same header, with both streams swapped.
    pub fn new_server_side(init: &[u8; 64]) -> Self {
        let Self { rx, tx } = Self::new(init);
        Self { rx: tx, tx: rx }
    }

    fn stream(header: &[u8; 64]) -> Ctr {
        Ctr::new(
            GenericArray::from_slice(&header[8..40]),
            GenericArray::from_slice(&header[40..56]),
        )
    }

    pub fn encrypt(&mut self, buffer: &mut [u8]) {
        self.tx.apply_keystream(buffer);
    }

    pub fn decrypt(&mut self, buffer: &mut [u8]) {
        self.rx.apply_keystream(buffer);
    }
}
