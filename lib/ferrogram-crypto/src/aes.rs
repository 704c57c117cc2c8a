// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [AES-Infinite Garble Extension](https://mgp25.com/blog/2015/06/21/AESIGE/) and AES-CTR helpers.

#![allow(deprecated)] // see https://github.com/RustCrypto/block-ciphers/issues/509

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};

fn xor_block(block: &mut [u8], with: &[u8; 16]) {
    block.iter_mut().zip(with).for_each(|(b, w)| *b ^= w);
}

/// Encrypt the input plaintext in-place using the AES-IGE mode.
/// The buffer length must be a multiple of 16.
pub fn ige_encrypt(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 32]) {
    assert_eq!(buffer.len() % 16, 0);

    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut prev_cipher: [u8; 16] = iv[..16].try_into().unwrap();
    let mut prev_plain: [u8; 16] = iv[16..].try_into().unwrap();

    for block in buffer.chunks_mut(16) {
        let plain: [u8; 16] = (&*block).try_into().unwrap();

        xor_block(block, &prev_cipher);
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
        xor_block(block, &prev_plain);

        prev_cipher.copy_from_slice(block);
        prev_plain = plain;
    }
}

/// Decrypt the input ciphertext in-place using the AES-IGE mode.
/// The buffer length must be a multiple of 16.
pub fn ige_decrypt(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 32]) {
    assert_eq!(buffer.len() % 16, 0);

    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut prev_cipher: [u8; 16] = iv[..16].try_into().unwrap();
    let mut prev_plain: [u8; 16] = iv[16..].try_into().unwrap();

    for block in buffer.chunks_mut(16) {
        let encrypted: [u8; 16] = (&*block).try_into().unwrap();

        xor_block(block, &prev_plain);
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
        xor_block(block, &prev_cipher);

        prev_plain.copy_from_slice(block);
        prev_cipher = encrypted;
    }
}

/// Apply the AES-256-CTR keystream (big-endian 128-bit counter) over `buffer` in-place.
///
/// Encryption and decryption are the same operation.
pub fn ctr256_apply(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 16]) {
    let mut cipher = ctr::Ctr128BE::<Aes256>::new(
        GenericArray::from_slice(key),
        GenericArray::from_slice(iv),
    );
    cipher.apply_keystream(buffer);
}
