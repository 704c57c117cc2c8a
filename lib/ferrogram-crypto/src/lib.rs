// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Cryptographic utilities needed to talk to Telegram's servers.
//!
//! Most users will never need this crate directly. It contains the
//! [MTProto 2.0] message encryption, the AES-IGE and AES-CTR ciphers,
//! the pieces used during Authorization Key generation, and the
//! helpers used to verify and decrypt files served from CDN datacenters.
//!
//! [MTProto 2.0]: https://core.telegram.org/mtproto/description

#![deny(unsafe_code)]

pub mod aes;
mod auth_key;
pub mod cdn;
mod deque_buffer;
pub mod factorize;
pub mod hex;
mod obfuscated;
pub mod rsa;
mod sha;
pub mod two_factor_auth;

use std::fmt;

pub use auth_key::AuthKey;
pub use deque_buffer::DequeBuffer;
pub use obfuscated::ObfuscatedCipher;

#[doc(hidden)]
pub mod __private {
    pub use sha1;
    pub use sha2;
}

/// Smallest amount of random padding MTProto 2.0 accepts.
pub const MIN_PADDING: usize = 12;

/// Largest amount of random padding MTProto 2.0 accepts.
pub const MAX_PADDING: usize = 1024;

/// The error type produced when decrypting server messages.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The ciphertext is either too small or not padded correctly.
    InvalidBuffer,

    /// The server replied with the ID of a different authorization key.
    AuthKeyMismatch,

    /// The key of the message did not match our expectations.
    MessageKeyMismatch,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBuffer => write!(f, "invalid ciphertext buffer length"),
            Self::AuthKeyMismatch => write!(f, "server authkey mismatches with ours"),
            Self::MessageKeyMismatch => write!(f, "server msgkey mismatches with ours"),
        }
    }
}

/// Which side of the connection is encrypting.
///
/// MTProto 2.0 mixes a different slice of the key depending on the direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Client,
    Server,
}

impl Side {
    /// "where x = 0 for messages from client to server and x = 8 for those from server to client."
    fn x(self) -> usize {
        match self {
            Side::Client => 0,
            Side::Server => 8,
        }
    }
}

/// Derives `(aes_key, aes_iv)` from the `msg_key`.
fn calc_key(auth_key: &AuthKey, msg_key: &[u8; 16], side: Side) -> ([u8; 32], [u8; 32]) {
    let x = side.x();

    // sha256_a = SHA256 (msg_key + substr (auth_key, x, 36));
    let sha256_a = sha256!(msg_key, &auth_key.data[x..x + 36]);

    // sha256_b = SHA256 (substr (auth_key, 40+x, 36) + msg_key);
    let sha256_b = sha256!(&auth_key.data[40 + x..40 + x + 36], msg_key);

    // aes_key = substr (sha256_a, 0, 8) + substr (sha256_b, 8, 16) + substr (sha256_a, 24, 8);
    let mut aes_key = [0; 32];
    aes_key[0..8].copy_from_slice(&sha256_a[0..8]);
    aes_key[8..24].copy_from_slice(&sha256_b[8..24]);
    aes_key[24..32].copy_from_slice(&sha256_a[24..32]);

    // aes_iv = substr (sha256_b, 0, 8) + substr (sha256_a, 8, 16) + substr (sha256_b, 24, 8);
    let mut aes_iv = [0; 32];
    aes_iv[0..8].copy_from_slice(&sha256_b[0..8]);
    aes_iv[8..24].copy_from_slice(&sha256_a[8..24]);
    aes_iv[24..32].copy_from_slice(&sha256_b[24..32]);

    (aes_key, aes_iv)
}

/// `msg_key = substr (SHA256 (substr (auth_key, 88+x, 32) + plaintext + random_padding), 8, 16)`
fn calc_msg_key(auth_key: &AuthKey, padded_plaintext: &[u8], side: Side) -> [u8; 16] {
    let x = side.x();
    let msg_key_large = sha256!(&auth_key.data[88 + x..88 + x + 32], padded_plaintext);
    let mut msg_key = [0; 16];
    msg_key.copy_from_slice(&msg_key_large[8..24]);
    msg_key
}

/// Determines the padding length needed for a plaintext of a certain length.
///
/// > Note that MTProto 2.0 requires from 12 to 1024 bytes of padding
/// > [...] the resulting message length be divisible by 16 bytes
pub fn determine_padding_v2_length(len: usize) -> usize {
    16 + (16 - (len % 16))
}

fn encrypt_padded_data_v2(buffer: &mut DequeBuffer<u8>, auth_key: &AuthKey, side: Side) {
    let msg_key = calc_msg_key(auth_key, buffer.as_ref(), side);
    let (key, iv) = calc_key(auth_key, &msg_key, side);
    aes::ige_encrypt(buffer.as_mut(), &key, &iv);

    buffer.extend_front(&msg_key);
    buffer.extend_front(&auth_key.key_id);
}

/// Encrypts the plaintext in `buffer` in-place following the [MTProto 2.0 algorithm].
///
/// Random padding is appended, and the `auth_key_id` and `msg_key` are prepended.
///
/// [MTProto 2.0 algorithm]: https://core.telegram.org/mtproto/description#defining-aes-key-and-initialization-vector
pub fn encrypt_data_v2(buffer: &mut DequeBuffer<u8>, auth_key: &AuthKey) {
    encrypt_data_v2_as(buffer, auth_key, Side::Client)
}

/// Like [`encrypt_data_v2`], but picking the direction explicitly.
///
/// Only servers (and tests pretending to be one) need [`Side::Server`].
pub fn encrypt_data_v2_as(buffer: &mut DequeBuffer<u8>, auth_key: &AuthKey, side: Side) {
    let mut padding = vec![0; determine_padding_v2_length(buffer.len())];
    getrandom::fill(&mut padding).expect("failed to generate a secure padding");
    buffer.extend(padding);
    encrypt_padded_data_v2(buffer, auth_key, side);
}

/// Decrypts a message sent by the server, verifying its `auth_key_id` and `msg_key`.
///
/// The returned slice is the padded plaintext; callers must validate the inner length.
pub fn decrypt_data_v2<'a>(
    ciphertext: &'a mut [u8],
    auth_key: &AuthKey,
) -> Result<&'a mut [u8], Error> {
    decrypt_data_v2_as(ciphertext, auth_key, Side::Server)
}

/// Like [`decrypt_data_v2`], but picking the direction the message was encrypted with.
pub fn decrypt_data_v2_as<'a>(
    ciphertext: &'a mut [u8],
    auth_key: &AuthKey,
    side: Side,
) -> Result<&'a mut [u8], Error> {
    // Plaintext must be at least 32 bytes with padding
    if ciphertext.len() < 24 || (ciphertext.len() - 24) % 16 != 0 {
        return Err(Error::InvalidBuffer);
    }

    if auth_key.key_id != ciphertext[..8] {
        return Err(Error::AuthKeyMismatch);
    }

    let mut msg_key = [0; 16];
    msg_key.copy_from_slice(&ciphertext[8..24]);

    let (key, iv) = calc_key(auth_key, &msg_key, side);
    let plaintext = &mut ciphertext[24..];
    aes::ige_decrypt(plaintext, &key, &iv);

    if calc_msg_key(auth_key, plaintext, side) != msg_key {
        return Err(Error::MessageKeyMismatch);
    }

    Ok(plaintext)
}

/// Generate the AES key and initialization vector from the server nonce
/// and the new client nonce. This is done after the DH exchange.
pub fn generate_key_data_from_nonce(
    server_nonce: &[u8; 16],
    new_nonce: &[u8; 32],
) -> ([u8; 32], [u8; 32]) {
    let hash1 = sha1!(new_nonce, server_nonce);
    let hash2 = sha1!(server_nonce, new_nonce);
    let hash3 = sha1!(new_nonce, new_nonce);

    // key = hash1 + hash2[:12]
    let mut key = [0; 32];
    key[..20].copy_from_slice(&hash1);
    key[20..].copy_from_slice(&hash2[..12]);

    // iv = hash2[12:20] + hash3 + new_nonce[:4]
    let mut iv = [0; 32];
    iv[..8].copy_from_slice(&hash2[12..]);
    iv[8..28].copy_from_slice(&hash3);
    iv[28..].copy_from_slice(&new_nonce[..4]);

    (key, iv)
}

/// Encrypt data using AES-IGE, padding it with random bytes to a multiple of 16 first.
pub fn encrypt_ige(plaintext: &[u8], key: &[u8; 32], iv: &[u8; 32]) -> Vec<u8> {
    let mut buffer = plaintext.to_vec();
    let pad_len = (16 - (buffer.len() % 16)) % 16;
    if pad_len != 0 {
        let mut padding = vec![0; pad_len];
        getrandom::fill(&mut padding).expect("failed to generate random padding for encryption");
        buffer.extend(padding);
    }

    aes::ige_encrypt(&mut buffer, key, iv);
    buffer
}

/// Decrypt data using AES-IGE. Panics if the ciphertext is not padded to 16 bytes.
pub fn decrypt_ige(padded_ciphertext: &[u8], key: &[u8; 32], iv: &[u8; 32]) -> Vec<u8> {
    let mut buffer = padded_ciphertext.to_vec();
    aes::ige_decrypt(&mut buffer, key, iv);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_auth_key() -> AuthKey {
        let mut buffer = [0u8; 256];
        buffer
            .iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = i as u8);

        AuthKey::from_bytes(buffer)
    }

    #[test]
    fn encrypt_client_data_v2() {
        let mut buffer = DequeBuffer::with_capacity(0, 0);
        buffer.extend(b"Hello, world! This data should remain secure!");
        let padding = determine_padding_v2_length(buffer.len());
        buffer.extend((0..padding).map(|_| 0));

        let auth_key = get_test_auth_key();
        let expected = vec![
            50, 209, 88, 110, 164, 87, 223, 200, 168, 23, 41, 212, 109, 181, 64, 25, 162, 191, 215,
            247, 68, 249, 185, 108, 79, 113, 108, 253, 196, 71, 125, 178, 162, 193, 95, 109, 219,
            133, 35, 95, 185, 85, 47, 29, 132, 7, 198, 170, 234, 0, 204, 132, 76, 90, 27, 246, 172,
            68, 183, 155, 94, 220, 42, 35, 134, 139, 61, 96, 115, 165, 144, 153, 44, 15, 41, 117,
            36, 61, 86, 62, 161, 128, 210, 24, 238, 117, 124, 154,
        ];

        encrypt_padded_data_v2(&mut buffer, &auth_key, Side::Client);
        assert_eq!(buffer.as_ref(), expected);
    }

    #[test]
    fn decrypt_what_the_server_encrypted() {
        let auth_key = get_test_auth_key();
        let mut buffer = DequeBuffer::with_capacity(64, 24);
        buffer.extend(b"0123456789abcdef0123456789abcdef");

        encrypt_data_v2_as(&mut buffer, &auth_key, Side::Server);
        let mut ciphertext = buffer.as_ref().to_vec();
        let plaintext = decrypt_data_v2(&mut ciphertext, &auth_key).unwrap();
        assert_eq!(&plaintext[..32], b"0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn padding_bounds_for_small_body() {
        let added = determine_padding_v2_length(32);
        assert!((MIN_PADDING..=MAX_PADDING).contains(&added));
        assert_eq!((32 + added) % 16, 0);
    }

    #[test]
    fn decrypt_rejects_foreign_key_and_tampering() {
        let auth_key = get_test_auth_key();
        let mut buffer = DequeBuffer::with_capacity(64, 24);
        buffer.extend([7u8; 48]);
        encrypt_data_v2_as(&mut buffer, &auth_key, Side::Server);

        let mut wrong_id = buffer.as_ref().to_vec();
        wrong_id[0] ^= 1;
        assert_eq!(
            decrypt_data_v2(&mut wrong_id, &auth_key),
            Err(Error::AuthKeyMismatch)
        );

        let mut tampered = buffer.as_ref().to_vec();
        let last = tampered.len() - 1;
        tampered[last] ^= 1;
        assert_eq!(
            decrypt_data_v2(&mut tampered, &auth_key),
            Err(Error::MessageKeyMismatch)
        );

        let mut short = buffer.as_ref()[..30].to_vec();
        assert_eq!(
            decrypt_data_v2(&mut short, &auth_key),
            Err(Error::InvalidBuffer)
        );
    }

    #[test]
    fn key_from_nonce() {
        let mut server_nonce = [0u8; 16];
        server_nonce
            .iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = i as u8);
        let mut new_nonce = [0u8; 32];
        new_nonce
            .iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = i as u8);

        let (key, iv) = generate_key_data_from_nonce(&server_nonce, &new_nonce);
        assert_eq!(
            key,
            [
                7, 88, 241, 83, 59, 97, 93, 36, 246, 232, 169, 74, 111, 203, 238, 10, 85, 234, 171,
                34, 23, 215, 41, 92, 169, 33, 61, 26, 45, 125, 22, 166
            ]
        );
        assert_eq!(
            iv,
            [
                90, 132, 16, 142, 152, 5, 101, 108, 232, 100, 7, 14, 22, 110, 98, 24, 246, 120, 62,
                133, 17, 71, 26, 90, 183, 128, 44, 242, 0, 1, 2, 3
            ]
        );
    }

    #[test]
    fn ige_round_trip_pads_input() {
        let key = [3; 32];
        let iv = [5; 32];
        let ciphertext = encrypt_ige(b"short", &key, &iv);
        assert_eq!(ciphertext.len(), 16);
        assert_eq!(&decrypt_ige(&ciphertext, &key, &iv)[..5], b"short");
    }
}
