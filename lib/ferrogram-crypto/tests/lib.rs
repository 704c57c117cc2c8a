// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use ferrogram_crypto::{
    AuthKey, DequeBuffer, Error, Side, decrypt_data_v2, decrypt_data_v2_as, encrypt_data_v2,
    encrypt_data_v2_as,
};

fn auth_key() -> AuthKey {
    AuthKey::from_bytes(std::array::from_fn(|i| (i * 3) as u8))
}

fn encrypted(body: &[u8], side: Side) -> Vec<u8> {
    let mut buffer = DequeBuffer::with_capacity(body.len() + 64, 24);
    buffer.extend(body);
    encrypt_data_v2_as(&mut buffer, &auth_key(), side);
    buffer.as_ref().to_vec()
}

#[test]
fn ciphertext_layout() {
    let ciphertext = encrypted(&[1; 40], Side::Client);
    // key id + msg key + padded body
    assert_eq!((ciphertext.len() - 24) % 16, 0);
    assert_eq!(ciphertext[..8], auth_key().id().to_le_bytes());
    assert!(ciphertext.len() - 24 - 40 >= 12);
}

#[test]
fn padding_is_random() {
    assert_ne!(
        encrypted(&[0; 16], Side::Client),
        encrypted(&[0; 16], Side::Client)
    );
}

#[test]
fn directions_are_not_interchangeable() {
    // Something the client encrypted cannot be read as if the server had sent it.
    let mut ciphertext = encrypted(&[5; 32], Side::Client);
    assert_eq!(
        decrypt_data_v2(&mut ciphertext, &auth_key()),
        Err(Error::MessageKeyMismatch)
    );

    let mut ciphertext = encrypted(&[5; 32], Side::Client);
    let plaintext = decrypt_data_v2_as(&mut ciphertext, &auth_key(), Side::Client).unwrap();
    assert_eq!(plaintext[..32], [5; 32]);
}

#[test]
fn client_encryption_uses_client_side() {
    let mut buffer = DequeBuffer::with_capacity(64, 0);
    buffer.extend(b"ping");
    encrypt_data_v2(&mut buffer, &auth_key());

    let mut ciphertext = buffer.as_ref().to_vec();
    let plaintext = decrypt_data_v2_as(&mut ciphertext, &auth_key(), Side::Client).unwrap();
    assert_eq!(&plaintext[..4], b"ping");
}
