// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::sha1;
use std::fmt;

/// A 2048-bit [authorization key] shared with one datacenter.
///
/// Two keys compare equal when their identifiers match.
///
/// [authorization key]: https://core.telegram.org/mtproto/auth_key
#[derive(Clone)]
pub struct AuthKey {
    pub(crate) data: [u8; 256],
    pub(crate) aux_hash: [u8; 8],
    pub(crate) key_id: [u8; 8],
}

impl AuthKey {
    /// Wraps the raw key material, precomputing the auxiliary hash and the key identifier.
    pub fn from_bytes(data: [u8; 256]) -> Self {
        let digest = sha1!(&data);
        let mut aux_hash = [0; 8];
        aux_hash.copy_from_slice(&digest[..8]);
        let mut key_id = [0; 8];
        key_id.copy_from_slice(&digest[12..20]);

        Self {
            data,
            aux_hash,
            key_id,
        }
    }

    /// The raw key material, suitable for persisting.
    pub fn to_bytes(&self) -> [u8; 256] {
        self.data
    }

    /// The 64 lower-order bits of the SHA1 of the key, as sent in every encrypted message.
    pub fn id(&self) -> i64 {
        i64::from_le_bytes(self.key_id)
    }

    /// `new_nonce_hash{number}` used to confirm the outcome of the key exchange.
    pub fn calc_new_nonce_hash(&self, new_nonce: &[u8; 32], number: u8) -> [u8; 16] {
        let digest = sha1!(new_nonce, [number], &self.aux_hash);
        let mut hash = [0; 16];
        hash.copy_from_slice(&digest[4..]);
        hash
    }
}

impl PartialEq for AuthKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_id == other.key_id
    }
}

impl Eq for AuthKey {}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKey").field("id", &self.id()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential<const N: usize>() -> [u8; N] {
        std::array::from_fn(|i| i as u8)
    }

    #[test]
    fn derived_identifiers() {
        let auth_key = AuthKey::from_bytes(sequential());
        assert_eq!(auth_key.aux_hash, [73, 22, 214, 189, 183, 247, 142, 104]);
        assert_eq!(auth_key.key_id, [50, 209, 88, 110, 164, 87, 223, 200]);
        assert_eq!(
            auth_key.id(),
            i64::from_le_bytes([50, 209, 88, 110, 164, 87, 223, 200])
        );
    }

    #[test]
    fn new_nonce_hashes() {
        let auth_key = AuthKey::from_bytes(sequential());
        let new_nonce = sequential();

        assert_eq!(
            auth_key.calc_new_nonce_hash(&new_nonce, 1),
            [194, 206, 210, 179, 62, 89, 58, 85, 210, 127, 74, 93, 171, 238, 124, 103]
        );
        assert_eq!(
            auth_key.calc_new_nonce_hash(&new_nonce, 2),
            [244, 49, 142, 133, 189, 47, 243, 190, 132, 217, 254, 252, 227, 220, 227, 159]
        );
        assert_eq!(
            auth_key.calc_new_nonce_hash(&new_nonce, 3),
            [75, 249, 215, 179, 125, 180, 19, 238, 67, 29, 40, 81, 118, 49, 203, 61]
        );
    }

    #[test]
    fn equality_follows_key_id() {
        let a = AuthKey::from_bytes(sequential());
        let b = AuthKey::from_bytes(a.to_bytes());
        let c = AuthKey::from_bytes([1; 256]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
