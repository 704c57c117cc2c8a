// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decryption and verification of file parts served by CDN datacenters.
//!
//! CDN servers only ever see encrypted file contents. Each part is encrypted
//! with AES-256-CTR, using a per-file key and an IV whose last four bytes
//! encode the offset of the part (in 16-byte blocks). Integrity is verified
//! against the SHA-256 of fixed-size blocks obtained from the master datacenter.

use std::fmt;

use crate::{aes, sha256};

/// A hash of a contiguous range of the decrypted file, as returned by `upload.getCdnFileHashes`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHash {
    pub offset: i64,
    pub limit: i32,
    pub hash: Vec<u8>,
}

/// The decrypted contents of a part did not match the expected hashes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashMismatch {
    /// Absolute file offset of the first block that failed to verify.
    pub offset: i64,
}

impl std::error::Error for HashMismatch {}

impl fmt::Display for HashMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cdn file hash mismatch at offset {}", self.offset)
    }
}

/// Builds the counter IV for a part starting at `offset`: `iv[..12] ∥ u32be(offset / 16)`.
pub fn ctr_iv(iv: &[u8; 16], offset: i64) -> [u8; 16] {
    let mut result = *iv;
    result[12..].copy_from_slice(&((offset / 16) as u32).to_be_bytes());
    result
}

/// Decrypts a CDN part in-place. `offset` must be a multiple of 16.
pub fn decrypt_part(data: &mut [u8], key: &[u8; 32], iv: &[u8; 16], offset: i64) {
    aes::ctr256_apply(data, key, &ctr_iv(iv, offset));
}

/// Verifies the decrypted `data` starting at `offset` against every hash that covers it.
///
/// Hashes whose range lies outside `data` are ignored. The last block of the file
/// may be shorter than the hash limit, in which case only the available bytes are hashed.
pub fn verify_part(data: &[u8], offset: i64, hashes: &[FileHash]) -> Result<(), HashMismatch> {
    let end = offset + data.len() as i64;
    for hash in hashes {
        if hash.offset < offset || hash.offset >= end {
            continue;
        }
        let start = (hash.offset - offset) as usize;
        let stop = (start + hash.limit as usize).min(data.len());
        if sha256!(&data[start..stop])[..] != hash.hash[..] {
            return Err(HashMismatch {
                offset: hash.offset,
            });
        }
    }
    Ok(())
}

/// Returns the offsets within `offset..offset + len` that no hash in `hashes` covers yet.
pub fn missing_hash_offsets(offset: i64, len: usize, block: i32, hashes: &[FileHash]) -> Vec<i64> {
    (offset..offset + len as i64)
        .step_by(block as usize)
        .filter(|start| !hashes.iter().any(|h| h.offset == *start))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: i32 = 128 * 1024;

    fn hashes_of(data: &[u8], base: i64) -> Vec<FileHash> {
        data.chunks(BLOCK as usize)
            .enumerate()
            .map(|(i, chunk)| FileHash {
                offset: base + i as i64 * BLOCK as i64,
                limit: BLOCK,
                hash: sha256!(chunk).to_vec(),
            })
            .collect()
    }

    #[test]
    fn iv_encodes_block_offset() {
        let iv = [0xaa; 16];
        let derived = ctr_iv(&iv, 1024 * 1024);
        assert_eq!(derived[..12], [0xaa; 12]);
        assert_eq!(derived[12..], (1024 * 1024 / 16u32).to_be_bytes());
    }

    #[test]
    fn parts_decrypt_independently() {
        let key = [4; 32];
        let iv = [9; 16];
        let plain = (0..64u8).collect::<Vec<_>>();

        // Encrypt the whole file at once, then decrypt only its second half.
        let mut whole = plain.clone();
        decrypt_part(&mut whole, &key, &iv, 0);
        let mut half = whole[32..].to_vec();
        decrypt_part(&mut half, &key, &iv, 32);
        assert_eq!(half, plain[32..]);
    }

    #[test]
    fn verification_detects_tampering() {
        let data = vec![3u8; BLOCK as usize + 100];
        let hashes = hashes_of(&data, 0);
        assert_eq!(verify_part(&data, 0, &hashes), Ok(()));

        let mut tampered = data.clone();
        tampered[BLOCK as usize + 5] ^= 1;
        assert_eq!(
            verify_part(&tampered, 0, &hashes),
            Err(HashMismatch {
                offset: BLOCK as i64
            })
        );
    }

    #[test]
    fn missing_offsets_are_reported() {
        let data = vec![1u8; 2 * BLOCK as usize];
        let mut hashes = hashes_of(&data, 0);
        hashes.remove(1);
        assert_eq!(
            missing_hash_offsets(0, data.len(), BLOCK, &hashes),
            vec![BLOCK as i64]
        );
    }
}
