// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigUint;

use crate::sha1;

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;

/// One of the server's public keys.
#[derive(Clone, Debug)]
pub struct Key {
    n: BigUint,
    e: BigUint,
}

impl Key {
    /// Builds a key from its decimal modulus and exponent.
    pub fn new(n: &str, e: &str) -> Option<Self> {
        let decimal = |s: &str| BigUint::parse_bytes(s.as_bytes(), 10);
        Some(Self {
            n: decimal(n)?,
            e: decimal(e)?,
        })
    }

    /// Parses a `-----BEGIN RSA PUBLIC KEY-----` block, the format CDN
    /// datacenters announce their keys in.
    pub fn from_pem(pem: &str) -> Option<Self> {
        let body = pem
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("-----"))
            .collect::<String>();
        let der = STANDARD.decode(body).ok()?;

        let (sequence, _) = der_element(&der, DER_SEQUENCE)?;
        let (n, rest) = der_element(sequence, DER_INTEGER)?;
        let (e, _) = der_element(rest, DER_INTEGER)?;
        Some(Self {
            n: BigUint::from_bytes_be(n),
            e: BigUint::from_bytes_be(e),
        })
    }

    /// Big-endian modulus and exponent, the input of the key fingerprint.
    pub fn components(&self) -> (Vec<u8>, Vec<u8>) {
        (self.n.to_bytes_be(), self.e.to_bytes_be())
    }
}

/// Splits a DER element with the given tag into its contents and whatever
/// follows it.
fn der_element(der: &[u8], tag: u8) -> Option<(&[u8], &[u8])> {
    let (&found, rest) = der.split_first()?;
    if found != tag {
        return None;
    }
    let (&first, mut rest) = rest.split_first()?;
    let len = if first < 0x80 {
        usize::from(first)
    } else {
        let count = usize::from(first & 0x7f);
        if count > size_of::<usize>() || rest.len() < count {
            return None;
        }
        let (digits, after) = rest.split_at(count);
        rest = after;
        digits.iter().fold(0, |len, &d| (len << 8) | usize::from(d))
    };
    (rest.len() >= len).then(|| rest.split_at(len))
}

/// RSA encrypts `sha1(data) + data + padding` into a 256 byte block.
///
/// The plaintext is 255 bytes long, padding taken from the start of
/// `random_bytes`. `data` may therefore be at most 235 bytes.
pub fn encrypt_hashed(data: &[u8], key: &Key, random_bytes: &[u8; 256]) -> Vec<u8> {
    let mut plain = [0; 255];
    let (hash, rest) = plain.split_at_mut(20);
    hash.copy_from_slice(&sha1!(data));
    let (body, padding) = rest.split_at_mut(data.len());
    body.copy_from_slice(data);
    let padding_len = padding.len();
    padding.copy_from_slice(&random_bytes[..padding_len]);

    let cipher = BigUint::from_bytes_be(&plain).modpow(&key.e, &key.n).to_bytes_be();
    let mut block = vec![0; 256];
    block[256 - cipher.len()..].copy_from_slice(&cipher);
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULUS: &str = "22081946531037833540524260580660774032207476521197121128740358761486364763467087828766873972338019078976854986531076484772771735399701424566177039926855356719497736439289455286277202113900509554266057302466528985253648318314129246825219640197356165626774276930672688973278712614800066037531599375044750753580126415613086372604312320014358994394131667022861767539879232149461579922316489532682165746762569651763794500923643656753278887871955676253526661694459370047843286685859688756429293184148202379356802488805862746046071921830921840273062124571073336369210703400985851431491295910187179045081526826572515473914151";

    fn der(tag: u8, contents: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        match contents.len() {
            len @ 0..0x80 => out.push(len as u8),
            len @ 0x80..0x100 => out.extend([0x81, len as u8]),
            len => out.extend([0x82, (len >> 8) as u8, len as u8]),
        }
        out.extend_from_slice(contents);
        out
    }

    #[test]
    fn pem_key_matches_decimal_key() {
        let decimal = Key::new(MODULUS, "65537").unwrap();
        let (n, e) = decimal.components();

        let mut n_int = vec![0];
        n_int.extend(n);
        let mut integers = der(DER_INTEGER, &n_int);
        integers.extend(der(DER_INTEGER, &e));
        let body = STANDARD.encode(der(DER_SEQUENCE, &integers));

        let mut pem = String::from("-----BEGIN RSA PUBLIC KEY-----\n");
        for line in body.as_bytes().chunks(64) {
            pem.push_str(std::str::from_utf8(line).unwrap());
            pem.push('\n');
        }
        pem.push_str("-----END RSA PUBLIC KEY-----\n");

        let parsed = Key::from_pem(&pem).unwrap();
        assert_eq!(parsed.n, decimal.n);
        assert_eq!(parsed.e, decimal.e);
        assert!(Key::from_pem("-----BEGIN RSA PUBLIC KEY-----\nAAAA\n").is_none());
    }

    #[test]
    fn encrypt_with_zero_padding() {
        let key = Key::new(MODULUS, "65537").unwrap();
        let result = encrypt_hashed(b"Hello!", &key, &[0; 256]);
        assert_eq!(
            result,
            vec![
                117, 112, 45, 76, 136, 210, 155, 106, 185, 52, 53, 81, 36, 221, 40, 217, 182, 42,
                71, 85, 136, 65, 200, 3, 20, 80, 247, 73, 155, 28, 156, 107, 211, 157, 39, 193, 88,
                28, 81, 52, 78, 81, 193, 121, 35, 112, 100, 167, 35, 174, 147, 157, 90, 195, 80,
                20, 253, 139, 79, 226, 79, 117, 227, 17, 92, 50, 161, 99, 105, 238, 43, 55, 58, 97,
                236, 148, 70, 185, 43, 46, 61, 240, 118, 24, 219, 10, 138, 253, 169, 153, 182, 112,
                43, 50, 181, 129, 155, 214, 234, 73, 112, 251, 52, 124, 168, 74, 96, 208, 195, 138,
                183, 12, 102, 229, 237, 1, 64, 68, 136, 137, 163, 184, 130, 238, 165, 51, 186, 208,
                94, 250, 32, 69, 237, 167, 23, 18, 60, 65, 74, 191, 222, 212, 62, 30, 180, 131,
                160, 73, 120, 110, 245, 3, 27, 18, 213, 26, 63, 247, 236, 183, 216, 4, 212, 65, 53,
                148, 95, 152, 247, 90, 74, 108, 241, 161, 223, 55, 85, 158, 48, 187, 233, 42, 75,
                121, 102, 195, 79, 7, 56, 230, 209, 48, 89, 133, 119, 109, 38, 223, 171, 124, 15,
                223, 215, 236, 32, 44, 199, 140, 84, 207, 130, 172, 35, 134, 199, 157, 14, 25, 117,
                128, 164, 250, 148, 48, 10, 35, 130, 249, 225, 22, 254, 130, 223, 155, 216, 114,
                229, 185, 218, 123, 66, 98, 35, 191, 26, 216, 88, 137, 48, 181, 30, 22, 93, 108,
                221, 2
            ]
        );
    }

    #[test]
    fn output_is_always_256_bytes() {
        let key = Key::new("3233", "17").unwrap();
        assert_eq!(encrypt_hashed(b"x", &key, &[1; 256]).len(), 256);
    }
}
