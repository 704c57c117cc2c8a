// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The [SRP] computations needed to log into accounts protected with a password.
//!
//! [SRP]: https://core.telegram.org/api/srp

use num_bigint::BigUint;
use num_traits::One;
use sha2::{Digest, Sha256, Sha512};

use crate::hex;

/// The 2048-bit safe prime Telegram has used for every exchange so far.
const KNOWN_SAFE_PRIME: &str = "c71caeb9c6b1c9048e6c522f70f13f73980d40238e3e21c14934d037563d930f48198a0aa7c14058229493d22530f4dbfa336f6e0ac925139543aed44cce7c3720fd51f69458705ac68cd4fe6b6b13abdc9746512969328454f18faf8c595f642477fe96bb2a941d5bcd1d4ac8cc49880708fa9b378e3c4f3a9060bee67cf9a4a4a695811051907e162753b56b0f6b410dba74d8a84b2a14b3144e0ef1284754fd17ed950d5965b4b9dd46582db1178d169c6bc465b0d6ff9ca3928fef5b9ae4e418fc15e83ebea0f87fa9ff5eed70050ded2849f47bf959d956850ce929851f0d8115f635b105ee2e4e15d04b2454bf6f4fadf034b10403119cd8e3b92fcc5b";

// H(data) := sha256(data)
macro_rules! h {
    ( $( $x:expr ),* ) => {{
        let mut hasher = Sha256::new();
        $( hasher.update($x); )*
        <[u8; 32]>::from(hasher.finalize())
    }};
}

/// Parameters the server returns in `account.password` for the current algorithm.
#[derive(Clone, Debug)]
pub struct SrpParams<'a> {
    pub salt1: &'a [u8],
    pub salt2: &'a [u8],
    pub g: i32,
    pub p: &'a [u8],
    pub g_b: &'a [u8],
}

/// Computes `(M1, g_a)` proving knowledge of `password` without sending it.
///
/// `a` is the client's random secret (2048 bits).
pub fn calculate_2fa(params: &SrpParams<'_>, a: &[u8], password: &[u8]) -> ([u8; 32], Vec<u8>) {
    let p = pad_to_256(params.p);
    let g_b = pad_to_256(params.g_b);
    let a = pad_to_256(a);
    let g_padded = pad_to_256(&[params.g as u8]);

    let big_p = BigUint::from_bytes_be(&p);
    let big_g = BigUint::from(params.g as u32);
    let big_a = BigUint::from_bytes_be(&a);
    let big_g_b = BigUint::from_bytes_be(&g_b);

    // k := H(p | g)
    let k = BigUint::from_bytes_be(&h!(&p, &g_padded));

    // g_a := pow(g, a) mod p
    let g_a = pad_to_256(&big_g.modpow(&big_a, &big_p).to_bytes_be());

    // u := H(g_a | g_b)
    let u = BigUint::from_bytes_be(&h!(&g_a, &g_b));

    // x := PH2(password, salt1, salt2)
    let x = BigUint::from_bytes_be(&ph2(password, params.salt1, params.salt2));

    // v := pow(g, x) mod p
    let v = big_g.modpow(&x, &big_p);

    // k_v := (k * v) mod p
    let k_v = (k * v) % &big_p;

    // t := (g_b - k_v) mod p, kept positive
    let t = ((big_g_b % &big_p) + &big_p - k_v) % &big_p;

    // s_a := pow(t, a + u * x) mod p
    let s_a = t.modpow(&(big_a + u * x), &big_p);

    // k_a := H(s_a)
    let k_a = h!(pad_to_256(&s_a.to_bytes_be()));

    // M1 := H(H(p) xor H(g) | H(salt1) | H(salt2) | g_a | g_b | k_a)
    let mut p_xor_g = h!(&p);
    p_xor_g
        .iter_mut()
        .zip(h!(&g_padded))
        .for_each(|(l, r)| *l ^= r);

    let m1 = h!(
        p_xor_g,
        h!(params.salt1),
        h!(params.salt2),
        &g_a,
        &g_b,
        k_a
    );

    (m1, g_a)
}

/// Checks that `p` is a 2048-bit safe prime and that `g` generates a subgroup of order `(p - 1) / 2`.
///
/// Both Diffie-Hellman during key exchange and SRP rely on these parameters.
pub fn check_p_and_g(p: &[u8], g: i32) -> bool {
    let big_p = BigUint::from_bytes_be(p);
    if big_p.bits() != 2048 {
        return false;
    }

    let residue = |m: u32| (&big_p % m).to_u32_digits().first().copied().unwrap_or(0);
    let generates_subgroup = match g {
        2 => residue(8) == 7,
        3 => residue(3) == 2,
        4 => true,
        5 => matches!(residue(5), 1 | 4),
        6 => matches!(residue(24), 19 | 23),
        7 => matches!(residue(7), 3 | 5 | 6),
        _ => false,
    };
    if !generates_subgroup {
        return false;
    }

    big_p == BigUint::from_bytes_be(&hex::from_hex(KNOWN_SAFE_PRIME))
        || glass_pumpkin::safe_prime::check(&big_p)
}

/// Checks `1 < value < p - 1` and that `value` is at least 2^(2048-64) away from both ends.
pub fn check_g_in_range(value: &[u8], p: &[u8]) -> bool {
    let value = BigUint::from_bytes_be(value);
    let p = BigUint::from_bytes_be(p);
    let one = BigUint::one();
    if value <= one || p <= &one + &one || value >= &p - &one {
        return false;
    }

    let margin = one << (2048 - 64);
    value >= margin && p >= &margin + &value
}

// SH(data, salt) := H(salt | data | salt)
fn sh(data: &[u8], salt: &[u8]) -> [u8; 32] {
    h!(salt, data, salt)
}

// PH2(password, salt1, salt2) := SH(pbkdf2(sha512, PH1(password, salt1, salt2), salt1, 100000), salt2)
// where PH1(password, salt1, salt2) := SH(SH(password, salt1), salt2)
fn ph2(password: &[u8], salt1: &[u8], salt2: &[u8]) -> [u8; 32] {
    let ph1 = sh(&sh(password, salt1), salt2);

    let mut derived = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<Sha512>(&ph1, salt1, 100000, &mut derived);

    sh(&derived, salt2)
}

fn pad_to_256(data: &[u8]) -> Vec<u8> {
    let mut padded = vec![0; 256usize.saturating_sub(data.len())];
    padded.extend(data);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_calculations() {
        let p = pad_to_256(&[4]);
        let params = SrpParams {
            salt1: &[1],
            salt2: &[2],
            g: 3,
            p: &p,
            g_b: &[5],
        };

        let (m1, g_a) = calculate_2fa(&params, &[6], &[7]);

        assert_eq!(
            m1,
            [
                113, 194, 128, 151, 4, 153, 170, 134, 32, 95, 223, 56, 223, 136, 52, 244, 208, 194,
                114, 97, 231, 249, 72, 123, 225, 229, 225, 113, 128, 184, 98, 51,
            ]
        );

        let mut expected_g_a = vec![0; 255];
        expected_g_a.push(1);
        assert_eq!(g_a, expected_g_a);
    }

    #[test]
    fn known_prime_passes_checks() {
        let p = hex::from_hex(KNOWN_SAFE_PRIME);
        assert!(check_p_and_g(&p, 3));
        assert!(check_p_and_g(&p, 4));
        assert!(!check_p_and_g(&p, 9));
        assert!(!check_p_and_g(&[23], 2));
    }

    #[test]
    fn range_check_rejects_edges() {
        let p = hex::from_hex(KNOWN_SAFE_PRIME);
        assert!(!check_g_in_range(&[1], &p));
        assert!(!check_g_in_range(&[2], &p));
        assert!(!check_g_in_range(&p, &p));

        let mut middle = p.clone();
        middle[0] >>= 1;
        assert!(check_g_in_range(&middle, &p));
    }
}
