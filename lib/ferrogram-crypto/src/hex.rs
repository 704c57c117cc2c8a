// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Hexadecimal helpers, used by tests and to embed well-known constants.

use std::fmt::Write;

/// Lowercase hexadecimal representation of `bytes`.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Parses an hexadecimal string of even length, in either case.
pub fn opt_from_hex(hex: &str) -> Option<Vec<u8>> {
    fn nibble(digit: u8) -> Option<u8> {
        (digit as char).to_digit(16).map(|d| d as u8)
    }

    if hex.len() % 2 != 0 {
        return None;
    }

    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| Some(nibble(pair[0])? << 4 | nibble(pair[1])?))
        .collect()
}

/// Like [`opt_from_hex`], but panics on invalid input. Meant for constants.
pub fn from_hex(hex: &str) -> Vec<u8> {
    opt_from_hex(hex).expect("invalid hexadecimal constant")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_both_ways() {
        assert_eq!(to_hex(&[0, 15, 171, 255]), "000fabff");
        assert_eq!(opt_from_hex("000FabfF"), Some(vec![0, 15, 171, 255]));
        assert_eq!(opt_from_hex("abc"), None);
        assert_eq!(opt_from_hex("zz"), None);
    }
}
