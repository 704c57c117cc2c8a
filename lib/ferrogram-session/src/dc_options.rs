// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};

use crate::types::DcOption;

/// The datacenter assumed to be home until Telegram says otherwise.
pub const DEFAULT_DC: i32 = 2;

const fn ipv4(a: u8, b: u8, c: u8, d: u8) -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::new(a, b, c, d), 443)
}

const fn ipv6(a: u16, b: u16, c: u16, d: u16, h: u16) -> SocketAddrV6 {
    SocketAddrV6::new(Ipv6Addr::new(a, b, c, d, 0, 0, 0, h), 443, 0, 0)
}

const fn dc(id: i32, ipv4: SocketAddrV4, ipv6: SocketAddrV6) -> DcOption {
    DcOption {
        id,
        ipv4,
        ipv6,
        auth_key: None,
    }
}

/// Hardcoded known `static` options from `functions::help::GetConfig`.
const PRODUCTION: [DcOption; 5] = [
    dc(1, ipv4(149, 154, 175, 53), ipv6(0x2001, 0xb28, 0xf23d, 0xf001, 0xa)),
    dc(2, ipv4(149, 154, 167, 41), ipv6(0x2001, 0x67c, 0x4e8, 0xf002, 0xa)),
    dc(3, ipv4(149, 154, 175, 100), ipv6(0x2001, 0xb28, 0xf23d, 0xf003, 0xa)),
    dc(4, ipv4(149, 154, 167, 92), ipv6(0x2001, 0x67c, 0x4e8, 0xf004, 0xa)),
    dc(5, ipv4(91, 108, 56, 104), ipv6(0x2001, 0xb28, 0xf23f, 0xf005, 0xa)),
];

/// Same as [`PRODUCTION`], but for the test servers.
const TEST: [DcOption; 3] = [
    dc(1, ipv4(149, 154, 175, 10), ipv6(0x2001, 0xb28, 0xf23d, 0xf001, 0xe)),
    dc(2, ipv4(149, 154, 167, 40), ipv6(0x2001, 0x67c, 0x4e8, 0xf002, 0xe)),
    dc(3, ipv4(149, 154, 175, 117), ipv6(0x2001, 0xb28, 0xf23d, 0xf003, 0xe)),
];

/// The statically-known datacenters, without any authorization key.
pub fn known_dc_options(test_mode: bool) -> &'static [DcOption] {
    if test_mode { &TEST } else { &PRODUCTION }
}

/// A single statically-known datacenter, if the identifier is valid.
pub fn known_dc_option(dc_id: i32, test_mode: bool) -> Option<DcOption> {
    known_dc_options(test_mode)
        .iter()
        .find(|dc_option| dc_option.id == dc_id)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_known_options() {
        assert_eq!(known_dc_options(false).len(), 5);
        assert_eq!(known_dc_options(true).len(), 3);
        assert!(known_dc_option(DEFAULT_DC, false).is_some());
        assert!(known_dc_option(DEFAULT_DC, true).is_some());
        assert!(known_dc_option(4, true).is_none());
        assert_eq!(
            known_dc_option(2, true).map(|dc| dc.ipv4),
            Some(ipv4(149, 154, 167, 40))
        );
    }
}
