// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod tcp;

pub use tcp::NetStream;

/// Represents a socket address to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAddr {
    /// Direct connection over TCP.
    Tcp { address: std::net::SocketAddr },
}

impl From<std::net::SocketAddr> for ServerAddr {
    fn from(address: std::net::SocketAddr) -> Self {
        Self::Tcp { address }
    }
}
