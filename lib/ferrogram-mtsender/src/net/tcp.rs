// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use log::info;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
pub use tokio::net::tcp::{ReadHalf, WriteHalf};

use super::ServerAddr;

pub enum NetStream {
    Tcp(TcpStream),
}

impl NetStream {
    pub(crate) fn split(&mut self) -> (ReadHalf<'_>, WriteHalf<'_>) {
        match self {
            Self::Tcp(stream) => stream.split(),
        }
    }

    pub(crate) async fn connect(addr: &ServerAddr) -> Result<Self, std::io::Error> {
        match addr {
            ServerAddr::Tcp { address } => {
                info!("connecting to {address}...");
                let stream = TcpStream::connect(address).await?;
                stream.set_nodelay(true)?;
                Ok(NetStream::Tcp(stream))
            }
        }
    }

    pub(crate) async fn shutdown(&mut self) -> Result<(), std::io::Error> {
        match self {
            Self::Tcp(stream) => stream.shutdown().await,
        }
    }
}
