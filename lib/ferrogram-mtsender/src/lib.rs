// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This library serves to abstract the connection to Telegram's servers.
//!
//! The [`Sender`] is the base building block that manages a single network
//! connection, the transport state, and the MTP state, as well as taking
//! care of buffering messages before sending them off in a single container.
//! It also keeps the connection alive with pings, and can re-establish it
//! after a failure without losing the requests that were still in flight.
//!
//! To interact with the API, it is often needed to create more than one
//! connection, for either migrations during sign in or file transfers.
//! To that end, the [`SenderPool`] is the one that manages any number
//! of `Sender`. This will commonly be the entry point to using this library.

#![deny(unsafe_code)]

mod configuration;
mod errors;
mod net;
mod sender;
mod sender_pool;

pub use configuration::{BoxedTransport, ConnectionParams, TransportMode};
pub use errors::{InvocationError, ReadError, RpcError, RpcErrorKind};
pub use net::ServerAddr;
pub use sender::{
    Sender, SenderState, UpdatesLike, connect, connect_with_auth, connect_with_keys,
    generate_auth_key, generate_auth_key_with_keys,
};
pub use sender_pool::{SenderPool, SenderPoolHandle, SenderPoolRunner};
