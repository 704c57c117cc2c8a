// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![deny(unsafe_code)]

//! This library is an implementation of the [Mobile Transport Protocol].
//!
//! It packs enqueued requests into message containers to later be
//! encrypted and transmitted, processes the server responses while
//! verifying every security check, and keeps the session state (salts,
//! sequence numbers, pending acknowledgements) correct along the way.
//!
//! The [`transport`] module frames the encrypted payloads for the wire, and
//! [`authentication`] contains the steps needed to negotiate the
//! authorization key in the first place.
//!
//! Nothing in here performs any IO. The caller owns the connection.
//!
//! [Mobile Transport Protocol]: https://core.telegram.org/mtproto
pub mod authentication;
mod manual_tl;
pub mod mtp;
pub mod transport;

/// The default compression threshold to be used.
pub const DEFAULT_COMPRESSION_THRESHOLD: Option<usize> = Some(512);

/// A Message Identifier.
///
/// When requests are serialized, a new message identifier is attached to them.
/// As server responses get processed, some of them will be RPC responses.
/// The message identifier in the response can be matched with the message identifier
/// that was assigned to the request to determine which request the response is for.
#[derive(Copy, Clone, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct MsgId(pub(crate) i64);

impl MsgId {
    /// The raw identifier, as it travels over the wire.
    pub fn value(self) -> i64 {
        self.0
    }
}
