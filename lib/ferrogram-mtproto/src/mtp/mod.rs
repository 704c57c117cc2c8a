// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The message layer of MTProto.
//!
//! Outgoing requests are wrapped into messages (and containers, when more
//! than one is queued), and incoming payloads are unwrapped into the
//! [`Deserialization`] events the sender acts upon.
//!
//! The handshake runs over [`Plain`], which keeps almost no state. Once a
//! key exists, every message goes through [`Encrypted`].
mod encrypted;
mod msg_id;
mod plain;

use crate::MsgId;
pub use encrypted::{Builder, Encrypted, SALT_REFRESH_MARGIN};
use ferrogram_crypto::{self as crypto, DequeBuffer};
use ferrogram_tl_types as tl;
pub use msg_id::RECEIVED_WINDOW_SIZE;
pub use plain::Plain;
use std::fmt;

/// The body of an `rpc_result`, not yet parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct RpcResult {
    /// Identifier of the request being answered.
    pub msg_id: MsgId,
    pub body: Vec<u8>,
}

/// An `rpc_result` whose body was an `rpc_error`.
#[derive(Clone, Debug, PartialEq)]
pub struct RpcResultError {
    pub msg_id: MsgId,
    pub error: tl::types::RpcError,
}

/// A `bad_msg_notification` or `bad_server_salt` about one of our messages.
#[derive(Clone, Debug, PartialEq)]
pub struct BadMessage {
    pub msg_id: MsgId,
    pub code: i32,
}

/// A response that arrived but could not be parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct DeserializationFailure {
    pub msg_id: MsgId,
    pub error: DeserializeError,
}

/// Something the sender needs to act on after a payload was processed.
#[derive(Clone, Debug, PartialEq)]
pub enum Deserialization {
    /// A request returned `Updates`. The result is delivered as usual and
    /// this copy goes to the updates pipeline.
    OwnUpdate { msg_id: MsgId, update: Vec<u8> },
    /// `Updates` pushed by the server without being asked for.
    Update(Vec<u8>),
    RpcResult(RpcResult),
    RpcError(RpcResultError),
    BadMessage(BadMessage),
    Failure(DeserializationFailure),
    /// The server never got the message and wants it again.
    Resend(MsgId),
    /// Answer to our `destroy_session`.
    SessionDestroyed { session_id: i64 },
}

/// Codes after which the session was already corrected and the message
/// can go out again.
const RETRYABLE_CODES: [i32; 6] = [16, 17, 32, 33, 34, 48];

impl BadMessage {
    pub fn description(&self) -> &'static str {
        match self.code {
            16 => "msg_id too low (local clock behind)",
            17 => "msg_id too high (local clock ahead)",
            18 => "msg_id lower bits not divisible by 4",
            19 => "container reused a msg_id already received",
            20 => "message too old to be processed",
            32 => "seq_no too low",
            33 => "seq_no too high",
            34 => "expected even seq_no for a service message",
            35 => "expected odd seq_no for a content message",
            48 => "server salt is no longer valid",
            64 => "container was malformed",
            _ => "unrecognized notification code",
        }
    }

    /// Whether the request can be sent again as-is.
    pub fn retryable(&self) -> bool {
        RETRYABLE_CODES.contains(&self.code)
    }

    pub fn fatal(&self) -> bool {
        !self.retryable()
    }
}

/// Which check made an encrypted message untrustworthy.
///
/// The connection is dropped when any of these fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityCheck {
    CiphertextLength,
    AuthKeyId,
    MessageKey,
    SessionId,
    /// Messages from the server must have an odd identifier.
    MessageIdParity,
    MessageLength,
    /// Padding must be between 12 and 1024 bytes.
    Padding,
    /// Identifier already seen, or older than the newest one accepted.
    ReplayedMessageId,
}

impl fmt::Display for SecurityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::CiphertextLength => "ciphertext length is not a multiple of the block",
            Self::AuthKeyId => "message encrypted under another auth key",
            Self::MessageKey => "msg_key does not match the plaintext",
            Self::SessionId => "message belongs to another session",
            Self::MessageIdParity => "server msg_id is even",
            Self::MessageLength => "inner length out of bounds",
            Self::Padding => "padding out of bounds",
            Self::ReplayedMessageId => "msg_id was replayed",
        };
        f.write_str(what)
    }
}

/// Failure to make sense of a payload received from the server.
#[derive(Clone, Debug, PartialEq)]
pub enum DeserializeError {
    /// A plain message carried a non-zero auth key id.
    BadAuthKey { got: i64, expected: i64 },
    BadMessageId { got: i64 },
    NegativeMessageLength { got: i32 },
    TooLongMessageLength { got: usize, max_length: usize },
    /// Ran out of bytes while reading.
    MessageBufferTooSmall,
    DecompressionFailed,
    UnexpectedConstructor { id: u32 },
    SecurityCheckMismatch(SecurityCheck),
}

impl std::error::Error for DeserializeError {}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadAuthKey { got, expected } => {
                write!(f, "auth key id {got} in plain message, want {expected}")
            }
            Self::BadMessageId { got } => write!(f, "invalid msg_id {got}"),
            Self::NegativeMessageLength { got } => write!(f, "message length {got} is negative"),
            Self::TooLongMessageLength { got, max_length } => {
                write!(f, "message length {got} exceeds the {max_length} available")
            }
            Self::MessageBufferTooSmall => f.write_str("payload ended prematurely"),
            Self::DecompressionFailed => f.write_str("gzip_packed could not be inflated"),
            Self::UnexpectedConstructor { id } => write!(f, "unknown constructor {id:08x}"),
            Self::SecurityCheckMismatch(check) => write!(f, "rejected message: {check}"),
        }
    }
}

impl From<tl::deserialize::Error> for DeserializeError {
    fn from(error: tl::deserialize::Error) -> Self {
        match error {
            tl::deserialize::Error::UnexpectedEof => Self::MessageBufferTooSmall,
            tl::deserialize::Error::UnexpectedConstructor { id }
            | tl::deserialize::Error::SchemaMismatch { id, .. } => {
                Self::UnexpectedConstructor { id }
            }
        }
    }
}

impl From<crypto::Error> for DeserializeError {
    fn from(error: crypto::Error) -> Self {
        let check = match error {
            crypto::Error::InvalidBuffer => SecurityCheck::CiphertextLength,
            crypto::Error::AuthKeyMismatch => SecurityCheck::AuthKeyId,
            crypto::Error::MessageKeyMismatch => SecurityCheck::MessageKey,
        };
        Self::SecurityCheckMismatch(check)
    }
}

/// A message layer, either [`Plain`] or [`Encrypted`].
///
/// Requests are added with [`Mtp::push`] until it returns `None` or there
/// is nothing left to send, then [`Mtp::finalize`] seals the buffer so the
/// transport can frame it.
pub trait Mtp {
    /// Appends a serialized request, returning the identifier it was given.
    ///
    /// `None` means the current batch is full and must be finalized first.
    /// Bodies must be 4-byte aligned.
    fn push(&mut self, buffer: &mut DequeBuffer<u8>, request: &[u8]) -> Option<MsgId>;

    /// Seals the batch. Pending acks and other service messages are
    /// included even when no request was pushed, so the buffer may or may
    /// not be empty afterwards.
    ///
    /// Returns the identifier of the outermost message written, if any.
    fn finalize(&mut self, buffer: &mut DequeBuffer<u8>) -> Option<MsgId>;

    /// Processes one payload received through the transport.
    fn deserialize(&mut self, payload: &mut [u8])
    -> Result<Vec<Deserialization>, DeserializeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_and_clock_notifications_are_retryable() {
        for code in [16, 17, 48] {
            assert!(BadMessage { msg_id: MsgId(1), code }.retryable());
        }
        for code in [18, 19, 20, 64, 99] {
            assert!(BadMessage { msg_id: MsgId(1), code }.fatal());
        }
    }

    #[test]
    fn crypto_errors_map_to_security_checks() {
        assert_eq!(
            DeserializeError::from(crypto::Error::MessageKeyMismatch),
            DeserializeError::SecurityCheckMismatch(SecurityCheck::MessageKey)
        );
    }
}
