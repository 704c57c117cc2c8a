// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::msg_id::MsgIdGenerator;
use super::{Deserialization, DeserializeError, Mtp, RpcResult};
use crate::MsgId;
use ferrogram_crypto::DequeBuffer;
use ferrogram_tl_types::{Cursor, Deserializable, Serializable};

/// `auth_key_id`, `msg_id` and `message_data_length`.
const HEADER_LEN: usize = 8 + 8 + 4;

/// An implementation of the [Mobile Transport Protocol] for plaintext
/// (unencrypted) messages.
///
/// Plain messages are only used to exchange the requests needed to
/// generate an authorization key, one at a time, so the buffer holds
/// at most one message.
///
/// [Mobile Transport Protocol]: https://core.telegram.org/mtproto/description#unencrypted-message
pub struct Plain {
    msg_ids: MsgIdGenerator,
    last_msg_id: i64,
}

#[allow(clippy::new_without_default)]
impl Plain {
    pub fn new() -> Self {
        Self {
            msg_ids: MsgIdGenerator::new(0),
            last_msg_id: 0,
        }
    }
}

impl Mtp for Plain {
    /// Wraps a request's data into a plain message and writes it to the buffer.
    ///
    /// Returns `None` if the buffer already contains a message.
    fn push(&mut self, buffer: &mut DequeBuffer<u8>, request: &[u8]) -> Option<MsgId> {
        if !buffer.is_empty() {
            return None;
        }

        let msg_id = self.msg_ids.next();
        0i64.serialize(buffer); // auth_key_id
        msg_id.serialize(buffer);
        (request.len() as i32).serialize(buffer);
        buffer.extend(request.iter());

        self.last_msg_id = msg_id;
        Some(MsgId(msg_id))
    }

    fn finalize(&mut self, buffer: &mut DequeBuffer<u8>) -> Option<MsgId> {
        if buffer.is_empty() {
            None
        } else {
            Some(MsgId(self.last_msg_id))
        }
    }

    /// Validates that the returned data is a correct plain message, and
    /// if it is, returns its body as the result of the last request sent.
    fn deserialize(
        &mut self,
        payload: &mut [u8],
    ) -> Result<Vec<Deserialization>, DeserializeError> {
        if payload.len() < HEADER_LEN {
            return Err(DeserializeError::MessageBufferTooSmall);
        }

        let mut buf = Cursor::from_slice(payload);
        let auth_key_id = i64::deserialize(&mut buf)?;
        if auth_key_id != 0 {
            return Err(DeserializeError::BadAuthKey {
                got: auth_key_id,
                expected: 0,
            });
        }

        // The server time can't be validated yet, since our own clock may
        // be off until the first encrypted message arrives. Responses do
        // however have to be `1` modulo 4.
        let msg_id = i64::deserialize(&mut buf)?;
        if msg_id <= 0 || (msg_id % 4) != 1 {
            return Err(DeserializeError::BadMessageId { got: msg_id });
        }

        let len = i32::deserialize(&mut buf)?;
        if len <= 0 {
            return Err(DeserializeError::NegativeMessageLength { got: len });
        }
        let len = len as usize;
        if HEADER_LEN + len > payload.len() {
            return Err(DeserializeError::TooLongMessageLength {
                got: len,
                max_length: payload.len() - HEADER_LEN,
            });
        }

        Ok(vec![Deserialization::RpcResult(RpcResult {
            msg_id: MsgId(self.last_msg_id),
            body: payload[HEADER_LEN..HEADER_LEN + len].to_vec(),
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(msg_id: i64, body: &[u8]) -> Vec<u8> {
        let mut payload = Vec::new();
        0i64.serialize(&mut payload);
        msg_id.serialize(&mut payload);
        (body.len() as i32).serialize(&mut payload);
        payload.extend_from_slice(body);
        payload
    }

    #[test]
    fn only_one_message_fits() {
        let mut mtp = Plain::new();
        let mut buffer = DequeBuffer::with_capacity(0, 0);

        let msg_id = mtp.push(&mut buffer, b"Hey!").unwrap();
        assert_eq!(buffer.len(), HEADER_LEN + 4);
        assert_eq!(buffer[..8], [0; 8]);
        assert_eq!(msg_id.value() & 3, 0);

        assert_eq!(mtp.push(&mut buffer, b"Hey!"), None);
        assert_eq!(mtp.finalize(&mut buffer), Some(msg_id));
    }

    #[test]
    fn response_is_matched_to_last_request() {
        let mut mtp = Plain::new();
        let mut buffer = DequeBuffer::with_capacity(0, 0);
        let msg_id = mtp.push(&mut buffer, b"Hey!").unwrap();

        let mut payload = response(0x51e57ac42770964d, b"Ok!!");
        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![Deserialization::RpcResult(RpcResult {
                msg_id,
                body: b"Ok!!".to_vec(),
            })])
        );
    }

    #[test]
    fn bad_responses_are_rejected() {
        let mut mtp = Plain::new();

        let mut payload = response(0x51e57ac42770964c, b"Ok!!");
        assert_eq!(
            mtp.deserialize(&mut payload),
            Err(DeserializeError::BadMessageId {
                got: 0x51e57ac42770964c
            })
        );

        let mut payload = response(1, b"Ok!!");
        payload[..8].copy_from_slice(&7i64.to_le_bytes());
        assert_eq!(
            mtp.deserialize(&mut payload),
            Err(DeserializeError::BadAuthKey {
                got: 7,
                expected: 0
            })
        );

        let mut payload = response(1, b"Ok!!");
        payload.truncate(HEADER_LEN + 2);
        assert_eq!(
            mtp.deserialize(&mut payload),
            Err(DeserializeError::TooLongMessageLength {
                got: 4,
                max_length: 2
            })
        );
    }
}
