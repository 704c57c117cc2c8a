// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Constructors whose body is an arbitrary serialized object, which the
//! generated types cannot represent.
use crate::mtp::DeserializeError;
use ferrogram_tl_types::deserialize::{Buffer, Error as ReadError, Result as ReadResult};
use ferrogram_tl_types::{Deserializable, Identifiable, Serializable};
use flate2::Compression;
use flate2::write::{GzDecoder, GzEncoder};
use std::io::Write;

fn expect_constructor<T: Identifiable>(buf: Buffer) -> ReadResult<()> {
    match u32::deserialize(buf)? {
        id if id == T::CONSTRUCTOR_ID => Ok(()),
        id => Err(ReadError::UnexpectedConstructor { id }),
    }
}

/// Reads a length prefix, refusing anything that cannot fit in a container.
fn read_len(buf: Buffer, max: usize) -> ReadResult<usize> {
    usize::try_from(i32::deserialize(buf)?)
        .ok()
        .filter(|&len| len <= max)
        .ok_or(ReadError::UnexpectedEof)
}

/// `message msg_id:long seqno:int bytes:int body:Object = Message`
pub(crate) struct Message {
    pub msg_id: i64,
    pub seq_no: i32,
    pub body: Vec<u8>,
}

impl Message {
    /// Bytes taken by `msg_id`, `seqno` and `bytes`.
    pub const SIZE_OVERHEAD: usize = 8 + 4 + 4;

    pub fn constructor_id(&self) -> Result<u32, ReadError> {
        u32::from_bytes(&self.body)
    }

    /// Odd sequence numbers mark content messages, which the receiver acknowledges.
    pub fn requires_ack(&self) -> bool {
        self.seq_no & 1 == 1
    }
}

impl Serializable for Message {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.msg_id.serialize(buf);
        self.seq_no.serialize(buf);
        (self.body.len() as i32).serialize(buf);
        buf.extend(self.body.iter().copied());
    }
}

impl Deserializable for Message {
    fn deserialize(buf: Buffer) -> ReadResult<Self> {
        let msg_id = i64::deserialize(buf)?;
        let seq_no = i32::deserialize(buf)?;
        let mut body = vec![0; read_len(buf, MessageContainer::MAXIMUM_SIZE)?];
        buf.read_exact(&mut body)?;
        Ok(Self {
            msg_id,
            seq_no,
            body,
        })
    }
}

/// `rpc_result#f35c6d01 req_msg_id:long result:Object = RpcResult`
pub(crate) struct RpcResult {
    pub req_msg_id: i64,
    pub result: Vec<u8>,
}

impl RpcResult {
    pub fn inner_constructor(&self) -> Result<u32, ReadError> {
        u32::from_bytes(&self.result)
    }
}

impl Identifiable for RpcResult {
    const CONSTRUCTOR_ID: u32 = 0xf35c6d01;
}

impl Serializable for RpcResult {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.req_msg_id.serialize(buf);
        buf.extend(self.result.iter().copied());
    }
}

impl Deserializable for RpcResult {
    fn deserialize(buf: Buffer) -> ReadResult<Self> {
        expect_constructor::<Self>(buf)?;
        let req_msg_id = i64::deserialize(buf)?;
        // The result runs until the end of the message.
        let mut result = Vec::new();
        buf.read_to_end(&mut result)?;
        Ok(Self { req_msg_id, result })
    }
}

/// `msg_container#73f1f8dc messages:vector<message> = MessageContainer`
pub(crate) struct MessageContainer {
    pub messages: Vec<Message>,
}

impl MessageContainer {
    /// Bytes taken by the constructor and the message count.
    pub const SIZE_OVERHEAD: usize = 4 + 4;

    /// The server rejects containers with a larger body.
    pub const MAXIMUM_SIZE: usize = 1_044_456 - Self::SIZE_OVERHEAD;

    /// The server rejects containers with more messages.
    pub const MAXIMUM_LENGTH: usize = 100;
}

impl Identifiable for MessageContainer {
    const CONSTRUCTOR_ID: u32 = 0x73f1f8dc;
}

impl Serializable for MessageContainer {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (self.messages.len() as i32).serialize(buf);
        for message in &self.messages {
            message.serialize(buf);
        }
    }
}

impl Deserializable for MessageContainer {
    fn deserialize(buf: Buffer) -> ReadResult<Self> {
        expect_constructor::<Self>(buf)?;
        let count = read_len(buf, usize::MAX)?;
        let mut messages = Vec::with_capacity(count.min(Self::MAXIMUM_LENGTH));
        for _ in 0..count {
            messages.push(Message::deserialize(buf)?);
        }
        Ok(Self { messages })
    }
}

/// `gzip_packed#3072cfa1 packed_data:bytes = Object`
pub(crate) struct GzipPacked {
    pub packed_data: Vec<u8>,
}

impl GzipPacked {
    pub fn new(data: &[u8]) -> Self {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        // Writing into a Vec cannot fail.
        let _ = encoder.write_all(data);
        Self {
            packed_data: encoder.finish().unwrap_or_default(),
        }
    }

    pub fn decompress(&self) -> Result<Vec<u8>, DeserializeError> {
        let mut decoder = GzDecoder::new(Vec::new());
        decoder
            .write_all(&self.packed_data)
            .and_then(|()| decoder.finish())
            .map_err(|_| DeserializeError::DecompressionFailed)
    }
}

impl Identifiable for GzipPacked {
    const CONSTRUCTOR_ID: u32 = 0x3072cfa1;
}

impl Serializable for GzipPacked {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.packed_data.serialize(buf);
    }
}

impl Deserializable for GzipPacked {
    fn deserialize(buf: Buffer) -> ReadResult<Self> {
        expect_constructor::<Self>(buf)?;
        Ok(Self {
            packed_data: Vec::<u8>::deserialize(buf)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_is_transparent() {
        let data = (0..4096).map(|i| (i % 7) as u8).collect::<Vec<_>>();
        let packed = GzipPacked::new(&data);
        assert!(packed.packed_data.len() < data.len());

        let bytes = packed.to_bytes();
        let unpacked = GzipPacked::from_bytes(&bytes).unwrap().decompress().unwrap();
        assert_eq!(unpacked, data);
    }

    #[test]
    fn corrupted_gzip_fails() {
        let packed = GzipPacked {
            packed_data: vec![0x1f, 0x8b, 0xff, 0xff],
        };
        assert_eq!(packed.decompress(), Err(DeserializeError::DecompressionFailed));
    }

    #[test]
    fn container_keeps_message_order() {
        let message = |msg_id, seq_no, body: &[u8]| Message {
            msg_id,
            seq_no,
            body: body.to_vec(),
        };
        let container = MessageContainer {
            messages: vec![message(5, 1, &[1, 2, 3, 4]), message(9, 2, &[])],
        };
        let bytes = container.to_bytes();
        assert_eq!(
            bytes.len(),
            MessageContainer::SIZE_OVERHEAD + 2 * Message::SIZE_OVERHEAD + 4
        );

        let parsed = MessageContainer::from_bytes(&bytes).unwrap();
        let ids = parsed.messages.iter().map(|m| m.msg_id).collect::<Vec<_>>();
        assert_eq!(ids, [5, 9]);
        assert_eq!(parsed.messages[0].body, [1, 2, 3, 4]);
        assert!(parsed.messages[0].requires_ack());
        assert!(!parsed.messages[1].requires_ack());
    }

    #[test]
    fn wrong_constructor_is_reported() {
        let bytes = MessageContainer { messages: vec![] }.to_bytes();
        assert_eq!(
            GzipPacked::from_bytes(&bytes).err(),
            Some(ReadError::UnexpectedConstructor {
                id: MessageContainer::CONSTRUCTOR_ID
            })
        );
    }

    #[test]
    fn negative_message_length_is_rejected() {
        let mut bytes = Vec::new();
        1i64.serialize(&mut bytes);
        1i32.serialize(&mut bytes);
        (-4i32).serialize(&mut bytes);
        assert!(Message::from_bytes(&bytes).is_err());
    }
}
