// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::msg_id::{MsgIdGenerator, ReceivedWindow};
use super::{
    BadMessage, Deserialization, DeserializationFailure, DeserializeError, Mtp, RpcResult,
    RpcResultError, SecurityCheck,
};
use crate::{MsgId, manual_tl};
use ferrogram_crypto::{AuthKey, DequeBuffer, MAX_PADDING, MIN_PADDING, decrypt_data_v2, encrypt_data_v2};
use ferrogram_tl_types::{self as tl, Cursor, Deserializable, Identifiable, Serializable};
use log::{debug, error, info, trace, warn};
use std::mem;

/// How many seconds before the current salt expires new ones are requested.
pub const SALT_REFRESH_MARGIN: i32 = 30;

/// How many future salts to ask for at once.
const FUTURE_SALT_COUNT: i32 = 64;

/// `salt` and `session_id`.
const PLAINTEXT_HEADER_LEN: usize = 8 + 8;

/// `msg_id`, `seq_no` and `length` of a message.
const MESSAGE_HEADER_LEN: usize = manual_tl::Message::SIZE_OVERHEAD;

/// A builder to configure [`Encrypted`] instances.
///
/// Use the [`Encrypted::build`] method to create builder instances.
pub struct Builder {
    time_offset: i32,
    first_salt: i64,
    compression_threshold: Option<usize>,
}

/// An implementation of the [Mobile Transport Protocol] for ciphertext
/// (encrypted) messages.
///
/// [Mobile Transport Protocol]: https://core.telegram.org/mtproto/description
pub struct Encrypted {
    /// The authorization key to use to encrypt payload.
    auth_key: AuthKey,

    /// Generator of outgoing message identifiers, which also owns the time offset.
    msg_ids: MsgIdGenerator,

    /// The current salt to be used when encrypting payload.
    salt: i64,

    /// Known future salts, sorted by the time they become valid.
    salts: Vec<tl::types::FutureSalt>,

    /// Identifier of the in-flight `get_future_salts`, if any.
    salt_request_msg_id: Option<i64>,

    /// The secure, random identifier for this session.
    client_id: i64,

    /// The current message sequence number.
    sequence: i32,

    /// Identifiers of received [content-related messages] that still need
    /// to be acknowledged to the server.
    ///
    /// [content-related messages]: https://core.telegram.org/mtproto/description#content-related-message
    pending_ack: Vec<i64>,

    /// Service messages generated while deserializing, along with whether
    /// they are content-related.
    pending_service: Vec<(Vec<u8>, bool)>,

    /// Recently received message identifiers.
    received: ReceivedWindow,

    /// If present, the threshold in bytes at which a message will be
    /// considered large enough to attempt compressing it. Otherwise,
    /// outgoing messages will never be compressed.
    compression_threshold: Option<usize>,

    /// Results produced by the message currently being deserialized.
    deserialization: Vec<Deserialization>,

    /// How many messages are there in the buffer.
    msg_count: usize,

    /// The identifier of the last message or container written.
    last_msg_id: i64,
}

impl Builder {
    /// Configures the time offset to Telegram servers.
    pub fn time_offset(mut self, offset: i32) -> Self {
        self.time_offset = offset;
        self
    }

    pub fn first_salt(mut self, first_salt: i64) -> Self {
        self.first_salt = first_salt;
        self
    }

    /// Configures the compression threshold for outgoing messages.
    pub fn compression_threshold(mut self, threshold: Option<usize>) -> Self {
        self.compression_threshold = threshold;
        self
    }

    /// Finishes the builder and returns the `Encrypted` instance with all
    /// the configuration changes applied.
    pub fn finish(self, auth_key: [u8; 256]) -> Encrypted {
        Encrypted {
            auth_key: AuthKey::from_bytes(auth_key),
            msg_ids: MsgIdGenerator::new(self.time_offset),
            salt: self.first_salt,
            salts: Vec::new(),
            salt_request_msg_id: None,
            client_id: random_session_id(),
            sequence: 0,
            pending_ack: Vec::new(),
            pending_service: Vec::new(),
            received: ReceivedWindow::default(),
            compression_threshold: self.compression_threshold,
            deserialization: Vec::new(),
            msg_count: 0,
            last_msg_id: 0,
        }
    }
}

fn random_session_id() -> i64 {
    let mut buffer = [0u8; 8];
    getrandom::fill(&mut buffer).expect("failed to generate a secure session_id");
    i64::from_le_bytes(buffer)
}

impl Encrypted {
    /// Start building a new encrypted MTP.
    pub fn build() -> Builder {
        Builder {
            time_offset: 0,
            first_salt: 0,
            compression_threshold: crate::DEFAULT_COMPRESSION_THRESHOLD,
        }
    }

    /// The authorization key used for encryption and decryption.
    pub fn auth_key(&self) -> [u8; 256] {
        self.auth_key.to_bytes()
    }

    /// The random identifier of the current session.
    pub fn session_id(&self) -> i64 {
        self.client_id
    }

    /// The time offset from the server's time, in seconds.
    pub fn time_offset(&self) -> i32 {
        self.msg_ids.time_offset
    }

    /// The salt that will be used for the next encrypted message.
    pub fn salt(&self) -> i64 {
        self.salt
    }

    /// Starts a fresh session under the same authorization key.
    ///
    /// Must be used whenever the underlying connection is replaced, since
    /// the server may otherwise consider the new messages a replay.
    pub fn reset(&mut self) {
        self.client_id = random_session_id();
        self.sequence = 0;
        self.pending_ack.clear();
        self.pending_service.clear();
        self.received.clear();
        self.salt_request_msg_id = None;
        self.msg_count = 0;
        info!("started new session {:x}", self.client_id);
    }

    /// Generates the next sequence number depending on whether
    /// it should be for a content-related query or not.
    fn get_seq_no(&mut self, content_related: bool) -> i32 {
        if content_related {
            self.sequence += 2;
            self.sequence - 1
        } else {
            self.sequence
        }
    }

    fn serialize_msg(
        &mut self,
        buffer: &mut DequeBuffer<u8>,
        body: &[u8],
        content_related: bool,
    ) -> MsgId {
        let msg_id = self.msg_ids.next();
        let seq_no = self.get_seq_no(content_related);

        msg_id.serialize(buffer);
        seq_no.serialize(buffer);
        (body.len() as i32).serialize(buffer);
        buffer.extend(body.iter());

        self.msg_count += 1;
        self.last_msg_id = msg_id;
        MsgId(msg_id)
    }

    /// Drops expired salts and switches to the oldest one that is valid.
    fn rotate_salt(&mut self) {
        let now = self.msg_ids.server_now();
        self.salts.retain(|salt| salt.valid_until > now);
        if let Some(salt) = self.salts.first() {
            if salt.valid_since <= now && salt.salt != self.salt {
                debug!("switching to future salt valid until {}", salt.valid_until);
                self.salt = salt.salt;
            }
        }
    }

    fn needs_future_salts(&self) -> bool {
        if self.salt_request_msg_id.is_some() {
            return false;
        }
        match self.salts.as_slice() {
            [] => true,
            [last] => last.valid_until - SALT_REFRESH_MARGIN <= self.msg_ids.server_now(),
            _ => false,
        }
    }

    /// Writes the messages the protocol itself needs to send, if any.
    fn write_service_messages(&mut self, buffer: &mut DequeBuffer<u8>) {
        self.rotate_salt();
        if self.needs_future_salts() {
            let body = tl::functions::GetFutureSalts {
                num: FUTURE_SALT_COUNT,
            }
            .to_bytes();
            let msg_id = self.serialize_msg(buffer, &body, true);
            self.salt_request_msg_id = Some(msg_id.0);
        }

        if !self.pending_ack.is_empty() {
            let body = tl::enums::MsgsAck::from(tl::types::MsgsAck {
                msg_ids: mem::take(&mut self.pending_ack),
            })
            .to_bytes();
            self.serialize_msg(buffer, &body, false);
        }

        for (body, content_related) in mem::take(&mut self.pending_service) {
            self.serialize_msg(buffer, &body, content_related);
        }
    }

    fn push_result(&mut self, msg_id: MsgId, body: Vec<u8>) {
        match u32::from_bytes(&body) {
            Ok(tl::types::RpcError::CONSTRUCTOR_ID) => {
                match tl::enums::RpcError::from_bytes(&body) {
                    Ok(tl::enums::RpcError::RpcError(error)) => self
                        .deserialization
                        .push(Deserialization::RpcError(RpcResultError { msg_id, error })),
                    Err(e) => self.push_failure(msg_id, e.into()),
                }
            }
            Ok(tl::types::FutureSalts::CONSTRUCTOR_ID)
                if Some(msg_id.0) == self.salt_request_msg_id =>
            {
                match tl::enums::FutureSalts::from_bytes(&body) {
                    Ok(tl::enums::FutureSalts::FutureSalts(salts)) => self.adopt_salts(salts),
                    Err(e) => {
                        warn!("failed to deserialize future salts: {e}");
                        self.salt_request_msg_id = None;
                    }
                }
            }
            Ok(id) => {
                // Updates produced by our own requests may bump `pts`, so they
                // are processed like any other or gaps would appear.
                if tl::enums::Updates::CONSTRUCTOR_IDS.contains(&id) {
                    self.deserialization.push(Deserialization::OwnUpdate {
                        msg_id,
                        update: body.clone(),
                    });
                }
                self.deserialization
                    .push(Deserialization::RpcResult(RpcResult { msg_id, body }));
            }
            Err(e) => self.push_failure(msg_id, e.into()),
        }
    }

    fn push_failure(&mut self, msg_id: MsgId, error: DeserializeError) {
        self.deserialization
            .push(Deserialization::Failure(DeserializationFailure { msg_id, error }));
    }

    fn adopt_salts(&mut self, salts: tl::types::FutureSalts) {
        self.salt_request_msg_id = None;
        self.salts = salts.salts.0;
        self.salts.sort_by_key(|salt| salt.valid_since);
        debug!("received {} future salts", self.salts.len());
        self.rotate_salt();
    }

    fn process_message(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        if message.requires_ack() {
            self.pending_ack.push(message.msg_id);
        }

        // Service messages are listed in the same order as in
        // https://core.telegram.org/mtproto/service_messages and
        // https://core.telegram.org/mtproto/service_messages_about_messages
        match message.constructor_id()? {
            manual_tl::RpcResult::CONSTRUCTOR_ID => self.handle_rpc_result(message),
            tl::types::MsgsAck::CONSTRUCTOR_ID => self.handle_ack(message),
            tl::types::BadMsgNotification::CONSTRUCTOR_ID
            | tl::types::BadServerSalt::CONSTRUCTOR_ID => self.handle_bad_notification(message),
            tl::types::MsgsStateReq::CONSTRUCTOR_ID => self.handle_state_req(message),
            tl::types::MsgsStateInfo::CONSTRUCTOR_ID => self.handle_state_info(message),
            tl::types::MsgsAllInfo::CONSTRUCTOR_ID => self.handle_msg_all(message),
            tl::types::MsgDetailedInfo::CONSTRUCTOR_ID
            | tl::types::MsgNewDetailedInfo::CONSTRUCTOR_ID => self.handle_detailed_info(message),
            tl::types::MsgResendReq::CONSTRUCTOR_ID => self.handle_msg_resend(message),
            tl::types::FutureSalts::CONSTRUCTOR_ID => self.handle_future_salts(message),
            tl::types::Pong::CONSTRUCTOR_ID => self.handle_pong(message),
            tl::types::DestroySessionOk::CONSTRUCTOR_ID
            | tl::types::DestroySessionNone::CONSTRUCTOR_ID => self.handle_destroy_session(message),
            tl::types::NewSessionCreated::CONSTRUCTOR_ID => {
                self.handle_new_session_created(message)
            }
            manual_tl::MessageContainer::CONSTRUCTOR_ID => self.handle_container(message),
            manual_tl::GzipPacked::CONSTRUCTOR_ID => self.handle_gzip_packed(message),
            _ => self.handle_update(message),
        }
    }

    /// **[Response to an RPC query]**
    ///
    /// ```tl
    /// rpc_result#f35c6d01 req_msg_id:long result:Object = RpcResult;
    /// ```
    ///
    /// The result may be an `rpc_error`, one of the `rpc_drop_answer`
    /// answers, or the compressed form of any of them.
    ///
    /// [Response to an RPC query]: https://core.telegram.org/mtproto/service_messages#response-to-an-rpc-query
    fn handle_rpc_result(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let rpc_result = manual_tl::RpcResult::from_bytes(&message.body)?;
        let inner_constructor = rpc_result.inner_constructor();
        let manual_tl::RpcResult { req_msg_id, result } = rpc_result;
        let msg_id = MsgId(req_msg_id);

        // Errors in the result belong to the request, not to this message.
        let inner_constructor = match inner_constructor {
            Ok(x) => x,
            Err(e) => {
                self.push_failure(msg_id, e.into());
                return Ok(());
            }
        };

        match inner_constructor {
            tl::types::RpcAnswerUnknown::CONSTRUCTOR_ID => {
                debug!("server knows nothing of the answer to {req_msg_id}");
                self.push_result(msg_id, result);
            }
            tl::types::RpcAnswerDroppedRunning::CONSTRUCTOR_ID => {
                debug!("answer to {req_msg_id} dropped while the query was running");
                self.push_result(msg_id, result);
            }
            tl::types::RpcAnswerDropped::CONSTRUCTOR_ID => {
                debug!("answer to {req_msg_id} removed from the server queue");
                self.push_result(msg_id, result);
            }
            manual_tl::GzipPacked::CONSTRUCTOR_ID => {
                match manual_tl::GzipPacked::from_bytes(&result)
                    .map_err(DeserializeError::from)
                    .and_then(|gzip| gzip.decompress())
                {
                    Ok(body) => self.push_result(msg_id, body),
                    Err(e) => self.push_failure(msg_id, e),
                }
            }
            _ => self.push_result(msg_id, result),
        }

        Ok(())
    }

    /// **[Acknowledgment of Receipt]**
    ///
    /// [Acknowledgment of Receipt]: https://core.telegram.org/mtproto/service_messages_about_messages#acknowledgment-of-receipt
    fn handle_ack(&self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::MsgsAck::MsgsAck(ack) = tl::enums::MsgsAck::from_bytes(&message.body)?;
        trace!("server acknowledged {:?}", ack.msg_ids);
        Ok(())
    }

    /// **[Notice of Ignored Error Message]**
    ///
    /// ```tl
    /// bad_msg_notification#a7eff811 bad_msg_id:long bad_msg_seqno:int error_code:int = BadMsgNotification;
    /// bad_server_salt#edab447b bad_msg_id:long bad_msg_seqno:int error_code:int new_server_salt:long = BadMsgNotification;
    /// ```
    ///
    /// The session state is corrected here, so the caller only has to
    /// decide whether to resend the message with a new identifier.
    ///
    /// [Notice of Ignored Error Message]: https://core.telegram.org/mtproto/service_messages_about_messages#notice-of-ignored-error-message
    fn handle_bad_notification(
        &mut self,
        message: manual_tl::Message,
    ) -> Result<(), DeserializeError> {
        let (bad_msg_id, code) = match tl::enums::BadMsgNotification::from_bytes(&message.body)? {
            tl::enums::BadMsgNotification::BadMsgNotification(x) => (x.bad_msg_id, x.error_code),
            tl::enums::BadMsgNotification::BadServerSalt(x) => {
                self.salt = x.new_server_salt;
                self.salts.clear();
                (x.bad_msg_id, x.error_code)
            }
        };

        match code {
            // `msg_id` too low or too high, our `time_offset` is wrong.
            16 | 17 => self.msg_ids.correct(message.msg_id),
            // `seq_no` too low. Bump it by some large-ish value.
            32 => self.sequence += 64,
            // `seq_no` too high.
            33 => self.sequence -= 16,
            _ => {}
        }

        if Some(bad_msg_id) == self.salt_request_msg_id {
            self.salt_request_msg_id = None;
        }

        let bad_msg = BadMessage {
            msg_id: MsgId(bad_msg_id),
            code,
        };
        if bad_msg.fatal() {
            error!(
                "bad msg {bad_msg_id} ({code}): {}",
                bad_msg.description()
            );
        } else {
            debug!(
                "bad msg {bad_msg_id} ({code}): {}",
                bad_msg.description()
            );
        }
        self.deserialization.push(Deserialization::BadMessage(bad_msg));
        Ok(())
    }

    /// **[Request for Message Status Information]**
    ///
    /// Answered with one status byte per identifier, based on the
    /// identifiers received recently.
    ///
    /// [Request for Message Status Information]: https://core.telegram.org/mtproto/service_messages_about_messages#request-for-message-status-information
    fn handle_state_req(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::MsgsStateReq::MsgsStateReq(req) =
            tl::enums::MsgsStateReq::from_bytes(&message.body)?;

        let info = req
            .msg_ids
            .iter()
            .map(|&msg_id| self.received.state_of(msg_id))
            .collect();

        let body = tl::enums::MsgsStateInfo::from(tl::types::MsgsStateInfo {
            req_msg_id: message.msg_id,
            info,
        })
        .to_bytes();
        self.pending_service.push((body, false));
        Ok(())
    }

    fn handle_state_info(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::MsgsStateInfo::MsgsStateInfo(info) =
            tl::enums::MsgsStateInfo::from_bytes(&message.body)?;
        debug!(
            "status of messages requested in {}: {:?}",
            info.req_msg_id, info.info
        );
        Ok(())
    }

    fn handle_msg_all(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::MsgsAllInfo::MsgsAllInfo(info) =
            tl::enums::MsgsAllInfo::from_bytes(&message.body)?;
        debug!(
            "server reported status of {} messages",
            info.msg_ids.len()
        );
        Ok(())
    }

    /// **[Extended Voluntary Communication of Status of One Message]**
    ///
    /// Answers we already have are acknowledged, the rest are requested again.
    ///
    /// [Extended Voluntary Communication of Status of One Message]: https://core.telegram.org/mtproto/service_messages_about_messages#extended-voluntary-communication-of-status-of-one-message
    fn handle_detailed_info(
        &mut self,
        message: manual_tl::Message,
    ) -> Result<(), DeserializeError> {
        let answer_msg_id = match tl::enums::MsgDetailedInfo::from_bytes(&message.body)? {
            tl::enums::MsgDetailedInfo::MsgDetailedInfo(x) => x.answer_msg_id,
            tl::enums::MsgDetailedInfo::MsgNewDetailedInfo(x) => x.answer_msg_id,
        };

        if self.received.contains(answer_msg_id) {
            self.pending_ack.push(answer_msg_id);
        } else {
            debug!("requesting answer {answer_msg_id} again");
            let body = tl::enums::MsgResendReq::from(tl::types::MsgResendReq {
                msg_ids: vec![answer_msg_id],
            })
            .to_bytes();
            self.pending_service.push((body, true));
        }
        Ok(())
    }

    fn handle_msg_resend(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::MsgResendReq::MsgResendReq(req) =
            tl::enums::MsgResendReq::from_bytes(&message.body)?;
        self.deserialization.extend(
            req.msg_ids
                .into_iter()
                .map(|msg_id| Deserialization::Resend(MsgId(msg_id))),
        );
        Ok(())
    }

    fn handle_future_salts(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::FutureSalts::FutureSalts(salts) =
            tl::enums::FutureSalts::from_bytes(&message.body)?;

        if Some(salts.req_msg_id) == self.salt_request_msg_id {
            self.adopt_salts(salts);
        } else {
            self.deserialization.push(Deserialization::RpcResult(RpcResult {
                msg_id: MsgId(salts.req_msg_id),
                body: message.body,
            }));
        }
        Ok(())
    }

    fn handle_pong(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::Pong::Pong(pong) = tl::enums::Pong::from_bytes(&message.body)?;

        self.deserialization.push(Deserialization::RpcResult(RpcResult {
            msg_id: MsgId(pong.msg_id),
            body: message.body,
        }));
        Ok(())
    }

    fn handle_destroy_session(
        &mut self,
        message: manual_tl::Message,
    ) -> Result<(), DeserializeError> {
        let session_id = match tl::enums::DestroySessionRes::from_bytes(&message.body)? {
            tl::enums::DestroySessionRes::DestroySessionOk(x) => x.session_id,
            tl::enums::DestroySessionRes::DestroySessionNone(x) => x.session_id,
        };
        self.deserialization
            .push(Deserialization::SessionDestroyed { session_id });
        Ok(())
    }

    fn handle_new_session_created(
        &mut self,
        message: manual_tl::Message,
    ) -> Result<(), DeserializeError> {
        let tl::enums::NewSession::Created(session) =
            tl::enums::NewSession::from_bytes(&message.body)?;
        info!(
            "server created new session starting at {}",
            session.first_msg_id
        );
        self.salt = session.server_salt;
        Ok(())
    }

    fn handle_container(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let container = manual_tl::MessageContainer::from_bytes(&message.body)?;
        for inner_message in container.messages {
            if inner_message.constructor_id() == Ok(manual_tl::MessageContainer::CONSTRUCTOR_ID) {
                warn!("ignoring nested container {}", inner_message.msg_id);
                continue;
            }
            if self.received.contains(inner_message.msg_id) {
                debug!("ignoring duplicate message {}", inner_message.msg_id);
                continue;
            }
            self.received.remember(inner_message.msg_id);

            let msg_id = inner_message.msg_id;
            if let Err(e) = self.process_message(inner_message) {
                warn!("failed to process message {msg_id} in container: {e}");
            }
        }

        Ok(())
    }

    fn handle_gzip_packed(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let packed = manual_tl::GzipPacked::from_bytes(&message.body)?;
        // The outer message was already acknowledged if needed.
        self.process_message(manual_tl::Message {
            msg_id: message.msg_id,
            seq_no: 0,
            body: packed.decompress()?,
        })
    }

    fn handle_update(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        self.deserialization
            .push(Deserialization::Update(message.body));
        Ok(())
    }

    /// Validates the decrypted plaintext and extracts the only message in it.
    fn parse_plaintext(&self, plaintext: &[u8]) -> Result<manual_tl::Message, DeserializeError> {
        let mismatch = DeserializeError::SecurityCheckMismatch;
        if plaintext.len() < PLAINTEXT_HEADER_LEN + MESSAGE_HEADER_LEN + MIN_PADDING {
            return Err(mismatch(SecurityCheck::MessageLength));
        }

        let mut buf = Cursor::from_slice(plaintext);
        let _salt = i64::deserialize(&mut buf)?;
        let session_id = i64::deserialize(&mut buf)?;
        if session_id != self.client_id {
            return Err(mismatch(SecurityCheck::SessionId));
        }

        let msg_id = i64::deserialize(&mut buf)?;
        if msg_id % 2 == 0 {
            return Err(mismatch(SecurityCheck::MessageIdParity));
        }

        let seq_no = i32::deserialize(&mut buf)?;
        let len = i32::deserialize(&mut buf)?;
        let max_len = plaintext.len() - PLAINTEXT_HEADER_LEN - MESSAGE_HEADER_LEN;
        if len < 0 || len % 4 != 0 || len as usize > max_len {
            return Err(mismatch(SecurityCheck::MessageLength));
        }

        let padding = max_len - len as usize;
        if !(MIN_PADDING..=MAX_PADDING).contains(&padding) {
            return Err(mismatch(SecurityCheck::Padding));
        }

        let start = PLAINTEXT_HEADER_LEN + MESSAGE_HEADER_LEN;
        Ok(manual_tl::Message {
            msg_id,
            seq_no,
            body: plaintext[start..start + len as usize].to_vec(),
        })
    }
}

impl Mtp for Encrypted {
    fn push(&mut self, buffer: &mut DequeBuffer<u8>, request: &[u8]) -> Option<MsgId> {
        if self.msg_count == 0 {
            self.write_service_messages(buffer);
        }

        assert!(request.len() % 4 == 0);
        assert!(
            request.len() + MESSAGE_HEADER_LEN <= manual_tl::MessageContainer::MAXIMUM_SIZE,
            "request too large to be sent"
        );

        if self.msg_count >= manual_tl::MessageContainer::MAXIMUM_LENGTH {
            return None;
        }

        let compressed = match self.compression_threshold {
            Some(threshold) if request.len() >= threshold => {
                let compressed = manual_tl::GzipPacked::new(request).to_bytes();
                (compressed.len() < request.len()).then_some(compressed)
            }
            _ => None,
        };
        let body = compressed.as_deref().unwrap_or(request);

        let new_size = buffer.len() + MESSAGE_HEADER_LEN + body.len();
        if self.msg_count > 0 && new_size > manual_tl::MessageContainer::MAXIMUM_SIZE {
            return None;
        }

        Some(self.serialize_msg(buffer, body, true))
    }

    fn finalize(&mut self, buffer: &mut DequeBuffer<u8>) -> Option<MsgId> {
        if self.msg_count == 0 {
            self.write_service_messages(buffer);
        }
        if self.msg_count == 0 {
            return None;
        }

        if self.msg_count > 1 {
            let container_id = self.msg_ids.next();
            let seq_no = self.get_seq_no(false);
            let len = (buffer.len() + manual_tl::MessageContainer::SIZE_OVERHEAD) as i32;

            let mut header = Vec::with_capacity(
                MESSAGE_HEADER_LEN + manual_tl::MessageContainer::SIZE_OVERHEAD,
            );
            container_id.serialize(&mut header);
            seq_no.serialize(&mut header);
            len.serialize(&mut header);
            manual_tl::MessageContainer::CONSTRUCTOR_ID.serialize(&mut header);
            (self.msg_count as i32).serialize(&mut header);
            buffer.extend_front(&header);

            self.last_msg_id = container_id;
        }

        let mut header = Vec::with_capacity(PLAINTEXT_HEADER_LEN);
        self.salt.serialize(&mut header);
        self.client_id.serialize(&mut header);
        buffer.extend_front(&header);

        encrypt_data_v2(buffer, &self.auth_key);
        self.msg_count = 0;
        Some(MsgId(self.last_msg_id))
    }

    fn deserialize(
        &mut self,
        payload: &mut [u8],
    ) -> Result<Vec<Deserialization>, DeserializeError> {
        // Transports may append their own padding after the ciphertext.
        let len = if payload.len() >= 24 {
            payload.len() - (payload.len() - 24) % 16
        } else {
            payload.len()
        };

        let plaintext = decrypt_data_v2(&mut payload[..len], &self.auth_key)?;
        let message = self.parse_plaintext(plaintext)?;

        if !self.received.accept_outer(message.msg_id) {
            return Err(DeserializeError::SecurityCheckMismatch(
                SecurityCheck::ReplayedMessageId,
            ));
        }

        let result = self.process_message(message);
        let deserialization = mem::take(&mut self.deserialization);
        result.map(|()| deserialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrogram_crypto::{Side, decrypt_data_v2_as, encrypt_data_v2_as};

    const FIRST_SERVER_MSG_ID: i64 = 0x5f00_0000_0000_0001;

    fn auth_key() -> [u8; 256] {
        let mut key = [0u8; 256];
        key.iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = i as u8);
        key
    }

    /// An instance that already knows which salt to use.
    fn settled_mtp() -> Encrypted {
        let mut mtp = Encrypted::build()
            .compression_threshold(None)
            .finish(auth_key());
        mtp.salts = vec![tl::types::FutureSalt {
            valid_since: 0,
            valid_until: i32::MAX,
            salt: 1,
        }];
        mtp
    }

    fn server_message(session_id: i64, msg_id: i64, seq_no: i32, body: &[u8]) -> Vec<u8> {
        let mut buffer = DequeBuffer::with_capacity(0, 0);
        1i64.serialize(&mut buffer);
        session_id.serialize(&mut buffer);
        msg_id.serialize(&mut buffer);
        seq_no.serialize(&mut buffer);
        (body.len() as i32).serialize(&mut buffer);
        buffer.extend(body.iter());
        encrypt_data_v2_as(&mut buffer, &AuthKey::from_bytes(auth_key()), Side::Server);
        buffer.as_ref().to_vec()
    }

    /// Decrypts what the client sent and returns `(salt, message)`.
    fn client_message(buffer: &DequeBuffer<u8>) -> (i64, manual_tl::Message) {
        let mut data = buffer.as_ref().to_vec();
        let plaintext =
            decrypt_data_v2_as(&mut data, &AuthKey::from_bytes(auth_key()), Side::Client).unwrap();
        let mut cursor = Cursor::from_slice(plaintext);
        let salt = i64::deserialize(&mut cursor).unwrap();
        let _session_id = i64::deserialize(&mut cursor).unwrap();
        (salt, manual_tl::Message::deserialize(&mut cursor).unwrap())
    }

    fn rpc_result(req_msg_id: i64, result: Vec<u8>) -> Vec<u8> {
        manual_tl::RpcResult { req_msg_id, result }.to_bytes()
    }

    #[test]
    fn first_push_requests_future_salts() {
        let mut mtp = Encrypted::build().finish(auth_key());
        let mut buffer = DequeBuffer::with_capacity(0, 0);

        let msg_id = mtp.push(&mut buffer, b"Hey!").unwrap();
        let container_id = mtp.finalize(&mut buffer).unwrap();
        assert!(container_id.0 > msg_id.0);

        let (_, message) = client_message(&buffer);
        assert_eq!(message.msg_id, container_id.0);
        assert_eq!(message.seq_no, 4);

        let container = manual_tl::MessageContainer::from_bytes(&message.body).unwrap();
        assert_eq!(container.messages.len(), 2);
        assert_eq!(
            container.messages[0].constructor_id(),
            Ok(tl::functions::GetFutureSalts::CONSTRUCTOR_ID)
        );
        assert_eq!(container.messages[0].seq_no, 1);
        assert_eq!(container.messages[1].msg_id, msg_id.0);
        assert_eq!(container.messages[1].seq_no, 3);
        assert_eq!(container.messages[1].body, b"Hey!");
        assert_eq!(mtp.salt_request_msg_id, Some(container.messages[0].msg_id));
    }

    #[test]
    fn future_salts_are_adopted() {
        let mut mtp = Encrypted::build().finish(auth_key());
        let mut buffer = DequeBuffer::with_capacity(0, 0);
        mtp.push(&mut buffer, b"Hey!").unwrap();
        mtp.finalize(&mut buffer).unwrap();

        let now = mtp.msg_ids.server_now();
        let salts = tl::enums::FutureSalts::from(tl::types::FutureSalts {
            req_msg_id: mtp.salt_request_msg_id.unwrap(),
            now,
            salts: tl::RawVec(vec![tl::types::FutureSalt {
                valid_since: now - 10,
                valid_until: now + 3600,
                salt: 42,
            }]),
        })
        .to_bytes();

        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &salts);
        assert_eq!(mtp.deserialize(&mut payload), Ok(vec![]));
        assert_eq!(mtp.salt(), 42);
        assert_eq!(mtp.salt_request_msg_id, None);

        buffer.clear();
        let msg_id = mtp.push(&mut buffer, b"Hey!").unwrap();
        assert_eq!(mtp.finalize(&mut buffer), Some(msg_id));

        let (salt, message) = client_message(&buffer);
        assert_eq!(salt, 42);
        assert_eq!(message.msg_id, msg_id.0);
        assert_eq!(message.body, b"Hey!");
    }

    #[test]
    fn finalize_without_messages_writes_nothing() {
        let mut mtp = settled_mtp();
        let mut buffer = DequeBuffer::with_capacity(0, 0);
        assert_eq!(mtp.finalize(&mut buffer), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn rpc_results_are_returned_and_acknowledged() {
        let mut mtp = settled_mtp();
        let server_msg_id = FIRST_SERVER_MSG_ID;
        let mut payload = server_message(
            mtp.session_id(),
            server_msg_id,
            1,
            &rpc_result(1234, b"Ok!!".to_vec()),
        );

        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![Deserialization::RpcResult(RpcResult {
                msg_id: MsgId(1234),
                body: b"Ok!!".to_vec(),
            })])
        );

        let mut buffer = DequeBuffer::with_capacity(0, 0);
        assert!(mtp.finalize(&mut buffer).is_some());
        let (salt, message) = client_message(&buffer);
        assert_eq!(salt, 1);
        assert_eq!(message.seq_no % 2, 0);
        assert_eq!(
            tl::enums::MsgsAck::from_bytes(&message.body),
            Ok(tl::enums::MsgsAck::MsgsAck(tl::types::MsgsAck {
                msg_ids: vec![server_msg_id]
            }))
        );
    }

    #[test]
    fn rpc_errors_are_parsed() {
        let mut mtp = settled_mtp();
        let error = tl::types::RpcError {
            error_code: 420,
            error_message: "FLOOD_WAIT_31".into(),
        };
        let body = rpc_result(1234, tl::enums::RpcError::from(error.clone()).to_bytes());
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 1, &body);

        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![Deserialization::RpcError(RpcResultError {
                msg_id: MsgId(1234),
                error,
            })])
        );
    }

    #[test]
    fn own_updates_are_copied() {
        let mut mtp = settled_mtp();
        let update = tl::enums::Updates::from(tl::types::UpdatesTooLong {}).to_bytes();
        let body = rpc_result(1234, update.clone());
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 1, &body);

        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![
                Deserialization::OwnUpdate {
                    msg_id: MsgId(1234),
                    update: update.clone(),
                },
                Deserialization::RpcResult(RpcResult {
                    msg_id: MsgId(1234),
                    body: update,
                }),
            ])
        );
    }

    #[test]
    fn replayed_messages_are_rejected() {
        let mut mtp = settled_mtp();
        let update = tl::enums::Updates::from(tl::types::UpdatesTooLong {}).to_bytes();

        let payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID + 4, 2, &update);
        assert!(mtp.deserialize(&mut payload.clone()).is_ok());
        assert_eq!(
            mtp.deserialize(&mut payload.clone()),
            Err(DeserializeError::SecurityCheckMismatch(
                SecurityCheck::ReplayedMessageId
            ))
        );

        let mut older = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &update);
        assert_eq!(
            mtp.deserialize(&mut older),
            Err(DeserializeError::SecurityCheckMismatch(
                SecurityCheck::ReplayedMessageId
            ))
        );
    }

    #[test]
    fn foreign_messages_are_rejected() {
        let mut mtp = settled_mtp();
        let update = tl::enums::Updates::from(tl::types::UpdatesTooLong {}).to_bytes();

        let mut payload =
            server_message(mtp.session_id().wrapping_add(1), FIRST_SERVER_MSG_ID, 2, &update);
        assert_eq!(
            mtp.deserialize(&mut payload),
            Err(DeserializeError::SecurityCheckMismatch(
                SecurityCheck::SessionId
            ))
        );

        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID + 1, 2, &update);
        assert_eq!(
            mtp.deserialize(&mut payload),
            Err(DeserializeError::SecurityCheckMismatch(
                SecurityCheck::MessageIdParity
            ))
        );

        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &update);
        payload[30] ^= 1;
        assert_eq!(
            mtp.deserialize(&mut payload),
            Err(DeserializeError::SecurityCheckMismatch(
                SecurityCheck::MessageKey
            ))
        );

        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &update);
        payload[0] ^= 1;
        assert_eq!(
            mtp.deserialize(&mut payload),
            Err(DeserializeError::SecurityCheckMismatch(
                SecurityCheck::AuthKeyId
            ))
        );
    }

    #[test]
    fn transport_padding_is_ignored() {
        let mut mtp = settled_mtp();
        let update = tl::enums::Updates::from(tl::types::UpdatesTooLong {}).to_bytes();
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &update);
        payload.extend_from_slice(&[0xaa; 7]);

        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![Deserialization::Update(update)])
        );
    }

    #[test]
    fn containers_are_unpacked_and_acknowledged() {
        let mut mtp = settled_mtp();
        let container = manual_tl::MessageContainer {
            messages: vec![
                manual_tl::Message {
                    msg_id: FIRST_SERVER_MSG_ID,
                    seq_no: 1,
                    body: rpc_result(1000, b"one!".to_vec()),
                },
                manual_tl::Message {
                    msg_id: FIRST_SERVER_MSG_ID + 4,
                    seq_no: 3,
                    body: rpc_result(2000, b"two!".to_vec()),
                },
                manual_tl::Message {
                    msg_id: FIRST_SERVER_MSG_ID + 4,
                    seq_no: 3,
                    body: rpc_result(2000, b"two!".to_vec()),
                },
            ],
        }
        .to_bytes();
        let mut payload =
            server_message(mtp.session_id(), FIRST_SERVER_MSG_ID + 8, 4, &container);

        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![
                Deserialization::RpcResult(RpcResult {
                    msg_id: MsgId(1000),
                    body: b"one!".to_vec(),
                }),
                Deserialization::RpcResult(RpcResult {
                    msg_id: MsgId(2000),
                    body: b"two!".to_vec(),
                }),
            ])
        );

        let mut buffer = DequeBuffer::with_capacity(0, 0);
        mtp.finalize(&mut buffer).unwrap();
        let (_, message) = client_message(&buffer);
        assert_eq!(
            tl::enums::MsgsAck::from_bytes(&message.body),
            Ok(tl::enums::MsgsAck::MsgsAck(tl::types::MsgsAck {
                msg_ids: vec![FIRST_SERVER_MSG_ID, FIRST_SERVER_MSG_ID + 4]
            }))
        );
    }

    #[test]
    fn bad_server_salt_is_adopted() {
        let mut mtp = settled_mtp();
        let body = tl::enums::BadMsgNotification::from(tl::types::BadServerSalt {
            bad_msg_id: 1234,
            bad_msg_seqno: 1,
            error_code: 48,
            new_server_salt: 77,
        })
        .to_bytes();
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &body);

        let result = mtp.deserialize(&mut payload).unwrap();
        assert_eq!(
            result,
            vec![Deserialization::BadMessage(BadMessage {
                msg_id: MsgId(1234),
                code: 48,
            })]
        );
        assert_eq!(mtp.salt(), 77);

        let mut buffer = DequeBuffer::with_capacity(0, 0);
        mtp.salt_request_msg_id = Some(1);
        mtp.push(&mut buffer, b"Hey!").unwrap();
        mtp.finalize(&mut buffer).unwrap();
        assert_eq!(client_message(&buffer).0, 77);
    }

    #[test]
    fn bad_seq_no_is_corrected() {
        let mut mtp = settled_mtp();
        let body = tl::enums::BadMsgNotification::from(tl::types::BadMsgNotification {
            bad_msg_id: 1234,
            bad_msg_seqno: 1,
            error_code: 32,
        })
        .to_bytes();
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &body);
        mtp.deserialize(&mut payload).unwrap();
        assert_eq!(mtp.sequence, 64);
    }

    #[test]
    fn gzip_packed_is_unpacked() {
        let mut mtp = settled_mtp();
        let update = tl::enums::Updates::from(tl::types::UpdatesTooLong {}).to_bytes();
        let body = manual_tl::GzipPacked::new(&update).to_bytes();
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 1, &body);

        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![Deserialization::Update(update)])
        );
        assert_eq!(mtp.pending_ack, vec![FIRST_SERVER_MSG_ID]);
    }

    #[test]
    fn large_requests_are_compressed() {
        let mut mtp = Encrypted::build()
            .compression_threshold(Some(512))
            .finish(auth_key());
        mtp.salts = settled_mtp().salts;
        let request = vec![0u8; 4096];

        let mut buffer = DequeBuffer::with_capacity(0, 0);
        mtp.push(&mut buffer, &request).unwrap();
        mtp.finalize(&mut buffer).unwrap();

        let (_, message) = client_message(&buffer);
        assert_eq!(
            message.constructor_id(),
            Ok(manual_tl::GzipPacked::CONSTRUCTOR_ID)
        );
        let packed = manual_tl::GzipPacked::from_bytes(&message.body).unwrap();
        assert_eq!(packed.decompress(), Ok(request));
    }

    #[test]
    fn container_is_limited_in_length() {
        let mut mtp = settled_mtp();
        let mut buffer = DequeBuffer::with_capacity(0, 0);
        for _ in 0..manual_tl::MessageContainer::MAXIMUM_LENGTH {
            assert!(mtp.push(&mut buffer, b"Hey!").is_some());
        }
        assert_eq!(mtp.push(&mut buffer, b"Hey!"), None);
    }

    #[test]
    fn state_requests_are_answered() {
        let mut mtp = settled_mtp();
        let update = tl::enums::Updates::from(tl::types::UpdatesTooLong {}).to_bytes();
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &update);
        mtp.deserialize(&mut payload).unwrap();

        let request_id = FIRST_SERVER_MSG_ID + 4;
        let body = tl::enums::MsgsStateReq::from(tl::types::MsgsStateReq {
            msg_ids: vec![FIRST_SERVER_MSG_ID, request_id + 400],
        })
        .to_bytes();
        let mut payload = server_message(mtp.session_id(), request_id, 2, &body);
        assert_eq!(mtp.deserialize(&mut payload), Ok(vec![]));

        let mut buffer = DequeBuffer::with_capacity(0, 0);
        mtp.finalize(&mut buffer).unwrap();
        let (_, message) = client_message(&buffer);
        assert_eq!(
            tl::enums::MsgsStateInfo::from_bytes(&message.body),
            Ok(tl::enums::MsgsStateInfo::MsgsStateInfo(
                tl::types::MsgsStateInfo {
                    req_msg_id: request_id,
                    info: vec![4, 3],
                }
            ))
        );
    }

    #[test]
    fn resend_requests_and_pongs_are_reported() {
        let mut mtp = settled_mtp();
        let body = tl::enums::MsgResendReq::from(tl::types::MsgResendReq {
            msg_ids: vec![1000, 2000],
        })
        .to_bytes();
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &body);
        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![
                Deserialization::Resend(MsgId(1000)),
                Deserialization::Resend(MsgId(2000)),
            ])
        );

        let pong = tl::enums::Pong::from(tl::types::Pong {
            msg_id: 3000,
            ping_id: 7,
        })
        .to_bytes();
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID + 4, 2, &pong);
        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![Deserialization::RpcResult(RpcResult {
                msg_id: MsgId(3000),
                body: pong,
            })])
        );
    }

    #[test]
    fn destroyed_session_is_reported() {
        let mut mtp = settled_mtp();
        let body = tl::enums::DestroySessionRes::from(tl::types::DestroySessionOk {
            session_id: mtp.session_id(),
        })
        .to_bytes();
        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &body);
        assert_eq!(
            mtp.deserialize(&mut payload),
            Ok(vec![Deserialization::SessionDestroyed {
                session_id: mtp.session_id()
            }])
        );
    }

    #[test]
    fn reset_starts_a_new_session() {
        let mut mtp = settled_mtp();
        let old_session = mtp.session_id();
        let update = tl::enums::Updates::from(tl::types::UpdatesTooLong {}).to_bytes();
        let mut payload = server_message(old_session, FIRST_SERVER_MSG_ID, 1, &update);
        mtp.deserialize(&mut payload).unwrap();

        mtp.reset();
        assert_ne!(mtp.session_id(), old_session);
        assert!(mtp.pending_ack.is_empty());
        assert_eq!(mtp.sequence, 0);

        let mut payload = server_message(mtp.session_id(), FIRST_SERVER_MSG_ID, 2, &update);
        assert!(mtp.deserialize(&mut payload).is_ok());
    }
}
