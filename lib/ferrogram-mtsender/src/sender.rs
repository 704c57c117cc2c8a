// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ferrogram_crypto::{DequeBuffer, rsa};
use ferrogram_mtproto::mtp::{
    self, BadMessage, Deserialization, DeserializationFailure, Mtp, RpcResult, RpcResultError,
};
use ferrogram_mtproto::transport::{self, Transport};
use ferrogram_mtproto::{MsgId, authentication};
use ferrogram_tl_types::{self as tl, Deserializable, Identifiable, RemoteCall, Serializable};
use log::{debug, error, info, trace, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::{Instant, sleep_until, timeout};

use crate::errors::{InvocationError, ReadError, RpcError};
use crate::net::{NetStream, ServerAddr};

type Reply = oneshot::Sender<Result<Vec<u8>, InvocationError>>;

/// Largest packet sent or accepted: the server's 1 MiB limit plus framing.
const MAX_PACKET: usize = 1024 * 1024 + 8 * 1024;

/// Room left in front of the write buffer for the headers every layer prepends.
const HEADER_ROOM: usize = 160;

const PING_INTERVAL: Duration = Duration::from_secs(60);

/// Sent along every ping. The server drops the connection after this many
/// seconds without another one.
const DISCONNECT_DELAY: i32 = 75;

/// The connection is declared dead after this many unanswered pings.
const MAX_MISSED_PONGS: u32 = 2;

/// Acknowledgements wait at most this long for a request to ride along with.
const ACK_DELAY: Duration = Duration::from_millis(100);

const DESTROY_SESSION_TIMEOUT: Duration = Duration::from_secs(1);

/// Handshakes the server asked to restart are attempted this many times in total.
const AUTH_KEY_ATTEMPTS: usize = 3;

/// Unique identifiers for pings, seeded from the clock once.
fn generate_random_id() -> i64 {
    static NEXT: AtomicI64 = AtomicI64::new(0);

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(1, |since| since.as_nanos() as i64);
    // Only the first caller's seed is used.
    let _ = NEXT.compare_exchange(0, seed, Ordering::SeqCst, Ordering::SeqCst);
    NEXT.fetch_add(1, Ordering::SeqCst)
}

/// What a connection hands to the updates pipeline.
#[derive(Debug)]
pub enum UpdatesLike {
    Updates(tl::enums::Updates),
    /// The home connection dropped and came back. Updates may have been
    /// missed in between.
    Reconnected,
    /// The home connection dropped and could not be restored. Whatever
    /// happened meanwhile has to be fetched as a difference later.
    ConnectionClosed,
}

/// Where a [`Sender`] is in its life.
///
/// ```text
/// Disconnected -> Handshaking -> Authorized -> Connected
/// Connected -> Reconnecting -> Authorized
/// any -> Stopping -> Stopped
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SenderState {
    Disconnected,
    /// Negotiating an auth key with plain messages.
    Handshaking,
    /// Encrypted, but nothing received yet.
    Authorized,
    Connected,
    Reconnecting,
    /// Destroying the session before closing.
    Stopping,
    Stopped,
}

/// One connection to one datacenter: socket, framing and message layer.
///
/// Requests are queued with [`Sender::enqueue_body`] and make progress
/// only while [`Sender::step`] is being polled.
pub struct Sender<T: Transport, M: Mtp> {
    stream: NetStream,
    transport: T,
    mtp: M,
    addr: ServerAddr,
    state: SenderState,
    pending: Vec<Pending>,
    next_ping: Instant,
    pong: Option<oneshot::Receiver<Result<Vec<u8>, InvocationError>>>,
    missed_pongs: u32,
    flush_at: Option<Instant>,
    session_destroyed: bool,

    inbox: Vec<u8>,
    inbox_len: usize,
    outbox: DequeBuffer<u8>,
    outbox_sent: usize,
}

struct Pending {
    body: Vec<u8>,
    stage: Stage,
    tx: Reply,
}

/// A request's identifiers, and those of the container it went in (the
/// same as its own when it went alone).
#[derive(Clone, Copy, Debug)]
struct Ids {
    msg_id: MsgId,
    container: MsgId,
}

enum Stage {
    Queued,
    /// In the outbox, not yet fully written.
    Packed(Ids),
    Sent(Ids),
}

impl Stage {
    fn ids(&self) -> Option<Ids> {
        match *self {
            Self::Queued => None,
            Self::Packed(ids) | Self::Sent(ids) => Some(ids),
        }
    }

    fn has_msg_id(&self, msg_id: MsgId) -> bool {
        self.ids().is_some_and(|ids| ids.msg_id == msg_id)
    }
}

impl Pending {
    fn name(&self) -> &'static str {
        tl::name_for_id(constructor_id(&self.body)).unwrap_or("?")
    }

    fn reply(self, result: Result<Vec<u8>, InvocationError>) {
        // The caller may have stopped waiting.
        let _ = self.tx.send(result);
    }
}

fn constructor_id(body: &[u8]) -> u32 {
    body.first_chunk::<4>().map_or(0, |id| u32::from_le_bytes(*id))
}

fn dead_connection(kind: io::ErrorKind, reason: &str) -> ReadError {
    ReadError::Io(io::Error::new(kind, reason.to_string()))
}

impl<T: Transport, M: Mtp> Sender<T, M> {
    /// Opens the socket. No request is sent, not even `initConnection`.
    pub async fn connect(transport: T, mtp: M, addr: ServerAddr) -> Result<Self, io::Error> {
        let stream = NetStream::connect(&addr).await?;
        Ok(Self {
            stream,
            transport,
            mtp,
            addr,
            state: SenderState::Authorized,
            pending: Vec::new(),
            next_ping: Instant::now() + PING_INTERVAL,
            pong: None,
            missed_pongs: 0,
            flush_at: None,
            session_destroyed: false,
            inbox: vec![0; MAX_PACKET],
            inbox_len: 0,
            outbox: DequeBuffer::with_capacity(MAX_PACKET, HEADER_ROOM),
            outbox_sent: 0,
        })
    }

    pub fn state(&self) -> SenderState {
        self.state
    }

    pub fn addr(&self) -> &ServerAddr {
        &self.addr
    }

    /// Sends a request and steps the connection until its result arrives.
    pub async fn invoke<R: RemoteCall>(
        &mut self,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        let body = self.invoke_raw(request.to_bytes()).await?;
        Ok(R::Return::from_bytes(&body)?)
    }

    pub async fn invoke_raw(&mut self, body: Vec<u8>) -> Result<Vec<u8>, InvocationError> {
        let (tx, mut rx) = oneshot::channel();
        self.enqueue_body(body, tx);
        loop {
            if let Err(e) = self.step().await {
                self.fail_requests(&e);
                return Err(e.into());
            }
            match rx.try_recv() {
                Ok(result) => return result,
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => return Err(InvocationError::Dropped),
            }
        }
    }

    /// Queues a serialized request. Its result goes to `tx`.
    ///
    /// If `tx`'s receiver is dropped first, the request is forgotten and
    /// any response to it discarded.
    pub fn enqueue_body(&mut self, body: Vec<u8>, tx: Reply) {
        let pending = Pending {
            body,
            stage: Stage::Queued,
            tx,
        };
        debug!("queued {}", pending.name());
        self.pending.push(pending);
    }

    /// Does one unit of network work: a read, a write, or a timer.
    ///
    /// Returns the updates that arrived, if any. An error means the
    /// connection is gone. Pending requests are kept for
    /// [`Sender::reconnect`] to replay, or for [`Sender::fail_requests`].
    pub async fn step(&mut self) -> Result<Vec<UpdatesLike>, ReadError> {
        self.fill_outbox();
        let unsent = self.outbox.len() - self.outbox_sent;

        let (mut reader, mut writer) = self.stream.split();
        let flush_at = self.flush_at;
        let result = tokio::select! {
            read = reader.read(&mut self.inbox[self.inbox_len..]) => {
                read.map_err(ReadError::Io).and_then(|n| self.on_read(n))
            }
            written = writer.write(&self.outbox[self.outbox_sent..]), if unsent > 0 => {
                written.map_err(ReadError::Io).map(|n| {
                    self.on_written(n);
                    Vec::new()
                })
            }
            _ = sleep_until(self.next_ping) => self.ping().map(|()| Vec::new()),
            _ = sleep_until(flush_at.unwrap_or(self.next_ping)), if flush_at.is_some() => {
                Ok(Vec::new())
            }
        };

        if let Err(e) = &result {
            warn!("connection to {:?} broke: {e}", self.addr);
            self.state = SenderState::Disconnected;
        }
        result
    }

    /// Packs queued requests (and any service messages that are due) into
    /// the outbox, unless it still holds data being written.
    fn fill_outbox(&mut self) {
        if !self.outbox.is_empty() {
            return;
        }

        self.pending.retain(|p| {
            let wanted = !p.tx.is_closed();
            if !wanted {
                debug!("dropping {} as nobody awaits it", p.name());
            }
            wanted
        });

        let mut packed_any = false;
        for p in self.pending.iter_mut() {
            if !matches!(p.stage, Stage::Queued) {
                continue;
            }
            let Some(msg_id) = self.mtp.push(&mut self.outbox, &p.body) else {
                break;
            };
            trace!("packed {} as {msg_id:?}", p.name());
            p.stage = Stage::Packed(Ids {
                msg_id,
                container: msg_id,
            });
            packed_any = true;
        }

        let flush_due = self.flush_at.is_some_and(|at| at <= Instant::now());
        if !packed_any && !flush_due {
            return;
        }
        self.flush_at = None;

        let Some(outer) = self.mtp.finalize(&mut self.outbox) else {
            return;
        };
        for p in self.pending.iter_mut() {
            if let Stage::Packed(ids) = &mut p.stage {
                ids.container = outer;
            }
        }
        self.transport.pack(&mut self.outbox);
    }

    fn on_read(&mut self, n: usize) -> Result<Vec<UpdatesLike>, ReadError> {
        if n == 0 {
            return Err(dead_connection(io::ErrorKind::ConnectionReset, "server closed the connection"));
        }
        self.inbox_len += n;
        trace!("received {n} bytes, {} buffered", self.inbox_len);

        let mut updates = Vec::new();
        let mut consumed = 0;
        while consumed < self.inbox_len {
            let packet = &mut self.inbox[consumed..self.inbox_len];
            let offset = match self.transport.unpack(packet) {
                Ok(offset) => offset,
                Err(transport::Error::MissingBytes) => break,
                Err(e) => return Err(e.into()),
            };
            let events = self
                .mtp
                .deserialize(&mut packet[offset.data_start..offset.data_end])?;
            self.handle(events, &mut updates);
            consumed += offset.next_offset;
        }

        self.inbox.copy_within(consumed..self.inbox_len, 0);
        self.inbox_len -= consumed;

        if consumed > 0 {
            if self.state == SenderState::Authorized {
                self.state = SenderState::Connected;
            }
            // Received messages must be acknowledged even if nothing else is sent.
            self.flush_at.get_or_insert_with(|| Instant::now() + ACK_DELAY);
        }
        Ok(updates)
    }

    fn on_written(&mut self, n: usize) {
        self.outbox_sent += n;
        trace!("wrote {n} bytes, {}/{} done", self.outbox_sent, self.outbox.len());
        if self.outbox_sent < self.outbox.len() {
            return;
        }

        self.outbox.clear();
        self.outbox_sent = 0;
        for p in self.pending.iter_mut() {
            if let Stage::Packed(ids) = p.stage {
                debug!("sent {} as {:?}", p.name(), ids.msg_id);
                p.stage = Stage::Sent(ids);
            }
        }
    }

    /// Checks that the last ping was answered and sends the next one.
    fn ping(&mut self) -> Result<(), ReadError> {
        if let Some(mut pong) = self.pong.take() {
            if let Err(TryRecvError::Empty) = pong.try_recv() {
                self.missed_pongs += 1;
                warn!("ping unanswered ({} in a row)", self.missed_pongs);
            } else {
                self.missed_pongs = 0;
            }
        }
        if self.missed_pongs >= MAX_MISSED_PONGS {
            return Err(dead_connection(io::ErrorKind::TimedOut, "pings went unanswered"));
        }

        let (tx, rx) = oneshot::channel();
        let ping = tl::functions::PingDelayDisconnect {
            ping_id: generate_random_id(),
            disconnect_delay: DISCONNECT_DELAY,
        };
        self.enqueue_body(ping.to_bytes(), tx);
        self.pong = Some(rx);
        self.next_ping = Instant::now() + PING_INTERVAL;
        Ok(())
    }

    /// Fails every pending request with a copy of `error`.
    pub fn fail_requests(&mut self, error: &ReadError) {
        if self.pending.is_empty() {
            return;
        }
        warn!("failing {} pending request(s): {error}", self.pending.len());
        for p in self.pending.drain(..) {
            p.reply(Err(error.clone().into()));
        }
    }

    fn handle(&mut self, events: Vec<Deserialization>, updates: &mut Vec<UpdatesLike>) {
        for event in events {
            match event {
                Deserialization::OwnUpdate { update, .. } | Deserialization::Update(update) => {
                    match tl::enums::Updates::from_bytes(&update) {
                        Ok(parsed) => updates.push(UpdatesLike::Updates(parsed)),
                        Err(e) => warn!("discarding unparsable updates: {e}"),
                    }
                }
                Deserialization::RpcResult(result) => self.on_result(result),
                Deserialization::RpcError(error) => self.on_rpc_error(error),
                Deserialization::BadMessage(bad) => self.on_bad_message(bad),
                Deserialization::Failure(failure) => self.on_failure(failure),
                Deserialization::Resend(msg_id) => {
                    for p in self.pending.iter_mut().filter(|p| p.stage.has_msg_id(msg_id)) {
                        debug!("server requested {} again", p.name());
                        p.stage = Stage::Queued;
                    }
                }
                Deserialization::SessionDestroyed { session_id } => {
                    info!("server destroyed session {session_id}");
                    self.session_destroyed = true;
                    self.pending.retain(|p| {
                        constructor_id(&p.body) != tl::functions::DestroySession::CONSTRUCTOR_ID
                    });
                }
            }
        }
    }

    fn take(&mut self, msg_id: MsgId) -> Option<Pending> {
        let index = self.pending.iter().position(|p| p.stage.has_msg_id(msg_id));
        match index {
            Some(i) => Some(self.pending.swap_remove(i)),
            None => {
                debug!("no pending request has {msg_id:?}, response dropped");
                None
            }
        }
    }

    fn on_result(&mut self, result: RpcResult) {
        if let Some(p) = self.take(result.msg_id) {
            debug!(
                "{} returned {}",
                p.name(),
                tl::name_for_id(constructor_id(&result.body)).unwrap_or("?")
            );
            p.reply(Ok(result.body));
        }
    }

    fn on_rpc_error(&mut self, error: RpcResultError) {
        if let Some(p) = self.take(error.msg_id) {
            let caused_by = constructor_id(&p.body);
            let error = RpcError::from(error.error).with_caused_by(caused_by);
            debug!("{} failed: {error}", p.name());
            p.reply(Err(error.into()));
        }
    }

    fn on_failure(&mut self, failure: DeserializationFailure) {
        if let Some(p) = self.take(failure.msg_id) {
            debug!("response to {} could not be parsed: {}", p.name(), failure.error);
            p.reply(Err(failure.error.into()));
        }
    }

    /// Notifications may refer to a message or to the container it was in.
    fn on_bad_message(&mut self, bad: BadMessage) {
        let mut i = self.pending.len();
        while i > 0 {
            i -= 1;
            let Some(ids) = self.pending[i].stage.ids() else {
                continue;
            };
            if ids.msg_id != bad.msg_id && ids.container != bad.msg_id {
                continue;
            }

            if bad.retryable() {
                info!("{}: resending {:?}", bad.description(), ids.msg_id);
                self.pending[i].stage = Stage::Queued;
            } else {
                error!("{}: giving up on {:?}", bad.description(), ids.msg_id);
                self.pending.swap_remove(i).reply(Err(InvocationError::Dropped));
            }
        }
    }

    /// Keeps the socket and buffers, switching to another message layer.
    fn with_mtp<N: Mtp>(self, mtp: N) -> Sender<T, N> {
        Sender {
            stream: self.stream,
            transport: self.transport,
            mtp,
            addr: self.addr,
            state: self.state,
            pending: self.pending,
            next_ping: Instant::now() + PING_INTERVAL,
            pong: None,
            missed_pongs: 0,
            flush_at: None,
            session_destroyed: false,
            inbox: self.inbox,
            inbox_len: self.inbox_len,
            outbox: self.outbox,
            outbox_sent: self.outbox_sent,
        }
    }
}

impl<T: Transport> Sender<T, mtp::Encrypted> {
    pub fn auth_key(&self) -> [u8; 256] {
        self.mtp.auth_key()
    }

    pub fn session_id(&self) -> i64 {
        self.mtp.session_id()
    }

    /// Opens a new socket to the same address, keeping the auth key.
    ///
    /// The message session starts over. Requests still without a response
    /// are queued again and get new identifiers.
    pub async fn reconnect(&mut self) -> Result<(), io::Error> {
        self.state = SenderState::Reconnecting;
        self.stream = NetStream::connect(&self.addr).await?;
        self.transport.reset();
        self.mtp.reset();

        self.inbox_len = 0;
        self.outbox.clear();
        self.outbox_sent = 0;
        self.pong = None;
        self.missed_pongs = 0;
        self.flush_at = None;
        self.next_ping = Instant::now() + PING_INTERVAL;
        for p in self.pending.iter_mut() {
            p.stage = Stage::Queued;
        }

        info!("reconnected to {:?} with {} request(s) to replay", self.addr, self.pending.len());
        self.state = SenderState::Authorized;
        Ok(())
    }

    /// Closes the connection gracefully.
    ///
    /// `destroy_session` is sent together with any pending acks and given a
    /// moment to be confirmed. Requests still waiting fail with
    /// [`InvocationError::Dropped`].
    pub async fn stop(&mut self) {
        if self.state == SenderState::Stopped {
            return;
        }
        let was_connected = self.state != SenderState::Disconnected;
        self.state = SenderState::Stopping;

        if was_connected {
            let (tx, _rx) = oneshot::channel();
            let destroy = tl::functions::DestroySession {
                session_id: self.mtp.session_id(),
            };
            self.enqueue_body(destroy.to_bytes(), tx);

            let confirmed = timeout(DESTROY_SESSION_TIMEOUT, async {
                while !self.session_destroyed && self.step().await.is_ok() {}
            })
            .await;
            if confirmed.is_err() {
                debug!("destroy_session was not confirmed in time");
            }
            if let Err(e) = self.stream.shutdown().await {
                debug!("socket shutdown failed: {e}");
            }
        }

        for p in self.pending.drain(..) {
            p.reply(Err(InvocationError::Dropped));
        }
        self.state = SenderState::Stopped;
    }
}

/// Connects and negotiates a new auth key over the connection.
pub async fn connect<T: Transport>(
    transport: T,
    addr: ServerAddr,
) -> Result<Sender<T, mtp::Encrypted>, InvocationError> {
    let sender = Sender::connect(transport, mtp::Plain::new(), addr).await?;
    generate_auth_key(sender).await
}

/// Like [`connect`], for datacenters whose public keys are not built in.
pub async fn connect_with_keys<T: Transport>(
    transport: T,
    addr: ServerAddr,
    extra_keys: &[rsa::Key],
) -> Result<Sender<T, mtp::Encrypted>, InvocationError> {
    let sender = Sender::connect(transport, mtp::Plain::new(), addr).await?;
    generate_auth_key_with_keys(sender, extra_keys).await
}

async fn handshake<T: Transport>(
    sender: &mut Sender<T, mtp::Plain>,
    extra_keys: &[rsa::Key],
) -> Result<authentication::Finished, InvocationError> {
    let (request, step1) = authentication::step1()?;
    let res_pq = sender.invoke_raw(request).await?;
    trace!("handshake: got res_pq");

    let (request, step2) = authentication::step2_with_keys(step1, &res_pq, extra_keys)?;
    let dh_params = sender.invoke_raw(request).await?;
    trace!("handshake: got server_DH_params");

    let (request, step3) = authentication::step3(step2, &dh_params)?;
    let answer = sender.invoke_raw(request).await?;
    trace!("handshake: got set_client_DH_params answer");

    Ok(authentication::create_key(step3, &answer)?)
}

/// Runs the key exchange over a plain sender, then turns it into an
/// encrypted one on the same connection.
///
/// A handshake the server asks to retry starts over, up to three times.
pub async fn generate_auth_key<T: Transport>(
    sender: Sender<T, mtp::Plain>,
) -> Result<Sender<T, mtp::Encrypted>, InvocationError> {
    generate_auth_key_with_keys(sender, &[]).await
}

/// Like [`generate_auth_key`], also trusting `extra_keys`.
pub async fn generate_auth_key_with_keys<T: Transport>(
    mut sender: Sender<T, mtp::Plain>,
    extra_keys: &[rsa::Key],
) -> Result<Sender<T, mtp::Encrypted>, InvocationError> {
    info!("negotiating auth key with {:?}", sender.addr);
    sender.state = SenderState::Handshaking;

    let mut attempt = 1;
    let finished = loop {
        match handshake(&mut sender, extra_keys).await {
            Ok(finished) => break finished,
            Err(InvocationError::Authentication(e))
                if e.retryable() && attempt < AUTH_KEY_ATTEMPTS =>
            {
                warn!("handshake attempt {attempt} failed, retrying: {e}");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };
    info!("auth key ready");

    let encrypted = mtp::Encrypted::build()
        .time_offset(finished.time_offset)
        .first_salt(finished.first_salt)
        .finish(finished.auth_key);
    let mut sender = sender.with_mtp(encrypted);
    sender.state = SenderState::Authorized;
    Ok(sender)
}

/// Connects using an auth key negotiated earlier.
pub async fn connect_with_auth<T: Transport>(
    transport: T,
    addr: ServerAddr,
    auth_key: [u8; 256],
) -> Result<Sender<T, mtp::Encrypted>, io::Error> {
    Sender::connect(transport, mtp::Encrypted::build().finish(auth_key), addr).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_unique() {
        let a = generate_random_id();
        let b = generate_random_id();
        assert_ne!(a, b);
    }

    #[test]
    fn constructor_of_short_body_is_zero() {
        assert_eq!(constructor_id(&[1, 2]), 0);
        assert_eq!(constructor_id(&[1, 0, 0, 0, 9]), 1);
    }

    #[test]
    fn queued_requests_have_no_ids() {
        assert!(Stage::Queued.ids().is_none());
    }
}
