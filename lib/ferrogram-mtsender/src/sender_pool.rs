// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::configuration::{BoxedTransport, ConnectionParams};
use crate::errors::ReadError;
use crate::sender::{UpdatesLike, connect, connect_with_auth, connect_with_keys};
use crate::{InvocationError, Sender, ServerAddr};
use ferrogram_crypto::rsa;
use ferrogram_mtproto::{mtp, transport};
use ferrogram_session::Session;
use ferrogram_session::types::DcOption;
use ferrogram_tl_types::{self as tl, Deserializable, RemoteCall, Serializable, enums};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};
use std::sync::Arc;
use std::time::Duration;
use std::{fmt, mem, panic};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{AbortHandle, JoinSet};

type Reply = oneshot::Sender<Result<Vec<u8>, InvocationError>>;

type PendingReply = oneshot::Receiver<Result<Vec<u8>, InvocationError>>;

type EncryptedSender = Sender<BoxedTransport, mtp::Encrypted>;

enum Request {
    Invoke {
        target: Target,
        body: Vec<u8>,
        tx: Reply,
    },
    Disconnect {
        dc_id: i32,
    },
    Quit,
}

/// One connection per datacenter for regular requests, and a second one
/// for file transfers so they do not hold back everything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Target {
    dc_id: i32,
    media: bool,
}

struct Rpc {
    body: Vec<u8>,
    tx: Reply,
}

/// A request body that is already serialized, sent as-is as the query
/// of `initConnection`.
struct Serialized(Vec<u8>);

impl Serializable for Serialized {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.0.iter().copied());
    }
}

impl RemoteCall for Serialized {
    type Return = Vec<u8>;
}

struct Connection {
    rpc_tx: mpsc::UnboundedSender<Rpc>,
    task: AbortHandle,
}

#[derive(Clone, Copy)]
struct Backoff {
    attempts: usize,
    initial_delay: Duration,
}

/// Sends requests to a running [`SenderPoolRunner`]. Cheap to clone.
#[derive(Clone)]
pub struct SenderPoolHandle(mpsc::UnboundedSender<Request>);

/// A freshly created pool, split into the parts that are used separately.
pub struct SenderPool {
    /// Must be spawned (or awaited) for any request to make progress.
    pub runner: SenderPoolRunner,
    pub handle: SenderPoolHandle,
    /// Updates from every connection, in the order they arrived.
    pub updates: mpsc::UnboundedReceiver<UpdatesLike>,
}

/// Owns every connection, opening them the first time a datacenter is used.
pub struct SenderPoolRunner {
    pub session: Arc<dyn Session>,
    /// See <https://core.telegram.org/myapp>.
    pub api_id: i32,
    pub connection_params: ConnectionParams,
    request_rx: mpsc::UnboundedReceiver<Request>,
    updates_tx: mpsc::UnboundedSender<UpdatesLike>,
    connections: HashMap<Target, Connection>,
    tasks: JoinSet<()>,
    /// CDN datacenters announced by `help.getConfig`. Never persisted.
    cdn_options: HashMap<i32, DcOption>,
    /// Public keys from `help.getCdnConfig`, fetched on first use.
    cdn_keys: Option<Vec<rsa::Key>>,
    cdn_config: Option<PendingReply>,
    /// Requests to CDN datacenters waiting for [`Self::cdn_keys`].
    awaiting_cdn_keys: Vec<(Target, Rpc)>,
    /// Requests made by the runner itself, routed before the next one.
    deferred: Vec<(Target, Rpc)>,
}

impl SenderPoolHandle {
    async fn invoke(&self, target: Target, body: Vec<u8>) -> Result<Vec<u8>, InvocationError> {
        let (tx, rx) = oneshot::channel();
        self.0
            .send(Request::Invoke { target, body, tx })
            .map_err(|_| InvocationError::Dropped)?;
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(InvocationError::Dropped),
        }
    }

    /// Sends an already-serialized request to a datacenter.
    pub async fn invoke_in_dc(
        &self,
        dc_id: i32,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, InvocationError> {
        self.invoke(Target { dc_id, media: false }, body).await
    }

    /// Like [`Self::invoke_in_dc`], over the file transfer connection.
    pub async fn invoke_in_media_dc(
        &self,
        dc_id: i32,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, InvocationError> {
        self.invoke(Target { dc_id, media: true }, body).await
    }

    /// Closes both connections to a datacenter, if open. Pending requests
    /// on them fail with [`InvocationError::Dropped`].
    ///
    /// Returns `false` if the runner is gone.
    pub fn disconnect_from_dc(&self, dc_id: i32) -> bool {
        self.0.send(Request::Disconnect { dc_id }).is_ok()
    }

    /// Stops the runner, closing every connection gracefully.
    pub fn quit(&self) -> bool {
        self.0.send(Request::Quit).is_ok()
    }
}

impl SenderPool {
    /// A pool with the default [`ConnectionParams`].
    ///
    /// Two pools must not share the same session.
    pub fn new<S: Session + 'static>(session: Arc<S>, api_id: i32) -> Self {
        Self::with_configuration(session, api_id, ConnectionParams::default())
    }

    pub fn with_configuration<S: Session + 'static>(
        session: Arc<S>,
        api_id: i32,
        connection_params: ConnectionParams,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (updates_tx, updates) = mpsc::unbounded_channel();
        let runner = SenderPoolRunner {
            session,
            api_id,
            connection_params,
            request_rx,
            updates_tx,
            connections: HashMap::new(),
            tasks: JoinSet::new(),
            cdn_options: HashMap::new(),
            cdn_keys: None,
            cdn_config: None,
            awaiting_cdn_keys: Vec::new(),
            deferred: Vec::new(),
        };

        Self {
            runner,
            handle: SenderPoolHandle(request_tx),
            updates,
        }
    }
}

impl SenderPoolRunner {
    /// Serves requests until [`SenderPoolHandle::quit`] is called or every
    /// handle is dropped.
    ///
    /// A panic inside a connection task is propagated.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                Some(finished) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(e) = finished {
                        if e.is_panic() {
                            panic::resume_unwind(e.into_panic());
                        }
                    }
                    self.connections.retain(|_, c| !c.task.is_finished());
                }
                reply = wait_for(&mut self.cdn_config) => {
                    self.cdn_config = None;
                    self.on_cdn_config(reply);
                    for (target, rpc) in mem::take(&mut self.awaiting_cdn_keys) {
                        self.route(target, rpc).await;
                    }
                }
                request = self.request_rx.recv() => match request {
                    Some(Request::Invoke { target, body, tx }) => {
                        self.route(target, Rpc { body, tx }).await;
                        while let Some((target, rpc)) = self.deferred.pop() {
                            self.route(target, rpc).await;
                        }
                    }
                    Some(Request::Disconnect { dc_id }) => {
                        self.connections.retain(|target, c| {
                            let keep = target.dc_id != dc_id;
                            if !keep {
                                c.task.abort();
                            }
                            keep
                        });
                    }
                    Some(Request::Quit) | None => break,
                }
            }
        }

        info!("closing {} connection(s)", self.connections.len());
        // Senders notice their request channel closing and stop on their own.
        self.connections.clear();
        self.tasks.join_all().await;
    }

    async fn route(&mut self, target: Target, rpc: Rpc) {
        if let Some(connection) = self.connections.get(&target) {
            if let Err(mpsc::error::SendError(rpc)) = connection.rpc_tx.send(rpc) {
                let _ = rpc.tx.send(Err(InvocationError::Dropped));
            }
            return;
        }

        let Some(mut dc_option) = self.dc_option(target.dc_id) else {
            let _ = rpc.tx.send(Err(InvocationError::InvalidDc));
            return;
        };

        let cdn = self.cdn_options.contains_key(&target.dc_id);
        let (sender, rpc) = if cdn {
            let Some(keys) = self.cdn_keys.as_deref() else {
                self.await_cdn_keys(target, rpc);
                return;
            };
            let addr = ServerAddr::Tcp {
                address: dc_option.ipv4.into(),
            };
            let transport = self.connection_params.transport.instantiate();
            match connect_with_keys(transport, addr, keys).await {
                // The first request on a CDN connection carries `initConnection`.
                Ok(sender) => {
                    let body = self.init_connection(Serialized(rpc.body)).to_bytes();
                    (sender, Rpc { body, tx: rpc.tx })
                }
                Err(e) => {
                    let _ = rpc.tx.send(Err(e));
                    return;
                }
            }
        } else {
            match self.open(&dc_option).await {
                Ok(sender) => (sender, rpc),
                Err(e) => {
                    let _ = rpc.tx.send(Err(e));
                    return;
                }
            }
        };

        let auth_key = sender.auth_key();
        if !cdn && dc_option.auth_key != Some(auth_key) {
            dc_option.auth_key = Some(auth_key);
            self.session.set_dc_option(&dc_option);
        }

        let (rpc_tx, rpc_rx) = mpsc::unbounded_channel();
        let _ = rpc_tx.send(rpc);
        let home = !target.media && target.dc_id == self.session.home_dc_id();
        let backoff = Backoff {
            attempts: self.connection_params.reconnection_attempts,
            initial_delay: self.connection_params.reconnection_delay,
        };
        let task = self.tasks.spawn(drive(
            sender,
            rpc_rx,
            self.updates_tx.clone(),
            home,
            backoff,
        ));
        debug!("opened connection {target:?}");
        self.connections.insert(target, Connection { rpc_tx, task });
    }

    /// The address of a main datacenter, or of a CDN one learnt from the
    /// last `help.getConfig`.
    fn dc_option(&self, dc_id: i32) -> Option<DcOption> {
        self.session
            .dc_option(dc_id)
            .or_else(|| self.cdn_options.get(&dc_id).cloned())
    }

    /// Parks a CDN request until the public keys of the CDN datacenters are
    /// known, asking the home datacenter for them if nobody has yet.
    fn await_cdn_keys(&mut self, target: Target, rpc: Rpc) {
        self.awaiting_cdn_keys.push((target, rpc));
        if self.cdn_config.is_some() {
            return;
        }
        debug!("fetching cdn public keys");
        let (tx, rx) = oneshot::channel();
        let home = Target {
            dc_id: self.session.home_dc_id(),
            media: false,
        };
        let body = tl::functions::help::GetCdnConfig {}.to_bytes();
        self.deferred.push((home, Rpc { body, tx }));
        self.cdn_config = Some(rx);
    }

    fn on_cdn_config(&mut self, reply: Result<Vec<u8>, InvocationError>) {
        match reply.and_then(|body| parse_cdn_keys(&body)) {
            Ok(keys) => {
                info!("got {} cdn public key(s)", keys.len());
                self.cdn_keys = Some(keys);
            }
            Err(e) => {
                warn!("could not fetch cdn public keys: {e}");
                for (_, rpc) in self.awaiting_cdn_keys.drain(..) {
                    let _ = rpc.tx.send(Err(InvocationError::InvalidDc));
                }
            }
        }
    }

    fn init_connection<X: RemoteCall>(
        &self,
        query: X,
    ) -> tl::functions::InvokeWithLayer<tl::functions::InitConnection<X>> {
        let params = &self.connection_params;
        tl::functions::InvokeWithLayer {
            layer: tl::LAYER,
            query: tl::functions::InitConnection {
                api_id: self.api_id,
                device_model: params.device_model.clone(),
                system_version: params.system_version.clone(),
                app_version: params.app_version.clone(),
                system_lang_code: params.system_lang_code.clone(),
                lang_pack: String::new(),
                lang_code: params.lang_code.clone(),
                query,
            },
        }
    }

    /// Connects (reusing the stored key when there is one) and runs
    /// `initConnection`, learning the current datacenter table.
    async fn open(&mut self, dc_option: &DcOption) -> Result<EncryptedSender, InvocationError> {
        let mode = self.connection_params.transport;
        let addr = ServerAddr::Tcp {
            address: dc_option.ipv4.into(),
        };
        let init = self.init_connection(tl::functions::help::GetConfig {});

        let mut sender = match dc_option.auth_key {
            Some(key) => connect_with_auth(mode.instantiate(), addr.clone(), key).await?,
            None => connect(mode.instantiate(), addr.clone()).await?,
        };

        let config = match sender.invoke(&init).await {
            Err(InvocationError::Transport(transport::Error::BadStatus { status: 404 })) => {
                warn!("dc {} no longer knows our auth key, negotiating a new one", dc_option.id);
                sender = connect(mode.instantiate(), addr).await?;
                sender.invoke(&init).await?
            }
            result => result?,
        };

        let enums::Config::Config(config) = config;
        self.store_dc_options(config.dc_options);
        Ok(sender)
    }

    /// Saves the static, general-purpose addresses from a `config` in the
    /// session, and the CDN ones in memory.
    fn store_dc_options(&mut self, options: Vec<enums::DcOption>) {
        for enums::DcOption::DcOption(option) in options {
            if option.tcpo_only || !option.cdn && (option.media_only || !option.r#static) {
                continue;
            }
            let known = if option.cdn {
                self.cdn_options.get(&option.id).cloned()
            } else {
                self.session.dc_option(option.id)
            };
            let Some(dc_option) = merge_address(known, &option) else {
                warn!("dc {} has an unparsable address {:?}", option.id, option.ip_address);
                continue;
            };
            debug!("dc {} is at {}", option.id, option.ip_address);
            if option.cdn {
                self.cdn_options.insert(option.id, dc_option);
            } else {
                self.session.set_dc_option(&dc_option);
            }
        }
    }
}

/// Resolves once the reply arrives, never if nothing was asked.
async fn wait_for(pending: &mut Option<PendingReply>) -> Result<Vec<u8>, InvocationError> {
    match pending {
        Some(rx) => rx.await.unwrap_or(Err(InvocationError::Dropped)),
        None => future::pending().await,
    }
}

/// The keys of a `cdnConfig`. Keys that fail to parse are skipped.
fn parse_cdn_keys(body: &[u8]) -> Result<Vec<rsa::Key>, InvocationError> {
    let enums::CdnConfig::CdnConfig(config) = enums::CdnConfig::from_bytes(body)?;
    Ok(config
        .public_keys
        .into_iter()
        .filter_map(|enums::CdnPublicKey::CdnPublicKey(key)| {
            let parsed = rsa::Key::from_pem(&key.public_key);
            if parsed.is_none() {
                warn!("cdn dc {} announced an unreadable public key", key.dc_id);
            }
            parsed
        })
        .collect())
}

/// Folds one announced address into what was known about the datacenter.
fn merge_address(known: Option<DcOption>, option: &tl::types::DcOption) -> Option<DcOption> {
    let mut dc_option = known.unwrap_or(DcOption {
        id: option.id,
        ipv4: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
        ipv6: SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, 0, 0, 0),
        auth_key: None,
    });
    let port = u16::try_from(option.port).ok()?;

    if option.ipv6 {
        dc_option.ipv6 = SocketAddrV6::new(option.ip_address.parse().ok()?, port, 0, 0);
    } else {
        let ip: Ipv4Addr = option.ip_address.parse().ok()?;
        dc_option.ipv4 = SocketAddrV4::new(ip, port);
        if dc_option.ipv6.ip().is_unspecified() {
            dc_option.ipv6 = SocketAddrV6::new(ip.to_ipv6_mapped(), port, 0, 0);
        }
    }
    Some(dc_option)
}

/// Reconnects with exponential backoff. `false` once every attempt failed.
async fn reconnect(sender: &mut EncryptedSender, backoff: Backoff) -> bool {
    let mut delay = backoff.initial_delay;
    for attempt in 1..=backoff.attempts {
        tokio::time::sleep(delay).await;
        if let Err(e) = sender.reconnect().await {
            warn!("reconnect {attempt} of {} failed: {e}", backoff.attempts);
            delay *= 2;
        } else {
            return true;
        }
    }
    false
}

/// Runs one connection until its request channel closes or it fails for good.
async fn drive(
    mut sender: EncryptedSender,
    mut rpc_rx: mpsc::UnboundedReceiver<Rpc>,
    updates: mpsc::UnboundedSender<UpdatesLike>,
    home: bool,
    backoff: Backoff,
) {
    let forward = |event: UpdatesLike| {
        let _ = updates.send(event);
    };
    // Only the home connection's state matters to the updates pipeline.
    let notify = |event: UpdatesLike| {
        if home {
            forward(event);
        }
    };

    loop {
        tokio::select! {
            step = sender.step() => match step {
                Ok(received) => received.into_iter().for_each(forward),
                Err(e) => {
                    if e.is_recoverable() && reconnect(&mut sender, backoff).await {
                        notify(UpdatesLike::Reconnected);
                        continue;
                    }
                    give_up(&mut sender, &e);
                    notify(UpdatesLike::ConnectionClosed);
                    break;
                }
            },
            rpc = rpc_rx.recv() => match rpc {
                Some(Rpc { body, tx }) => sender.enqueue_body(body, tx),
                None => {
                    sender.stop().await;
                    break;
                }
            },
        }
    }
}

fn give_up(sender: &mut EncryptedSender, err: &ReadError) {
    warn!("connection to {:?} lost: {err}", sender.addr());
    sender.fail_requests(err);
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invoke { target, body, .. } => {
                let name = body
                    .first_chunk::<4>()
                    .and_then(|id| tl::name_for_id(u32::from_le_bytes(*id)))
                    .unwrap_or("?");
                write!(f, "Invoke({name} in {target:?})")
            }
            Self::Disconnect { dc_id } => write!(f, "Disconnect({dc_id})"),
            Self::Quit => f.write_str("Quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrogram_session::storages::MemorySession;

    fn announced(id: i32, ip: &str, ipv6: bool) -> tl::types::DcOption {
        tl::types::DcOption {
            ipv6,
            media_only: false,
            tcpo_only: false,
            cdn: false,
            r#static: true,
            this_port_only: false,
            id,
            ip_address: ip.to_string(),
            port: 443,
            secret: None,
        }
    }

    #[test]
    fn ipv4_fills_mapped_ipv6() {
        let merged = merge_address(None, &announced(2, "149.154.167.51", false)).unwrap();
        assert_eq!(merged.ipv4, "149.154.167.51:443".parse().unwrap());
        assert_eq!(merged.ipv6.ip(), &"::ffff:149.154.167.51".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn existing_key_is_kept() {
        let known = DcOption {
            id: 2,
            ipv4: "1.2.3.4:443".parse().unwrap(),
            ipv6: "[2001:db8::1]:443".parse().unwrap(),
            auth_key: Some([7; 256]),
        };
        let merged = merge_address(Some(known), &announced(2, "5.6.7.8", false)).unwrap();
        assert_eq!(merged.auth_key, Some([7; 256]));
        assert_eq!(merged.ipv6, "[2001:db8::1]:443".parse().unwrap());
        assert!(merge_address(None, &announced(2, "not an ip", false)).is_none());
    }

    fn runner() -> SenderPoolRunner {
        SenderPool::new(Arc::new(MemorySession::default()), 1).runner
    }

    #[test]
    fn cdn_dc_is_routable_but_not_persisted() {
        let mut runner = runner();
        let mut cdn = announced(203, "91.105.192.100", false);
        cdn.cdn = true;
        cdn.r#static = false;
        let mut media = announced(4, "149.154.165.136", false);
        media.media_only = true;
        runner.store_dc_options(vec![cdn.into(), media.into()]);

        assert!(runner.session.dc_option(203).is_none());
        assert_eq!(
            runner.dc_option(203).map(|dc| dc.ipv4),
            Some("91.105.192.100:443".parse().unwrap())
        );
        assert_eq!(
            runner.session.dc_option(4).map(|dc| dc.ipv4),
            ferrogram_session::known_dc_option(4, false).map(|dc| dc.ipv4)
        );
        assert!(runner.dc_option(204).is_none());
    }

    #[tokio::test]
    async fn cdn_request_waits_for_public_keys() {
        let mut runner = runner();
        let mut cdn = announced(203, "91.105.192.100", false);
        cdn.cdn = true;
        runner.store_dc_options(vec![cdn.into()]);

        let target = Target {
            dc_id: 203,
            media: true,
        };
        for _ in 0..2 {
            let (tx, _rx) = oneshot::channel();
            runner.route(target, Rpc { body: vec![1, 2, 3, 4], tx }).await;
        }

        assert_eq!(runner.awaiting_cdn_keys.len(), 2);
        assert_eq!(runner.deferred.len(), 1);
        let (home, rpc) = &runner.deferred[0];
        assert_eq!(home.dc_id, runner.session.home_dc_id());
        assert_eq!(rpc.body, tl::functions::help::GetCdnConfig {}.to_bytes());

        runner.on_cdn_config(Err(InvocationError::Dropped));
        assert!(runner.awaiting_cdn_keys.is_empty());
        assert!(runner.cdn_keys.is_none());
    }

    #[test]
    fn unreadable_cdn_keys_are_skipped() {
        let config = enums::CdnConfig::from(tl::types::CdnConfig {
            public_keys: vec![
                tl::types::CdnPublicKey {
                    dc_id: 203,
                    public_key: "-----BEGIN RSA PUBLIC KEY-----\nAAAA\n".to_string(),
                }
                .into(),
            ],
        });
        assert!(parse_cdn_keys(&config.to_bytes()).unwrap().is_empty());
        assert!(parse_cdn_keys(&[0; 4]).is_err());
    }

    #[test]
    fn serialized_query_is_wrapped_verbatim() {
        let runner = runner();
        let body = tl::functions::help::GetConfig {}.to_bytes();
        assert_eq!(
            runner.init_connection(Serialized(body.clone())).to_bytes(),
            runner.init_connection(tl::functions::help::GetConfig {}).to_bytes()
        );
    }
}
