// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ferrogram_session::Session;

use super::net::Network;
use super::retry_policy::{AutoSleep, RetryPolicy};
use crate::message_cache::MessageCache;

pub(crate) struct ClientInner {
    pub(crate) session: Arc<dyn Session>,
    pub(crate) api_id: i32,
    pub(crate) network: Arc<dyn Network>,
    pub(crate) configuration: ClientConfiguration,
    pub(crate) auth_copied_to_dcs: tokio::sync::Mutex<Vec<i32>>,
    pub(crate) message_cache: Mutex<MessageCache>,
}

/// High-level access to the API over a [`SenderPool`].
///
/// Everything else in this crate is reached through a client.
///
/// The client is cheap to clone, and every clone shares the same connections, session and
/// caches. Connections are owned by the [`SenderPoolRunner`], which must be running for any
/// request to make progress.
///
/// [`SenderPool`]: ferrogram_mtsender::SenderPool
/// [`SenderPoolRunner`]: ferrogram_mtsender::SenderPoolRunner
#[derive(Clone)]
pub struct Client(pub(crate) Arc<ClientInner>);

/// How a [`Client`] makes its requests.
pub struct ClientConfiguration {
    /// Consulted whenever a request fails.
    pub retry_policy: Box<dyn RetryPolicy>,

    /// How long to wait for the response of a single attempt before giving up on it
    /// with [`InvocationError::Timeout`].
    ///
    /// A response arriving after the timeout is discarded. `None` waits forever.
    ///
    /// [`InvocationError::Timeout`]: ferrogram_mtsender::InvocationError::Timeout
    pub request_timeout: Option<Duration>,

    /// How many messages are remembered so that their media can be refreshed
    /// when a file reference expires.
    pub message_cache_size: usize,
}

/// Options for [`Client::stream_updates`].
pub struct UpdatesConfiguration {
    /// Fetch what happened while the client was offline, starting from the
    /// stored updates state. Off by default, in which case only updates
    /// arriving from now on are delivered.
    pub catch_up: bool,

    /// Updates buffered while the stream is not being polled.
    ///
    /// Updates beyond the limit are dropped with a rate-limited warning.
    /// `Some(0)` buffers nothing and `None` buffers without bound.
    pub update_queue_limit: Option<usize>,
}

/// Per-call overrides for [`Client::invoke_with`].
#[derive(Default)]
pub struct InvokeOptions {
    /// Datacenter to send the request to, instead of the home datacenter.
    ///
    /// Requests sent to a datacenter other than home are not migrated.
    pub dc_id: Option<i32>,

    /// Overrides [`ClientConfiguration::request_timeout`].
    pub timeout: Option<Duration>,

    /// Overrides [`ClientConfiguration::retry_policy`].
    pub retry_policy: Option<Box<dyn RetryPolicy>>,
}

impl Default for ClientConfiguration {
    /// Returns an instance with an [`AutoSleep::default`] retry policy, no
    /// timeout, and room for ten thousand cached messages.
    fn default() -> Self {
        Self {
            retry_policy: Box::new(AutoSleep::default()),
            request_timeout: None,
            message_cache_size: 10_000,
        }
    }
}

impl Default for UpdatesConfiguration {
    /// No catching up, buffering up to 100 updates.
    fn default() -> Self {
        Self {
            catch_up: false,
            update_queue_limit: Some(100),
        }
    }
}

impl Client {
    pub(crate) fn new_inner(
        session: Arc<dyn Session>,
        api_id: i32,
        network: Arc<dyn Network>,
        configuration: ClientConfiguration,
    ) -> Self {
        let message_cache = MessageCache::new(configuration.message_cache_size);
        Self(Arc::new(ClientInner {
            session,
            api_id,
            network,
            configuration,
            auth_copied_to_dcs: tokio::sync::Mutex::new(Vec::new()),
            message_cache: Mutex::new(message_cache),
        }))
    }

    /// The session this client reads from and writes to.
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.0.session
    }
}
