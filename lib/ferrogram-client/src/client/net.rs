// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use ferrogram_mtsender::{InvocationError, SenderPool, SenderPoolHandle};
use ferrogram_session::Session;
use ferrogram_tl_types::{self as tl, Deserializable};
use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use tokio::time::sleep;

use super::client::{ClientConfiguration, InvokeOptions};
use super::retry_policy::{RetryContext, RetryPolicy};
use super::Client;

/// How many times a request may be moved to another datacenter before giving up.
const MAX_MIGRATIONS: usize = 3;

/// How many times importing an exported authorization is attempted.
const MAX_AUTH_IMPORT_ATTEMPTS: usize = 3;

/// The connections a [`Client`] sends its requests through.
///
/// Implemented by [`SenderPoolHandle`]. Any other implementation can stand
/// in for it, which is mostly useful to drive a client without a network.
pub trait Network: Send + Sync {
    /// Invoke the serialized request body in the given datacenter.
    ///
    /// `media` selects the connection dedicated to file transfers.
    fn invoke_in_dc(
        &self,
        dc_id: i32,
        media: bool,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<Vec<u8>, InvocationError>>;

    /// Drop any active connection to the given datacenter.
    fn disconnect_from_dc(&self, dc_id: i32);

    /// Close every connection.
    fn quit(&self);
}

impl Network for SenderPoolHandle {
    fn invoke_in_dc(
        &self,
        dc_id: i32,
        media: bool,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<Vec<u8>, InvocationError>> {
        if media {
            Box::pin(SenderPoolHandle::invoke_in_media_dc(self, dc_id, body))
        } else {
            Box::pin(SenderPoolHandle::invoke_in_dc(self, dc_id, body))
        }
    }

    fn disconnect_from_dc(&self, dc_id: i32) {
        SenderPoolHandle::disconnect_from_dc(self, dc_id);
    }

    fn quit(&self) {
        SenderPoolHandle::quit(self);
    }
}

/// Construction, raw invocation and connection management.
impl Client {
    /// A client sending its requests through `sender_pool`.
    ///
    /// The session and `api_id` are taken from the pool, so client and pool
    /// always agree on them.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use ferrogram_client::Client;
    /// use ferrogram_session::storages::MemorySession;
    /// use ferrogram_mtsender::SenderPool;
    ///
    /// const API_ID: i32 = 12345; // from my.telegram.org
    ///
    /// # async fn f() {
    /// let session = Arc::new(MemorySession::default());
    /// let pool = SenderPool::new(session, API_ID);
    /// let client = Client::new(&pool);
    /// // Nothing is sent until the runner is polled.
    /// tokio::spawn(pool.runner.run());
    /// # }
    /// ```
    pub fn new(sender_pool: &SenderPool) -> Self {
        Self::with_configuration(sender_pool, Default::default())
    }

    /// [`Self::new`] with a non-default configuration.
    pub fn with_configuration(
        sender_pool: &SenderPool,
        configuration: ClientConfiguration,
    ) -> Self {
        Self::new_inner(
            Arc::clone(&sender_pool.runner.session),
            sender_pool.runner.api_id,
            Arc::new(sender_pool.handle.clone()),
            configuration,
        )
    }

    /// Creates a client that sends its requests through an arbitrary [`Network`].
    pub fn with_network(
        session: Arc<dyn Session>,
        api_id: i32,
        network: Arc<dyn Network>,
        configuration: ClientConfiguration,
    ) -> Self {
        Self::new_inner(session, api_id, network, configuration)
    }

    /// Sends a raw request to the home datacenter and waits for its result.
    ///
    /// When the server answers that the account lives elsewhere, the home
    /// datacenter is updated and the request sent there.
    /// Errors are otherwise retried as the configured [`RetryPolicy`] decides.
    ///
    /// # Examples
    ///
    /// ```
    /// # async fn f(client: ferrogram_client::Client) -> Result<(), Box<dyn std::error::Error>> {
    /// use ferrogram_client::tl;
    ///
    /// dbg!(client.invoke(&tl::functions::Ping { ping_id: 0 }).await?);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn invoke<R: tl::RemoteCall>(
        &self,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        self.invoke_with(request, InvokeOptions::default()).await
    }

    /// Like [`Self::invoke`], but in the specified DC.
    pub async fn invoke_in_dc<R: tl::RemoteCall>(
        &self,
        dc_id: i32,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        self.invoke_with(
            request,
            InvokeOptions {
                dc_id: Some(dc_id),
                ..Default::default()
            },
        )
        .await
    }

    /// Like [`Self::invoke`], with per-call overrides.
    pub async fn invoke_with<R: tl::RemoteCall>(
        &self,
        request: &R,
        options: InvokeOptions,
    ) -> Result<R::Return, InvocationError> {
        let retry_policy = options
            .retry_policy
            .as_deref()
            .unwrap_or(self.0.configuration.retry_policy.as_ref());
        let timeout = options.timeout.or(self.0.configuration.request_timeout);

        self.do_invoke(options.dc_id, false, request.to_bytes(), timeout, retry_policy)
            .await
            .and_then(|body| R::Return::from_bytes(&body).map_err(|e| e.into()))
    }

    /// Invoke the request over the connection dedicated to file transfers.
    pub(crate) async fn invoke_in_media_dc<R: tl::RemoteCall>(
        &self,
        dc_id: i32,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        self.do_invoke(
            Some(dc_id),
            true,
            request.to_bytes(),
            self.0.configuration.request_timeout,
            self.0.configuration.retry_policy.as_ref(),
        )
        .await
        .and_then(|body| R::Return::from_bytes(&body).map_err(|e| e.into()))
    }

    async fn do_invoke(
        &self,
        dc_id: Option<i32>,
        media: bool,
        request_body: Vec<u8>,
        timeout: Option<Duration>,
        retry_policy: &dyn RetryPolicy,
    ) -> Result<Vec<u8>, InvocationError> {
        let mut retry_context = RetryContext::new();
        let mut migrations = 0;

        loop {
            let target_dc_id = dc_id.unwrap_or_else(|| self.0.session.home_dc_id());
            let call = self
                .0
                .network
                .invoke_in_dc(target_dc_id, media, request_body.clone());

            let result = match timeout {
                Some(duration) => tokio::time::timeout(duration, call)
                    .await
                    .unwrap_or(Err(InvocationError::Timeout)),
                None => call.await,
            };

            let error = match result {
                Ok(response) => break Ok(response),
                Err(e) => e,
            };

            if let Some(new_dc_id) = error.rpc().and_then(|rpc| rpc.migrate_dc()) {
                if dc_id.is_none() && !error.is("FILE_MIGRATE") && migrations < MAX_MIGRATIONS {
                    migrations += 1;
                    info!(
                        "migrating from dc {} to {} after {}",
                        target_dc_id, new_dc_id, error
                    );
                    self.0.network.disconnect_from_dc(target_dc_id);
                    self.0.session.set_home_dc_id(new_dc_id);
                    continue;
                }
                break Err(error);
            }

            if error
                .rpc()
                .is_some_and(|rpc| rpc.is_authorization_revoked())
                && self.0.session.logged_in_user().is_some()
            {
                warn!("authorization is no longer valid: {}", error);
                self.0.session.clear_authorization();
                break Err(error);
            }

            retry_context.record(error);
            match retry_policy.should_retry(&retry_context) {
                ControlFlow::Continue(delay) => {
                    info!(
                        "sleeping on {} for {:?} before retrying",
                        retry_context.error, delay,
                    );
                    sleep(delay).await;
                    retry_context.fail_count = retry_context.fail_count.saturating_add(1);
                    retry_context.slept_so_far += delay;
                }
                ControlFlow::Break(()) => break Err(retry_context.error),
            }
        }
    }

    /// Make the authorization of the home datacenter usable in the given datacenter.
    ///
    /// This is done at most once per datacenter, and only while logged in.
    pub(crate) async fn copy_auth_to_dc(&self, target_dc_id: i32) -> Result<(), InvocationError> {
        let mut auth_copied_to_dcs = self.0.auth_copied_to_dcs.lock().await;
        if auth_copied_to_dcs.contains(&target_dc_id) {
            return Ok(());
        }

        let home_dc_id = self.0.session.home_dc_id();
        if target_dc_id == home_dc_id || self.0.session.logged_in_user().is_none() {
            return Ok(());
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let tl::enums::auth::ExportedAuthorization::ExportedAuthorization(exported) = self
                .invoke(&tl::functions::auth::ExportAuthorization {
                    dc_id: target_dc_id,
                })
                .await?;

            match self
                .invoke_in_media_dc(
                    target_dc_id,
                    &tl::functions::auth::ImportAuthorization {
                        id: exported.id,
                        bytes: exported.bytes,
                    },
                )
                .await
            {
                Ok(_) => break,
                Err(e) if e.is("AUTH_BYTES_INVALID") && attempt < MAX_AUTH_IMPORT_ATTEMPTS => {
                    debug!("authorization import into dc {} failed, retrying", target_dc_id);
                }
                Err(e) => return Err(e),
            }
        }

        info!("authorization copied to dc {}", target_dc_id);
        auth_copied_to_dcs.push(target_dc_id);
        Ok(())
    }

    /// Close every connection owned by the [`SenderPool`] this client was made from.
    ///
    /// Requests made after this fail with [`InvocationError::Dropped`].
    pub fn disconnect(&self) {
        self.0.network.quit();
    }
}
