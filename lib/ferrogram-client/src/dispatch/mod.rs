// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Routing of updates to handlers.
//!
//! Handlers are organized in groups. Groups are visited in ascending order and, within a
//! group, the first handler whose event kind and filter match the update is run. What
//! happens next depends on the [`Propagation`] it returns.
//!
//! ```
//! use ferrogram_client::dispatch::{Dispatcher, EventKind, Propagation, filters};
//!
//! # fn f(client: ferrogram_client::Client) {
//! let mut dispatcher = Dispatcher::new(client);
//! dispatcher.add_handler(0, EventKind::Message, filters::command("start"), |client, context| async move {
//!     if let Some(chat) = context.update.chat() {
//!         if let Some(chat) = client.session().peer(chat) {
//!             client.send_message(&chat, "Hello!").await?;
//!         }
//!     }
//!     Ok::<_, ferrogram_client::dispatch::HandlerError>(Propagation::EndGroup)
//! });
//! # }
//! ```

pub mod filters;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use ferrogram_mtsender::InvocationError;
use futures_util::future::BoxFuture;
use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::Client;
use crate::client::UpdateStream;
use crate::update::Update;
pub use filters::{Context, Filter, Matches};

/// What the dispatcher should do after a handler runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Skip the rest of the handlers in this group, and continue with the next group.
    #[default]
    EndGroup,
    /// Keep looking for matching handlers in this same group.
    Continue,
    /// Don't run any more handlers for this update.
    Stop,
}

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = Result<Propagation, HandlerError>;

/// The kind of event a handler is interested in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Every update, including those with a more specific kind.
    Raw,
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    DeletedMessages,
    CallbackQuery,
    InlineQuery,
    UserStatus,
    Poll,
}

impl EventKind {
    /// The kind of a given update, or `None` if only raw handlers can handle it.
    pub fn of(update: &Update) -> Option<Self> {
        Some(match update {
            Update::NewMessage(_) => Self::Message,
            Update::MessageEdited(_) => Self::EditedMessage,
            Update::ChannelPost(_) => Self::ChannelPost,
            Update::ChannelPostEdited(_) => Self::EditedChannelPost,
            Update::MessageDeleted(_) => Self::DeletedMessages,
            Update::CallbackQuery(_) => Self::CallbackQuery,
            Update::InlineQuery(_) => Self::InlineQuery,
            Update::UserStatus(_) => Self::UserStatus,
            Update::Poll(_) => Self::Poll,
            Update::Raw(_) => return None,
        })
    }

    fn accepts(self, update: &Update) -> bool {
        self == Self::Raw || Self::of(update) == Some(self)
    }
}

type Callback = Arc<dyn Fn(Client, Context) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

struct Handler {
    kind: EventKind,
    filter: Box<dyn Filter>,
    callback: Callback,
}

/// Configuration that controls [`Dispatcher::run`].
#[derive(Clone, Debug)]
pub struct DispatcherConfiguration {
    /// How many updates may be handled at the same time.
    pub workers: usize,
}

impl Default for DispatcherConfiguration {
    /// Returns an instance with as many workers as processors plus four, up to 32.
    fn default() -> Self {
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self {
            workers: (cpus + 4).min(32),
        }
    }
}

/// Routes updates to the handlers added to it.
pub struct Dispatcher {
    client: Client,
    groups: BTreeMap<i32, Vec<Handler>>,
}

impl Dispatcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            groups: BTreeMap::new(),
        }
    }

    /// Add a handler at the end of the given group.
    ///
    /// The callback receives the client and the [`Context`] the filter was checked against.
    pub fn add_handler<F, C, Fut>(
        &mut self,
        group: i32,
        kind: EventKind,
        filter: F,
        callback: C,
    ) -> &mut Self
    where
        F: Filter,
        C: Fn(Client, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.groups.entry(group).or_default().push(Handler {
            kind,
            filter: Box::new(filter),
            callback: Arc::new(move |client, context| Box::pin(callback(client, context))),
        });
        self
    }

    /// Remove every handler in the given group.
    pub fn remove_group(&mut self, group: i32) {
        self.groups.remove(&group);
    }

    /// Run the handlers interested in the update, following the propagation rules.
    ///
    /// Handlers that fail are logged, and their group ends as if they had returned
    /// [`Propagation::EndGroup`].
    pub async fn dispatch(&self, update: &Update) {
        let self_id = self.client.session().logged_in_user().map(|user| user.id);

        for (group, handlers) in &self.groups {
            for handler in handlers {
                if !handler.kind.accepts(update) {
                    continue;
                }
                let mut context = Context::new(update.clone(), self_id);
                if !handler.filter.check(&mut context) {
                    continue;
                }

                let propagation = match (handler.callback)(self.client.clone(), context).await {
                    Ok(propagation) => propagation,
                    Err(err) => {
                        warn!("handler in group {group} failed: {err}");
                        Propagation::EndGroup
                    }
                };
                match propagation {
                    Propagation::Continue => continue,
                    Propagation::EndGroup => break,
                    Propagation::Stop => {
                        debug!("propagation stopped in group {group}");
                        return;
                    }
                }
            }
        }
    }

    /// Dispatch every update from the stream until it ends.
    ///
    /// Up to [`DispatcherConfiguration::workers`] updates are handled concurrently. Updates
    /// keep being read from the stream while every worker is busy, and wait for a free
    /// worker in the order they arrived. Returns once the stream fails, after the handlers
    /// that were queued or running finish.
    pub async fn run(
        self,
        mut updates: UpdateStream,
        configuration: DispatcherConfiguration,
    ) -> Result<(), InvocationError> {
        let workers = Arc::new(Semaphore::new(configuration.workers.max(1)));
        let this = Arc::new(self);
        let mut tasks = JoinSet::new();

        let result = loop {
            while let Some(joined) = tasks.try_join_next() {
                if let Err(err) = joined {
                    warn!("update handling task failed: {err}");
                }
            }

            let update = match updates.next().await {
                Ok(update) => update,
                Err(InvocationError::Dropped) => break Ok(()),
                Err(err) => break Err(err),
            };
            let this = Arc::clone(&this);
            let workers = Arc::clone(&workers);
            tasks.spawn(async move {
                let Ok(_permit) = workers.acquire_owned().await else {
                    return;
                };
                this.dispatch(&update).await
            });
        };

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                warn!("update handling task failed: {err}");
            }
        }
        updates.sync_update_state();
        result
    }
}
