// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Methods to deal with and offer access to updates.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ferrogram_mtsender::{InvocationError, UpdatesLike};
use ferrogram_session::types::{PeerId, UpdateState};
use ferrogram_tl_types as tl;
use log::{debug, info, trace, warn};
use tokio::sync::mpsc;

use super::{Client, UpdatesConfiguration};
use crate::peer::{Peer, PeerMap};
use crate::update::Update;
use crate::update::message_box::{
    BOT_CHANNEL_DIFF_LIMIT, Decision, Entry, MessageBox, NO_SEQ, PtsInfo,
    USER_CHANNEL_DIFF_LIMIT, channel_difference_request,
};

/// How long to wait after warning the user that the updates limit was exceeded.
const UPDATE_LIMIT_EXCEEDED_LOG_COOLDOWN: Duration = Duration::from_secs(300);

/// A channel whose difference must be fetched before its updates can be dispatched.
enum ChannelFetch {
    /// Some peers of the update are "min", so the update is fetched again to get them in full.
    Message {
        channel_id: i64,
        info: PtsInfo,
        message_id: Option<i32>,
        fallback: (tl::enums::Update, PeerMap),
    },
    /// Updates went missing, so everything since the local state is fetched.
    Resync { channel_id: i64, pts: Option<i32> },
}

/// The account-wide updates of a short envelope, kept in case the difference can't be fetched.
type Fallback = Vec<(tl::enums::Update, PeerMap)>;

pub struct UpdateStream {
    client: Client,
    message_box: MessageBox,
    // When did we last warn the user that the update queue filled up?
    // This is used to avoid spamming the log.
    last_update_limit_warn: Option<Instant>,
    buffer: VecDeque<(tl::enums::Update, PeerMap)>,
    channel_fetches: VecDeque<ChannelFetch>,
    short_fallback: Fallback,
    updates: mpsc::UnboundedReceiver<UpdatesLike>,
    configuration: UpdatesConfiguration,
    should_get_state: bool,
}

fn message_of(update: &tl::enums::Update) -> Option<&tl::enums::Message> {
    match update {
        tl::enums::Update::NewChannelMessage(u) => Some(&u.message),
        tl::enums::Update::EditChannelMessage(u) => Some(&u.message),
        _ => None,
    }
}

/// Whether the update references a peer that only came in its "min" form.
fn references_min_peer(channel_id: i64, update: &tl::enums::Update, peers: &PeerMap) -> bool {
    let is_min = |id| peers.get(id).is_some_and(|peer: &Peer| peer.info().min);

    let sender = match message_of(update) {
        Some(tl::enums::Message::Message(message)) => message.from_id.as_ref(),
        Some(tl::enums::Message::Service(message)) => message.from_id.as_ref(),
        _ => None,
    };
    is_min(PeerId::channel(channel_id)) || sender.is_some_and(|peer| is_min(PeerId::from(peer)))
}

fn short_message(short: tl::types::UpdateShortMessage, self_id: Option<i64>) -> tl::enums::Update {
    let sender = if short.out { self_id } else { Some(short.user_id) };
    tl::types::UpdateNewMessage {
        message: tl::types::Message {
            out: short.out,
            mentioned: short.mentioned,
            silent: short.silent,
            post: false,
            id: short.id,
            from_id: sender.map(|user_id| tl::types::PeerUser { user_id }.into()),
            peer_id: tl::types::PeerUser {
                user_id: short.user_id,
            }
            .into(),
            reply_to_msg_id: None,
            date: short.date,
            message: short.message,
            media: None,
            entities: short.entities,
            views: None,
            edit_date: None,
            post_author: None,
            grouped_id: None,
        }
        .into(),
        pts: short.pts,
        pts_count: short.pts_count,
    }
    .into()
}

fn short_chat_message(short: tl::types::UpdateShortChatMessage) -> tl::enums::Update {
    tl::types::UpdateNewMessage {
        message: tl::types::Message {
            out: short.out,
            mentioned: short.mentioned,
            silent: short.silent,
            post: false,
            id: short.id,
            from_id: Some(
                tl::types::PeerUser {
                    user_id: short.from_id,
                }
                .into(),
            ),
            peer_id: tl::types::PeerChat {
                chat_id: short.chat_id,
            }
            .into(),
            reply_to_msg_id: None,
            date: short.date,
            message: short.message,
            media: None,
            entities: short.entities,
            views: None,
            edit_date: None,
            post_author: None,
            grouped_id: None,
        }
        .into(),
        pts: short.pts,
        pts_count: short.pts_count,
    }
    .into()
}

impl UpdateStream {
    pub async fn next(&mut self) -> Result<Update, InvocationError> {
        let (update, peers) = self.next_raw().await?;
        let update = Update::from_raw(update, &peers);
        if let Some(message) = update.message() {
            self.client.cache_message(message);
        }
        Ok(update)
    }

    pub async fn next_raw(&mut self) -> Result<(tl::enums::Update, PeerMap), InvocationError> {
        if self.should_get_state {
            self.should_get_state = false;
            match self
                .client
                .invoke(&tl::functions::updates::GetState {})
                .await
            {
                Ok(state) => {
                    self.message_box.set_state(state);
                    self.sync_update_state();
                }
                Err(err) => {
                    // The account may no longer actually be logged in, or it can rarely fail.
                    // The state will be adopted from the updates as they arrive.
                    warn!("failed to fetch the initial update state: {err}");
                }
            }
        }

        loop {
            if let Some(update) = self.buffer.pop_front() {
                return Ok(update);
            }

            if let Some(request) = self.message_box.get_difference() {
                self.get_difference(request).await?;
                continue;
            }

            if let Some(fetch) = self.channel_fetches.pop_front() {
                self.get_channel_difference(fetch).await?;
                continue;
            }

            match self.updates.recv().await {
                Some(updates) => self.process_socket_updates(updates),
                None => break Err(InvocationError::Dropped),
            }
        }
    }

    async fn get_difference(
        &mut self,
        request: tl::functions::updates::GetDifference,
    ) -> Result<(), InvocationError> {
        trace!("requesting {request:?}");
        match self.client.invoke(&request).await {
            Ok(difference) => {
                let (updates, users, chats) = self.message_box.apply_difference(difference);
                let peers = PeerMap::new(users, chats);
                self.client.cache_peers(&peers);
                self.extend_update_queue(updates, peers);
                if !self.message_box.is_getting_diff(Entry::AccountWide) {
                    // Whatever the short envelopes contained is part of the difference.
                    self.short_fallback.clear();
                    self.sync_update_state();
                }
                Ok(())
            }
            Err(err) => {
                self.message_box.end_get_diff(Entry::AccountWide);
                if self.short_fallback.is_empty() {
                    return Err(err);
                }
                warn!("failed to get difference, dispatching short updates as-is: {err}");
                for (update, peers) in std::mem::take(&mut self.short_fallback) {
                    self.extend_update_queue(vec![update], peers);
                }
                Ok(())
            }
        }
    }

    fn channel_diff_limit(&self) -> i32 {
        match self.client.0.session.logged_in_user() {
            Some(user) if user.bot => BOT_CHANNEL_DIFF_LIMIT,
            _ => USER_CHANNEL_DIFF_LIMIT,
        }
    }

    async fn get_channel_difference(&mut self, fetch: ChannelFetch) -> Result<(), InvocationError> {
        let channel_id = match &fetch {
            ChannelFetch::Message { channel_id, .. } | ChannelFetch::Resync { channel_id, .. } => {
                *channel_id
            }
        };
        let entry = Entry::Channel(channel_id);
        let input_channel = self
            .client
            .0
            .session
            .peer(PeerId::channel(channel_id))
            .and_then(|peer| peer.input_channel());

        let Some(input_channel) = input_channel else {
            warn!("cannot getChannelDifference for {channel_id} as we're missing its hash");
            self.message_box.end_get_diff(entry);
            if let ChannelFetch::Message { fallback, .. } = fetch {
                self.extend_update_queue(vec![fallback.0], fallback.1);
            }
            return Ok(());
        };

        let request = match &fetch {
            ChannelFetch::Message {
                info, message_id, ..
            } => channel_difference_request(input_channel, info, *message_id),
            ChannelFetch::Resync { pts, .. } => {
                let Some(pts) = self.message_box.pts(entry).or(*pts) else {
                    warn!("cannot getChannelDifference for {channel_id} without a known pts");
                    self.message_box.end_get_diff(entry);
                    return Ok(());
                };
                tl::functions::updates::GetChannelDifference {
                    force: false,
                    channel: input_channel,
                    filter: tl::types::ChannelMessagesFilterEmpty {}.into(),
                    pts,
                    limit: self.channel_diff_limit(),
                }
            }
        };
        trace!("requesting {request:?}");

        let difference = match self.client.invoke(&request).await {
            Ok(difference) => difference,
            Err(InvocationError::Dropped) => return Err(InvocationError::Dropped),
            Err(err) => {
                if err.is("CHANNEL_PRIVATE") {
                    info!("account can no longer fetch updates of channel {channel_id}");
                } else {
                    // PERSISTENT_TIMESTAMP_OUTDATED and internal errors are temporary.
                    // The difference is fetched again on the next gap.
                    warn!("getting difference for channel {channel_id} failed: {err}");
                }
                self.message_box.end_get_diff(entry);
                if let ChannelFetch::Message { fallback, .. } = fetch {
                    self.extend_update_queue(vec![fallback.0], fallback.1);
                }
                return Ok(());
            }
        };

        let ((updates, users, chats), is_final) =
            self.message_box.apply_channel_difference(channel_id, difference);
        let peers = PeerMap::new(users, chats);
        self.client.cache_peers(&peers);

        match fetch {
            ChannelFetch::Message { fallback, .. } if updates.is_empty() => {
                debug!("channel {channel_id} difference was empty, dispatching original update");
                self.extend_update_queue(vec![fallback.0], fallback.1);
            }
            ChannelFetch::Message { .. } => self.extend_update_queue(updates, peers),
            ChannelFetch::Resync { .. } => {
                self.extend_update_queue(updates, peers);
                if !is_final {
                    self.channel_fetches
                        .push_front(ChannelFetch::Resync { channel_id, pts: None });
                }
            }
        }
        self.sync_update_state();
        Ok(())
    }

    pub(crate) fn process_socket_updates(&mut self, updates: UpdatesLike) {
        let updates = match updates {
            UpdatesLike::Updates(updates) => updates,
            UpdatesLike::Reconnected | UpdatesLike::ConnectionClosed => {
                info!("connection to the home datacenter was interrupted, fetching difference");
                self.begin_get_diff();
                return;
            }
        };

        use tl::enums::Updates as U;
        match updates {
            U::TooLong(_) => {
                info!("received updatesTooLong, fetching difference");
                self.begin_get_diff();
            }
            U::UpdateShortMessage(short) => {
                let self_id = self.client.0.session.logged_in_user().map(|user| user.id);
                self.process_short(short_message(short, self_id));
            }
            U::UpdateShortChatMessage(short) => self.process_short(short_chat_message(short)),
            U::UpdateShortSentMessage(sent) => {
                // The message itself was already returned to whoever sent it.
                let info = PtsInfo {
                    pts: sent.pts,
                    pts_count: sent.pts_count,
                    entry: Entry::AccountWide,
                };
                if self.message_box.check(&info) == Decision::Gap {
                    self.begin_get_diff();
                }
            }
            U::UpdateShort(short) => {
                self.process_batch(vec![short.update], Vec::new(), Vec::new(), short.date, NO_SEQ)
            }
            U::Combined(combined) => self.process_batch(
                combined.updates,
                combined.users,
                combined.chats,
                combined.date,
                combined.seq,
            ),
            U::Updates(updates) => self.process_batch(
                updates.updates,
                updates.users,
                updates.chats,
                updates.date,
                updates.seq,
            ),
        }
    }

    fn begin_get_diff(&mut self) {
        // Without a known state there is nothing to get the difference from.
        if !self.message_box.is_empty() {
            self.message_box.begin_get_diff(Entry::AccountWide);
        }
    }

    /// Short envelopes lack the peers they mention, so the difference is fetched to get them.
    fn process_short(&mut self, update: tl::enums::Update) {
        if self.message_box.is_empty() {
            self.process_batch(vec![update], Vec::new(), Vec::new(), 0, NO_SEQ);
            return;
        }
        self.short_fallback.push((update, PeerMap::default()));
        self.message_box.begin_get_diff(Entry::AccountWide);
    }

    fn process_batch(
        &mut self,
        mut updates: Vec<tl::enums::Update>,
        users: Vec<tl::enums::User>,
        chats: Vec<tl::enums::Chat>,
        date: i32,
        seq: i32,
    ) {
        let peers = PeerMap::new(users, chats);
        // Peers are known before any update mentioning them is dispatched.
        self.client.cache_peers(&peers);
        self.message_box.set_date_seq(date, seq);

        updates.sort_by_key(|update| {
            PtsInfo::from_update(update).map_or(0, |info| info.pts - info.pts_count)
        });

        let mut ready = Vec::with_capacity(updates.len());
        for update in updates {
            let Some(info) = PtsInfo::from_update(&update) else {
                if let tl::enums::Update::ChannelTooLong(too_long) = &update {
                    self.queue_resync(too_long.channel_id, too_long.pts);
                } else {
                    ready.push(update);
                }
                continue;
            };

            match info.entry {
                Entry::AccountWide => {
                    if self.message_box.is_getting_diff(Entry::AccountWide) {
                        // The difference will contain this update too.
                        continue;
                    }
                    match self.message_box.check(&info) {
                        Decision::Apply => ready.push(update),
                        Decision::Duplicate => {}
                        Decision::Gap => self.message_box.begin_get_diff(Entry::AccountWide),
                    }
                }
                Entry::Channel(channel_id) => {
                    if self.message_box.is_getting_diff(info.entry) {
                        continue;
                    }
                    if references_min_peer(channel_id, &update, &peers) {
                        debug!("update for channel {channel_id} has min peers, refetching it");
                        let message_id = message_of(&update).map(message_id);
                        self.channel_fetches.push_back(ChannelFetch::Message {
                            channel_id,
                            info,
                            message_id,
                            fallback: (update, peers.clone()),
                        });
                        continue;
                    }
                    match self.message_box.check(&info) {
                        Decision::Apply => ready.push(update),
                        Decision::Duplicate => {}
                        Decision::Gap => self.queue_resync(channel_id, None),
                    }
                }
            }
        }

        self.extend_update_queue(ready, peers);
    }

    fn queue_resync(&mut self, channel_id: i64, pts: Option<i32>) {
        let entry = Entry::Channel(channel_id);
        if !self.message_box.is_getting_diff(entry) {
            self.message_box.begin_get_diff(entry);
            self.channel_fetches
                .push_back(ChannelFetch::Resync { channel_id, pts });
        }
    }

    fn extend_update_queue(&mut self, mut updates: Vec<tl::enums::Update>, peers: PeerMap) {
        if let Some(limit) = self.configuration.update_queue_limit {
            if let Some(exceeds) = (self.buffer.len() + updates.len()).checked_sub(limit + 1) {
                let exceeds = (exceeds + 1).min(updates.len());
                let now = Instant::now();
                let notify = match self.last_update_limit_warn {
                    None => true,
                    Some(instant) => now - instant > UPDATE_LIMIT_EXCEEDED_LOG_COOLDOWN,
                };

                updates.truncate(updates.len() - exceeds);
                if notify {
                    warn!(
                        "{exceeds} updates were dropped because the update_queue_limit was exceeded"
                    );
                    self.last_update_limit_warn = Some(now);
                }
            }
        }

        self.buffer
            .extend(updates.into_iter().map(|update| (update, peers.clone())));
    }

    /// Synchronize the updates state to the session.
    pub fn sync_update_state(&self) {
        self.client
            .0
            .session
            .set_update_state(UpdateState::All(self.message_box.session_state()));
    }
}

fn message_id(message: &tl::enums::Message) -> i32 {
    match message {
        tl::enums::Message::Empty(message) => message.id,
        tl::enums::Message::Message(message) => message.id,
        tl::enums::Message::Service(message) => message.id,
    }
}

impl Drop for UpdateStream {
    fn drop(&mut self) {
        self.sync_update_state();
    }
}

impl Client {
    /// Returns an asynchronous stream of processed updates.
    ///
    /// The updates are guaranteed to be in order, and any gaps will be resolved.\
    /// **Important** to note that for gaps in channels to be resolved, the channels must have
    /// been persisted in the session cache beforehand (i.e. be retrievable with
    /// [`Session::peer`](ferrogram_session::Session::peer)).
    ///
    /// The updates are wrapped in [`crate::Update`] to make them more convenient to use,
    /// but their raw type is still accessible to bridge any missing functionality.
    pub fn stream_updates(
        &self,
        updates: mpsc::UnboundedReceiver<UpdatesLike>,
        configuration: UpdatesConfiguration,
    ) -> UpdateStream {
        let mut message_box = if configuration.catch_up {
            MessageBox::load(&self.0.session.updates_state())
        } else {
            // If the user doesn't want to bother with catching up on previous update, start with
            // pristine state instead.
            MessageBox::new()
        };
        if !message_box.is_empty() {
            message_box.begin_get_diff(Entry::AccountWide);
        }
        // Don't bother getting pristine update state if we're not logged in.
        let should_get_state =
            message_box.is_empty() && self.0.session.logged_in_user().is_some();

        UpdateStream {
            client: self.clone(),
            message_box,
            last_update_limit_warn: None,
            buffer: VecDeque::new(),
            channel_fetches: VecDeque::new(),
            short_fallback: Vec::new(),
            updates,
            configuration,
            should_get_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::Future;

    fn get_update_stream() -> UpdateStream {
        panic!()
    }

    #[test]
    fn ensure_next_update_future_impls_send() {
        if false {
            // We just want it to type-check, not actually run.
            fn typeck(_: impl Future + Send) {}
            typeck(get_update_stream().next());
        }
    }

    #[test]
    fn check_short_message_direction() {
        let short = |out| tl::types::UpdateShortMessage {
            out,
            mentioned: false,
            media_unread: false,
            silent: false,
            id: 3,
            user_id: 20,
            message: "hi".to_string(),
            pts: 5,
            pts_count: 1,
            date: 0,
            via_bot_id: None,
            entities: None,
            ttl_period: None,
        };

        let sender = |update: tl::enums::Update| match update {
            tl::enums::Update::NewMessage(u) => match u.message {
                tl::enums::Message::Message(m) => (m.from_id, m.peer_id),
                _ => unreachable!(),
            },
            _ => unreachable!(),
        };

        let user = |user_id| tl::enums::Peer::User(tl::types::PeerUser { user_id });
        assert_eq!(
            sender(short_message(short(false), Some(10))),
            (Some(user(20)), user(20))
        );
        assert_eq!(
            sender(short_message(short(true), Some(10))),
            (Some(user(10)), user(20))
        );
    }
}
