// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bookkeeping of the persistent timestamps needed to process updates in order.
//!
//! Each message box tracks the `pts` of an entry. An update carrying `(pts, pts_count)`
//! can be applied only when `local_pts + pts_count == pts`. If the left side is larger the
//! update was already seen, and if it is smaller some updates went missing, which must be
//! recovered by fetching the difference.
//!
//! See <https://core.telegram.org/api/updates#message-related-event-sequences>.
use std::collections::{HashMap, HashSet};

use ferrogram_session::types::{ChannelState, UpdatesState};
use ferrogram_tl_types as tl;
use log::{debug, info, trace};

/// Telegram sends `seq` equal to `0` when "it doesn't matter", so we use that value too.
pub(crate) const NO_SEQ: i32 = 0;

// See https://core.telegram.org/method/updates.getChannelDifference.
pub(crate) const BOT_CHANNEL_DIFF_LIMIT: i32 = 100000;
pub(crate) const USER_CHANNEL_DIFF_LIMIT: i32 = 100;

/// A [`MessageBox`] entry key.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Entry {
    /// Account-wide `pts`.
    ///
    /// This includes private conversations (one-to-one) and small group chats.
    AccountWide,
    /// Channel-specific `pts`, keyed by the bare channel identifier.
    ///
    /// This includes "megagroup", "broadcast" and "supergroup" channels.
    Channel(i64),
}

/// Represents the information needed to correctly handle a specific `tl::enums::Update`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PtsInfo {
    pub(crate) pts: i32,
    pub(crate) pts_count: i32,
    pub(crate) entry: Entry,
}

/// What should be done with an update after checking its [`PtsInfo`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    /// The update is next in sequence and has been applied to the local state.
    Apply,
    /// The update was already processed before.
    Duplicate,
    /// Some updates before this one are missing.
    Gap,
}

/// Alias for the commonly-referenced three-tuple of update and related peers.
pub(crate) type UpdateAndPeers = (
    Vec<tl::enums::Update>,
    Vec<tl::enums::User>,
    Vec<tl::enums::Chat>,
);

fn message_channel_id(message: &tl::enums::Message) -> Option<i64> {
    let peer = match message {
        tl::enums::Message::Empty(message) => message.peer_id.as_ref()?,
        tl::enums::Message::Message(message) => &message.peer_id,
        tl::enums::Message::Service(message) => &message.peer_id,
    };
    match peer {
        tl::enums::Peer::Channel(channel) => Some(channel.channel_id),
        _ => None,
    }
}

impl PtsInfo {
    pub(crate) fn from_update(update: &tl::enums::Update) -> Option<Self> {
        use tl::enums::Update as U;

        let (pts, pts_count, entry) = match update {
            U::NewMessage(u) => (u.pts, u.pts_count, Entry::AccountWide),
            U::EditMessage(u) => (u.pts, u.pts_count, Entry::AccountWide),
            U::DeleteMessages(u) => (u.pts, u.pts_count, Entry::AccountWide),
            U::NewChannelMessage(u) => (
                u.pts,
                u.pts_count,
                Entry::Channel(message_channel_id(&u.message)?),
            ),
            U::EditChannelMessage(u) => (
                u.pts,
                u.pts_count,
                Entry::Channel(message_channel_id(&u.message)?),
            ),
            U::DeleteChannelMessages(u) => {
                (u.pts, u.pts_count, Entry::Channel(u.channel_id))
            }
            _ => return None,
        };
        Some(Self {
            pts,
            pts_count,
            entry,
        })
    }
}

/// The `pts` of every known entry, along with the account-wide `qts`, `date` and `seq`.
#[derive(Debug, Default)]
pub(crate) struct MessageBox {
    map: HashMap<Entry, i32>,
    qts: i32,
    date: i32,
    seq: i32,
    /// For which entries are we currently getting difference.
    getting_diff_for: HashSet<Entry>,
}

impl MessageBox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Create a [`MessageBox`] from a previously known update state.
    pub(crate) fn load(state: &UpdatesState) -> Self {
        let mut map = HashMap::with_capacity(state.channels.len() + 1);
        if state.pts != 0 {
            map.insert(Entry::AccountWide, state.pts);
        }
        map.extend(
            state
                .channels
                .iter()
                .map(|channel| (Entry::Channel(channel.id), channel.pts)),
        );
        Self {
            map,
            qts: state.qts,
            date: state.date,
            seq: state.seq,
            getting_diff_for: HashSet::new(),
        }
    }

    /// Return the current state in a format that sessions understand.
    pub(crate) fn session_state(&self) -> UpdatesState {
        let mut channels = self
            .map
            .iter()
            .filter_map(|(entry, pts)| match entry {
                Entry::Channel(id) => Some(ChannelState { id: *id, pts: *pts }),
                Entry::AccountWide => None,
            })
            .collect::<Vec<_>>();
        channels.sort_by_key(|channel| channel.id);

        UpdatesState {
            pts: self.pts(Entry::AccountWide).unwrap_or(0),
            qts: self.qts,
            date: self.date,
            seq: self.seq,
            channels,
        }
    }

    /// Return true if the message box is empty and has no state yet.
    pub(crate) fn is_empty(&self) -> bool {
        !self.map.contains_key(&Entry::AccountWide)
    }

    pub(crate) fn pts(&self, entry: Entry) -> Option<i32> {
        self.map.get(&entry).copied()
    }

    /// Sets the update state, usually from the result of `updates.getState`.
    pub(crate) fn set_state(&mut self, state: tl::enums::updates::State) {
        let tl::enums::updates::State::State(state) = state;
        trace!("setting state {state:?}");
        self.map.insert(Entry::AccountWide, state.pts);
        self.qts = state.qts;
        self.date = state.date;
        self.seq = state.seq;
    }

    /// Record the `pts` of an entry, never moving it backwards.
    pub(crate) fn set_pts(&mut self, entry: Entry, pts: i32) {
        let local = self.map.entry(entry).or_insert(pts);
        *local = (*local).max(pts);
    }

    /// Record the auxiliary `date` and `seq` of an updates container.
    pub(crate) fn set_date_seq(&mut self, date: i32, seq: i32) {
        if date != 0 {
            self.date = self.date.max(date);
        }
        if seq != NO_SEQ {
            self.seq = seq;
        }
    }

    /// Check whether an update with the given [`PtsInfo`] can be applied.
    ///
    /// Updates that are next in sequence advance the local state. Entries without any
    /// local state yet adopt the one of the update. Updates that don't advance the state
    /// (`pts_count == 0`) are never considered to be a gap.
    pub(crate) fn check(&mut self, info: &PtsInfo) -> Decision {
        let Some(local_pts) = self.pts(info.entry) else {
            debug!("adopting pts {} for {:?}", info.pts, info.entry);
            self.map.insert(info.entry, info.pts);
            return Decision::Apply;
        };

        if info.pts_count == 0 {
            self.set_pts(info.entry, info.pts);
            return Decision::Apply;
        }

        let expected = local_pts + info.pts_count;
        if expected == info.pts {
            self.map.insert(info.entry, info.pts);
            Decision::Apply
        } else if expected > info.pts {
            debug!(
                "skipping update for {:?} (local {:?}, count {:?}, remote {:?})",
                info.entry, local_pts, info.pts_count, info.pts
            );
            Decision::Duplicate
        } else {
            info!(
                "gap on update for {:?} (local {:?}, count {:?}, remote {:?})",
                info.entry, local_pts, info.pts_count, info.pts
            );
            Decision::Gap
        }
    }

    pub(crate) fn begin_get_diff(&mut self, entry: Entry) {
        self.getting_diff_for.insert(entry);
    }

    pub(crate) fn end_get_diff(&mut self, entry: Entry) {
        self.getting_diff_for.remove(&entry);
    }

    pub(crate) fn is_getting_diff(&self, entry: Entry) -> bool {
        self.getting_diff_for.contains(&entry)
    }

    /// Whether there's any need to call `updates.getDifference`, and the request to do so.
    pub(crate) fn get_difference(&self) -> Option<tl::functions::updates::GetDifference> {
        if !self.is_getting_diff(Entry::AccountWide) {
            return None;
        }
        let pts = self.pts(Entry::AccountWide)?;
        Some(tl::functions::updates::GetDifference {
            pts,
            pts_limit: None,
            pts_total_limit: None,
            date: self.date,
            qts: self.qts,
            qts_limit: None,
        })
    }

    /// Apply the result of `updates.getDifference`, returning the updates it contained.
    ///
    /// Getting difference ends unless the result was only a slice of it.
    pub(crate) fn apply_difference(
        &mut self,
        difference: tl::enums::updates::Difference,
    ) -> UpdateAndPeers {
        trace!("applying account difference: {difference:?}");
        match difference {
            tl::enums::updates::Difference::Empty(diff) => {
                debug!("handling empty difference (date = {}, seq = {})", diff.date, diff.seq);
                self.date = diff.date;
                self.seq = diff.seq;
                self.end_get_diff(Entry::AccountWide);
                (Vec::new(), Vec::new(), Vec::new())
            }
            tl::enums::updates::Difference::Difference(diff) => {
                debug!(
                    "handling full difference {} new messages, {} other updates",
                    diff.new_messages.len(),
                    diff.other_updates.len()
                );
                self.end_get_diff(Entry::AccountWide);
                self.apply_difference_type(
                    diff.new_messages,
                    diff.other_updates,
                    diff.users,
                    diff.chats,
                    diff.state,
                )
            }
            tl::enums::updates::Difference::Slice(diff) => {
                debug!(
                    "handling partial difference {} new messages, {} other updates",
                    diff.new_messages.len(),
                    diff.other_updates.len()
                );
                self.apply_difference_type(
                    diff.new_messages,
                    diff.other_updates,
                    diff.users,
                    diff.chats,
                    diff.intermediate_state,
                )
            }
            tl::enums::updates::Difference::TooLong(diff) => {
                // The messages in between are lost. The local state moves ahead and
                // whatever arrives from now on is processed normally.
                info!("difference too long, skipping to pts {}", diff.pts);
                self.map.insert(Entry::AccountWide, diff.pts);
                self.end_get_diff(Entry::AccountWide);
                (Vec::new(), Vec::new(), Vec::new())
            }
        }
    }

    fn apply_difference_type(
        &mut self,
        new_messages: Vec<tl::enums::Message>,
        other_updates: Vec<tl::enums::Update>,
        users: Vec<tl::enums::User>,
        chats: Vec<tl::enums::Chat>,
        state: tl::enums::updates::State,
    ) -> UpdateAndPeers {
        let mut updates = Vec::with_capacity(new_messages.len() + other_updates.len());
        // Messages are already in order and don't carry their own pts.
        updates.extend(new_messages.into_iter().map(|message| {
            tl::types::UpdateNewMessage {
                message,
                pts: 0,
                pts_count: 0,
            }
            .into()
        }));

        for update in other_updates {
            match PtsInfo::from_update(&update) {
                // Channel updates inside a difference still advance the channel state.
                Some(info) if matches!(info.entry, Entry::Channel(_)) => {
                    if self.check(&info) != Decision::Duplicate {
                        updates.push(update);
                    }
                }
                _ => updates.push(update),
            }
        }

        self.set_state(state);
        (updates, users, chats)
    }

    /// Apply the result of `updates.getChannelDifference` for the given channel.
    ///
    /// Returns the updates it contained and whether the difference is final.
    pub(crate) fn apply_channel_difference(
        &mut self,
        channel_id: i64,
        difference: tl::enums::updates::ChannelDifference,
    ) -> (UpdateAndPeers, bool) {
        let entry = Entry::Channel(channel_id);
        trace!("applying channel difference for {channel_id}: {difference:?}");

        let (result, is_final) = match difference {
            tl::enums::updates::ChannelDifference::Empty(diff) => {
                self.set_pts(entry, diff.pts);
                ((Vec::new(), Vec::new(), Vec::new()), diff.r#final)
            }
            tl::enums::updates::ChannelDifference::TooLong(diff) => {
                info!("channel {channel_id} difference too long, skipping to pts {}", diff.pts);
                self.set_pts(entry, diff.pts);
                let updates = diff
                    .messages
                    .into_iter()
                    .map(|message| new_channel_message(message, diff.pts))
                    .collect();
                ((updates, diff.users, diff.chats), diff.r#final)
            }
            tl::enums::updates::ChannelDifference::ChannelDifference(diff) => {
                self.set_pts(entry, diff.pts);
                let mut messages = diff.new_messages;
                messages.sort_by_key(message_id);
                let mut updates = messages
                    .into_iter()
                    .map(|message| new_channel_message(message, diff.pts))
                    .collect::<Vec<_>>();
                updates.extend(diff.other_updates);
                ((updates, diff.users, diff.chats), diff.r#final)
            }
        };

        if is_final {
            self.end_get_diff(entry);
        }
        (result, is_final)
    }
}

fn message_id(message: &tl::enums::Message) -> i32 {
    match message {
        tl::enums::Message::Empty(message) => message.id,
        tl::enums::Message::Message(message) => message.id,
        tl::enums::Message::Service(message) => message.id,
    }
}

fn new_channel_message(message: tl::enums::Message, pts: i32) -> tl::enums::Update {
    tl::types::UpdateNewChannelMessage {
        message,
        pts,
        pts_count: 0,
    }
    .into()
}

/// Build the request to fetch the difference of a channel after the given update.
///
/// When the update is about a single message, only that message is requested.
pub(crate) fn channel_difference_request(
    channel: tl::enums::InputChannel,
    info: &PtsInfo,
    message_id: Option<i32>,
) -> tl::functions::updates::GetChannelDifference {
    let filter = match message_id {
        Some(id) => tl::types::ChannelMessagesFilter {
            exclude_new_messages: false,
            ranges: vec![
                tl::types::MessageRange {
                    min_id: id,
                    max_id: id,
                }
                .into(),
            ],
        }
        .into(),
        None => tl::types::ChannelMessagesFilterEmpty {}.into(),
    };
    tl::functions::updates::GetChannelDifference {
        force: false,
        channel,
        filter,
        pts: info.pts - info.pts_count,
        limit: info.pts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(entry: Entry, pts: i32, pts_count: i32) -> PtsInfo {
        PtsInfo {
            pts,
            pts_count,
            entry,
        }
    }

    fn state(pts: i32) -> tl::enums::updates::State {
        tl::types::updates::State {
            pts,
            qts: 0,
            date: 1,
            seq: 0,
            unread_count: 0,
        }
        .into()
    }

    #[test]
    fn check_updates_in_sequence_are_applied() {
        let mut message_box = MessageBox::new();
        message_box.set_state(state(10));

        assert_eq!(message_box.check(&info(Entry::AccountWide, 11, 1)), Decision::Apply);
        assert_eq!(message_box.check(&info(Entry::AccountWide, 14, 3)), Decision::Apply);
        assert_eq!(message_box.pts(Entry::AccountWide), Some(14));
    }

    #[test]
    fn check_duplicates_and_gaps() {
        let mut message_box = MessageBox::new();
        message_box.set_state(state(10));

        assert_eq!(message_box.check(&info(Entry::AccountWide, 10, 1)), Decision::Duplicate);
        assert_eq!(message_box.check(&info(Entry::AccountWide, 13, 1)), Decision::Gap);
        assert_eq!(message_box.pts(Entry::AccountWide), Some(10));
    }

    #[test]
    fn check_zero_count_is_never_a_gap() {
        let mut message_box = MessageBox::new();
        message_box.set_state(state(10));

        assert_eq!(message_box.check(&info(Entry::AccountWide, 50, 0)), Decision::Apply);
        assert_eq!(message_box.pts(Entry::AccountWide), Some(50));
        assert_eq!(message_box.check(&info(Entry::AccountWide, 20, 0)), Decision::Apply);
        assert_eq!(message_box.pts(Entry::AccountWide), Some(50));
    }

    #[test]
    fn check_unknown_channel_adopts_pts() {
        let mut message_box = MessageBox::new();
        assert_eq!(message_box.check(&info(Entry::Channel(5), 100, 1)), Decision::Apply);
        assert_eq!(message_box.check(&info(Entry::Channel(5), 101, 1)), Decision::Apply);
        assert_eq!(message_box.check(&info(Entry::Channel(5), 103, 1)), Decision::Gap);
    }

    #[test]
    fn check_state_round_trips_through_session() {
        let mut message_box = MessageBox::new();
        message_box.set_state(state(10));
        message_box.set_pts(Entry::Channel(7), 70);
        message_box.set_pts(Entry::Channel(3), 30);

        let saved = message_box.session_state();
        assert_eq!(saved.pts, 10);
        assert_eq!(
            saved.channels,
            vec![ChannelState { id: 3, pts: 30 }, ChannelState { id: 7, pts: 70 }]
        );

        let loaded = MessageBox::load(&saved);
        assert_eq!(loaded.pts(Entry::Channel(7)), Some(70));
        assert!(!loaded.is_empty());
        assert!(MessageBox::load(&UpdatesState::default()).is_empty());
    }

    #[test]
    fn check_difference_request_follows_state() {
        let mut message_box = MessageBox::new();
        message_box.set_state(state(10));
        assert!(message_box.get_difference().is_none());

        message_box.begin_get_diff(Entry::AccountWide);
        let request = message_box.get_difference().unwrap();
        assert_eq!(request.pts, 10);
        assert_eq!(request.date, 1);

        let (updates, _, _) = message_box.apply_difference(
            tl::types::updates::Difference {
                new_messages: vec![
                    tl::types::MessageEmpty {
                        id: 1,
                        peer_id: None,
                    }
                    .into(),
                ],
                new_encrypted_messages: Vec::new(),
                other_updates: Vec::new(),
                chats: Vec::new(),
                users: Vec::new(),
                state: state(12),
            }
            .into(),
        );
        assert_eq!(updates.len(), 1);
        assert_eq!(message_box.pts(Entry::AccountWide), Some(12));
        assert!(message_box.get_difference().is_none());
    }

    #[test]
    fn check_channel_difference_request() {
        let channel: tl::enums::InputChannel = tl::types::InputChannel {
            channel_id: 1,
            access_hash: 2,
        }
        .into();
        let request =
            channel_difference_request(channel, &info(Entry::Channel(1), 42, 1), Some(100));
        assert_eq!(request.pts, 41);
        assert_eq!(request.limit, 42);
        assert_eq!(
            request.filter,
            tl::enums::ChannelMessagesFilter::ChannelMessagesFilter(
                tl::types::ChannelMessagesFilter {
                    exclude_new_messages: false,
                    ranges: vec![tl::types::MessageRange { min_id: 100, max_id: 100 }.into()],
                }
            )
        );
    }

    #[test]
    fn check_channel_difference_sorts_messages() {
        let mut message_box = MessageBox::new();
        message_box.begin_get_diff(Entry::Channel(1));
        let peer: tl::enums::Peer = tl::types::PeerChannel { channel_id: 1 }.into();
        let message = |id| -> tl::enums::Message {
            tl::types::MessageService {
                out: false,
                silent: false,
                post: false,
                id,
                from_id: None,
                peer_id: peer.clone(),
                date: 0,
                action: tl::types::MessageActionEmpty {}.into(),
            }
            .into()
        };

        let ((updates, _, _), is_final) = message_box.apply_channel_difference(
            1,
            tl::types::updates::ChannelDifference {
                r#final: true,
                pts: 44,
                timeout: None,
                new_messages: vec![message(9), message(8)],
                other_updates: Vec::new(),
                chats: Vec::new(),
                users: Vec::new(),
            }
            .into(),
        );
        assert!(is_final);
        assert!(!message_box.is_getting_diff(Entry::Channel(1)));
        assert_eq!(message_box.pts(Entry::Channel(1)), Some(44));
        let ids = updates
            .iter()
            .map(|update| match update {
                tl::enums::Update::NewChannelMessage(u) => message_id(&u.message),
                _ => unreachable!(),
            })
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![8, 9]);
    }
}
