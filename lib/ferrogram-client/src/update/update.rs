// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use ferrogram_session::types::PeerId;
use ferrogram_tl_types as tl;

use super::{CallbackQuery, InlineQuery, Message, MessageDeletion, Poll, UserStatus};
use crate::peer::PeerMap;

/// An update that indicates some event, which may be of interest to the logged-in account, has occured.
///
/// Only updates pertaining to messages are guaranteed to be delivered, and can be fetched on-demand if
/// they occured while the client was offline by enabling [`catch_up`](crate::client::UpdatesConfiguration::catch_up).
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Update {
    /// Occurs whenever a new text message or a message with media is produced.
    NewMessage(Message),
    /// Occurs when a message is updated.
    MessageEdited(Message),
    /// Occurs whenever a broadcast channel publishes a new post.
    ChannelPost(Message),
    /// Occurs when a broadcast channel post is updated.
    ChannelPostEdited(Message),
    /// Occurs when a message is deleted.
    MessageDeleted(MessageDeletion),
    /// Occurs when Telegram calls back into your bot because an inline callback
    /// button was pressed.
    CallbackQuery(CallbackQuery),
    /// Occurs whenever you sign in as a bot and a user sends an inline query
    /// such as `@bot query`.
    InlineQuery(InlineQuery),
    /// Occurs when a user goes online or offline.
    UserStatus(UserStatus),
    /// Occurs when the results of a poll change.
    Poll(Poll),
    /// Raw events are not actual events.
    /// Instead, they are the raw Update object that Telegram sends. You
    /// normally shouldn't need these.
    Raw(tl::enums::Update),
}

fn message_of(update: &tl::enums::Update) -> Option<&tl::enums::Message> {
    use tl::enums::Update as U;
    match update {
        U::NewMessage(u) => Some(&u.message),
        U::NewChannelMessage(u) => Some(&u.message),
        U::EditMessage(u) => Some(&u.message),
        U::EditChannelMessage(u) => Some(&u.message),
        _ => None,
    }
}

impl Update {
    /// Create new friendly to use `Update` from its raw version and the peers that came with it.
    pub fn from_raw(update: tl::enums::Update, peers: &PeerMap) -> Self {
        use tl::enums::Update as U;

        if let Some(raw_message) = message_of(&update).cloned() {
            if let tl::enums::Message::Empty(_) = raw_message {
                return Self::Raw(update);
            }
            let msg = crate::message::Message::from_raw(raw_message, peers);
            let edited = matches!(update, U::EditMessage(_) | U::EditChannelMessage(_));
            let post = msg.post();
            let message = Message { msg, raw: update };
            return match (post, edited) {
                (false, false) => Self::NewMessage(message),
                (false, true) => Self::MessageEdited(message),
                (true, false) => Self::ChannelPost(message),
                (true, true) => Self::ChannelPostEdited(message),
            };
        }

        match update {
            U::DeleteMessages(_) | U::DeleteChannelMessages(_) => {
                Self::MessageDeleted(MessageDeletion { raw: update })
            }
            U::BotCallbackQuery(_) => Self::CallbackQuery(CallbackQuery {
                raw: update,
                peers: peers.clone(),
            }),
            U::BotInlineQuery(_) => Self::InlineQuery(InlineQuery {
                raw: update,
                peers: peers.clone(),
            }),
            U::UserStatus(_) => Self::UserStatus(UserStatus {
                raw: update,
                peers: peers.clone(),
            }),
            U::MessagePoll(_) => Self::Poll(Poll { raw: update }),
            _ => Self::Raw(update),
        }
    }

    /// Raw update, as sent by Telegram.
    ///
    /// Only contains the individual [`Update`](tl::enums::Update),
    /// not the [`Updates`](tl::enums::Updates) container from which it may have come from.
    pub fn raw(&self) -> &tl::enums::Update {
        match self {
            Update::NewMessage(update)
            | Update::MessageEdited(update)
            | Update::ChannelPost(update)
            | Update::ChannelPostEdited(update) => &update.raw,
            Update::MessageDeleted(update) => &update.raw,
            Update::CallbackQuery(update) => &update.raw,
            Update::InlineQuery(update) => &update.raw,
            Update::UserStatus(update) => &update.raw,
            Update::Poll(update) => &update.raw,
            Update::Raw(update) => update,
        }
    }

    /// The message carried by this update, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Update::NewMessage(message)
            | Update::MessageEdited(message)
            | Update::ChannelPost(message)
            | Update::ChannelPostEdited(message) => Some(message),
            _ => None,
        }
    }

    /// The chat in which the event occured, if it is known.
    pub fn chat(&self) -> Option<PeerId> {
        match self {
            Update::MessageDeleted(deletion) => deletion.channel(),
            Update::CallbackQuery(query) => Some(query.chat()),
            Update::InlineQuery(query) => Some(query.sender_id()),
            Update::UserStatus(status) => Some(status.user_id()),
            _ => self.message().and_then(|message| message.chat()),
        }
    }

    /// The user or chat that caused the event, if it is known.
    pub fn sender(&self) -> Option<PeerId> {
        match self {
            Update::CallbackQuery(query) => Some(query.sender()),
            Update::InlineQuery(query) => Some(query.sender_id()),
            Update::UserStatus(status) => Some(status.user_id()),
            _ => self.message().and_then(|message| message.sender()),
        }
    }
}
