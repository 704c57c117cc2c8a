// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Messages, as seen by the logged-in account.
//!
//! The public `raw` field exposes the schema type. Its shape follows the
//! schema layer and may change between releases.
use ferrogram_session::types::PeerId;
use ferrogram_tl_types as tl;

use crate::media::Media;
use crate::peer::{Peer, PeerMap};
use crate::utils::{self, Date};

/// A text, media or service message.
///
/// The value is a snapshot: later edits to the message are not reflected.
#[derive(Clone, Debug)]
pub struct Message {
    pub raw: tl::enums::Message,
    // A single response contains many peers, some only related to deeper layers of the
    // message. Keeping the whole map makes clones cheap.
    pub(crate) peers: PeerMap,
}

impl Message {
    pub fn from_raw(message: tl::enums::Message, peers: &PeerMap) -> Self {
        Self {
            raw: message,
            peers: peers.clone(),
        }
    }

    /// Builds the message that was sent from the short confirmation Telegram answers with.
    pub(crate) fn from_short_sent(
        sent: tl::types::UpdateShortSentMessage,
        chat: PeerId,
        text: String,
        self_id: Option<i64>,
    ) -> Self {
        Self {
            raw: tl::types::Message {
                out: sent.out,
                mentioned: false,
                silent: false,
                post: false,
                id: sent.id,
                from_id: self_id.map(|user_id| tl::types::PeerUser { user_id }.into()),
                peer_id: peer_of(chat),
                reply_to_msg_id: None,
                date: sent.date,
                message: text,
                media: sent.media,
                entities: sent.entities,
                views: None,
                edit_date: None,
                post_author: None,
                grouped_id: None,
            }
            .into(),
            peers: PeerMap::default(),
        }
    }

    pub fn id(&self) -> i32 {
        match &self.raw {
            tl::enums::Message::Empty(message) => message.id,
            tl::enums::Message::Message(message) => message.id,
            tl::enums::Message::Service(message) => message.id,
        }
    }

    pub(crate) fn peer_id(&self) -> Option<&tl::enums::Peer> {
        match &self.raw {
            tl::enums::Message::Empty(message) => message.peer_id.as_ref(),
            tl::enums::Message::Message(message) => Some(&message.peer_id),
            tl::enums::Message::Service(message) => Some(&message.peer_id),
        }
    }

    /// The chat the message belongs to.
    ///
    /// For private conversations this is the other user, even for outgoing messages.
    pub fn chat(&self) -> Option<PeerId> {
        self.peer_id().map(PeerId::from)
    }

    /// The full information of [`Self::chat`], if it came along with the message.
    pub fn chat_peer(&self) -> Option<&Peer> {
        self.peers.get(self.chat()?)
    }

    /// Who sent this message.
    ///
    /// Messages posted by channels have no sender, unless they are signed.
    /// Incoming private messages without explicit sender are attributed to the chat.
    pub fn sender(&self) -> Option<PeerId> {
        let from_id = match &self.raw {
            tl::enums::Message::Empty(_) => return None,
            tl::enums::Message::Message(message) => message.from_id.as_ref(),
            tl::enums::Message::Service(message) => message.from_id.as_ref(),
        };
        match from_id {
            Some(peer) => Some(PeerId::from(peer)),
            None => match self.peer_id()? {
                tl::enums::Peer::User(user) if !self.outgoing() => {
                    Some(PeerId::user(user.user_id))
                }
                _ => None,
            },
        }
    }

    pub fn sender_peer(&self) -> Option<&Peer> {
        self.peers.get(self.sender()?)
    }

    /// Sent by the logged-in account, as opposed to received.
    pub fn outgoing(&self) -> bool {
        match &self.raw {
            tl::enums::Message::Empty(_) => false,
            tl::enums::Message::Message(message) => message.out,
            tl::enums::Message::Service(message) => message.out,
        }
    }

    /// The logged-in account is mentioned.
    pub fn mentioned(&self) -> bool {
        match &self.raw {
            tl::enums::Message::Message(message) => message.mentioned,
            _ => false,
        }
    }

    /// Whether this is a message posted in a broadcast channel.
    pub fn post(&self) -> bool {
        match &self.raw {
            tl::enums::Message::Empty(_) => false,
            tl::enums::Message::Message(message) => message.post,
            tl::enums::Message::Service(message) => message.post,
        }
    }

    pub fn silent(&self) -> bool {
        match &self.raw {
            tl::enums::Message::Empty(_) => false,
            tl::enums::Message::Message(message) => message.silent,
            tl::enums::Message::Service(message) => message.silent,
        }
    }

    /// When the message was sent.
    pub fn date(&self) -> Date {
        utils::date(match &self.raw {
            tl::enums::Message::Empty(_) => 0,
            tl::enums::Message::Message(message) => message.date,
            tl::enums::Message::Service(message) => message.date,
        })
    }

    /// The last time this message was edited, if any.
    pub fn edit_date(&self) -> Option<Date> {
        match &self.raw {
            tl::enums::Message::Message(message) => message.edit_date.map(utils::date),
            _ => None,
        }
    }

    /// The text of the message, empty for service messages or media without caption.
    pub fn text(&self) -> &str {
        match &self.raw {
            tl::enums::Message::Message(message) => &message.message,
            _ => "",
        }
    }

    pub fn entities(&self) -> Option<&Vec<tl::enums::MessageEntity>> {
        match &self.raw {
            tl::enums::Message::Message(message) => message.entities.as_ref(),
            _ => None,
        }
    }

    pub fn media(&self) -> Option<Media> {
        match &self.raw {
            tl::enums::Message::Message(message) => message.media.clone().and_then(Media::from_raw),
            _ => None,
        }
    }

    /// The action carried by a service message.
    pub fn action(&self) -> Option<&tl::enums::MessageAction> {
        match &self.raw {
            tl::enums::Message::Service(message) => Some(&message.action),
            _ => None,
        }
    }

    pub fn is_service(&self) -> bool {
        matches!(self.raw, tl::enums::Message::Service(_))
    }

    pub fn reply_to_message_id(&self) -> Option<i32> {
        match &self.raw {
            tl::enums::Message::Message(message) => message.reply_to_msg_id,
            _ => None,
        }
    }

    pub fn view_count(&self) -> Option<i32> {
        match &self.raw {
            tl::enums::Message::Message(message) => message.views,
            _ => None,
        }
    }

    pub fn post_author(&self) -> Option<&str> {
        match &self.raw {
            tl::enums::Message::Message(message) => message.post_author.as_deref(),
            _ => None,
        }
    }

    pub fn grouped_id(&self) -> Option<i64> {
        match &self.raw {
            tl::enums::Message::Message(message) => message.grouped_id,
            _ => None,
        }
    }
}

pub(crate) fn peer_of(id: PeerId) -> tl::enums::Peer {
    use ferrogram_session::types::PeerIdKind;

    match id.kind() {
        PeerIdKind::User => tl::types::PeerUser {
            user_id: id.bare_id(),
        }
        .into(),
        PeerIdKind::Chat => tl::types::PeerChat {
            chat_id: id.bare_id(),
        }
        .into(),
        PeerIdKind::Channel => tl::types::PeerChannel {
            channel_id: id.bare_id(),
        }
        .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(out: bool, from_id: Option<tl::enums::Peer>, peer_id: PeerId) -> Message {
        Message::from_raw(
            tl::types::Message {
                out,
                mentioned: false,
                silent: false,
                post: false,
                id: 10,
                from_id,
                peer_id: peer_of(peer_id),
                reply_to_msg_id: Some(9),
                date: 1_700_000_000,
                message: "hello".to_string(),
                media: None,
                entities: None,
                views: None,
                edit_date: None,
                post_author: None,
                grouped_id: None,
            }
            .into(),
            &PeerMap::default(),
        )
    }

    #[test]
    fn private_incoming_sender_is_the_chat() {
        let message = message(false, None, PeerId::user(5));
        assert_eq!(message.chat(), Some(PeerId::user(5)));
        assert_eq!(message.sender(), Some(PeerId::user(5)));
        assert_eq!(message.text(), "hello");
        assert_eq!(message.reply_to_message_id(), Some(9));
        assert_eq!(message.date().timestamp(), 1_700_000_000);
    }

    #[test]
    fn explicit_sender_wins() {
        let from = tl::types::PeerUser { user_id: 7 }.into();
        let message = message(false, Some(from), PeerId::channel(3));
        assert_eq!(message.chat(), Some(PeerId::channel(3)));
        assert_eq!(message.sender(), Some(PeerId::user(7)));
    }

    #[test]
    fn outgoing_private_message_has_no_implicit_sender() {
        assert_eq!(message(true, None, PeerId::user(5)).sender(), None);
    }

    #[test]
    fn short_sent_message_is_outgoing() {
        let message = Message::from_short_sent(
            tl::types::UpdateShortSentMessage {
                out: true,
                id: 42,
                pts: 1,
                pts_count: 1,
                date: 1_600_000_000,
                media: None,
                entities: None,
                ttl_period: None,
            },
            PeerId::chat(4),
            "hi".to_string(),
            Some(1),
        );

        assert_eq!(message.id(), 42);
        assert!(message.outgoing());
        assert_eq!(message.date().timestamp(), 1_600_000_000);
        assert_eq!(message.chat(), Some(PeerId::chat(4)));
        assert_eq!(message.sender(), Some(PeerId::user(1)));
        assert_eq!(message.text(), "hi");
    }
}
