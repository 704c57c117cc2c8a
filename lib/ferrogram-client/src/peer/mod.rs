// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Types relating to users, groups and channels.
//!
//! Properties containing raw types are public and will be called "raw".
//! Keep in mind that **these fields are not part of the semantic versioning guarantees**.

mod peer_map;

use ferrogram_session::types::{PeerId, PeerInfo};
use ferrogram_tl_types as tl;

pub use peer_map::PeerMap;

/// A user, group, or broadcast channel.
///
/// * Private conversations with other people are treated as the peer of the user itself.
/// * Conversations in a group, whether it's a small group or a megagroup, are simply groups.
/// * Conversations where only administrators broadcast messages are known as channels.
#[derive(Clone, Debug)]
pub enum Peer {
    User(User),
    Group(Group),
    Channel(Channel),
}

/// A user or bot account.
#[derive(Clone, Debug)]
pub struct User {
    pub raw: tl::enums::User,
}

/// A small group chat or a megagroup.
#[derive(Clone, Debug)]
pub struct Group {
    pub raw: tl::enums::Chat,
}

/// A broadcast channel.
#[derive(Clone, Debug)]
pub struct Channel {
    pub raw: tl::enums::Chat,
}

impl Peer {
    pub fn from_user(user: tl::enums::User) -> Self {
        Self::User(User { raw: user })
    }

    pub fn from_chat(chat: tl::enums::Chat) -> Self {
        use tl::enums::Chat as C;

        let broadcast = match &chat {
            C::Channel(channel) => channel.broadcast,
            C::ChannelForbidden(channel) => channel.broadcast,
            C::Empty(_) | C::Chat(_) | C::Forbidden(_) => false,
        };
        if broadcast {
            Self::Channel(Channel { raw: chat })
        } else {
            Self::Group(Group { raw: chat })
        }
    }

    pub fn id(&self) -> PeerId {
        match self {
            Self::User(user) => PeerId::user(user.id()),
            Self::Group(Group { raw }) | Self::Channel(Channel { raw }) => chat_id(raw),
        }
    }

    /// The name of a user, or the title of a group or channel.
    pub fn name(&self) -> &str {
        match self {
            Self::User(user) => user.first_name(),
            Self::Group(Group { raw }) | Self::Channel(Channel { raw }) => chat_title(raw),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::User(user) => user.username(),
            Self::Group(Group { raw }) | Self::Channel(Channel { raw }) => match raw {
                tl::enums::Chat::Channel(channel) => channel.username.as_deref(),
                _ => None,
            },
        }
    }

    /// The information the session keeps about this peer.
    pub fn info(&self) -> PeerInfo {
        match self {
            Self::User(user) => PeerInfo::from(&user.raw),
            Self::Group(Group { raw }) | Self::Channel(Channel { raw }) => PeerInfo::from(raw),
        }
    }
}

impl User {
    pub fn id(&self) -> i64 {
        match &self.raw {
            tl::enums::User::Empty(user) => user.id,
            tl::enums::User::User(user) => user.id,
        }
    }

    fn user(&self) -> Option<&tl::types::User> {
        match &self.raw {
            tl::enums::User::User(user) => Some(user),
            tl::enums::User::Empty(_) => None,
        }
    }

    /// The first name of the user, empty if it was deleted or is not known.
    pub fn first_name(&self) -> &str {
        self.user()
            .and_then(|user| user.first_name.as_deref())
            .unwrap_or("")
    }

    pub fn last_name(&self) -> Option<&str> {
        self.user().and_then(|user| user.last_name.as_deref())
    }

    pub fn username(&self) -> Option<&str> {
        self.user().and_then(|user| user.username.as_deref())
    }

    pub fn phone(&self) -> Option<&str> {
        self.user().and_then(|user| user.phone.as_deref())
    }

    pub fn is_bot(&self) -> bool {
        self.user().is_some_and(|user| user.bot)
    }

    /// Whether this is the user the client is logged in as.
    pub fn is_self(&self) -> bool {
        self.user().is_some_and(|user| user.is_self)
    }

    pub fn deleted(&self) -> bool {
        self.user().is_some_and(|user| user.deleted)
    }
}

impl Group {
    pub fn id(&self) -> PeerId {
        chat_id(&self.raw)
    }

    pub fn title(&self) -> &str {
        chat_title(&self.raw)
    }

    /// Whether the group is a megagroup, that is, a channel acting as a group.
    pub fn is_megagroup(&self) -> bool {
        matches!(
            self.raw,
            tl::enums::Chat::Channel(_) | tl::enums::Chat::ChannelForbidden(_)
        )
    }
}

impl Channel {
    pub fn id(&self) -> PeerId {
        chat_id(&self.raw)
    }

    pub fn title(&self) -> &str {
        chat_title(&self.raw)
    }

    pub fn participants_count(&self) -> Option<i32> {
        match &self.raw {
            tl::enums::Chat::Channel(channel) => channel.participants_count,
            _ => None,
        }
    }
}

fn chat_id(chat: &tl::enums::Chat) -> PeerId {
    use tl::enums::Chat as C;

    match chat {
        C::Empty(chat) => PeerId::chat(chat.id),
        C::Chat(chat) => PeerId::chat(chat.id),
        C::Forbidden(chat) => PeerId::chat(chat.id),
        C::Channel(channel) => PeerId::channel(channel.id),
        C::ChannelForbidden(channel) => PeerId::channel(channel.id),
    }
}

fn chat_title(chat: &tl::enums::Chat) -> &str {
    use tl::enums::Chat as C;

    match chat {
        C::Empty(_) => "",
        C::Chat(chat) => &chat.title,
        C::Forbidden(chat) => &chat.title,
        C::Channel(channel) => &channel.title,
        C::ChannelForbidden(channel) => &channel.title,
    }
}
