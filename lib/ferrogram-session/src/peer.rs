// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::str::FromStr;

use ferrogram_tl_types as tl;

/// Offset applied to channel identifiers in the dialog format.
const CHANNEL_OFFSET: i64 = 1_000_000_000_000;

/// A compact peer identifier.
/// ```
/// use std::mem::size_of;
/// assert_eq!(size_of::<ferrogram_session::types::PeerId>(), size_of::<i64>());
/// ```
///
/// The internal representation uses the dialog format to bit-pack both the
/// peer's true identifier and its type in a single integer: users are kept
/// positive, small group chats are negated, and channels are negated after
/// being prefixed with `100`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(i64);

/// The three families a [`PeerId`] can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerIdKind {
    /// The identifier belongs to a [`tl::enums::User`].
    User,
    /// The identifier belongs to a [`tl::types::Chat`] or one of its derivatives.
    Chat,
    /// The identifier belongs to a [`tl::types::Channel`] or one of its derivatives.
    Channel,
}

/// What a cached peer is, as far as the session knows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerKind {
    User,
    Bot,
    /// Small group chat.
    Group,
    /// Broadcast channel.
    Channel,
    /// Megagroup or gigagroup.
    Supergroup,
}

/// A cached peer, with everything needed to build its input form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: PeerId,
    /// Authority bound to both the peer and the session's authorization key.
    ///
    /// Small group chats never have one.
    pub access_hash: Option<i64>,
    pub kind: PeerKind,
    /// Lowercase username, without the leading `@`.
    pub username: Option<String>,
    /// Phone number, digits only.
    pub phone: Option<String>,
    /// Whether this information came from a `min` constructor, whose access
    /// hash is only usable from the context it was received in.
    pub min: bool,
}

impl PeerId {
    /// Creates a peer identifier for a user.
    pub fn user(id: i64) -> Self {
        Self(id)
    }

    /// Creates a peer identifier for a small group chat.
    pub fn chat(id: i64) -> Self {
        Self(-id)
    }

    /// Creates a peer identifier for a channel, megagroup or gigagroup.
    pub fn channel(id: i64) -> Self {
        Self(-(CHANNEL_OFFSET + id))
    }

    /// Wraps an identifier that is already in the dialog format.
    pub fn from_dialog_id(id: i64) -> Self {
        Self(id)
    }

    /// The identifier in the dialog format, unique across all peer kinds.
    pub fn dialog_id(self) -> i64 {
        self.0
    }

    pub fn kind(self) -> PeerIdKind {
        if self.0 > 0 {
            PeerIdKind::User
        } else if self.0 <= -CHANNEL_OFFSET {
            PeerIdKind::Channel
        } else {
            PeerIdKind::Chat
        }
    }

    /// The identifier used by Telegram's API, which alone cannot tell the peer kind apart.
    pub fn bare_id(self) -> i64 {
        match self.kind() {
            PeerIdKind::User => self.0,
            PeerIdKind::Chat => -self.0,
            PeerIdKind::Channel => -self.0 - CHANNEL_OFFSET,
        }
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&tl::enums::Peer> for PeerId {
    fn from(peer: &tl::enums::Peer) -> Self {
        match peer {
            tl::enums::Peer::User(user) => Self::user(user.user_id),
            tl::enums::Peer::Chat(chat) => Self::chat(chat.chat_id),
            tl::enums::Peer::Channel(channel) => Self::channel(channel.channel_id),
        }
    }
}

impl From<tl::enums::Peer> for PeerId {
    fn from(peer: tl::enums::Peer) -> Self {
        Self::from(&peer)
    }
}

impl PeerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
            Self::Group => "group",
            Self::Channel => "channel",
            Self::Supergroup => "supergroup",
        }
    }
}

impl fmt::Display for PeerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "user" => Self::User,
            "bot" => Self::Bot,
            "group" => Self::Group,
            "channel" => Self::Channel,
            "supergroup" => Self::Supergroup,
            _ => return Err(format!("unknown peer kind: {s}")),
        })
    }
}

/// Strips everything but the digits out of a phone number.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

fn normalize_username(username: &str) -> Option<String> {
    let username = username.trim_start_matches('@').to_lowercase();
    if username.is_empty() {
        None
    } else {
        Some(username)
    }
}

impl PeerInfo {
    /// Combines this freshly-received information with what was cached before.
    ///
    /// Information coming from a `min` constructor never replaces a full one,
    /// although the username and phone it carries are still taken.
    pub fn merged_with(self, existing: Option<&PeerInfo>) -> PeerInfo {
        match existing {
            Some(existing) if self.min && !existing.min => PeerInfo {
                username: self.username.or_else(|| existing.username.clone()),
                phone: self.phone.or_else(|| existing.phone.clone()),
                ..existing.clone()
            },
            Some(existing) => PeerInfo {
                access_hash: self.access_hash.or(existing.access_hash),
                ..self
            },
            None => self,
        }
    }

    /// The input peer to use when invoking requests with this peer.
    ///
    /// Without an access hash, only ambient authority works, such as the
    /// one bots have over users they already interacted with.
    pub fn input_peer(&self) -> tl::enums::InputPeer {
        let access_hash = self.access_hash.unwrap_or(0);
        match self.id.kind() {
            PeerIdKind::User => tl::types::InputPeerUser {
                user_id: self.id.bare_id(),
                access_hash,
            }
            .into(),
            PeerIdKind::Chat => tl::types::InputPeerChat {
                chat_id: self.id.bare_id(),
            }
            .into(),
            PeerIdKind::Channel => tl::types::InputPeerChannel {
                channel_id: self.id.bare_id(),
                access_hash,
            }
            .into(),
        }
    }

    pub fn input_user(&self) -> Option<tl::enums::InputUser> {
        (self.id.kind() == PeerIdKind::User).then(|| {
            tl::types::InputUser {
                user_id: self.id.bare_id(),
                access_hash: self.access_hash.unwrap_or(0),
            }
            .into()
        })
    }

    pub fn input_channel(&self) -> Option<tl::enums::InputChannel> {
        (self.id.kind() == PeerIdKind::Channel).then(|| {
            tl::types::InputChannel {
                channel_id: self.id.bare_id(),
                access_hash: self.access_hash.unwrap_or(0),
            }
            .into()
        })
    }
}

impl From<&tl::enums::User> for PeerInfo {
    fn from(user: &tl::enums::User) -> Self {
        match user {
            tl::enums::User::Empty(user) => PeerInfo {
                id: PeerId::user(user.id),
                access_hash: None,
                kind: PeerKind::User,
                username: None,
                phone: None,
                min: true,
            },
            tl::enums::User::User(user) => PeerInfo {
                id: PeerId::user(user.id),
                access_hash: user.access_hash,
                kind: if user.bot {
                    PeerKind::Bot
                } else {
                    PeerKind::User
                },
                username: user.username.as_deref().and_then(normalize_username),
                phone: user
                    .phone
                    .as_deref()
                    .map(normalize_phone)
                    .filter(|phone| !phone.is_empty()),
                min: user.min,
            },
        }
    }
}

impl From<&tl::enums::Chat> for PeerInfo {
    fn from(chat: &tl::enums::Chat) -> Self {
        let group = |id| PeerInfo {
            id: PeerId::chat(id),
            access_hash: None,
            kind: PeerKind::Group,
            username: None,
            phone: None,
            min: false,
        };
        let channel_kind = |broadcast| {
            if broadcast {
                PeerKind::Channel
            } else {
                PeerKind::Supergroup
            }
        };

        match chat {
            tl::enums::Chat::Empty(chat) => group(chat.id),
            tl::enums::Chat::Chat(chat) => group(chat.id),
            tl::enums::Chat::Forbidden(chat) => group(chat.id),
            tl::enums::Chat::Channel(channel) => PeerInfo {
                id: PeerId::channel(channel.id),
                access_hash: channel.access_hash,
                kind: channel_kind(channel.broadcast),
                username: channel.username.as_deref().and_then(normalize_username),
                phone: None,
                min: channel.min,
            },
            tl::enums::Chat::ChannelForbidden(channel) => PeerInfo {
                id: PeerId::channel(channel.id),
                access_hash: Some(channel.access_hash),
                kind: channel_kind(channel.broadcast),
                username: None,
                phone: None,
                min: false,
            },
        }
    }
}
