// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Methods related to sending messages.

use std::collections::HashMap;

use ferrogram_mtsender::InvocationError;
use ferrogram_session::types::{PeerId, PeerInfo};
use ferrogram_tl_types::{self as tl, Identifiable};
use log::debug;

use super::Client;
use crate::message::Message;
use crate::peer::{Peer, PeerMap, User};
use crate::utils::generate_random_id;

/// The error used when a response lacks what the request should have produced.
fn unexpected(id: u32) -> InvocationError {
    tl::deserialize::Error::UnexpectedConstructor { id }.into()
}

/// Find the message produced by a request with the given `random_id` in its response.
fn find_sent_message(
    updates: Vec<tl::enums::Update>,
    random_id: i64,
    peers: &PeerMap,
) -> Option<Message> {
    let id = updates.iter().find_map(|update| match update {
        tl::enums::Update::MessageId(u) if u.random_id == random_id => Some(u.id),
        _ => None,
    });

    let mut messages = updates
        .into_iter()
        .filter_map(|update| match update {
            tl::enums::Update::NewMessage(u) => Some(u.message),
            tl::enums::Update::NewChannelMessage(u) => Some(u.message),
            _ => None,
        })
        .map(|message| Message::from_raw(message, peers))
        .map(|message| (message.id(), message))
        .collect::<HashMap<_, _>>();

    match id {
        Some(id) => messages.remove(&id),
        // If there's no random_id to map from, a single message should've been produced
        // regardless, so try to recover by returning that.
        None if messages.len() == 1 => messages.into_values().next(),
        None => None,
    }
}

impl Client {
    /// Sends a text message to the desired chat.
    ///
    /// The chat must have been seen before so that its access hash is known,
    /// which is usually the case for any chat returned by the session.
    ///
    /// # Examples
    ///
    /// ```
    /// # async fn f(chat: ferrogram_session::types::PeerInfo, client: ferrogram_client::Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let message = client.send_message(&chat, "Boring text message :-(").await?;
    /// println!("Sent message with ID {}", message.id());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_message(
        &self,
        chat: &PeerInfo,
        text: impl Into<String>,
    ) -> Result<Message, InvocationError> {
        let text = text.into();
        let random_id = generate_random_id();
        let updates = self
            .invoke(&tl::functions::messages::SendMessage {
                no_webpage: false,
                silent: false,
                background: false,
                clear_draft: false,
                noforwards: false,
                peer: chat.input_peer(),
                message: text.clone(),
                random_id,
                schedule_date: None,
            })
            .await?;

        let message = match updates {
            tl::enums::Updates::UpdateShortSentMessage(sent) => {
                let self_id = self.0.session.logged_in_user().map(|user| user.id);
                Message::from_short_sent(sent, chat.id, text, self_id)
            }
            tl::enums::Updates::Updates(u) => {
                self.sent_message_in(u.updates, u.users, u.chats, random_id)
                    .ok_or_else(|| unexpected(tl::types::Updates::CONSTRUCTOR_ID))?
            }
            tl::enums::Updates::Combined(u) => {
                self.sent_message_in(u.updates, u.users, u.chats, random_id)
                    .ok_or_else(|| unexpected(tl::types::UpdatesCombined::CONSTRUCTOR_ID))?
            }
            tl::enums::Updates::UpdateShort(u) => {
                self.sent_message_in(vec![u.update], Vec::new(), Vec::new(), random_id)
                    .ok_or_else(|| unexpected(tl::types::UpdateShort::CONSTRUCTOR_ID))?
            }
            tl::enums::Updates::TooLong(_) => {
                return Err(unexpected(tl::types::UpdatesTooLong::CONSTRUCTOR_ID));
            }
            tl::enums::Updates::UpdateShortMessage(_) => {
                return Err(unexpected(tl::types::UpdateShortMessage::CONSTRUCTOR_ID));
            }
            tl::enums::Updates::UpdateShortChatMessage(_) => {
                return Err(unexpected(tl::types::UpdateShortChatMessage::CONSTRUCTOR_ID));
            }
        };

        debug!("sent message {} to {}", message.id(), chat.id);
        self.cache_message(&message);
        Ok(message)
    }

    /// Fetch the messages from the chat with the given identifiers.
    ///
    /// The returned vector has the same length as the input, with `None` for the messages
    /// that don't exist (or belong to a different chat).
    pub async fn get_messages_by_id(
        &self,
        chat: &PeerInfo,
        message_ids: &[i32],
    ) -> Result<Vec<Option<Message>>, InvocationError> {
        let id = message_ids
            .iter()
            .map(|&id| tl::types::InputMessageId { id }.into())
            .collect();

        let result = match chat.input_channel() {
            Some(channel) => {
                self.invoke(&tl::functions::channels::GetMessages { channel, id })
                    .await
            }
            None => {
                self.invoke(&tl::functions::messages::GetMessages { id })
                    .await
            }
        }?;

        let (messages, users, chats) = match result {
            tl::enums::messages::Messages::Messages(m) => (m.messages, m.users, m.chats),
            tl::enums::messages::Messages::Slice(m) => (m.messages, m.users, m.chats),
            tl::enums::messages::Messages::ChannelMessages(m) => (m.messages, m.users, m.chats),
            tl::enums::messages::Messages::NotModified(_) => (Vec::new(), Vec::new(), Vec::new()),
        };

        let peers = PeerMap::new(users, chats);
        self.cache_peers(&peers);
        let mut map = messages
            .into_iter()
            .map(|m| Message::from_raw(m, &peers))
            .filter(|m| m.chat() == Some(chat.id))
            .map(|m| (m.id(), m))
            .collect::<HashMap<_, _>>();

        for message in map.values() {
            self.cache_message(message);
        }
        Ok(message_ids.iter().map(|id| map.remove(id)).collect())
    }

    /// Get information about the logged-in account.
    pub async fn get_me(&self) -> Result<User, InvocationError> {
        let mut users = self
            .invoke(&tl::functions::users::GetUsers {
                id: vec![tl::types::InputUserSelf {}.into()],
            })
            .await?;
        let user = users.pop().ok_or(InvocationError::Dropped)?;
        self.0.session.update_peers(&[PeerInfo::from(&user)]);
        Ok(User { raw: user })
    }

    /// Resolves a username into the peer that owns it.
    ///
    /// The session is checked first, so only unknown usernames cause a request.
    pub async fn resolve_username(&self, username: &str) -> Result<Option<PeerInfo>, InvocationError> {
        let username = username.trim_start_matches('@');
        if let Some(peer) = self.0.session.peer_by_username(username) {
            return Ok(Some(peer));
        }

        let tl::enums::contacts::ResolvedPeer::ResolvedPeer(resolved) = match self
            .invoke(&tl::functions::contacts::ResolveUsername {
                username: username.to_string(),
            })
            .await
        {
            Ok(resolved) => resolved,
            Err(err) if err.is("USERNAME_NOT_OCCUPIED") => return Ok(None),
            Err(err) => return Err(err),
        };

        let peers = PeerMap::new(resolved.users, resolved.chats);
        self.cache_peers(&peers);
        Ok(peers.get(PeerId::from(&resolved.peer)).map(Peer::info))
    }

    fn sent_message_in(
        &self,
        updates: Vec<tl::enums::Update>,
        users: Vec<tl::enums::User>,
        chats: Vec<tl::enums::Chat>,
        random_id: i64,
    ) -> Option<Message> {
        let peers = PeerMap::new(users, chats);
        self.cache_peers(&peers);
        find_sent_message(updates, random_id, &peers)
    }

    /// Merge the peers into the session.
    pub(crate) fn cache_peers(&self, peers: &PeerMap) {
        if !peers.is_empty() {
            self.0.session.update_peers(&peers.infos());
        }
    }

    /// Remember the message, so that its media can be refreshed later on.
    pub(crate) fn cache_message(&self, message: &Message) {
        if let Some(chat) = message.chat() {
            self.0
                .message_cache
                .lock()
                .unwrap()
                .insert(chat, message.raw.clone());
        }
    }

    /// A message previously seen by this client, if it's still remembered.
    pub(crate) fn cached_message(&self, chat: PeerId, id: i32) -> Option<Message> {
        let raw = self.0.message_cache.lock().unwrap().get(chat, id)?;
        Some(Message::from_raw(raw, &PeerMap::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_message(id: i32) -> tl::enums::Update {
        tl::types::UpdateNewMessage {
            message: tl::types::MessageEmpty { id, peer_id: None }.into(),
            pts: 1,
            pts_count: 1,
        }
        .into()
    }

    #[test]
    fn check_sent_message_is_found_by_random_id() {
        let updates = vec![
            tl::types::UpdateMessageId { id: 8, random_id: 2 }.into(),
            new_message(7),
            new_message(8),
        ];
        let message = find_sent_message(updates, 2, &PeerMap::default()).unwrap();
        assert_eq!(message.id(), 8);
    }

    #[test]
    fn check_single_message_is_used_without_random_id() {
        let message = find_sent_message(vec![new_message(3)], 2, &PeerMap::default()).unwrap();
        assert_eq!(message.id(), 3);
        assert!(find_sent_message(vec![new_message(3), new_message(4)], 2, &PeerMap::default()).is_none());
    }
}
