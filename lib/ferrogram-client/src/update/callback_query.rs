// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use ferrogram_session::types::PeerId;
use ferrogram_tl_types as tl;

use crate::peer::{Peer, PeerMap};

/// Update that bots receive when a user presses one of the bot's inline callback buttons.
#[derive(Debug, Clone)]
pub struct CallbackQuery {
    pub raw: tl::enums::Update,
    pub(crate) peers: PeerMap,
}

impl CallbackQuery {
    fn update(&self) -> &tl::types::UpdateBotCallbackQuery {
        match &self.raw {
            tl::enums::Update::BotCallbackQuery(update) => update,
            _ => unreachable!(),
        }
    }

    pub fn query_id(&self) -> i64 {
        self.update().query_id
    }

    /// The identifier of the chat where the callback query occured.
    pub fn chat(&self) -> PeerId {
        PeerId::from(&self.update().peer)
    }

    /// The chat where the callback query occured, if it is in cache.
    pub fn chat_peer(&self) -> Option<&Peer> {
        self.peers.get(self.chat())
    }

    /// The identifier of the user who pressed the button.
    pub fn sender(&self) -> PeerId {
        PeerId::user(self.update().user_id)
    }

    /// The user who pressed the button, if it is in cache.
    pub fn sender_peer(&self) -> Option<&Peer> {
        self.peers.get(self.sender())
    }

    /// They binary payload data contained by the inline button which was pressed.
    ///
    /// This data cannot be faked by the client, since Telegram will only accept "button presses"
    /// on data that actually existed in the buttons of the message.
    pub fn data(&self) -> &[u8] {
        self.update().data.as_deref().unwrap_or(&[])
    }

    /// Identifier of the message containing the pressed button.
    ///
    /// Use [`crate::Client::get_messages_by_id`] with [`Self::chat`] to load it.
    pub fn message_id(&self) -> i32 {
        self.update().msg_id
    }
}
