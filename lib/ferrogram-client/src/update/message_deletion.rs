// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use ferrogram_session::types::PeerId;
use ferrogram_tl_types as tl;

/// Occurs when one or more messages are deleted.
///
/// Telegram does not say in which private conversation or small group the messages were,
/// so only deletions in channels and megagroups come with a [`Self::channel`].
#[derive(Debug, Clone)]
pub struct MessageDeletion {
    pub raw: tl::enums::Update,
}

impl MessageDeletion {
    /// The channel the messages were deleted from, if known.
    pub fn channel(&self) -> Option<PeerId> {
        match &self.raw {
            tl::enums::Update::DeleteChannelMessages(update) => {
                Some(PeerId::channel(update.channel_id))
            }
            _ => None,
        }
    }

    /// Identifiers of the messages that were deleted.
    pub fn messages(&self) -> &[i32] {
        match &self.raw {
            tl::enums::Update::DeleteMessages(update) => &update.messages,
            tl::enums::Update::DeleteChannelMessages(update) => &update.messages,
            _ => &[],
        }
    }
}
