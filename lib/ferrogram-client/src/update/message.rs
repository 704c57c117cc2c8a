// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::ops::Deref;

use ferrogram_tl_types as tl;

/// A new or edited message, along with the update that carried it.
///
/// Dereferences to [`crate::message::Message`].
#[derive(Debug, Clone)]
pub struct Message {
    pub(crate) msg: crate::message::Message,
    pub raw: tl::enums::Update,
}

impl Message {
    /// Whether the update was an edit rather than a new message.
    pub fn is_edit(&self) -> bool {
        matches!(
            self.raw,
            tl::enums::Update::EditMessage(_) | tl::enums::Update::EditChannelMessage(_)
        )
    }

    pub fn into_message(self) -> crate::message::Message {
        self.msg
    }
}

impl Deref for Message {
    type Target = crate::message::Message;

    fn deref(&self) -> &Self::Target {
        &self.msg
    }
}
