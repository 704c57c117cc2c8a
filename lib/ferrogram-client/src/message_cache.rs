// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bounded cache of recently seen messages.
//!
//! File references expire, and the only way to obtain a fresh one is to fetch the message
//! owning the media again. Remembering which messages were seen recently lets the client
//! refresh them by identifier.
use std::collections::{BTreeMap, HashMap};

use ferrogram_session::types::PeerId;
use ferrogram_tl_types as tl;

type Key = (i64, i32);

/// Least-recently-used map from `(chat, message id)` to the raw message.
pub(crate) struct MessageCache {
    capacity: usize,
    tick: u64,
    entries: HashMap<Key, (u64, tl::enums::Message)>,
    order: BTreeMap<u64, Key>,
}

impl MessageCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tick: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, chat: PeerId, message: tl::enums::Message) {
        if self.capacity == 0 {
            return;
        }
        let key = (chat.dialog_id(), message_id(&message));
        self.tick += 1;
        if let Some((old_tick, _)) = self.entries.insert(key, (self.tick, message)) {
            self.order.remove(&old_tick);
        }
        self.order.insert(self.tick, key);

        while self.entries.len() > self.capacity {
            match self.order.pop_first() {
                Some((_, oldest)) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Look up a message, marking it as recently used.
    pub(crate) fn get(&mut self, chat: PeerId, id: i32) -> Option<tl::enums::Message> {
        let key = (chat.dialog_id(), id);
        let (tick, message) = self.entries.get_mut(&key)?;
        self.order.remove(&*tick);
        self.tick += 1;
        *tick = self.tick;
        self.order.insert(self.tick, key);
        Some(message.clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn message_id(message: &tl::enums::Message) -> i32 {
    match message {
        tl::enums::Message::Empty(message) => message.id,
        tl::enums::Message::Message(message) => message.id,
        tl::enums::Message::Service(message) => message.id,
    }
}
