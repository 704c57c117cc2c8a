// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Message identifier bookkeeping for both directions of a session.
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// How many recently received message identifiers are remembered.
pub const RECEIVED_WINDOW_SIZE: usize = 2000;

/// Generates strictly increasing client message identifiers.
#[derive(Debug)]
pub(crate) struct MsgIdGenerator {
    /// The time offset from the server's time, in seconds.
    pub time_offset: i32,
    last: i64,
}

impl MsgIdGenerator {
    pub fn new(time_offset: i32) -> Self {
        Self {
            time_offset,
            last: 0,
        }
    }

    pub fn next(&mut self) -> i64 {
        self.next_at(SystemTime::now())
    }

    /// Message identifiers approximate the server's unix time in
    /// nanoseconds, shifted so the seconds fill the high 32 bits, and
    /// always leave the two lowest bits clear.
    pub fn next_at(&mut self, now: SystemTime) -> i64 {
        let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
        let nanos = since_epoch.as_nanos() as i128
            + i128::from(self.time_offset) * 1_000_000_000;
        let mut msg_id = (((nanos << 32) / 1_000_000_000) as i64) & !3;

        if msg_id <= self.last {
            msg_id = self.last + 4;
        }
        self.last = msg_id;
        msg_id
    }

    /// Adjusts the time offset using a message identifier known to come
    /// from the server.
    pub fn correct(&mut self, server_msg_id: i64) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        let correct = server_msg_id >> 32;
        self.time_offset = (correct - now) as i32;
        log::info!("corrected time offset to {}s", self.time_offset);
    }

    /// The current unix time as seen by the server, in seconds.
    pub fn server_now(&self) -> i32 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i32;
        now.wrapping_add(self.time_offset)
    }
}

/// The most recent message identifiers received from the server.
#[derive(Debug, Default)]
pub(crate) struct ReceivedWindow {
    ids: VecDeque<i64>,
    last_outer: i64,
}

impl ReceivedWindow {
    /// Accepts the identifier of a message that came directly in a packet.
    ///
    /// Every such identifier must be greater than all the ones accepted
    /// before it, or the packet is a replay.
    pub fn accept_outer(&mut self, msg_id: i64) -> bool {
        if msg_id <= self.last_outer {
            return false;
        }
        self.last_outer = msg_id;
        self.remember(msg_id);
        true
    }

    pub fn remember(&mut self, msg_id: i64) {
        match self.ids.binary_search(&msg_id) {
            Ok(_) => {}
            Err(pos) => self.ids.insert(pos, msg_id),
        }
        while self.ids.len() > RECEIVED_WINDOW_SIZE {
            self.ids.pop_front();
        }
    }

    /// Status byte of the message as used by `msgs_state_info`.
    pub fn state_of(&self, msg_id: i64) -> u8 {
        match (self.ids.front(), self.ids.back()) {
            (Some(&min), _) if msg_id < min => 1,
            (_, Some(&max)) if msg_id > max => 3,
            (None, None) => 3,
            _ if self.ids.binary_search(&msg_id).is_ok() => 4,
            _ => 2,
        }
    }

    pub fn contains(&self, msg_id: i64) -> bool {
        self.ids.binary_search(&msg_id).is_ok()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.last_outer = 0;
    }
}
