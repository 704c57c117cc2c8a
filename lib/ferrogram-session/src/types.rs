// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Values stored and returned by a [`crate::Session`].

use std::net::{SocketAddrV4, SocketAddrV6};

pub use crate::peer::{PeerId, PeerIdKind, PeerInfo, PeerKind, normalize_phone};

/// Where a datacenter lives, and the auth key negotiated with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DcOption {
    /// 1 to 5 for the main datacenters, which are always known.
    pub id: i32,
    pub ipv4: SocketAddrV4,
    /// May be an IPv4-mapped address when the datacenter has no IPv6.
    pub ipv6: SocketAddrV6,
    /// `None` until a handshake has been done with this datacenter.
    pub auth_key: Option<[u8; 256]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoggedInUser {
    pub id: i64,
    pub bot: bool,
}

/// Everything needed to resume updates where they were left.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdatesState {
    pub pts: i32,
    pub qts: i32,
    pub date: i32,
    pub seq: i32,
    pub channels: Vec<ChannelState>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelState {
    /// Bare channel identifier.
    pub id: i64,
    pub pts: i32,
}

/// One change to the [`UpdatesState`], as saved by
/// [`crate::Session::set_update_state`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateState {
    /// Replaces everything, including the channel list.
    All(UpdatesState),
    /// The common `pts` sequence along with its `date` and `seq`.
    Primary { pts: i32, date: i32, seq: i32 },
    /// The `qts` sequence, used by secret chats and bots.
    Secondary { qts: i32 },
    Channel { id: i64, pts: i32 },
}

impl UpdatesState {
    pub fn apply(&mut self, change: UpdateState) {
        match change {
            UpdateState::All(state) => *self = state,
            UpdateState::Primary { pts, date, seq } => {
                (self.pts, self.date, self.seq) = (pts, date, seq);
            }
            UpdateState::Secondary { qts } => self.qts = qts,
            UpdateState::Channel { id, pts } => {
                if let Some(known) = self.channels.iter_mut().find(|c| c.id == id) {
                    known.pts = pts;
                } else {
                    self.channels.push(ChannelState { id, pts });
                }
            }
        }
    }

    pub fn channel_pts(&self, id: i64) -> Option<i32> {
        self.channels.iter().find(|c| c.id == id).map(|c| c.pts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_state_is_inserted_then_replaced() {
        let mut state = UpdatesState::default();
        state.apply(UpdateState::Channel { id: 5, pts: 10 });
        state.apply(UpdateState::Channel { id: 5, pts: 12 });
        state.apply(UpdateState::Primary { pts: 3, date: 4, seq: 5 });

        assert_eq!(state.channel_pts(5), Some(12));
        assert_eq!(state.channels.len(), 1);
        assert_eq!((state.pts, state.date, state.seq), (3, 4, 5));
        assert_eq!(state.channel_pts(6), None);
    }
}
