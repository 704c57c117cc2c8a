// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use ferrogram_session::types::PeerId;
use ferrogram_tl_types as tl;

use crate::peer::{Peer, PeerMap, User};
use crate::utils::{self, Date};

/// Occurs when a user goes online or offline.
#[derive(Debug, Clone)]
pub struct UserStatus {
    pub raw: tl::enums::Update,
    pub(crate) peers: PeerMap,
}

impl UserStatus {
    fn update(&self) -> &tl::types::UpdateUserStatus {
        match &self.raw {
            tl::enums::Update::UserStatus(update) => update,
            _ => unreachable!(),
        }
    }

    pub fn user_id(&self) -> PeerId {
        PeerId::user(self.update().user_id)
    }

    /// The user whose status changed, if it is in cache.
    pub fn user(&self) -> Option<&User> {
        match self.peers.get(self.user_id()) {
            Some(Peer::User(user)) => Some(user),
            _ => None,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self.update().status, tl::enums::UserStatus::Online(_))
    }

    /// When the online status will expire, or when the user was last seen.
    ///
    /// Users may hide this, in which case only the fact that they were seen recently is known.
    pub fn timestamp(&self) -> Option<Date> {
        match &self.update().status {
            tl::enums::UserStatus::Online(status) => Some(utils::date(status.expires)),
            tl::enums::UserStatus::Offline(status) => Some(utils::date(status.was_online)),
            tl::enums::UserStatus::Empty(_) | tl::enums::UserStatus::Recently(_) => None,
        }
    }
}
