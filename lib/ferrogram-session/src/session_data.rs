// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;

use crate::Session;
use crate::dc_options::{DEFAULT_DC, known_dc_options};
use crate::types::{
    DcOption, LoggedInUser, PeerId, PeerInfo, UpdateState, UpdatesState, normalize_phone,
};

/// Plain representation of everything a session stores.
///
/// Used as the backing storage of [`crate::storages::MemorySession`], and as
/// the intermediate step to move data between storages.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionData {
    pub home_dc: i32,
    pub test_mode: bool,
    pub dc_options: HashMap<i32, DcOption>,
    pub user: Option<LoggedInUser>,
    pub peers: HashMap<PeerId, PeerInfo>,
    pub updates_state: UpdatesState,
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SessionData {
    /// Empty session data pointing to the statically-known datacenters.
    pub fn new(test_mode: bool) -> Self {
        Self {
            home_dc: DEFAULT_DC,
            test_mode,
            dc_options: known_dc_options(test_mode)
                .iter()
                .cloned()
                .map(|dc_option| (dc_option.id, dc_option))
                .collect(),
            user: None,
            peers: HashMap::new(),
            updates_state: UpdatesState::default(),
        }
    }

    /// Switches to the other set of servers, dropping every known datacenter option.
    pub fn set_test_mode(&mut self, test_mode: bool) {
        if self.test_mode != test_mode {
            let home_dc = self.home_dc;
            *self = Self {
                home_dc,
                user: self.user.take(),
                peers: std::mem::take(&mut self.peers),
                updates_state: std::mem::take(&mut self.updates_state),
                ..Self::new(test_mode)
            };
        }
    }

    /// Caches a single peer, following the rules of [`Session::update_peers`].
    pub fn cache_peer(&mut self, peer: &PeerInfo) {
        let merged = peer.clone().merged_with(self.peers.get(&peer.id));

        for other in self.peers.values_mut() {
            if other.id == merged.id {
                continue;
            }
            if merged.username.is_some() && other.username == merged.username {
                other.username = None;
            }
            if merged.phone.is_some() && other.phone == merged.phone {
                other.phone = None;
            }
        }

        self.peers.insert(merged.id, merged);
    }

    pub fn peer_by_username(&self, username: &str) -> Option<&PeerInfo> {
        let username = username.trim_start_matches('@').to_lowercase();
        self.peers
            .values()
            .find(|peer| peer.username.as_deref() == Some(username.as_str()))
    }

    pub fn peer_by_phone(&self, phone: &str) -> Option<&PeerInfo> {
        let phone = normalize_phone(phone);
        self.peers
            .values()
            .find(|peer| peer.phone.as_deref() == Some(phone.as_str()))
    }

    /// See [`Session::clear_authorization`].
    pub fn clear_authorization(&mut self) {
        self.dc_options
            .values_mut()
            .for_each(|dc_option| dc_option.auth_key = None);
        self.user = None;
        self.updates_state = UpdatesState::default();
    }

    /// Copies every value into another session.
    pub fn import_to(&self, session: &dyn Session) {
        session.set_test_mode(self.test_mode);
        session.set_home_dc_id(self.home_dc);
        self.dc_options
            .values()
            .for_each(|dc_option| session.set_dc_option(dc_option));
        session.set_logged_in_user(self.user);
        session.update_peers(&self.peers.values().cloned().collect::<Vec<_>>());
        session.set_update_state(UpdateState::All(self.updates_state.clone()));
    }

    /// Copies what can be enumerated out of another session.
    ///
    /// The [`Session`] interface offers no way to list cached peers, so only
    /// the logged-in user is carried over.
    pub fn export_from(session: &dyn Session) -> Self {
        let test_mode = session.test_mode();
        let dc_options = known_dc_options(test_mode)
            .iter()
            .filter_map(|dc_option| session.dc_option(dc_option.id))
            .map(|dc_option| (dc_option.id, dc_option))
            .collect();
        let user = session.logged_in_user();
        let peers = user
            .and_then(|user| session.peer(PeerId::user(user.id)))
            .map(|peer| (peer.id, peer))
            .into_iter()
            .collect();

        Self {
            home_dc: session.home_dc_id(),
            test_mode,
            dc_options,
            user,
            peers,
            updates_state: session.updates_state(),
        }
    }

    pub(crate) fn set_update_state(&mut self, update: UpdateState) {
        self.updates_state.apply(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PeerKind;

    fn peer(id: i64, username: Option<&str>, phone: Option<&str>) -> PeerInfo {
        PeerInfo {
            id: PeerId::user(id),
            access_hash: Some(id * 10),
            kind: PeerKind::User,
            username: username.map(str::to_string),
            phone: phone.map(str::to_string),
            min: false,
        }
    }

    #[test]
    fn check_username_moves_between_peers() {
        let mut data = SessionData::default();
        data.cache_peer(&peer(1, Some("alice"), Some("123")));
        data.cache_peer(&peer(2, Some("alice"), None));

        assert_eq!(data.peer_by_username("@ALICE").map(|p| p.id), Some(PeerId::user(2)));
        assert_eq!(data.peers[&PeerId::user(1)].username, None);
        assert_eq!(data.peer_by_phone("+1 23").map(|p| p.id), Some(PeerId::user(1)));
    }

    #[test]
    fn check_caching_is_idempotent() {
        let mut data = SessionData::default();
        data.cache_peer(&peer(1, Some("alice"), None));
        let once = data.clone();
        data.cache_peer(&peer(1, Some("alice"), None));
        assert_eq!(data, once);
    }

    #[test]
    fn check_test_mode_swaps_options() {
        let mut data = SessionData::default();
        data.dc_options.get_mut(&2).unwrap().auth_key = Some([1; 256]);
        data.set_test_mode(true);
        assert!(data.test_mode);
        assert_eq!(data.dc_options.len(), 3);
        assert!(data.dc_options.values().all(|dc| dc.auth_key.is_none()));
    }

    #[test]
    fn check_clear_authorization() {
        let mut data = SessionData::default();
        data.dc_options.get_mut(&2).unwrap().auth_key = Some([1; 256]);
        data.user = Some(LoggedInUser { id: 1, bot: false });
        data.updates_state.pts = 10;
        data.cache_peer(&peer(1, None, None));

        data.clear_authorization();
        assert!(data.dc_options.values().all(|dc| dc.auth_key.is_none()));
        assert_eq!(data.user, None);
        assert_eq!(data.updates_state, UpdatesState::default());
        assert_eq!(data.peers.len(), 1);
    }
}
