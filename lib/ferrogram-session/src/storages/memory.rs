// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Mutex;

use crate::types::{DcOption, LoggedInUser, PeerId, PeerInfo, UpdateState, UpdatesState};
use crate::{Session, SessionData, known_dc_option};

/// In-memory session interface.
///
/// Does not actually offer direct ways to persist the state anywhere,
/// so it should only be used in very few select cases, or together with
/// a [`crate::session_string`].
///
/// Logging in has a very high cost in terms of flood wait errors,
/// so the state really should be persisted by other means.
#[derive(Default)]
pub struct MemorySession(Mutex<SessionData>);

impl MemorySession {
    /// An empty session pointing to the test servers.
    pub fn for_test_servers() -> Self {
        Self::from(SessionData::new(true))
    }

    /// Snapshot of the entirety of the session data.
    pub fn data(&self) -> SessionData {
        self.0.lock().unwrap().clone()
    }
}

impl From<SessionData> for MemorySession {
    /// Constructs a memory session from the entirety of the session data,
    /// unlike [`SessionData::import_to`] which cannot know about every peer.
    fn from(session_data: SessionData) -> Self {
        Self(Mutex::new(session_data))
    }
}

impl Session for MemorySession {
    fn home_dc_id(&self) -> i32 {
        self.0.lock().unwrap().home_dc
    }

    fn set_home_dc_id(&self, dc_id: i32) {
        self.0.lock().unwrap().home_dc = dc_id;
    }

    fn test_mode(&self) -> bool {
        self.0.lock().unwrap().test_mode
    }

    fn set_test_mode(&self, test_mode: bool) {
        self.0.lock().unwrap().set_test_mode(test_mode);
    }

    fn dc_option(&self, dc_id: i32) -> Option<DcOption> {
        let data = self.0.lock().unwrap();
        data.dc_options
            .get(&dc_id)
            .cloned()
            .or_else(|| known_dc_option(dc_id, data.test_mode))
    }

    fn set_dc_option(&self, dc_option: &DcOption) {
        self.0
            .lock()
            .unwrap()
            .dc_options
            .insert(dc_option.id, dc_option.clone());
    }

    fn logged_in_user(&self) -> Option<LoggedInUser> {
        self.0.lock().unwrap().user
    }

    fn set_logged_in_user(&self, user: Option<LoggedInUser>) {
        self.0.lock().unwrap().user = user;
    }

    fn peer(&self, id: PeerId) -> Option<PeerInfo> {
        self.0.lock().unwrap().peers.get(&id).cloned()
    }

    fn peer_by_username(&self, username: &str) -> Option<PeerInfo> {
        self.0.lock().unwrap().peer_by_username(username).cloned()
    }

    fn peer_by_phone(&self, phone: &str) -> Option<PeerInfo> {
        self.0.lock().unwrap().peer_by_phone(phone).cloned()
    }

    fn update_peers(&self, peers: &[PeerInfo]) {
        let mut data = self.0.lock().unwrap();
        peers.iter().for_each(|peer| data.cache_peer(peer));
    }

    fn updates_state(&self) -> UpdatesState {
        self.0.lock().unwrap().updates_state.clone()
    }

    fn set_update_state(&self, update: UpdateState) {
        self.0.lock().unwrap().set_update_state(update);
    }

    fn clear_authorization(&self) {
        self.0.lock().unwrap().clear_authorization();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelState;

    #[test]
    fn check_channel_state_is_replaced() {
        let session = MemorySession::default();
        session.set_update_state(UpdateState::Channel { id: 5, pts: 1 });
        session.set_update_state(UpdateState::Channel { id: 5, pts: 7 });
        session.set_update_state(UpdateState::Primary {
            pts: 3,
            date: 4,
            seq: 5,
        });
        session.set_update_state(UpdateState::Secondary { qts: 6 });

        assert_eq!(
            session.updates_state(),
            UpdatesState {
                pts: 3,
                qts: 6,
                date: 4,
                seq: 5,
                channels: vec![ChannelState { id: 5, pts: 7 }],
            }
        );
    }

    #[test]
    fn check_auth_key_is_kept() {
        let session = MemorySession::default();
        let mut dc_option = session.dc_option(4).unwrap();
        assert!(dc_option.auth_key.is_none());

        dc_option.auth_key = Some([7; 256]);
        session.set_dc_option(&dc_option);
        assert_eq!(session.dc_option(4), Some(dc_option));

        session.clear_authorization();
        assert_eq!(session.dc_option(4).and_then(|dc| dc.auth_key), None);
    }
}
