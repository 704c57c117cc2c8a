// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::{DcOption, LoggedInUser, PeerId, PeerInfo, UpdateState, UpdatesState};

/// Storage for everything a client must remember between runs.
///
/// Methods take `&self` and cannot fail. Storages backed by something
/// fallible log the error and keep serving the value they hold in memory,
/// since the client has no sensible way to recover from a storage failure
/// in the middle of a request.
pub trait Session: Send + Sync {
    /// Datacenter where the account lives, or a best guess before login.
    ///
    /// Called on every request, so it must be cheap.
    fn home_dc_id(&self) -> i32;

    /// Records the datacenter the server told us to migrate to.
    fn set_home_dc_id(&self, dc_id: i32);

    fn test_mode(&self) -> bool;

    /// Switching modes forgets every stored [`DcOption`], as addresses and
    /// keys of one set of servers are useless on the other.
    fn set_test_mode(&self, test_mode: bool);

    /// Address and key of a datacenter.
    ///
    /// The main datacenters must always resolve, falling back to the
    /// built-in table. Unknown identifiers return `None`.
    fn dc_option(&self, dc_id: i32) -> Option<DcOption>;

    /// Saves a new address or a freshly generated auth key.
    fn set_dc_option(&self, dc_option: &DcOption);

    fn logged_in_user(&self) -> Option<LoggedInUser>;

    fn set_logged_in_user(&self, user: Option<LoggedInUser>);

    fn peer(&self, id: PeerId) -> Option<PeerInfo>;

    /// Case-insensitive lookup.
    fn peer_by_username(&self, username: &str) -> Option<PeerInfo>;

    /// Lookup ignoring any formatting in the number (see
    /// [`crate::types::normalize_phone`]).
    fn peer_by_phone(&self, phone: &str) -> Option<PeerInfo>;

    /// Stores peers, merging them with what was known before.
    ///
    /// Storing the same peers twice changes nothing. A `min` peer never
    /// overwrites the access hash of a full one (see
    /// [`PeerInfo::merged_with`]), and a username or phone number moves to
    /// the peer that now claims it.
    fn update_peers(&self, peers: &[PeerInfo]);

    fn updates_state(&self) -> UpdatesState;

    fn set_update_state(&self, update: UpdateState);

    /// Called once the server says the authorization is gone.
    ///
    /// Drops every auth key, the logged-in user and the updates state. The
    /// datacenter addresses and the peer cache survive.
    fn clear_authorization(&self);
}
