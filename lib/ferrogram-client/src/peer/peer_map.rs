// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::sync::Arc;

use ferrogram_session::types::{PeerId, PeerInfo};
use ferrogram_tl_types as tl;

use super::Peer;

/// Helper structure to efficiently retrieve peers via their identifier.
///
/// A lot of responses include the peers related to them in the form of a list of users
/// and chats, making it annoying to extract a specific peer. This structure lets you
/// save those separate vectors in a single place and query them by using a [`PeerId`].
///
/// Cloning is cheap: the map itself is shared.
#[derive(Clone, Debug, Default)]
pub struct PeerMap {
    pub(crate) map: Arc<HashMap<PeerId, Peer>>,
}

impl PeerMap {
    pub fn new<U, C>(users: U, chats: C) -> Self
    where
        U: IntoIterator<Item = tl::enums::User>,
        C: IntoIterator<Item = tl::enums::Chat>,
    {
        let map = users
            .into_iter()
            .map(Peer::from_user)
            .chain(chats.into_iter().map(Peer::from_chat))
            .map(|peer| (peer.id(), peer))
            .collect();

        Self { map: Arc::new(map) }
    }

    /// Retrieve the full `Peer` object given its `PeerId`.
    pub fn get(&self, peer: PeerId) -> Option<&Peer> {
        self.map.get(&peer)
    }

    /// Iterate over the peers in the map.
    pub fn iter(&self) -> impl Iterator<Item = (PeerId, &Peer)> {
        self.map.iter().map(|(k, v)| (*k, v))
    }

    /// The session information of every peer in the map.
    pub fn infos(&self) -> Vec<PeerInfo> {
        self.map.values().map(Peer::info).collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> tl::enums::User {
        tl::types::User {
            is_self: false,
            contact: false,
            deleted: false,
            bot: false,
            min: false,
            id,
            access_hash: Some(id * 10),
            first_name: Some(format!("user{id}")),
            last_name: None,
            username: None,
            phone: None,
            status: None,
        }
        .into()
    }

    fn channel(id: i64, broadcast: bool) -> tl::enums::Chat {
        tl::types::Channel {
            creator: false,
            left: false,
            broadcast,
            megagroup: !broadcast,
            min: false,
            gigagroup: false,
            id,
            access_hash: Some(1),
            title: format!("channel{id}"),
            username: Some("Chan".to_string()),
            date: 0,
            participants_count: None,
        }
        .into()
    }

    #[test]
    fn peers_are_indexed_by_dialog_id() {
        let peers = PeerMap::new(
            [user(1)],
            [channel(1, true), channel(2, false), tl::types::ChatEmpty { id: 1 }.into()],
        );

        assert_eq!(peers.len(), 4);
        assert!(matches!(peers.get(PeerId::user(1)), Some(Peer::User(_))));
        assert!(matches!(peers.get(PeerId::channel(1)), Some(Peer::Channel(_))));
        assert!(matches!(peers.get(PeerId::channel(2)), Some(Peer::Group(_))));
        assert!(matches!(peers.get(PeerId::chat(1)), Some(Peer::Group(_))));
        assert_eq!(peers.get(PeerId::channel(1)).unwrap().name(), "channel1");
    }

    #[test]
    fn infos_carry_access_hashes() {
        let peers = PeerMap::new([user(7)], []);
        let infos = peers.infos();

        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, PeerId::user(7));
        assert_eq!(infos[0].access_hash, Some(70));
    }
}
