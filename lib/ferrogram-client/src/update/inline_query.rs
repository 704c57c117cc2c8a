// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use ferrogram_session::types::PeerId;
use ferrogram_tl_types as tl;

use crate::media::Geo;
use crate::peer::{Peer, PeerMap, User};

/// `@bot query` typed by a user, delivered to bots with inline mode on.
#[derive(Debug, Clone)]
pub struct InlineQuery {
    pub raw: tl::enums::Update,
    pub(crate) peers: PeerMap,
}

impl InlineQuery {
    fn inner(&self) -> &tl::types::UpdateBotInlineQuery {
        let tl::enums::Update::BotInlineQuery(query) = &self.raw else {
            unreachable!("InlineQuery built from another update");
        };
        query
    }

    pub fn query_id(&self) -> i64 {
        self.inner().query_id
    }

    pub fn sender_id(&self) -> PeerId {
        PeerId::user(self.inner().user_id)
    }

    /// The user who typed the query, if the update came with it.
    pub fn sender(&self) -> Option<&User> {
        self.peers.get(self.sender_id()).and_then(|peer| match peer {
            Peer::User(user) => Some(user),
            _ => None,
        })
    }

    pub fn text(&self) -> &str {
        &self.inner().query
    }

    /// Pagination offset requested by the client.
    pub fn offset(&self) -> &str {
        &self.inner().offset
    }

    /// Only present for bots that request the user's location.
    pub fn geo(&self) -> Option<Geo> {
        match self.inner().geo.as_ref()? {
            tl::enums::GeoPoint::GeoPoint(point) => Some(Geo { raw: point.clone() }),
            tl::enums::GeoPoint::Empty(_) => None,
        }
    }
}
