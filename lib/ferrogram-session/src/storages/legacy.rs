// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The JSON format sessions used to be stored in, before SQLite.

use std::path::Path;
use std::{fmt, fs, io};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::SessionData;
use crate::types::{LoggedInUser, PeerId, PeerInfo, PeerKind, UpdatesState, normalize_phone};

/// A cached peer, as `[dialog_id, access_hash, kind, username, phone]`.
pub type LegacyPeer = (i64, Option<i64>, String, Option<String>, Option<String>);

/// A session in the legacy JSON format.
///
/// Only read, never written, in order to move it into a [`super::SqliteSession`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacySession {
    pub dc_id: i32,
    pub test_mode: bool,
    /// Standard base64 of the 256-byte authorization key bound to `dc_id`.
    pub auth_key: Option<String>,
    pub user_id: Option<i64>,
    pub is_bot: bool,
    pub date: i32,
    pub pts: i32,
    pub peers: Vec<LegacyPeer>,
}

#[derive(Debug)]
pub enum MigrationError {
    Io(io::Error),
    Json(serde_json::Error),
    /// The authorization key was not 256 bytes of valid base64.
    BadAuthKey,
}

impl std::error::Error for MigrationError {}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "legacy session could not be read: {e}"),
            Self::Json(e) => write!(f, "legacy session is malformed: {e}"),
            Self::BadAuthKey => write!(f, "legacy session has an invalid auth key"),
        }
    }
}

impl From<io::Error> for MigrationError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl LegacySession {
    /// Reads and validates a legacy session file.
    pub fn load(path: &Path) -> Result<Self, MigrationError> {
        let session = serde_json::from_slice::<Self>(&fs::read(path)?)?;
        session.auth_key()?;
        Ok(session)
    }

    fn auth_key(&self) -> Result<Option<[u8; 256]>, MigrationError> {
        self.auth_key
            .as_deref()
            .map(|auth_key| {
                STANDARD
                    .decode(auth_key)
                    .ok()
                    .and_then(|auth_key| <[u8; 256]>::try_from(auth_key).ok())
                    .ok_or(MigrationError::BadAuthKey)
            })
            .transpose()
    }

    /// Converts into the current representation.
    ///
    /// Peers of unknown kind are dropped.
    pub fn into_data(self) -> SessionData {
        let mut data = SessionData::new(self.test_mode);
        if data.dc_options.contains_key(&self.dc_id) {
            data.home_dc = self.dc_id;
        }
        if let (Ok(Some(auth_key)), Some(dc_option)) =
            (self.auth_key(), data.dc_options.get_mut(&data.home_dc))
        {
            dc_option.auth_key = Some(auth_key);
        }

        data.user = self.user_id.map(|id| LoggedInUser {
            id,
            bot: self.is_bot,
        });
        data.updates_state = UpdatesState {
            pts: self.pts,
            date: self.date,
            ..Default::default()
        };

        for (id, access_hash, kind, username, phone) in self.peers {
            let Ok(kind) = kind.parse::<PeerKind>() else {
                continue;
            };
            data.cache_peer(&PeerInfo {
                id: PeerId::from_dialog_id(id),
                access_hash,
                kind,
                username: username.map(|username| username.to_lowercase()),
                phone: phone
                    .map(|phone| normalize_phone(&phone))
                    .filter(|phone| !phone.is_empty()),
                min: false,
            });
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_conversion() {
        let legacy = LegacySession {
            dc_id: 5,
            test_mode: false,
            auth_key: Some(STANDARD.encode([3; 256])),
            user_id: Some(10),
            is_bot: false,
            date: 1,
            pts: 2,
            peers: vec![
                (10, Some(1), "user".into(), Some("Me".into()), Some("+1 555".into())),
                (-5, None, "group".into(), None, None),
                (11, Some(2), "alien".into(), None, None),
            ],
        };
        let data = legacy.into_data();

        assert_eq!(data.home_dc, 5);
        assert_eq!(data.dc_options[&5].auth_key, Some([3; 256]));
        assert_eq!(data.user, Some(LoggedInUser { id: 10, bot: false }));
        assert_eq!(data.peers.len(), 2);
        assert_eq!(data.peer_by_phone("1555").map(|p| p.id), Some(PeerId::user(10)));
        assert_eq!(data.peers[&PeerId::chat(5)].kind, PeerKind::Group);
    }

    #[test]
    fn check_bad_auth_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"dc_id": 2, "auth_key": "AAAA"}"#).unwrap();
        assert!(matches!(
            LegacySession::load(&path),
            Err(MigrationError::BadAuthKey)
        ));
    }
}
