// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use log::{info, warn};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};

use super::legacy::LegacySession;
use crate::types::{
    ChannelState, DcOption, LoggedInUser, PeerId, PeerInfo, PeerKind, UpdateState, UpdatesState,
    normalize_phone,
};
use crate::{DEFAULT_DC, Session, known_dc_option};

const VERSION: i64 = 1;

struct Database(Connection);

struct Cache {
    home_dc: i32,
    test_mode: bool,
    dc_options: HashMap<i32, DcOption>,
    user: Option<LoggedInUser>,
}

/// SQLite-based storage. This is the recommended option.
///
/// Values are written through to the database as soon as they change, so
/// the session survives restarts. Writes that fail are logged, and the
/// in-memory cache keeps serving the latest value.
pub struct SqliteSession {
    database: Mutex<Database>,
    cache: Mutex<Cache>,
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

fn read_dc_option(row: &Row) -> rusqlite::Result<DcOption> {
    Ok(DcOption {
        id: row.get(0)?,
        ipv4: row
            .get::<_, String>(1)?
            .parse()
            .map_err(|e| conversion_error(1, format!("bad ipv4 address: {e}")))?,
        ipv6: row
            .get::<_, String>(2)?
            .parse()
            .map_err(|e| conversion_error(2, format!("bad ipv6 address: {e}")))?,
        auth_key: row
            .get::<_, Option<Vec<u8>>>(3)?
            .map(|auth_key| {
                <[u8; 256]>::try_from(auth_key).map_err(|auth_key| {
                    conversion_error(3, format!("bad auth key length: {}", auth_key.len()))
                })
            })
            .transpose()?,
    })
}

fn read_peer(row: &Row) -> rusqlite::Result<PeerInfo> {
    Ok(PeerInfo {
        id: PeerId::from_dialog_id(row.get(0)?),
        access_hash: row.get(1)?,
        kind: row
            .get::<_, String>(2)?
            .parse::<PeerKind>()
            .map_err(|e| conversion_error(2, e))?,
        username: row.get(3)?,
        phone: row.get(4)?,
        min: row.get(5)?,
    })
}

impl Database {
    /// Returns `true` if the database was just created.
    fn init(&self) -> rusqlite::Result<bool> {
        let mut user_version: i64 = self
            .0
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        if user_version == VERSION {
            return Ok(false);
        }

        let created = user_version == 0;
        if user_version == 0 {
            self.migrate_v0_to_v1()?;
            user_version += 1;
        }
        if user_version == VERSION {
            self.0.pragma_update(None, "user_version", VERSION)?;
        }
        Ok(created)
    }

    fn migrate_v0_to_v1(&self) -> rusqlite::Result<()> {
        self.0.execute_batch(
            "BEGIN;
            CREATE TABLE dc_home (
                dc_id INTEGER NOT NULL,
                PRIMARY KEY(dc_id));
            CREATE TABLE dc_option (
                dc_id INTEGER NOT NULL,
                ipv4 TEXT NOT NULL,
                ipv6 TEXT NOT NULL,
                auth_key BLOB,
                PRIMARY KEY (dc_id));
            CREATE TABLE account (
                test_mode INTEGER NOT NULL,
                user_id INTEGER,
                bot INTEGER);
            CREATE TABLE peer (
                peer_id INTEGER NOT NULL,
                hash INTEGER,
                kind TEXT NOT NULL,
                username TEXT,
                phone TEXT,
                min INTEGER NOT NULL,
                PRIMARY KEY (peer_id));
            CREATE UNIQUE INDEX peer_username ON peer (username);
            CREATE UNIQUE INDEX peer_phone ON peer (phone);
            CREATE TABLE update_state (
                pts INTEGER NOT NULL,
                qts INTEGER NOT NULL,
                date INTEGER NOT NULL,
                seq INTEGER NOT NULL);
            CREATE TABLE channel_state (
                peer_id INTEGER NOT NULL,
                pts INTEGER NOT NULL,
                PRIMARY KEY (peer_id));
            INSERT INTO account VALUES (0, NULL, NULL);
            COMMIT;",
        )
    }

    fn fetch_peer(
        &self,
        sql: &str,
        value: &dyn rusqlite::ToSql,
    ) -> rusqlite::Result<Option<PeerInfo>> {
        self.0.query_row(sql, [value], read_peer).optional()
    }

    fn store_peer(transaction: &Transaction, peer: &PeerInfo) -> rusqlite::Result<()> {
        let existing = transaction
            .query_row(
                "SELECT * FROM peer WHERE peer_id = ?1",
                [peer.id.dialog_id()],
                read_peer,
            )
            .optional()?;
        let peer = peer.clone().merged_with(existing.as_ref());

        if let Some(username) = &peer.username {
            transaction.execute(
                "UPDATE peer SET username = NULL WHERE username = ?1 AND peer_id != ?2",
                params![username, peer.id.dialog_id()],
            )?;
        }
        if let Some(phone) = &peer.phone {
            transaction.execute(
                "UPDATE peer SET phone = NULL WHERE phone = ?1 AND peer_id != ?2",
                params![phone, peer.id.dialog_id()],
            )?;
        }
        transaction.execute(
            "INSERT OR REPLACE INTO peer VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                peer.id.dialog_id(),
                peer.access_hash,
                peer.kind.as_str(),
                peer.username,
                peer.phone,
                peer.min,
            ],
        )?;
        Ok(())
    }

    fn store_dc_option(&self, dc_option: &DcOption) -> rusqlite::Result<()> {
        self.0.execute(
            "INSERT OR REPLACE INTO dc_option VALUES (?1, ?2, ?3, ?4)",
            params![
                dc_option.id,
                dc_option.ipv4.to_string(),
                dc_option.ipv6.to_string(),
                dc_option.auth_key.map(|k| k.to_vec()),
            ],
        )?;
        Ok(())
    }

    fn load_cache(&self) -> rusqlite::Result<Cache> {
        let home_dc = self
            .0
            .query_row("SELECT * FROM dc_home LIMIT 1", [], |row| row.get(0))
            .optional()?
            .unwrap_or(DEFAULT_DC);

        let (test_mode, user) = self.0.query_row(
            "SELECT test_mode, user_id, bot FROM account LIMIT 1",
            [],
            |row| {
                let user = row
                    .get::<_, Option<i64>>(1)?
                    .map(|id| -> rusqlite::Result<_> {
                        Ok(LoggedInUser {
                            id,
                            bot: row.get::<_, Option<bool>>(2)?.unwrap_or(false),
                        })
                    })
                    .transpose()?;
                Ok((row.get(0)?, user))
            },
        )?;

        let mut statement = self.0.prepare("SELECT * FROM dc_option")?;
        let dc_options = statement
            .query_map([], read_dc_option)?
            .map(|dc_option| dc_option.map(|dc_option| (dc_option.id, dc_option)))
            .collect::<rusqlite::Result<_>>()?;

        Ok(Cache {
            home_dc,
            test_mode,
            dc_options,
            user,
        })
    }
}

impl SqliteSession {
    /// Open a connection to the SQLite database at `path`,
    /// creating one if it doesn't exist.
    ///
    /// When the database is created and a legacy JSON session exists next to
    /// it (same path with the `json` extension), its contents are imported.
    /// The JSON file is left untouched, and never read again.
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        let path = path.as_ref();
        let (session, created) = Self::from_connection(Connection::open(path)?)?;
        let legacy_path = path.with_extension("json");
        if created && legacy_path.exists() {
            match LegacySession::load(&legacy_path) {
                Ok(legacy) => {
                    info!("migrating legacy session from {}", legacy_path.display());
                    legacy.into_data().import_to(&session);
                }
                Err(e) => warn!("ignoring unreadable legacy session: {e}"),
            }
        }
        Ok(session)
    }

    /// Open a temporary, in-memory database.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?).map(|(session, _)| session)
    }

    fn from_connection(conn: Connection) -> rusqlite::Result<(Self, bool)> {
        let db = Database(conn);
        let created = db.init()?;
        let cache = db.load_cache()?;
        let session = SqliteSession {
            database: Mutex::new(db),
            cache: Mutex::new(cache),
        };
        Ok((session, created))
    }

    /// Runs a database operation, logging its failure.
    fn with_database<T>(
        &self,
        what: &str,
        f: impl FnOnce(&mut Database) -> rusqlite::Result<T>,
    ) -> Option<T> {
        let mut db = self.database.lock().unwrap();
        match f(&mut *db) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("failed to {what} in the session database: {e}");
                None
            }
        }
    }
}

impl Session for SqliteSession {
    fn home_dc_id(&self) -> i32 {
        self.cache.lock().unwrap().home_dc
    }

    fn set_home_dc_id(&self, dc_id: i32) {
        self.cache.lock().unwrap().home_dc = dc_id;
        self.with_database("store the home datacenter", |db| {
            let transaction = db.0.transaction()?;
            transaction.execute("DELETE FROM dc_home", [])?;
            transaction.execute("INSERT INTO dc_home VALUES (?1)", [dc_id])?;
            transaction.commit()
        });
    }

    fn test_mode(&self) -> bool {
        self.cache.lock().unwrap().test_mode
    }

    fn set_test_mode(&self, test_mode: bool) {
        {
            let mut cache = self.cache.lock().unwrap();
            if cache.test_mode == test_mode {
                return;
            }
            cache.test_mode = test_mode;
            cache.dc_options.clear();
        }
        self.with_database("store the test mode", |db| {
            let transaction = db.0.transaction()?;
            transaction.execute("UPDATE account SET test_mode = ?1", [test_mode])?;
            transaction.execute("DELETE FROM dc_option", [])?;
            transaction.commit()
        });
    }

    fn dc_option(&self, dc_id: i32) -> Option<DcOption> {
        let cache = self.cache.lock().unwrap();
        cache
            .dc_options
            .get(&dc_id)
            .cloned()
            .or_else(|| known_dc_option(dc_id, cache.test_mode))
    }

    fn set_dc_option(&self, dc_option: &DcOption) {
        self.cache
            .lock()
            .unwrap()
            .dc_options
            .insert(dc_option.id, dc_option.clone());
        self.with_database("store a datacenter option", |db| db.store_dc_option(dc_option));
    }

    fn logged_in_user(&self) -> Option<LoggedInUser> {
        self.cache.lock().unwrap().user
    }

    fn set_logged_in_user(&self, user: Option<LoggedInUser>) {
        self.cache.lock().unwrap().user = user;
        self.with_database("store the logged-in user", |db| {
            db.0.execute(
                "UPDATE account SET user_id = ?1, bot = ?2",
                params![user.map(|u| u.id), user.map(|u| u.bot)],
            )
        });
    }

    fn peer(&self, id: PeerId) -> Option<PeerInfo> {
        self.with_database("load a peer", |db| {
            db.fetch_peer("SELECT * FROM peer WHERE peer_id = ?1", &id.dialog_id())
        })
        .flatten()
    }

    fn peer_by_username(&self, username: &str) -> Option<PeerInfo> {
        let username = username.trim_start_matches('@').to_lowercase();
        self.with_database("load a peer", |db| {
            db.fetch_peer("SELECT * FROM peer WHERE username = ?1", &username)
        })
        .flatten()
    }

    fn peer_by_phone(&self, phone: &str) -> Option<PeerInfo> {
        let phone = normalize_phone(phone);
        self.with_database("load a peer", |db| {
            db.fetch_peer("SELECT * FROM peer WHERE phone = ?1", &phone)
        })
        .flatten()
    }

    fn update_peers(&self, peers: &[PeerInfo]) {
        if peers.is_empty() {
            return;
        }
        self.with_database("store peers", |db| {
            let transaction = db.0.transaction()?;
            for peer in peers {
                Database::store_peer(&transaction, peer)?;
            }
            transaction.commit()
        });
    }

    fn updates_state(&self) -> UpdatesState {
        self.with_database("load the update state", |db| {
            let mut state = db
                .0
                .query_row("SELECT * FROM update_state LIMIT 1", [], |row| {
                    Ok(UpdatesState {
                        pts: row.get(0)?,
                        qts: row.get(1)?,
                        date: row.get(2)?,
                        seq: row.get(3)?,
                        channels: Vec::new(),
                    })
                })
                .optional()?
                .unwrap_or_default();

            let mut statement = db.0.prepare("SELECT * FROM channel_state")?;
            state.channels = statement
                .query_map([], |row| {
                    Ok(ChannelState {
                        id: row.get(0)?,
                        pts: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<_>>()?;
            Ok(state)
        })
        .unwrap_or_default()
    }

    fn set_update_state(&self, update: UpdateState) {
        self.with_database("store the update state", |db| {
            let transaction = db.0.transaction()?;
            match update {
                UpdateState::All(updates_state) => {
                    transaction.execute("DELETE FROM update_state", [])?;
                    transaction.execute(
                        "INSERT INTO update_state VALUES (?1, ?2, ?3, ?4)",
                        params![
                            updates_state.pts,
                            updates_state.qts,
                            updates_state.date,
                            updates_state.seq,
                        ],
                    )?;
                    transaction.execute("DELETE FROM channel_state", [])?;
                    for channel in updates_state.channels {
                        transaction.execute(
                            "INSERT INTO channel_state VALUES (?1, ?2)",
                            params![channel.id, channel.pts],
                        )?;
                    }
                }
                UpdateState::Primary { pts, date, seq } => {
                    let previous = transaction.execute(
                        "UPDATE update_state SET pts = ?1, date = ?2, seq = ?3",
                        [pts, date, seq],
                    )?;
                    if previous == 0 {
                        transaction.execute(
                            "INSERT INTO update_state VALUES (?1, 0, ?2, ?3)",
                            [pts, date, seq],
                        )?;
                    }
                }
                UpdateState::Secondary { qts } => {
                    let previous =
                        transaction.execute("UPDATE update_state SET qts = ?1", [qts])?;
                    if previous == 0 {
                        transaction
                            .execute("INSERT INTO update_state VALUES (0, ?1, 0, 0)", [qts])?;
                    }
                }
                UpdateState::Channel { id, pts } => {
                    transaction.execute(
                        "INSERT OR REPLACE INTO channel_state VALUES (?1, ?2)",
                        params![id, pts],
                    )?;
                }
            }
            transaction.commit()
        });
    }

    fn clear_authorization(&self) {
        {
            let mut cache = self.cache.lock().unwrap();
            cache
                .dc_options
                .values_mut()
                .for_each(|dc_option| dc_option.auth_key = None);
            cache.user = None;
        }
        self.with_database("clear the authorization", |db| {
            db.0.execute_batch(
                "BEGIN;
                UPDATE dc_option SET auth_key = NULL;
                UPDATE account SET user_id = NULL, bot = NULL;
                DELETE FROM update_state;
                DELETE FROM channel_state;
                COMMIT;",
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: PeerId, kind: PeerKind, username: Option<&str>, min: bool) -> PeerInfo {
        PeerInfo {
            id,
            access_hash: Some(if min { 1 } else { 2 }),
            kind,
            username: username.map(str::to_string),
            phone: None,
            min,
        }
    }

    #[test]
    fn exercise_sqlite_session() {
        let session = SqliteSession::open_in_memory().unwrap();

        assert_eq!(session.home_dc_id(), DEFAULT_DC);
        session.set_home_dc_id(5);
        assert_eq!(session.home_dc_id(), 5);

        assert!(!session.test_mode());
        let mut dc_option = session.dc_option(5).unwrap();
        dc_option.auth_key = Some([1; 256]);
        session.set_dc_option(&dc_option);
        assert_eq!(session.dc_option(5), Some(dc_option));

        session.set_logged_in_user(Some(LoggedInUser { id: 77, bot: true }));
        assert_eq!(session.logged_in_user(), Some(LoggedInUser { id: 77, bot: true }));

        let channel = peer(PeerId::channel(9), PeerKind::Supergroup, Some("group"), false);
        session.update_peers(&[channel.clone(), channel.clone()]);
        assert_eq!(session.peer(PeerId::channel(9)), Some(channel.clone()));
        assert_eq!(session.peer_by_username("@Group"), Some(channel.clone()));

        let min = peer(PeerId::channel(9), PeerKind::Supergroup, None, true);
        session.update_peers(&[min]);
        assert_eq!(session.peer(PeerId::channel(9)), Some(channel));

        session.set_update_state(UpdateState::Primary {
            pts: 1,
            date: 2,
            seq: 3,
        });
        session.set_update_state(UpdateState::Secondary { qts: 4 });
        session.set_update_state(UpdateState::Channel { id: 9, pts: 5 });
        session.set_update_state(UpdateState::Channel { id: 9, pts: 6 });
        assert_eq!(
            session.updates_state(),
            UpdatesState {
                pts: 1,
                qts: 4,
                date: 2,
                seq: 3,
                channels: vec![ChannelState { id: 9, pts: 6 }],
            }
        );

        session.clear_authorization();
        assert_eq!(session.logged_in_user(), None);
        assert_eq!(session.dc_option(5).and_then(|dc| dc.auth_key), None);
        assert_eq!(session.updates_state(), UpdatesState::default());
        assert!(session.peer(PeerId::channel(9)).is_some());
    }

    #[test]
    fn check_username_is_unique() {
        let session = SqliteSession::open_in_memory().unwrap();
        session.update_peers(&[peer(PeerId::user(1), PeerKind::User, Some("name"), false)]);
        session.update_peers(&[peer(PeerId::user(2), PeerKind::Bot, Some("name"), false)]);

        assert_eq!(
            session.peer_by_username("name").map(|peer| peer.id),
            Some(PeerId::user(2))
        );
        assert_eq!(session.peer(PeerId::user(1)).unwrap().username, None);
    }

    #[test]
    fn check_state_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.session");

        {
            let session = SqliteSession::open(&path).unwrap();
            session.set_home_dc_id(4);
            session.set_test_mode(true);
            session.set_logged_in_user(Some(LoggedInUser { id: 1, bot: false }));
            session.set_update_state(UpdateState::All(UpdatesState {
                pts: 10,
                qts: 20,
                date: 30,
                seq: 40,
                channels: vec![ChannelState { id: 3, pts: 50 }],
            }));
        }

        let session = SqliteSession::open(&path).unwrap();
        assert_eq!(session.home_dc_id(), 4);
        assert!(session.test_mode());
        assert_eq!(session.logged_in_user(), Some(LoggedInUser { id: 1, bot: false }));
        assert_eq!(session.updates_state().channel_pts(3), Some(50));
    }

    #[test]
    fn check_legacy_session_is_migrated_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.session");
        std::fs::write(
            dir.path().join("bot.json"),
            r#"{
                "dc_id": 4,
                "test_mode": false,
                "auth_key": null,
                "user_id": 123,
                "is_bot": true,
                "date": 1700000000,
                "pts": 15,
                "peers": [[-1000000000042, 99, "channel", "News", null]]
            }"#,
        )
        .unwrap();

        {
            let session = SqliteSession::open(&path).unwrap();
            assert_eq!(session.home_dc_id(), 4);
            assert_eq!(session.logged_in_user(), Some(LoggedInUser { id: 123, bot: true }));
            assert_eq!(session.updates_state().pts, 15);
            assert_eq!(
                session.peer_by_username("news").map(|peer| peer.access_hash),
                Some(Some(99))
            );
            session.set_home_dc_id(2);
        }

        let session = SqliteSession::open(&path).unwrap();
        assert_eq!(session.home_dc_id(), 2);
    }
}
