// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compact, printable export of the minimum a session needs to stay logged in.
//!
//! The string is the URL-safe base64 (without padding) of the following bytes:
//!
//! | Size | Field |
//! |------|-------|
//! | 1 | Home datacenter identifier. |
//! | 1 | Whether the test servers are used (`0` or `1`). |
//! | 8 | Logged-in user identifier, big-endian, or zero. |
//! | 1 | Whether the logged-in user is a bot (`0` or `1`). |
//! | 256 | Authorization key for the home datacenter. |
//!
//! Cached peers and update state are not part of the string.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::types::LoggedInUser;
use crate::{Session, SessionData};

const ENCODED_LEN: usize = 1 + 1 + 8 + 1 + 256;

#[derive(Debug)]
pub enum Error {
    /// The home datacenter has no authorization key to export.
    NotAuthorized,
    /// The string is not valid base64.
    Base64(base64::DecodeError),
    /// The decoded data has the wrong size.
    BadLength { got: usize },
    /// The home datacenter identifier is not known.
    UnknownDc { id: i32 },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthorized => write!(f, "session has no auth key for its home dc"),
            Self::Base64(e) => write!(f, "session string is not valid base64: {e}"),
            Self::BadLength { got } => write!(
                f,
                "session string decodes to {got} bytes, but {ENCODED_LEN} were expected"
            ),
            Self::UnknownDc { id } => write!(f, "session string points to unknown dc {id}"),
        }
    }
}

/// Exports the session into a string.
///
/// The session must have an authorization key for its home datacenter.
pub fn export(session: &dyn Session) -> Result<String, Error> {
    let home_dc = session.home_dc_id();
    let auth_key = session
        .dc_option(home_dc)
        .and_then(|dc_option| dc_option.auth_key)
        .ok_or(Error::NotAuthorized)?;
    let user = session.logged_in_user();

    let mut buffer = Vec::with_capacity(ENCODED_LEN);
    buffer.push(home_dc as u8);
    buffer.push(session.test_mode() as u8);
    buffer.extend(user.map(|user| user.id).unwrap_or(0).to_be_bytes());
    buffer.push(user.is_some_and(|user| user.bot) as u8);
    buffer.extend(auth_key);
    Ok(URL_SAFE_NO_PAD.encode(buffer))
}

/// Imports a string produced by [`export`].
///
/// The resulting data can be turned into a [`crate::storages::MemorySession`],
/// or imported into any other storage with [`SessionData::import_to`].
pub fn import(string: &str) -> Result<SessionData, Error> {
    let buffer = URL_SAFE_NO_PAD
        .decode(string.trim())
        .map_err(Error::Base64)?;
    if buffer.len() != ENCODED_LEN {
        return Err(Error::BadLength { got: buffer.len() });
    }

    let home_dc = buffer[0] as i32;
    let test_mode = buffer[1] != 0;
    let mut user_id = [0; 8];
    user_id.copy_from_slice(&buffer[2..10]);
    let user_id = i64::from_be_bytes(user_id);
    let bot = buffer[10] != 0;
    let mut auth_key = [0; 256];
    auth_key.copy_from_slice(&buffer[11..]);

    let mut data = SessionData::new(test_mode);
    let dc_option = data
        .dc_options
        .get_mut(&home_dc)
        .ok_or(Error::UnknownDc { id: home_dc })?;
    dc_option.auth_key = Some(auth_key);
    data.home_dc = home_dc;
    data.user = (user_id != 0).then_some(LoggedInUser { id: user_id, bot });
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storages::MemorySession;

    #[test]
    fn check_export_requires_key() {
        let session = MemorySession::default();
        assert!(matches!(export(&session), Err(Error::NotAuthorized)));
    }

    #[test]
    fn check_export_import() {
        let session = MemorySession::for_test_servers();
        session.set_home_dc_id(3);
        let mut dc_option = session.dc_option(3).unwrap();
        dc_option.auth_key = Some([0xfe; 256]);
        session.set_dc_option(&dc_option);
        session.set_logged_in_user(Some(LoggedInUser {
            id: 0x0102030405,
            bot: true,
        }));

        let string = export(&session).unwrap();
        assert!(!string.contains('='));

        let raw = URL_SAFE_NO_PAD.decode(&string).unwrap();
        assert_eq!(raw.len(), ENCODED_LEN);
        assert_eq!(&raw[..11], &[3, 1, 0, 0, 0, 1, 2, 3, 4, 5, 1]);

        let imported = MemorySession::from(import(&string).unwrap());
        assert_eq!(imported.home_dc_id(), 3);
        assert!(imported.test_mode());
        assert_eq!(imported.dc_option(3), Some(dc_option));
        assert_eq!(imported.logged_in_user(), session.logged_in_user());
    }

    #[test]
    fn check_import_errors() {
        assert!(matches!(import("%%%"), Err(Error::Base64(_))));
        assert!(matches!(
            import(&URL_SAFE_NO_PAD.encode([1; 10])),
            Err(Error::BadLength { got: 10 })
        ));

        let mut raw = vec![9, 0];
        raw.extend([0; ENCODED_LEN - 2]);
        assert!(matches!(
            import(&URL_SAFE_NO_PAD.encode(raw)),
            Err(Error::UnknownDc { id: 9 })
        ));
    }
}
