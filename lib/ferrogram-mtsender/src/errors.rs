// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::time::Duration;
use std::{fmt, io};

use ferrogram_mtproto::{authentication, mtp, transport};
use ferrogram_tl_types as tl;

/// Names after which the stored authorization will never work again.
const REVOKED_AUTHORIZATION: [&str; 3] =
    ["AUTH_KEY_UNREGISTERED", "SESSION_REVOKED", "USER_DEACTIVATED"];

/// Names that carry a wait time in seconds as their value.
const WAIT_ERRORS: [&str; 3] = ["FLOOD_WAIT", "FLOOD_PREMIUM_WAIT", "SLOWMODE_WAIT"];

/// The connection could not be read from. Every pending request on it fails.
#[derive(Debug)]
pub enum ReadError {
    Io(io::Error),
    Transport(transport::Error),
    /// Includes payloads rejected by the security checks.
    Deserialize(mtp::DeserializeError),
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Deserialize(e) => Some(e),
        }
    }
}

// Every waiting request gets its own copy of the error.
impl Clone for ReadError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(match e.raw_os_error() {
                Some(code) => io::Error::from_raw_os_error(code),
                None => io::Error::new(e.kind(), e.to_string()),
            }),
            Self::Transport(e) => Self::Transport(e.clone()),
            Self::Deserialize(e) => Self::Deserialize(e.clone()),
        }
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("connection read failed: ")?;
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Transport(e) => write!(f, "{e}"),
            Self::Deserialize(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<transport::Error> for ReadError {
    fn from(error: transport::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<mtp::DeserializeError> for ReadError {
    fn from(error: mtp::DeserializeError) -> Self {
        Self::Deserialize(error)
    }
}

impl ReadError {
    /// `false` when the server no longer knows our auth key, since
    /// reconnecting with it would fail the same way.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Transport(transport::Error::BadStatus { status: 404 })
        )
    }
}

/// Category of an [`RpcError`] by its code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcErrorKind {
    /// 303: repeat in another datacenter.
    SeeOther,
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 406: usually meant to be shown to the user as-is.
    NotAcceptable,
    /// 420
    Flood,
    /// 500
    InternalServerError,
    /// -503: the server gave up waiting on an internal call.
    Timeout,
    Other(i32),
}

impl From<i32> for RpcErrorKind {
    fn from(code: i32) -> Self {
        match code {
            303 => Self::SeeOther,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            406 => Self::NotAcceptable,
            420 => Self::Flood,
            500 => Self::InternalServerError,
            -503 => Self::Timeout,
            code => Self::Other(code),
        }
    }
}

/// An `rpc_error` returned in place of a result.
///
/// The first all-digit word of the message is moved out of the name and
/// into [`RpcError::value`]:
///
/// ```
/// use ferrogram_mtsender::RpcError;
/// let error = RpcError::from(ferrogram_tl_types::types::RpcError {
///     error_code: 400,
///     error_message: "FILE_PART_3_MISSING".into(),
/// });
/// assert_eq!(error.name, "FILE_PART_MISSING");
/// assert_eq!(error.value, Some(3));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RpcError {
    /// Similar to an HTTP status. See [`RpcErrorKind`].
    pub code: i32,
    pub name: String,
    pub value: Option<u32>,
    /// Constructor of the request that failed, when known.
    pub caused_by: Option<u32>,
}

impl std::error::Error for RpcError {}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)?;
        if let Some(value) = self.value {
            write!(f, " with value {value}")?;
        }
        if let Some(id) = self.caused_by {
            match tl::name_for_id(id) {
                Some(name) => write!(f, " from {name}")?,
                None => write!(f, " from {id:08x}")?,
            }
        }
        Ok(())
    }
}

impl From<tl::types::RpcError> for RpcError {
    fn from(error: tl::types::RpcError) -> Self {
        let mut value = None;
        let mut words = Vec::new();
        for word in error.error_message.split('_') {
            match word.parse::<u32>() {
                Ok(number) if value.is_none() => value = Some(number),
                _ => words.push(word),
            }
        }

        Self {
            code: error.error_code,
            name: words.join("_"),
            value,
            caused_by: None,
        }
    }
}

impl RpcError {
    /// Compares the name, which is case-sensitive.
    ///
    /// A trailing `*` matches by prefix and a leading one by suffix, so
    /// `"PHONE_CODE_*"` matches both `PHONE_CODE_INVALID` and
    /// `PHONE_CODE_EXPIRED`.
    pub fn is(&self, pattern: &str) -> bool {
        if let Some(prefix) = pattern.strip_suffix('*') {
            self.name.starts_with(prefix)
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            self.name.ends_with(suffix)
        } else {
            self.name == pattern
        }
    }

    pub fn with_caused_by(self, constructor_id: u32) -> Self {
        Self {
            caused_by: Some(constructor_id),
            ..self
        }
    }

    pub fn kind(&self) -> RpcErrorKind {
        self.code.into()
    }

    /// The required wait for flood and slow mode errors.
    pub fn flood_wait(&self) -> Option<Duration> {
        if WAIT_ERRORS.iter().any(|name| self.is(name)) {
            self.value.map(|secs| Duration::from_secs(u64::from(secs)))
        } else {
            None
        }
    }

    /// The datacenter named by a `*_MIGRATE_X` error.
    pub fn migrate_dc(&self) -> Option<i32> {
        self.value
            .filter(|_| self.is("*_MIGRATE"))
            .and_then(|dc| i32::try_from(dc).ok())
    }

    pub fn is_file_reference_expired(&self) -> bool {
        self.is("FILE_REFERENCE_EXPIRED") || self.is("FILE_REFERENCE_INVALID")
    }

    pub fn is_authorization_revoked(&self) -> bool {
        REVOKED_AUTHORIZATION.contains(&self.name.as_str())
    }
}

/// A request did not produce a result.
#[derive(Debug)]
pub enum InvocationError {
    /// The server answered with an error.
    Rpc(RpcError),
    /// The connection failed. A new connection is made for the next request,
    /// so retrying once right away is usually fine.
    Io(io::Error),
    Deserialize(mtp::DeserializeError),
    /// Often a 404 (unknown auth key) or 429 (too many connections).
    Transport(transport::Error),
    /// The request was cancelled, or the [`crate::SenderPool`] stopped.
    Dropped,
    /// No address is known for the requested datacenter.
    InvalidDc,
    /// Every attempt at generating an auth key with a new datacenter failed.
    Authentication(authentication::Error),
    /// No response arrived in time. The response is discarded if it does
    /// arrive later.
    Timeout,
}

impl std::error::Error for InvocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rpc(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Deserialize(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Authentication(e) => Some(e),
            Self::Dropped | Self::InvalidDc | Self::Timeout => None,
        }
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rpc(e) => write!(f, "server returned {e}"),
            Self::Io(e) => write!(f, "connection failed: {e}"),
            Self::Deserialize(e) => write!(f, "invalid response: {e}"),
            Self::Transport(e) => write!(f, "transport failed: {e}"),
            Self::Dropped => f.write_str("request was dropped before completing"),
            Self::InvalidDc => f.write_str("datacenter is not known"),
            Self::Authentication(e) => write!(f, "could not generate auth key: {e}"),
            Self::Timeout => f.write_str("request timed out"),
        }
    }
}

impl From<ReadError> for InvocationError {
    fn from(error: ReadError) -> Self {
        match error {
            ReadError::Io(e) => Self::Io(e),
            ReadError::Transport(e) => Self::Transport(e),
            ReadError::Deserialize(e) => Self::Deserialize(e),
        }
    }
}

impl From<mtp::DeserializeError> for InvocationError {
    fn from(error: mtp::DeserializeError) -> Self {
        Self::Deserialize(error)
    }
}

impl From<transport::Error> for InvocationError {
    fn from(error: transport::Error) -> Self {
        Self::Transport(error)
    }
}

impl From<tl::deserialize::Error> for InvocationError {
    fn from(error: tl::deserialize::Error) -> Self {
        Self::Deserialize(error.into())
    }
}

impl From<io::Error> for InvocationError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<authentication::Error> for InvocationError {
    fn from(error: authentication::Error) -> Self {
        Self::Authentication(error)
    }
}

impl From<RpcError> for InvocationError {
    fn from(error: RpcError) -> Self {
        Self::Rpc(error)
    }
}

impl InvocationError {
    /// [`RpcError::is`], or `false` for anything but an RPC error.
    ///
    /// ```
    /// # use ferrogram_mtsender::{InvocationError, RpcError};
    /// let error = InvocationError::Rpc(RpcError {
    ///     code: 400,
    ///     name: "PHONE_CODE_EXPIRED".to_string(),
    ///     value: None,
    ///     caused_by: None,
    /// });
    /// assert!(error.is("PHONE_CODE_*"));
    /// assert!(!InvocationError::Timeout.is("PHONE_CODE_*"));
    /// ```
    pub fn is(&self, pattern: &str) -> bool {
        self.rpc().is_some_and(|rpc| rpc.is(pattern))
    }

    pub fn rpc(&self) -> Option<&RpcError> {
        match self {
            Self::Rpc(rpc) => Some(rpc),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc(code: i32, message: &str) -> RpcError {
        RpcError::from(tl::types::RpcError {
            error_code: code,
            error_message: message.into(),
        })
    }

    #[test]
    fn check_rpc_error_parsing() {
        assert_eq!(
            rpc(400, "CHAT_INVALID"),
            RpcError {
                code: 400,
                name: "CHAT_INVALID".into(),
                value: None,
                caused_by: None,
            }
        );
        assert_eq!(rpc(303, "PHONE_MIGRATE_5").name, "PHONE_MIGRATE");
        assert_eq!(rpc(400, "FILE_PART_7_MISSING").name, "FILE_PART_MISSING");
        assert_eq!(rpc(400, "FILE_PART_7_MISSING").value, Some(7));
        assert_eq!(rpc(500, "INTERDC_2_CALL_ERROR").name, "INTERDC_CALL_ERROR");
    }

    #[test]
    fn check_rpc_error_helpers() {
        assert_eq!(rpc(420, "FLOOD_WAIT_3").flood_wait(), Some(Duration::from_secs(3)));
        assert_eq!(rpc(420, "SLOWMODE_WAIT_10").flood_wait(), Some(Duration::from_secs(10)));
        assert_eq!(rpc(420, "FLOOD_WAIT_3").kind(), RpcErrorKind::Flood);
        assert_eq!(rpc(303, "PHONE_MIGRATE_5").migrate_dc(), Some(5));
        assert_eq!(rpc(303, "NETWORK_MIGRATE_2").migrate_dc(), Some(2));
        assert_eq!(rpc(400, "PHONE_CODE_INVALID").migrate_dc(), None);
        assert!(rpc(401, "AUTH_KEY_UNREGISTERED").is_authorization_revoked());
        assert!(!rpc(401, "SESSION_PASSWORD_NEEDED").is_authorization_revoked());
        assert!(rpc(400, "FILE_REFERENCE_EXPIRED").is_file_reference_expired());
        assert_eq!(rpc(-503, "Timeout").kind(), RpcErrorKind::Timeout);
        assert_eq!(rpc(418, "TEAPOT").kind(), RpcErrorKind::Other(418));
    }

    #[test]
    fn check_display_names_the_request() {
        let error = rpc(420, "FLOOD_WAIT_3").with_caused_by(0xcb9f372d);
        assert_eq!(error.caused_by, Some(0xcb9f372d));
        assert!(error.to_string().starts_with("FLOOD_WAIT (420) with value 3 from "));
    }

    #[test]
    fn check_recoverable_read_errors() {
        assert!(!ReadError::Transport(transport::Error::BadStatus { status: 404 }).is_recoverable());
        assert!(ReadError::Io(io::ErrorKind::ConnectionReset.into()).is_recoverable());
    }
}
