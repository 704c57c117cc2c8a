// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::time::Duration;

use ferrogram_mtproto::transport::{
    self, Abridged, Full, Intermediate, Obfuscated, PaddedIntermediate,
};

/// Used when the system reports no locale.
const FALLBACK_LOCALE: &str = "en";

/// How packets are framed on the wire.
///
/// The obfuscated modes wrap the framing in AES-CTR with keys generated
/// anew on every connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportMode {
    Abridged,
    #[default]
    Intermediate,
    PaddedIntermediate,
    Full,
    ObfuscatedAbridged,
    ObfuscatedIntermediate,
    ObfuscatedPaddedIntermediate,
}

pub type BoxedTransport = Box<dyn transport::Transport + Send>;

impl TransportMode {
    /// A fresh transport for a new connection.
    pub(crate) fn instantiate(self) -> BoxedTransport {
        match self {
            Self::Abridged => Box::new(Abridged::new()),
            Self::Intermediate => Box::new(Intermediate::new()),
            Self::PaddedIntermediate => Box::new(PaddedIntermediate::new()),
            Self::Full => Box::new(Full::new()),
            Self::ObfuscatedAbridged => Box::new(Obfuscated::new(Abridged::new())),
            Self::ObfuscatedIntermediate => Box::new(Obfuscated::new(Intermediate::new())),
            Self::ObfuscatedPaddedIntermediate => {
                Box::new(Obfuscated::new(PaddedIntermediate::new()))
            }
        }
    }
}

/// What the client reports about itself in `initConnection`, plus how
/// connections are made and kept alive.
#[derive(Clone, Debug)]
pub struct ConnectionParams {
    pub device_model: String,
    pub system_version: String,
    pub app_version: String,
    pub system_lang_code: String,
    pub lang_code: String,
    pub transport: TransportMode,
    /// Talk to the test servers. The session must be in test mode too.
    pub test_mode: bool,
    /// Reconnections tried after a connection drops, before giving up.
    pub reconnection_attempts: usize,
    /// Wait before the first reconnection. Doubles on every failure.
    pub reconnection_delay: Duration,
}

fn locale_or_fallback(locale: String) -> String {
    if locale.is_empty() {
        FALLBACK_LOCALE.to_string()
    } else {
        locale
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        let os = os_info::get();

        #[cfg(not(target_os = "android"))]
        let (system_locale, user_locale) = (locate_locale::system(), locate_locale::user());
        #[cfg(target_os = "android")]
        let (system_locale, user_locale) = (String::new(), String::new());

        Self {
            device_model: format!("{} {}", os.os_type(), os.bitness()),
            system_version: os.version().to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            system_lang_code: locale_or_fallback(system_locale),
            lang_code: locale_or_fallback(user_locale),
            transport: TransportMode::default(),
            test_mode: false,
            reconnection_attempts: 5,
            reconnection_delay: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_locale_falls_back() {
        assert_eq!(locale_or_fallback(String::new()), "en");
        assert_eq!(locale_or_fallback("es-ES".to_string()), "es-ES");
    }

    #[test]
    fn defaults_describe_this_device() {
        let params = ConnectionParams::default();
        assert!(!params.system_lang_code.is_empty());
        assert!(!params.lang_code.is_empty());
        assert_eq!(params.app_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(params.transport, TransportMode::Intermediate);
    }
}
