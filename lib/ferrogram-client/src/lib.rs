// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This library is a high-level implementation to access [Telegram's API], built on top of
//! the connection pool offered by `ferrogram-mtsender`.
//!
//! Create a new [`Client`] from a running [`SenderPool`] with [`Client::new`], sign in with
//! [`Client::request_login_code`] or [`Client::bot_sign_in`], and start making calls.
//!
//! # Updates
//!
//! Updates pushed by Telegram arrive through the [`SenderPool::updates`] channel. Hand it to
//! [`Client::stream_updates`] to have gaps resolved and peers cached, and either consume the
//! [`client::UpdateStream`] directly or feed it into a [`Dispatcher`] with its handler groups.
//!
//! # Method cost
//!
//! When a method is said to be "expensive", calling it too much in a certain period of time
//! will result in the API returning "flood wait" errors, meaning the method cannot be called
//! again for a certain amount of seconds. The default [`ClientConfiguration`] sleeps on small
//! flood errors to prevent interruption of simple scripts.
//!
//! # Re-exports
//!
//! The connection layer is re-exported as [`sender`], the session storages as [`session`]
//! and the raw types as [`tl`]. Using raw types is discouraged, but sometimes required to
//! access everything Telegram returned. Any function in [`tl::functions`] can be sent with
//! [`Client::invoke`].
//!
//! [Telegram's API]: https://core.telegram.org/#telegram-api

#![deny(unsafe_code)]

pub mod client;
pub mod dispatch;
pub mod media;
pub mod message;
mod message_cache;
pub mod peer;
pub mod update;
pub(crate) mod utils;

pub use client::{Client, ClientConfiguration, SignInError};
pub use dispatch::{Dispatcher, DispatcherConfiguration};
pub use ferrogram_mtsender::{self as sender, InvocationError, SenderPool};
pub use ferrogram_session as session;
pub use ferrogram_tl_types as tl;
pub use update::Update;

/// Alias for [`std::result::Result`] with the error set to [`InvocationError`].
pub type Result<T> = std::result::Result<T, InvocationError>;
