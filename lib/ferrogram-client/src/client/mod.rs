// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Contains client-specific configuration and types.

pub mod auth;
#[allow(clippy::module_inception)]
mod client;
mod files;
mod messages;
mod net;
mod retry_policy;
mod updates;

pub use auth::{LoginToken, PasswordToken, SignInError};
pub(crate) use client::ClientInner;
pub use client::{Client, ClientConfiguration, InvokeOptions, UpdatesConfiguration};
pub use files::{
    AsyncProgressCallback, BIG_FILE_SIZE, DownloadError, DownloadIter, MAX_CHUNK_SIZE,
    MAX_UPLOAD_PART_SIZE, MAX_UPLOAD_PARTS, MIN_CHUNK_SIZE, Progress, ProgressCallback,
    Transmission, UploadError,
};
pub use net::Network;
pub use retry_policy::{AutoSleep, NoRetries, RetryContext, RetryPolicy};
pub use updates::UpdateStream;
