// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Persistent state of an MTProto client.
//!
//! A [`Session`] remembers which datacenter is home, the auth key of each
//! datacenter, who is logged in, how far updates were processed, and the
//! access hashes of every peer seen so far.
//!
//! [`storages::MemorySession`] keeps all of it in memory and can be saved
//! as a [`session_string`]. [`storages::SqliteSession`] persists it in a
//! database file, and [`storages::LegacySession`] migrates the old JSON
//! format into either of them. [`SessionData`] is the common snapshot used
//! to move state between storages.

#![deny(unsafe_code)]

mod dc_options;
mod peer;
mod session;
mod session_data;
pub mod session_string;
pub mod storages;
pub mod types;

pub use dc_options::{DEFAULT_DC, known_dc_option, known_dc_options};
pub use session::Session;
pub use session_data::SessionData;
