// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ready-made [`crate::Session`] implementations.

mod legacy;
mod memory;
mod sqlite;

pub use legacy::{LegacySession, MigrationError};
pub use memory::MemorySession;
pub use sqlite::SqliteSession;
