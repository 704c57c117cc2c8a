// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Point in time used by the types in this crate.
pub type Date = DateTime<Utc>;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a "random" identifier suitable for sending messages or uploading files.
///
/// Identifiers start at the current time in nanoseconds and increase by one on every call,
/// so they never repeat within a process and are very unlikely to collide across restarts.
pub(crate) fn generate_random_id() -> i64 {
    if LAST_ID.load(Ordering::SeqCst) == 0 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as i64)
            .unwrap_or(1);

        let _ = LAST_ID.compare_exchange(0, now, Ordering::SeqCst, Ordering::SeqCst);
    }

    LAST_ID.fetch_add(1, Ordering::SeqCst)
}

pub(crate) fn date(date: i32) -> Date {
    DateTime::from_timestamp(date as i64, 0).unwrap_or_default()
}
