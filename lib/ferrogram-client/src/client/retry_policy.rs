// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::num::NonZeroU32;
use std::ops::ControlFlow;
use std::time::Duration;

use ferrogram_mtsender::{InvocationError, RpcErrorKind};

/// Internal server errors are retried after 1s, 2s, 4s... up to this delay.
const MAX_INTERNAL_ERROR_DELAY: Duration = Duration::from_secs(10);

/// Decides what happens to a request that failed.
///
/// Consulted after migrations and revoked authorizations were handled, so
/// it only sees errors that may go away by waiting.
pub trait RetryPolicy: Send + Sync {
    /// `Continue(delay)` sends the request again after `delay`.
    /// `Break` returns `ctx.error` to the caller.
    fn should_retry(&self, ctx: &RetryContext) -> ControlFlow<(), Duration>;
}

/// What a [`RetryPolicy`] knows about a failing request.
pub struct RetryContext {
    /// Failures so far, the current one included.
    pub fail_count: NonZeroU32,
    /// How many of those failures were flood waits.
    pub flood_waits: u32,
    /// How many of those failures were internal server errors.
    pub internal_errors: u32,
    /// How many of those failures were I/O errors.
    pub io_errors: u32,
    /// Total of the delays returned before. Time spent waiting for
    /// responses is not counted.
    pub slept_so_far: Duration,
    pub error: InvocationError,
}

impl RetryContext {
    pub(crate) fn new() -> Self {
        Self {
            fail_count: NonZeroU32::MIN,
            flood_waits: 0,
            internal_errors: 0,
            io_errors: 0,
            slept_so_far: Duration::ZERO,
            error: InvocationError::Dropped,
        }
    }

    /// Replaces the current error, counting it towards its kind.
    pub(crate) fn record(&mut self, error: InvocationError) {
        match &error {
            InvocationError::Rpc(rpc) if rpc.flood_wait().is_some() => self.flood_waits += 1,
            InvocationError::Rpc(rpc) if rpc.kind() == RpcErrorKind::InternalServerError => {
                self.internal_errors += 1
            }
            InvocationError::Io(_) => self.io_errors += 1,
            _ => {}
        }
        self.error = error;
    }
}

/// Returns every error to the caller as is.
pub struct NoRetries;

impl RetryPolicy for NoRetries {
    fn should_retry(&self, _: &RetryContext) -> ControlFlow<(), Duration> {
        ControlFlow::Break(())
    }
}

/// Sleeps through short waits instead of failing.
///
/// * Flood waits (`FLOOD_WAIT_X`, `SLOWMODE_WAIT_X`...) are slept on once,
///   when they are no longer than [`AutoSleep::threshold`]. Other kinds of
///   failure before it do not count.
/// * Internal server errors are retried with exponential backoff.
/// * A first I/O error can be treated as a short flood wait.
pub struct AutoSleep {
    /// Longest flood wait slept on. With a threshold of 20 seconds a
    /// `FLOOD_WAIT_17` is slept through, while a `FLOOD_WAIT_21` fails.
    pub threshold: Duration,

    /// Delay before retrying after the first I/O error, ignoring the
    /// threshold. `None` fails on I/O errors.
    pub io_errors_as_flood_of: Option<Duration>,

    /// Retries given to requests failing with code 500.
    pub internal_retries: u32,
}

impl Default for AutoSleep {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(60),
            io_errors_as_flood_of: Some(Duration::from_secs(1)),
            internal_retries: 3,
        }
    }
}

impl AutoSleep {
    fn internal_error_delay(&self, failures: u32) -> Option<Duration> {
        (failures <= self.internal_retries).then(|| {
            let exponent = failures.saturating_sub(1).min(4);
            Duration::from_secs(1 << exponent).min(MAX_INTERNAL_ERROR_DELAY)
        })
    }

    fn delay_for(&self, ctx: &RetryContext) -> Option<Duration> {
        match &ctx.error {
            InvocationError::Rpc(rpc) => match rpc.flood_wait() {
                Some(wait) => (ctx.flood_waits <= 1 && wait <= self.threshold).then_some(wait),
                None if rpc.kind() == RpcErrorKind::InternalServerError => {
                    self.internal_error_delay(ctx.internal_errors)
                }
                None => None,
            },
            InvocationError::Io(_) if ctx.io_errors <= 1 => self.io_errors_as_flood_of,
            _ => None,
        }
    }
}

impl RetryPolicy for AutoSleep {
    fn should_retry(&self, ctx: &RetryContext) -> ControlFlow<(), Duration> {
        match self.delay_for(ctx) {
            Some(delay) => ControlFlow::Continue(delay),
            None => ControlFlow::Break(()),
        }
    }
}
