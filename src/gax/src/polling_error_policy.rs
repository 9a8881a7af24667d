// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the types for polling error policies.
//!
//! Long-running operations are polled until they complete. A poll may fail,
//! and the poller needs to (1) distinguish transient from permanent errors,
//! and (2) limit how long the polling loop may run. Polling error policies
//! make both decisions.
//!
//! # Example
//! ```
//! # use aiplatform_gax::polling_error_policy::*;
//! use std::time::Duration;
//! // Poll for at most 15 minutes or at most 50 attempts: whichever limit is
//! // reached first stops the polling loop.
//! let policy = Aip194Strict
//!     .with_time_limit(Duration::from_secs(15 * 60))
//!     .with_attempt_limit(50);
//! ```

use crate::error::Error;
use crate::error::rpc::Code;
use crate::retry_result::RetryResult;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Determines how errors are handled in the polling loop.
pub trait PollingErrorPolicy: Send + Sync + std::fmt::Debug {
    /// Query the polling policy after an error.
    ///
    /// # Parameters
    /// * `loop_start` - when the polling loop started.
    /// * `attempt_count` - the number of poll attempts, always non-zero.
    /// * `error` - the error returned by the last poll.
    fn on_error(&self, loop_start: Instant, attempt_count: u32, error: Error) -> RetryResult;

    /// Called when the operation is successfully polled, but still in
    /// progress.
    ///
    /// Returning an error stops the polling loop.
    fn on_in_progress(
        &self,
        _loop_start: Instant,
        _attempt_count: u32,
        _operation_name: &str,
    ) -> Option<Error> {
        None
    }
}

/// A helper type to use [PollingErrorPolicy] in client and request options.
#[derive(Clone, Debug)]
pub struct PollingErrorPolicyArg(pub(crate) Arc<dyn PollingErrorPolicy>);

impl<T> std::convert::From<T> for PollingErrorPolicyArg
where
    T: PollingErrorPolicy + 'static,
{
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn PollingErrorPolicy>> for PollingErrorPolicyArg {
    fn from(value: Arc<dyn PollingErrorPolicy>) -> Self {
        Self(value)
    }
}

impl From<PollingErrorPolicyArg> for Arc<dyn PollingErrorPolicy> {
    fn from(value: PollingErrorPolicyArg) -> Self {
        value.0
    }
}

/// Extension trait for [PollingErrorPolicy].
pub trait PollingErrorPolicyExt: PollingErrorPolicy + Sized {
    /// Decorate a [PollingErrorPolicy] to limit the total elapsed time in the
    /// polling loop.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::polling_error_policy::*;
    /// use std::time::{Duration, Instant};
    /// let policy = Aip194Strict.with_time_limit(Duration::from_secs(10));
    /// let start = Instant::now() - Duration::from_secs(20);
    /// assert!(policy.on_error(start, 1, transient_error()).is_exhausted());
    ///
    /// use aiplatform_gax::error::{Error, rpc::Code, rpc::Status};
    /// fn transient_error() -> Error { Error::service(Status::default().set_code(Code::Unavailable)) }
    /// ```
    fn with_time_limit(self, maximum_duration: Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::custom(self, maximum_duration)
    }

    /// Decorate a [PollingErrorPolicy] to limit the number of poll attempts.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::polling_error_policy::*;
    /// use std::time::Instant;
    /// let policy = Aip194Strict.with_attempt_limit(3);
    /// assert!(policy.on_error(Instant::now(), 2, transient_error()).is_continue());
    /// assert!(policy.on_error(Instant::now(), 3, transient_error()).is_exhausted());
    ///
    /// use aiplatform_gax::error::{Error, rpc::Code, rpc::Status};
    /// fn transient_error() -> Error { Error::service(Status::default().set_code(Code::Unavailable)) }
    /// ```
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<T: PollingErrorPolicy> PollingErrorPolicyExt for T {}

/// A polling policy that strictly follows [AIP-194].
///
/// Polling is always idempotent, so the policy continues on any `UNAVAILABLE`
/// error, on transport errors without a response, and on transient failures
/// to create the authentication headers. All other errors stop the loop.
///
/// [AIP-194]: https://google.aip.dev/194
#[derive(Clone, Debug)]
pub struct Aip194Strict;

impl PollingErrorPolicy for Aip194Strict {
    fn on_error(&self, _loop_start: Instant, _attempt_count: u32, error: Error) -> RetryResult {
        if error.is_transient_and_before_rpc() || error.is_io() {
            return RetryResult::Continue(error);
        }
        if error.status().is_some() || error.http_status_code().is_some() {
            return if error.code() == Code::Unavailable {
                RetryResult::Continue(error)
            } else {
                RetryResult::Permanent(error)
            };
        }
        RetryResult::Permanent(error)
    }
}

/// A polling policy that continues on any error.
///
/// This policy must be decorated to limit the number of polling attempts or
/// the duration of the polling loop.
#[derive(Clone, Debug)]
pub struct AlwaysContinue;

impl PollingErrorPolicy for AlwaysContinue {
    fn on_error(&self, _loop_start: Instant, _attempt_count: u32, error: Error) -> RetryResult {
        RetryResult::Continue(error)
    }
}

/// A polling policy decorator that limits the total time in the polling loop.
///
/// Once the loop runs longer than the prescribed duration, this policy turns
/// [Continue][RetryResult::Continue] results into
/// [Exhausted][RetryResult::Exhausted], and stops polling in-progress
/// operations.
#[derive(Debug)]
pub struct LimitedElapsedTime<P = Aip194Strict>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_duration: Duration,
}

impl LimitedElapsedTime {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_duration: Duration) -> Self {
        Self {
            inner: Aip194Strict,
            maximum_duration,
        }
    }
}

impl<P> LimitedElapsedTime<P>
where
    P: PollingErrorPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }

    fn expired(&self, start: Instant) -> Option<Duration> {
        let elapsed = now().saturating_duration_since(start);
        (elapsed >= self.maximum_duration).then_some(elapsed)
    }
}

impl<P> PollingErrorPolicy for LimitedElapsedTime<P>
where
    P: PollingErrorPolicy,
{
    fn on_error(&self, start: Instant, count: u32, error: Error) -> RetryResult {
        match self.inner.on_error(start, count, error) {
            RetryResult::Continue(e) if self.expired(start).is_some() => {
                RetryResult::Exhausted(Error::exhausted(e))
            }
            result => result,
        }
    }

    fn on_in_progress(&self, start: Instant, count: u32, operation_name: &str) -> Option<Error> {
        self.inner
            .on_in_progress(start, count, operation_name)
            .or_else(|| {
                self.expired(start).map(|elapsed| {
                    Error::exhausted(Exhausted {
                        operation_name: operation_name.to_string(),
                        limit_name: "elapsed time",
                        value: format!("{elapsed:?}"),
                        limit: format!("{:?}", self.maximum_duration),
                    })
                })
            })
    }
}

/// A polling policy decorator that limits the number of attempts.
///
/// Once `attempt_count >= maximum_attempts` this policy turns
/// [Continue][RetryResult::Continue] results into
/// [Exhausted][RetryResult::Exhausted], and stops polling in-progress
/// operations.
#[derive(Debug)]
pub struct LimitedAttemptCount<P = Aip194Strict>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_attempts: u32) -> Self {
        Self {
            inner: Aip194Strict,
            maximum_attempts,
        }
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }
}

impl<P> PollingErrorPolicy for LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    fn on_error(&self, start: Instant, count: u32, error: Error) -> RetryResult {
        match self.inner.on_error(start, count, error) {
            RetryResult::Continue(e) if count >= self.maximum_attempts => {
                RetryResult::Exhausted(e)
            }
            result => result,
        }
    }

    fn on_in_progress(&self, start: Instant, count: u32, operation_name: &str) -> Option<Error> {
        self.inner
            .on_in_progress(start, count, operation_name)
            .or_else(|| {
                (count >= self.maximum_attempts).then(|| {
                    Error::exhausted(Exhausted {
                        operation_name: operation_name.to_string(),
                        limit_name: "attempt count",
                        value: count.to_string(),
                        limit: self.maximum_attempts.to_string(),
                    })
                })
            })
    }
}

/// The error reported when a polling policy stops an in-progress operation.
#[derive(Debug, thiserror::Error)]
#[error(
    "polling loop for {operation_name} exhausted, {limit_name} value ({value}) exceeds limit ({limit})"
)]
pub struct Exhausted {
    operation_name: String,
    limit_name: &'static str,
    value: String,
    limit: String,
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
