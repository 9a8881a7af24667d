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

//! A declarative retry configuration.
//!
//! [Retry] bundles a retry predicate with a jittered exponential backoff
//! schedule and a total timeout. It implements both [RetryPolicy] and
//! [BackoffPolicy], the generated clients use it to describe the default retry
//! behavior of each method.
//!
//! The retry loop sleeps between attempts. The sleep after the n-th failure
//! is drawn uniformly from `[0, min(initial * multiplier^(n-1), maximum)]` and
//! bounded by the time remaining until `total_timeout`. The sum of the sleeps
//! never exceeds `total_timeout`.
//!
//! # Example
//! ```
//! # use aiplatform_gax::retry::Retry;
//! # use aiplatform_gax::error::rpc::Code;
//! use std::time::Duration;
//! let retry = Retry::if_codes([Code::Unavailable, Code::DeadlineExceeded])
//!     .with_initial_delay(Duration::from_millis(100))
//!     .with_multiplier(1.3)
//!     .with_maximum_delay(Duration::from_secs(60))
//!     .with_total_timeout(Duration::from_secs(600));
//! ```
//!
//! [RetryPolicy]: crate::retry_policy::RetryPolicy
//! [BackoffPolicy]: crate::backoff_policy::BackoffPolicy

use crate::backoff_policy::BackoffPolicy;
use crate::error::Error;
use crate::error::rpc::Code;
use crate::exponential_backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use crate::retry_policy::RetryPolicy;
use crate::retry_result::RetryResult;
use crate::retry_state::RetryState;
use std::sync::Arc;
use std::time::{Duration, Instant};

type Predicate = Arc<dyn Fn(&Error) -> bool + Send + Sync>;

/// Retry configuration: which errors to retry, how long to wait between
/// attempts, and the total time budget.
#[derive(Clone)]
pub struct Retry {
    predicate: Predicate,
    initial_delay: Duration,
    multiplier: f64,
    maximum_delay: Duration,
    total_timeout: Duration,
}

impl Retry {
    /// Creates a configuration that retries the errors accepted by
    /// `predicate`.
    pub fn new<P>(predicate: P) -> Self
    where
        P: Fn(&Error) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            ..Self::default()
        }
    }

    /// Creates a configuration that retries errors with any of the given
    /// codes.
    pub fn if_codes<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = Code>,
    {
        let codes: Vec<Code> = codes.into_iter().collect();
        Self::new(move |e: &Error| codes.contains(&e.code()))
    }

    /// Changes the delay before the first retry.
    pub fn with_initial_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.initial_delay = v.into();
        self
    }

    /// Changes the growth factor for the delay.
    pub fn with_multiplier<V: Into<f64>>(mut self, v: V) -> Self {
        self.multiplier = v.into();
        self
    }

    /// Changes the maximum delay between attempts.
    pub fn with_maximum_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.maximum_delay = v.into();
        self
    }

    /// Changes the total time budget, including all attempts and sleeps.
    pub fn with_total_timeout<V: Into<Duration>>(mut self, v: V) -> Self {
        self.total_timeout = v.into();
        self
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn maximum_delay(&self) -> Duration {
        self.maximum_delay
    }

    pub fn total_timeout(&self) -> Duration {
        self.total_timeout
    }

    /// Returns true if `error` is retryable under this configuration.
    pub fn is_retryable(&self, error: &Error) -> bool {
        (self.predicate)(error)
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_delay(self.initial_delay)
            .with_maximum_delay(self.maximum_delay)
            .with_scaling(self.multiplier)
            .build()
            .unwrap_or_else(|_| {
                ExponentialBackoffBuilder::new()
                    .with_initial_delay(self.initial_delay)
                    .with_maximum_delay(self.maximum_delay)
                    .with_scaling(self.multiplier)
                    .clamp()
            })
    }
}

impl Default for Retry {
    /// Retries `UNAVAILABLE` errors, starting with a 100ms delay, growing by
    /// 1.3x up to 60s, for at most 600s.
    fn default() -> Self {
        Self {
            predicate: Arc::new(|e: &Error| e.code() == Code::Unavailable),
            initial_delay: Duration::from_millis(100),
            multiplier: 1.3,
            maximum_delay: Duration::from_secs(60),
            total_timeout: Duration::from_secs(600),
        }
    }
}

impl std::fmt::Debug for Retry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retry")
            .field("initial_delay", &self.initial_delay)
            .field("multiplier", &self.multiplier)
            .field("maximum_delay", &self.maximum_delay)
            .field("total_timeout", &self.total_timeout)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy for Retry {
    fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
        if error.is_transient_and_before_rpc() {
            return RetryResult::Continue(error);
        }
        // A closed transport never recovers.
        if error.is_closed() || error.is_cancelled() || !self.is_retryable(&error) {
            return RetryResult::Permanent(error);
        }
        if self.remaining_time(state) == Some(Duration::ZERO) {
            return RetryResult::Exhausted(Error::exhausted(error));
        }
        RetryResult::Continue(error)
    }

    fn remaining_time(&self, state: &RetryState) -> Option<Duration> {
        Some(state.remaining(self.total_timeout))
    }
}

impl BackoffPolicy for Retry {
    fn on_failure(&self, _loop_start: Instant, attempt_count: u32) -> Duration {
        self.backoff()
            .delay_with_jitter(attempt_count, &mut rand::rng())
    }
}
