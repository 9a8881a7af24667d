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

//! Defines the trait for polling backoff policies.
//!
//! Long-running operations are polled until completion. Between polls the
//! poller sleeps for a period computed by a polling backoff policy. Unlike
//! retry backoff policies, polling backoff policies do not use jitter: the
//! delay after the n-th poll is `min(initial * multiplier^(n-1), maximum)`.
//!
//! The default policy starts at one second, grows by a factor of 1.5, and
//! never waits more than one minute between polls.
//!
//! # Example
//! ```
//! # use aiplatform_gax::exponential_backoff::Error;
//! # use aiplatform_gax::exponential_backoff::ExponentialBackoffBuilder;
//! # use aiplatform_gax::polling_backoff_policy::PollingBackoffPolicyArg;
//! use std::time::Duration;
//!
//! let policy = ExponentialBackoffBuilder::new()
//!     .with_initial_delay(Duration::from_millis(100))
//!     .with_maximum_delay(Duration::from_secs(5))
//!     .with_scaling(4.0)
//!     .build()?;
//! let arg = PollingBackoffPolicyArg::from(policy);
//! # Ok::<(), Error>(())
//! ```

use crate::exponential_backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Defines the trait implemented by all polling backoff strategies.
pub trait PollingBackoffPolicy: Send + Sync + std::fmt::Debug {
    /// Returns the delay before the next poll.
    ///
    /// # Parameters
    /// * `loop_start` - when the polling loop started.
    /// * `attempt_count` - the number of poll queries. This method is always
    ///   called after the first attempt.
    fn wait_period(&self, loop_start: Instant, attempt_count: u32) -> Duration;
}

/// A helper type to use [PollingBackoffPolicy] in client and request options.
#[derive(Clone, Debug)]
pub struct PollingBackoffPolicyArg(pub(crate) Arc<dyn PollingBackoffPolicy>);

impl<T: PollingBackoffPolicy + 'static> std::convert::From<T> for PollingBackoffPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn PollingBackoffPolicy>> for PollingBackoffPolicyArg {
    fn from(value: Arc<dyn PollingBackoffPolicy>) -> Self {
        Self(value)
    }
}

impl From<PollingBackoffPolicyArg> for Arc<dyn PollingBackoffPolicy> {
    fn from(value: PollingBackoffPolicyArg) -> Self {
        value.0
    }
}

/// The default polling backoff: 1s initial, 1.5x multiplier, 60s maximum.
pub fn default_polling_backoff() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_delay(Duration::from_secs(1))
        .with_maximum_delay(Duration::from_secs(60))
        .with_scaling(1.5)
        .clamp()
}
