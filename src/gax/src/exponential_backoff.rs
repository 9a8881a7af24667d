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

//! Truncated exponential backoff.
//!
//! [ExponentialBackoff] implements both [BackoffPolicy] and
//! [PollingBackoffPolicy]. As a retry backoff policy it applies full jitter,
//! the delay after the n-th failure is drawn uniformly from
//! `[0, min(initial * scaling^(n-1), maximum)]`. As a polling backoff policy
//! the delay is deterministic: long-running operations are polled at
//! `min(initial * scaling^(n-1), maximum)`.
//!
//! [BackoffPolicy]: crate::backoff_policy::BackoffPolicy
//! [PollingBackoffPolicy]: crate::polling_backoff_policy::PollingBackoffPolicy

use std::time::{Duration, Instant};

const DEFAULT_INITIAL: Duration = Duration::from_secs(1);
const DEFAULT_MAXIMUM: Duration = Duration::from_secs(60);
const DEFAULT_SCALING: f64 = 2.0;

/// The error type for exponential backoff creation.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("the scaling value ({0}) should be >= 1.0")]
    InvalidScalingFactor(f64),
    #[error("the initial delay ({0:?}) should be greater than zero")]
    InvalidInitialDelay(Duration),
    #[error("the maximum delay ({maximum:?}) is smaller than the initial delay ({initial:?})")]
    EmptyRange {
        maximum: Duration,
        initial: Duration,
    },
}

/// Builds [ExponentialBackoff] policies.
#[derive(Clone, Debug)]
pub struct ExponentialBackoffBuilder {
    params: ExponentialBackoff,
}

impl ExponentialBackoffBuilder {
    /// Starts from one second initial delay, one minute maximum delay, and a
    /// scaling factor of 2.0.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::exponential_backoff::Error;
    /// # use aiplatform_gax::exponential_backoff::ExponentialBackoffBuilder;
    /// use std::time::Duration;
    ///
    /// let policy = ExponentialBackoffBuilder::new()
    ///     .with_initial_delay(Duration::from_millis(100))
    ///     .with_maximum_delay(Duration::from_secs(5))
    ///     .with_scaling(4.0)
    ///     .build()?;
    /// # Ok::<(), Error>(())
    /// ```
    pub fn new() -> Self {
        Self {
            params: ExponentialBackoff::default(),
        }
    }

    /// Sets the delay after the first attempt.
    pub fn with_initial_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.params.initial = v.into();
        self
    }

    /// Sets the upper bound for any delay.
    pub fn with_maximum_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.params.maximum = v.into();
        self
    }

    /// Sets the growth factor between attempts.
    pub fn with_scaling<V: Into<f64>>(mut self, v: V) -> Self {
        self.params.scaling = v.into();
        self
    }

    /// Validates the parameters and returns the policy.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::exponential_backoff::Error;
    /// # use aiplatform_gax::exponential_backoff::ExponentialBackoffBuilder;
    /// # use aiplatform_gax::backoff_policy::BackoffPolicy;
    /// use std::time::{Duration, Instant};
    /// let backoff = ExponentialBackoffBuilder::new()
    ///     .with_initial_delay(Duration::from_secs(5))
    ///     .with_maximum_delay(Duration::from_secs(50))
    ///     .build()?;
    /// assert!(backoff.on_failure(Instant::now(), 1) <= Duration::from_secs(5));
    /// assert!(backoff.on_failure(Instant::now(), 2) <= Duration::from_secs(10));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn build(self) -> Result<ExponentialBackoff, Error> {
        let ExponentialBackoff {
            initial,
            maximum,
            scaling,
        } = self.params;
        if scaling.is_nan() || scaling < 1.0 {
            return Err(Error::InvalidScalingFactor(scaling));
        }
        if initial.is_zero() {
            return Err(Error::InvalidInitialDelay(initial));
        }
        if maximum < initial {
            return Err(Error::EmptyRange { maximum, initial });
        }
        Ok(self.params)
    }

    /// Returns a policy with the parameters forced into recommended ranges.
    ///
    /// The maximum delay is clamped to `[1s, 1d]`, then the initial delay to
    /// `[1ms, maximum]`, and the scaling factor to `[1.0, 32.0]`. A NaN
    /// scaling factor becomes 1.0.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::exponential_backoff::ExponentialBackoffBuilder;
    /// # use aiplatform_gax::backoff_policy::BackoffPolicy;
    /// use std::time::{Duration, Instant};
    /// let backoff = ExponentialBackoffBuilder::new().with_scaling(100.0).clamp();
    /// assert!(backoff.on_failure(Instant::now(), 1) <= Duration::from_secs(1));
    /// ```
    pub fn clamp(self) -> ExponentialBackoff {
        const DAY: Duration = Duration::from_secs(24 * 60 * 60);
        let p = self.params;
        let maximum = p.maximum.clamp(Duration::from_secs(1), DAY);
        let initial = p.initial.clamp(Duration::from_millis(1), maximum);
        let scaling = match p.scaling {
            s if s.is_nan() => 1.0,
            s => s.clamp(1.0, 32.0),
        };
        ExponentialBackoff {
            initial,
            maximum,
            scaling,
        }
    }
}

impl Default for ExponentialBackoffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Implements truncated exponential backoff.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    initial: Duration,
    maximum: Duration,
    scaling: f64,
}

impl ExponentialBackoff {
    pub fn initial_delay(&self) -> Duration {
        self.initial
    }

    pub fn maximum_delay(&self) -> Duration {
        self.maximum
    }

    pub fn scaling(&self) -> f64 {
        self.scaling
    }

    /// The delay, before any jitter, after `attempt_count` attempts.
    pub fn delay(&self, attempt_count: u32) -> Duration {
        let exponent = i32::try_from(attempt_count.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.scaling.powi(exponent);
        let ceiling = self.maximum.div_duration_f64(self.initial);
        // `factor < ceiling` keeps `initial * factor` below `maximum`.
        if factor < ceiling {
            self.initial.mul_f64(factor)
        } else {
            self.maximum
        }
    }

    pub(crate) fn delay_with_jitter(&self, attempt_count: u32, rng: &mut impl rand::Rng) -> Duration {
        rng.random_range(Duration::ZERO..=self.delay(attempt_count))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL,
            maximum: DEFAULT_MAXIMUM,
            scaling: DEFAULT_SCALING,
        }
    }
}

impl crate::polling_backoff_policy::PollingBackoffPolicy for ExponentialBackoff {
    fn wait_period(&self, _loop_start: Instant, attempt_count: u32) -> Duration {
        self.delay(attempt_count)
    }
}

impl crate::backoff_policy::BackoffPolicy for ExponentialBackoff {
    fn on_failure(&self, _loop_start: Instant, attempt_count: u32) -> Duration {
        self.delay_with_jitter(attempt_count, &mut rand::rng())
    }
}
