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

//! The state of a retry loop, as seen by retry policies.

use std::time::{Duration, Instant};

/// What a retry policy knows about the call being retried.
///
/// The retry loop builds one of these before consulting the policy on each
/// failed attempt.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct RetryState {
    /// The method is safe to repeat.
    ///
    /// The default policies only retry idempotent methods. A policy may
    /// retry other methods when the application knows repeating them is safe.
    pub idempotent: bool,

    /// When the first attempt started.
    pub start: Instant,

    /// Attempts made so far, including the one that just failed.
    pub attempt_count: u32,
}

impl RetryState {
    /// A state for a loop starting now.
    pub fn new(idempotent: bool) -> Self {
        Self {
            idempotent,
            start: now(),
            attempt_count: 0,
        }
    }

    pub fn set_idempotent(mut self, v: bool) -> Self {
        self.idempotent = v;
        self
    }

    pub fn set_start<T: Into<Instant>>(mut self, v: T) -> Self {
        self.start = v.into();
        self
    }

    pub fn set_attempt_count<T: Into<u32>>(mut self, v: T) -> Self {
        self.attempt_count = v.into();
        self
    }

    /// The part of `budget` not yet used by this loop.
    ///
    /// Returns zero once the budget is spent.
    pub fn remaining(&self, budget: Duration) -> Duration {
        (self.start + budget).saturating_duration_since(now())
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new(false)
    }
}

// The tokio clock can be paused and advanced in tests.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn new_state() {
        let state = RetryState::new(true).set_attempt_count(3_u32);
        assert!(state.idempotent);
        assert_eq!(state.attempt_count, 3);
        assert_eq!(state.start, now());

        let state = RetryState::default();
        assert!(!state.idempotent, "{state:?}");
        assert_eq!(state.attempt_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining() {
        let state = RetryState::new(true);
        assert_eq!(state.remaining(Duration::from_secs(5)), Duration::from_secs(5));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(state.remaining(Duration::from_secs(5)), Duration::from_secs(3));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(state.remaining(Duration::from_secs(5)), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn set_start() {
        let earlier = now();
        tokio::time::advance(Duration::from_secs(1)).await;
        let state = RetryState::new(false).set_start(earlier);
        assert_eq!(state.remaining(Duration::from_secs(4)), Duration::from_secs(3));
    }
}
