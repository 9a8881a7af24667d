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

//! The decision a retry or polling policy makes after a failure.
//!
//! Only applications implementing their own policies need these types.

use crate::error::Error;

/// What the loop should do with a failed attempt.
///
/// # Example
///
/// ```
/// # use aiplatform_gax::error::Error;
/// # use aiplatform_gax::retry_policy::RetryPolicy;
/// # use aiplatform_gax::retry_result::RetryResult;
/// # use aiplatform_gax::retry_state::RetryState;
/// // Retries idempotent calls, at most five times.
/// #[derive(Debug)]
/// struct FiveTimes;
/// impl RetryPolicy for FiveTimes {
///     fn on_error(&self, state: &RetryState, error: Error) -> RetryResult {
///         match (state.idempotent, state.attempt_count) {
///             (false, _) => RetryResult::Permanent(error),
///             (true, n) if n >= 5 => RetryResult::Exhausted(error),
///             (true, _) => RetryResult::Continue(error),
///         }
///     }
/// }
/// ```
#[derive(Debug)]
pub enum RetryResult {
    /// Retrying cannot help, return the error.
    Permanent(Error),

    /// The error is transient, but the policy ran out of attempts or time.
    Exhausted(Error),

    /// Sleep and try again.
    Continue(Error),
}

impl RetryResult {
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue(_))
    }

    /// The error behind the decision.
    pub fn error(&self) -> &Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }

    pub fn into_error(self) -> Error {
        match self {
            Self::Permanent(e) | Self::Exhausted(e) | Self::Continue(e) => e,
        }
    }
}
