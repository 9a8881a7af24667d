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

use crate::Result;
use crate::backoff_policy::BackoffPolicy;
use crate::error::Error;
use crate::options::RequestOptions;
use crate::retry_policy::RetryPolicy;
use crate::retry_result::RetryResult;
use crate::retry_state::RetryState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Runs the retry loop for a given function.
///
/// This functions calls an inner function as long as (1) the retry policy has
/// not expired, (2) the inner function has not returned a successful request,
/// (3) the call deadline has not passed, and (4) the call is not cancelled.
///
/// In between calls the function waits the amount of time prescribed by the
/// backoff policy, using `sleep` to implement any sleep. The sleep is bounded
/// by the remaining time in the retry policy and the call deadline.
///
/// Each attempt receives the effective attempt timeout: the minimum of the
/// per-attempt timeout, the time remaining in the retry policy, and the time
/// remaining until the call deadline. Attempts that exceed it fail with a
/// [timeout][Error::timeout] error.
pub async fn retry_loop<F, S, Response>(
    mut inner: F,
    sleep: S,
    idempotent: bool,
    options: &RequestOptions,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
) -> Result<Response>
where
    F: AsyncFnMut(Option<Duration>) -> Result<Response> + Send,
    S: AsyncFn(Duration) -> () + Send,
{
    retry_loop_with_callback(
        async move |timeout, _| inner(timeout).await,
        sleep,
        idempotent,
        options,
        retry_policy,
        backoff_policy,
        |_, _, _| {},
    )
    .await
}

/// Runs the retry loop for a given function with a callback for retries.
///
/// `inner` receives the attempt timeout and the attempt number, starting at
/// 1. The `on_retry` callback is called before sleeping, with the attempt
/// count, the error, and the delay.
pub async fn retry_loop_with_callback<F, S, OnRetry, Response>(
    mut inner: F,
    sleep: S,
    idempotent: bool,
    options: &RequestOptions,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
    mut on_retry: OnRetry,
) -> Result<Response>
where
    F: AsyncFnMut(Option<Duration>, u32) -> Result<Response> + Send,
    S: AsyncFn(Duration) -> () + Send,
    OnRetry: FnMut(u32, &Error, Duration) + Send,
{
    let loop_start = now();
    let deadline = *options.deadline();
    let cancel = options.cancellation_token().clone();
    let mut attempt_count = 0_u32;
    // (backoff delay, previous error)
    let mut pending: Option<(Duration, Error)> = None;
    loop {
        let state = RetryState::new(idempotent)
            .set_start(loop_start)
            .set_attempt_count(attempt_count);

        if let Some((delay, prev_error)) = pending.take() {
            let delay = match remaining_budget(retry_policy.as_ref(), &state, deadline) {
                Some(r) if r.is_zero() => return Err(Error::exhausted(prev_error)),
                Some(r) => std::cmp::min(r, delay),
                None => delay,
            };
            on_retry(attempt_count, &prev_error, delay);
            tokio::select! {
                biased;
                _ = cancelled(cancel.as_ref()) => return Err(Error::cancelled(prev_error)),
                _ = sleep(delay) => {},
            }
            if remaining_budget(retry_policy.as_ref(), &state, deadline)
                .is_some_and(|r| r.is_zero())
            {
                return Err(Error::exhausted(prev_error));
            }
        } else if deadline.is_some_and(|d| d <= now()) {
            return Err(Error::timeout(DeadlineExpired));
        }

        if cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(Error::cancelled(CallCancelled));
        }

        let timeout = effective_timeout(
            options,
            remaining_budget(retry_policy.as_ref(), &state, deadline),
        );
        attempt_count += 1;
        match attempt(&mut inner, timeout, attempt_count, cancel.as_ref()).await {
            Ok(r) => return Ok(r),
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                let state = state.set_attempt_count(attempt_count);
                match retry_policy.on_error(&state, e) {
                    RetryResult::Permanent(e) | RetryResult::Exhausted(e) => return Err(e),
                    RetryResult::Continue(e) => {
                        let delay = backoff_policy.on_failure(loop_start, attempt_count);
                        pending = Some((delay, e));
                    }
                }
            }
        }
    }
}

async fn attempt<F, Response>(
    inner: &mut F,
    timeout: Option<Duration>,
    attempt_count: u32,
    cancel: Option<&CancellationToken>,
) -> Result<Response>
where
    F: AsyncFnMut(Option<Duration>, u32) -> Result<Response>,
{
    let call = async {
        match timeout {
            None => inner(None, attempt_count).await,
            Some(t) => match tokio::time::timeout(t, inner(Some(t), attempt_count)).await {
                Ok(r) => r,
                Err(_) => Err(Error::timeout(AttemptTimeout(t))),
            },
        }
    };
    tokio::select! {
        biased;
        _ = cancelled(cancel) => Err(Error::cancelled(CallCancelled)),
        r = call => r,
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(t) => t.cancelled().await,
        None => std::future::pending().await,
    }
}

fn remaining_budget(
    retry_policy: &dyn RetryPolicy,
    state: &RetryState,
    deadline: Option<Instant>,
) -> Option<Duration> {
    let until_deadline = deadline.map(|d| d.saturating_duration_since(now()));
    match (retry_policy.remaining_time(state), until_deadline) {
        (None, r) | (r, None) => r,
        (Some(a), Some(b)) => Some(std::cmp::min(a, b)),
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// A helper to compute the timeout for an attempt, given the attempt
/// timeout and the time remaining in the call.
pub fn effective_timeout(
    options: &RequestOptions,
    remaining_time: Option<Duration>,
) -> Option<Duration> {
    match (options.attempt_timeout(), remaining_time) {
        (None, None) => None,
        (None, Some(t)) => Some(t),
        (Some(t), None) => Some(*t),
        (Some(a), Some(r)) => Some(*std::cmp::min(a, &r)),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("the attempt exceeded its timeout of {0:?}")]
struct AttemptTimeout(Duration);

#[derive(Debug, thiserror::Error)]
#[error("the call deadline expired before the first attempt")]
struct DeadlineExpired;

#[derive(Debug, thiserror::Error)]
#[error("the call was cancelled by the application")]
struct CallCancelled;
