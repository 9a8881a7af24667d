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

use crate::clock::{Clock, TokioClock};
use crate::model::{CancelOperationRequest, GetOperationRequest, Operation, operation};
use crate::operations::Operations;
use gax::Result;
use gax::error::Error;
use gax::error::rpc::Code;
use gax::options::RequestOptions;
use gax::polling_backoff_policy::{PollingBackoffPolicy, default_polling_backoff};
use gax::polling_error_policy::{Aip194Strict, PollingErrorPolicy};
use gax::retry_result::RetryResult;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wkt::message::Message;

/// The result of polling a long-running operation.
///
/// # Parameters
/// * `R` - the response type. This is the type returned when the LRO completes
///   successfully.
/// * `M` - the metadata type. While operations are in progress the LRO may
///   return values of this type.
#[derive(Debug)]
pub enum PollingResult<R, M> {
    /// The operation is still in progress.
    InProgress(Option<M>),
    /// The operation completed. This includes the result.
    Completed(Result<R>),
    /// An error trying to poll the LRO.
    ///
    /// Not all errors indicate that the operation failed. For example, this
    /// may fail because it was not possible to connect to the service. Such
    /// transient errors may disappear in the next polling attempt. The
    /// polling error policy decides which errors are reported this way, and
    /// which ones complete the stream.
    PollingError(Error),
}

/// The lifecycle of a long-running operation, as last observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationState {
    /// The operation has not completed.
    Pending,
    /// The operation completed with a response.
    Succeeded,
    /// The operation completed with an error, or without the response its
    /// result type requires.
    Failed,
    /// The operation completed with a `CANCELLED` error.
    Cancelled,
}

/// A typed handle to a long-running operation.
///
/// Created by client methods that start long-running operations. The
/// response type `R` and metadata type `M` are declared by each method.
///
/// Once the handle observes `done == true` it never changes again, and no
/// further RPCs are made to poll it.
pub struct OperationFuture<R, M> {
    operation: Operation,
    operations: Arc<dyn Operations>,
    options: RequestOptions,
    error_policy: Arc<dyn PollingErrorPolicy>,
    backoff_policy: Arc<dyn PollingBackoffPolicy>,
    clock: Arc<dyn Clock>,
    _types: PhantomData<fn() -> (R, M)>,
}

impl<R, M> OperationFuture<R, M>
where
    R: Message,
    M: Message,
{
    /// Creates a new handle.
    ///
    /// # Parameters
    /// * `operation` - the operation returned by the initiating RPC.
    /// * `operations` - the sub-client used to poll and cancel.
    /// * `options` - the options used in each poll. The polling policies in
    ///   these options, if any, override the defaults.
    pub fn new(
        operation: Operation,
        operations: Arc<dyn Operations>,
        options: RequestOptions,
    ) -> Self {
        let error_policy = options
            .polling_error_policy()
            .clone()
            .unwrap_or_else(|| Arc::new(Aip194Strict));
        let backoff_policy = options
            .polling_backoff_policy()
            .clone()
            .unwrap_or_else(|| Arc::new(default_polling_backoff()));
        Self {
            operation,
            operations,
            options,
            error_policy,
            backoff_policy,
            clock: Arc::new(TokioClock),
            _types: PhantomData,
        }
    }

    /// Replaces the clock used to sleep between polls.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the polling error policy.
    pub fn with_polling_error_policy<P: Into<gax::polling_error_policy::PollingErrorPolicyArg>>(
        mut self,
        v: P,
    ) -> Self {
        self.error_policy = v.into().into();
        self
    }

    /// Replaces the polling backoff policy.
    pub fn with_polling_backoff_policy<
        P: Into<gax::polling_backoff_policy::PollingBackoffPolicyArg>,
    >(
        mut self,
        v: P,
    ) -> Self {
        self.backoff_policy = v.into().into();
        self
    }

    /// The name of the operation.
    pub fn name(&self) -> &str {
        &self.operation.name
    }

    /// The most recent state of the raw operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Returns `true` if the operation has completed, successfully or not.
    ///
    /// This does not make any RPCs.
    pub fn done(&self) -> bool {
        self.operation.done
    }

    /// The current lifecycle state.
    pub fn state(&self) -> OperationState {
        if !self.operation.done {
            return OperationState::Pending;
        }
        match &self.operation.result {
            Some(operation::Result::Error(s)) if Code::from(s.code) == Code::Cancelled => {
                OperationState::Cancelled
            }
            Some(operation::Result::Error(_)) => OperationState::Failed,
            Some(operation::Result::Response(_)) => OperationState::Succeeded,
            None if Self::empty_result() => OperationState::Succeeded,
            None => OperationState::Failed,
        }
    }

    /// Decodes the metadata in the most recent state of the operation.
    ///
    /// Metadata is often partial, or missing, before the operation completes.
    pub fn metadata(&self) -> Result<Option<M>> {
        self.operation
            .metadata
            .as_ref()
            .map(|any| any.to_msg::<M>())
            .transpose()
            .map_err(Error::deser)
    }

    /// Refreshes the state of the operation, returns `true` if it is done.
    ///
    /// Completed operations are not polled again.
    pub async fn poll(&mut self) -> Result<bool> {
        if self.operation.done {
            return Ok(true);
        }
        let request = GetOperationRequest::default().set_name(&self.operation.name);
        let updated = self
            .operations
            .get_operation(request, self.options.clone())
            .await?;
        self.update(updated);
        Ok(self.operation.done)
    }

    /// Polls until the operation completes and returns its outcome.
    ///
    /// Sleeps between polls as determined by the polling backoff policy.
    /// Errors while polling are handled by the polling error policy.
    ///
    /// If `deadline` elapses first, returns an error with code
    /// `DEADLINE_EXCEEDED` and leaves the handle unchanged, the application
    /// may call `result()` again.
    ///
    /// Completed operations return the same outcome on every call. An
    /// operation that failed returns the server's status as a service error.
    pub async fn result(&mut self, deadline: Option<Duration>) -> Result<R> {
        let loop_start = self.clock.now();
        let expiry = deadline.map(|d| loop_start + d);
        let mut attempt_count = 0_u32;
        while !self.operation.done {
            attempt_count += 1;
            let delay = self.backoff_policy.wait_period(loop_start, attempt_count);
            self.sleep_before_poll(delay, expiry).await?;
            match self.poll_until(expiry).await? {
                Ok(true) => break,
                Ok(false) => {
                    if let Some(e) = self.error_policy.on_in_progress(
                        loop_start,
                        attempt_count,
                        &self.operation.name,
                    ) {
                        return Err(e);
                    }
                }
                Err(e) => match self.error_policy.on_error(loop_start, attempt_count, e) {
                    RetryResult::Continue(e) => {
                        tracing::debug!(
                            operation = %self.operation.name,
                            attempt_count,
                            "continue polling after error: {e}"
                        );
                    }
                    RetryResult::Permanent(e) | RetryResult::Exhausted(e) => return Err(e),
                },
            }
        }
        self.outcome()
    }

    /// Requests server-side cancellation of the operation.
    ///
    /// The handle is not modified. The cancellation, if any, is observed by
    /// later polls, as a completed operation with a `CANCELLED` error.
    pub async fn cancel(&self) -> Result<()> {
        let request = CancelOperationRequest::default().set_name(&self.operation.name);
        self.operations
            .cancel_operation(request, self.options.clone())
            .await
    }

    /// Converts the handle into a stream of polling results.
    ///
    /// The first item reflects the current state, without making any RPCs.
    /// The stream ends after the first [PollingResult::Completed] item.
    pub fn into_stream(self) -> impl futures::Stream<Item = PollingResult<R, M>> + Send + 'static {
        futures::stream::unfold(StreamState::Initial(self), |state| async move {
            match state {
                StreamState::Done => None,
                StreamState::Initial(f) => {
                    if f.done() {
                        return Some((PollingResult::Completed(f.outcome()), StreamState::Done));
                    }
                    let start = f.clock.now();
                    let metadata = f.metadata().ok().flatten();
                    Some((
                        PollingResult::InProgress(metadata),
                        StreamState::Polling(f, start, 1),
                    ))
                }
                StreamState::Polling(mut f, start, attempt_count) => {
                    f.clock
                        .sleep(f.backoff_policy.wait_period(start, attempt_count))
                        .await;
                    match f.poll().await {
                        Ok(true) => {
                            Some((PollingResult::Completed(f.outcome()), StreamState::Done))
                        }
                        Ok(false) => match f.error_policy.on_in_progress(
                            start,
                            attempt_count,
                            &f.operation.name,
                        ) {
                            Some(e) => Some((PollingResult::Completed(Err(e)), StreamState::Done)),
                            None => {
                                let metadata = f.metadata().ok().flatten();
                                Some((
                                    PollingResult::InProgress(metadata),
                                    StreamState::Polling(f, start, attempt_count + 1),
                                ))
                            }
                        },
                        Err(e) => match f.error_policy.on_error(start, attempt_count, e) {
                            RetryResult::Continue(e) => Some((
                                PollingResult::PollingError(e),
                                StreamState::Polling(f, start, attempt_count + 1),
                            )),
                            RetryResult::Permanent(e) | RetryResult::Exhausted(e) => {
                                Some((PollingResult::Completed(Err(e)), StreamState::Done))
                            }
                        },
                    }
                }
            }
        })
    }

    fn update(&mut self, mut updated: Operation) {
        if updated.name.is_empty() {
            updated.name = self.operation.name.clone();
        }
        tracing::debug!(operation = %updated.name, done = updated.done, "polled operation");
        self.operation = updated;
    }

    fn outcome(&self) -> Result<R> {
        match &self.operation.result {
            Some(operation::Result::Response(any)) => any.to_msg::<R>().map_err(Error::deser),
            Some(operation::Result::Error(status)) => Err(Error::service(status.into())),
            None if Self::empty_result() => Ok(R::default()),
            None => Err(Error::deser(MissingResult(self.operation.name.clone()))),
        }
    }

    // Operations returning `Empty` may complete without a response.
    fn empty_result() -> bool {
        R::typename() == wkt::Empty::typename()
    }

    async fn sleep_before_poll(&self, delay: Duration, expiry: Option<Instant>) -> Result<()> {
        if let Some(expiry) = expiry {
            let remaining = expiry.saturating_duration_since(self.clock.now());
            if delay > remaining {
                self.clock.sleep(remaining).await;
                return Err(deadline_exceeded(&self.operation.name));
            }
        }
        self.clock.sleep(delay).await;
        Ok(())
    }

    // The outer error reports the deadline, the inner result is the poll.
    async fn poll_until(&mut self, expiry: Option<Instant>) -> Result<Result<bool>> {
        let Some(expiry) = expiry else {
            return Ok(self.poll().await);
        };
        let name = self.operation.name.clone();
        let clock = self.clock.clone();
        let remaining = expiry.saturating_duration_since(clock.now());
        tokio::select! {
            biased;
            r = self.poll() => Ok(r),
            _ = clock.sleep(remaining) => Err(deadline_exceeded(&name)),
        }
    }
}

impl<R, M> std::fmt::Debug for OperationFuture<R, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationFuture")
            .field("operation", &self.operation)
            .field("error_policy", &self.error_policy)
            .field("backoff_policy", &self.backoff_policy)
            .field("clock", &self.clock)
            .finish()
    }
}

enum StreamState<R, M> {
    Initial(OperationFuture<R, M>),
    Polling(OperationFuture<R, M>, Instant, u32),
    Done,
}

fn deadline_exceeded(name: &str) -> Error {
    Error::timeout(DeadlineReached(name.to_string()))
}

#[derive(Debug)]
struct DeadlineReached(String);

impl std::fmt::Display for DeadlineReached {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deadline reached while waiting for operation {}", self.0)
    }
}

impl std::error::Error for DeadlineReached {}

#[derive(Debug)]
struct MissingResult(String);

impl std::fmt::Display for MissingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation {} is done but has neither response nor error", self.0)
    }
}

impl std::error::Error for MissingResult {}
