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

//! Per-call options.
//!
//! While the client defaults are intended to work for most applications, some
//! calls need a different configuration. Applications sometimes change the
//! timeout for a specific call, send additional metadata, or change the retry
//! configuration. The `*Builder` returned by each client method implements the
//! [RequestOptionsBuilder] trait where applications can override the client
//! defaults.
//!
//! # Example
//! ```
//! # use aiplatform_gax::options::RequestOptions;
//! # use aiplatform_gax::retry::Retry;
//! # use aiplatform_gax::error::rpc::Code;
//! use std::time::Duration;
//! let mut options = RequestOptions::default();
//! options.set_attempt_timeout(Duration::from_secs(30));
//! options.set_retry(Retry::if_codes([Code::Unavailable]).with_total_timeout(Duration::from_secs(120)));
//! options.insert_header("x-goog-user-project", "my-billing-project");
//! ```

use crate::backoff_policy::{BackoffPolicy, BackoffPolicyArg};
use crate::metadata::Metadata;
use crate::polling_backoff_policy::{PollingBackoffPolicy, PollingBackoffPolicyArg};
use crate::polling_error_policy::{PollingErrorPolicy, PollingErrorPolicyArg};
use crate::retry::Retry;
use crate::retry_policy::{RetryPolicy, RetryPolicyArg};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// A set of options configuring a single request.
///
/// Applications only use this type directly in mocks, where they may want to
/// verify their application has configured all the right request parameters
/// and options. All other code uses this type indirectly, via the per-request
/// builders.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    idempotent: Option<bool>,
    user_agent: Option<String>,
    attempt_timeout: Option<Duration>,
    deadline: Option<Instant>,
    metadata: Metadata,
    cancellation_token: Option<CancellationToken>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Option<Arc<dyn BackoffPolicy>>,
    polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
    polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
}

impl RequestOptions {
    /// Gets the idempotency.
    pub fn idempotent(&self) -> Option<bool> {
        self.idempotent
    }

    /// Treat the RPC underlying this method as idempotent.
    ///
    /// Retry policies may examine the idempotency and the error details to
    /// decide if the error is retryable. The client libraries provide a
    /// default for each method.
    pub fn set_idempotency(&mut self, value: bool) {
        self.idempotent = Some(value);
    }

    /// Set the idempotency unless it is already set.
    pub(crate) fn set_default_idempotency(&mut self, default: bool) {
        self.idempotent.get_or_insert(default);
    }

    /// Prepends this prefix to the user agent header value.
    pub fn set_user_agent<T: Into<String>>(&mut self, v: T) {
        self.user_agent = Some(v.into());
    }

    /// Gets the current user-agent prefix.
    pub fn user_agent(&self) -> &Option<String> {
        &self.user_agent
    }

    /// Sets the per-attempt timeout.
    ///
    /// This affects the timeout for each attempt. The overall time budget is
    /// set by the retry policy and the call deadline.
    pub fn set_attempt_timeout<T: Into<Duration>>(&mut self, v: T) {
        self.attempt_timeout = Some(v.into());
    }

    /// Gets the current per-attempt timeout.
    pub fn attempt_timeout(&self) -> &Option<Duration> {
        &self.attempt_timeout
    }

    /// Sets an absolute deadline for the call, including all retry attempts.
    pub fn set_deadline<T: Into<Instant>>(&mut self, v: T) {
        self.deadline = Some(v.into());
    }

    /// Gets the current call deadline.
    pub fn deadline(&self) -> &Option<Instant> {
        &self.deadline
    }

    /// Appends a metadata entry sent with the request.
    ///
    /// Entries are sent in the order they are added, before any metadata
    /// generated by the client library.
    pub fn insert_header<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.metadata.push_ascii(key, value);
    }

    /// Appends a binary metadata entry sent with the request.
    pub fn insert_binary_header<K: Into<String>, V: Into<bytes::Bytes>>(&mut self, key: K, value: V) {
        self.metadata.push_binary(key, value);
    }

    /// Gets the caller-supplied metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Sets a token to cancel the call.
    ///
    /// Cancelling the token aborts the attempt in progress and suppresses
    /// further retries. The call fails with [Code::Cancelled].
    ///
    /// [Code::Cancelled]: crate::error::rpc::Code::Cancelled
    pub fn set_cancellation_token(&mut self, v: CancellationToken) {
        self.cancellation_token = Some(v);
    }

    /// Gets the cancellation token, if any.
    pub fn cancellation_token(&self) -> &Option<CancellationToken> {
        &self.cancellation_token
    }

    /// Get the current retry policy override, if any.
    pub fn retry_policy(&self) -> &Option<Arc<dyn RetryPolicy>> {
        &self.retry_policy
    }

    /// Sets the retry policy configuration.
    pub fn set_retry_policy<V: Into<RetryPolicyArg>>(&mut self, v: V) {
        self.retry_policy = Some(v.into().into());
    }

    /// Get the current backoff policy override, if any.
    pub fn backoff_policy(&self) -> &Option<Arc<dyn BackoffPolicy>> {
        &self.backoff_policy
    }

    /// Sets the backoff policy configuration.
    pub fn set_backoff_policy<V: Into<BackoffPolicyArg>>(&mut self, v: V) {
        self.backoff_policy = Some(v.into().into());
    }

    /// Sets both the retry and the backoff policies from a [Retry]
    /// configuration.
    pub fn set_retry(&mut self, v: Retry) {
        self.backoff_policy = Some(Arc::new(v.clone()));
        self.retry_policy = Some(Arc::new(v));
    }

    /// Get the current polling error policy override, if any.
    pub fn polling_error_policy(&self) -> &Option<Arc<dyn PollingErrorPolicy>> {
        &self.polling_error_policy
    }

    /// Sets the polling error policy configuration.
    pub fn set_polling_error_policy<V: Into<PollingErrorPolicyArg>>(&mut self, v: V) {
        self.polling_error_policy = Some(v.into().0);
    }

    /// Get the current polling backoff policy override, if any.
    pub fn polling_backoff_policy(&self) -> &Option<Arc<dyn PollingBackoffPolicy>> {
        &self.polling_backoff_policy
    }

    /// Sets the polling backoff policy configuration.
    pub fn set_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(&mut self, v: V) {
        self.polling_backoff_policy = Some(v.into().0);
    }
}

/// Implementations of this trait provide setters to configure request options.
///
/// The clients provide a builder for each RPC. These builders can be used to
/// set the request parameters, e.g., the name of the resource targeted by the
/// RPC, as well as any options affecting the request, such as additional
/// headers or timeouts.
pub trait RequestOptionsBuilder: internal::RequestBuilder {
    /// If `v` is `true`, treat the RPC underlying this method as idempotent.
    fn with_idempotency(self, v: bool) -> Self;

    /// Set the user agent header.
    fn with_user_agent<V: Into<String>>(self, v: V) -> Self;

    /// Sets the per-attempt timeout.
    fn with_attempt_timeout<V: Into<Duration>>(self, v: V) -> Self;

    /// Sets an absolute deadline for the call.
    fn with_deadline<V: Into<Instant>>(self, v: V) -> Self;

    /// Appends a metadata entry.
    fn with_header<K: Into<String>, V: Into<String>>(self, key: K, value: V) -> Self;

    /// Sets a cancellation token for the call.
    fn with_cancellation_token(self, v: CancellationToken) -> Self;

    /// Sets the retry policy configuration.
    fn with_retry_policy<V: Into<RetryPolicyArg>>(self, v: V) -> Self;

    /// Sets the backoff policy configuration.
    fn with_backoff_policy<V: Into<BackoffPolicyArg>>(self, v: V) -> Self;

    /// Sets the retry and backoff policies from a [Retry] configuration.
    fn with_retry(self, v: Retry) -> Self;

    /// Sets the polling error policy configuration.
    fn with_polling_error_policy<V: Into<PollingErrorPolicyArg>>(self, v: V) -> Self;

    /// Sets the polling backoff policy configuration.
    fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(self, v: V) -> Self;
}

pub mod internal {
    //! This module contains implementation details. It is not part of the
    //! public API. Types and functions in this module may be changed or removed
    //! without warnings. Applications should not use any types contained
    //! within.
    use super::RequestOptions;

    /// Simplify implementation of the [super::RequestOptionsBuilder] trait in
    /// the generated clients.
    pub trait RequestBuilder {
        fn request_options(&mut self) -> &mut RequestOptions;
    }

    pub fn set_default_idempotency(mut options: RequestOptions, default: bool) -> RequestOptions {
        options.set_default_idempotency(default);
        options
    }
}

impl<T> RequestOptionsBuilder for T
where
    T: internal::RequestBuilder,
{
    fn with_idempotency(mut self, v: bool) -> Self {
        self.request_options().set_idempotency(v);
        self
    }

    fn with_user_agent<V: Into<String>>(mut self, v: V) -> Self {
        self.request_options().set_user_agent(v);
        self
    }

    fn with_attempt_timeout<V: Into<Duration>>(mut self, v: V) -> Self {
        self.request_options().set_attempt_timeout(v);
        self
    }

    fn with_deadline<V: Into<Instant>>(mut self, v: V) -> Self {
        self.request_options().set_deadline(v);
        self
    }

    fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.request_options().insert_header(key, value);
        self
    }

    fn with_cancellation_token(mut self, v: CancellationToken) -> Self {
        self.request_options().set_cancellation_token(v);
        self
    }

    fn with_retry_policy<V: Into<RetryPolicyArg>>(mut self, v: V) -> Self {
        self.request_options().set_retry_policy(v);
        self
    }

    fn with_backoff_policy<V: Into<BackoffPolicyArg>>(mut self, v: V) -> Self {
        self.request_options().set_backoff_policy(v);
        self
    }

    fn with_retry(mut self, v: Retry) -> Self {
        self.request_options().set_retry(v);
        self
    }

    fn with_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.request_options().set_polling_error_policy(v);
        self
    }

    fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.request_options().set_polling_backoff_policy(v);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::internal::*;
    use super::*;
    use crate::exponential_backoff::ExponentialBackoffBuilder;
    use crate::polling_error_policy;
    use crate::retry_policy::LimitedAttemptCount;
    use crate::metadata::MetadataValue;

    #[derive(Debug, Default)]
    struct TestBuilder {
        request_options: RequestOptions,
    }
    impl RequestBuilder for TestBuilder {
        fn request_options(&mut self) -> &mut RequestOptions {
            &mut self.request_options
        }
    }

    #[test]
    fn request_options() {
        let mut opts = RequestOptions::default();

        assert_eq!(opts.idempotent, None);
        opts.set_idempotency(true);
        assert_eq!(opts.idempotent(), Some(true));

        opts.set_user_agent("test-only");
        assert_eq!(opts.user_agent().as_deref(), Some("test-only"));
        assert_eq!(opts.attempt_timeout(), &None);

        let d = Duration::from_secs(123);
        opts.set_attempt_timeout(d);
        assert_eq!(opts.attempt_timeout(), &Some(d));

        let deadline = Instant::now() + d;
        opts.set_deadline(deadline);
        assert_eq!(opts.deadline(), &Some(deadline));

        opts.insert_header("x-a", "1");
        opts.insert_binary_header("x-b", vec![1_u8]);
        let keys: Vec<_> = opts.metadata().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["x-a", "x-b-bin"]);

        opts.set_retry_policy(LimitedAttemptCount::new(3));
        assert!(opts.retry_policy().is_some(), "{opts:?}");

        opts.set_backoff_policy(ExponentialBackoffBuilder::new().clamp());
        assert!(opts.backoff_policy().is_some(), "{opts:?}");

        opts.set_polling_error_policy(polling_error_policy::Aip194Strict);
        assert!(opts.polling_error_policy().is_some(), "{opts:?}");

        opts.set_polling_backoff_policy(ExponentialBackoffBuilder::new().clamp());
        assert!(opts.polling_backoff_policy().is_some(), "{opts:?}");

        let token = CancellationToken::new();
        opts.set_cancellation_token(token.clone());
        token.cancel();
        assert!(
            opts.cancellation_token()
                .as_ref()
                .is_some_and(|t| t.is_cancelled())
        );
    }

    #[test]
    fn set_retry() {
        let mut opts = RequestOptions::default();
        opts.set_retry(Retry::default());
        assert!(opts.retry_policy().is_some(), "{opts:?}");
        assert!(opts.backoff_policy().is_some(), "{opts:?}");
    }

    #[test]
    fn request_options_idempotency() {
        let opts = set_default_idempotency(RequestOptions::default(), true);
        assert_eq!(opts.idempotent(), Some(true));
        let opts = set_default_idempotency(opts, false);
        assert_eq!(opts.idempotent(), Some(true));

        let opts = set_default_idempotency(RequestOptions::default(), false);
        assert_eq!(opts.idempotent(), Some(false));
    }

    #[test]
    fn request_options_builder() -> anyhow::Result<()> {
        let mut builder = TestBuilder::default();
        assert_eq!(builder.request_options().user_agent(), &None);

        let mut builder = TestBuilder::default()
            .with_idempotency(true)
            .with_user_agent("test-only")
            .with_attempt_timeout(Duration::from_secs(5))
            .with_header("x-goog-user-project", "p")
            .with_deadline(Instant::now())
            .with_cancellation_token(CancellationToken::new());
        let opts = builder.request_options();
        assert_eq!(opts.idempotent(), Some(true));
        assert_eq!(opts.user_agent().as_deref(), Some("test-only"));
        assert_eq!(opts.attempt_timeout(), &Some(Duration::from_secs(5)));
        assert_eq!(
            opts.metadata().get("x-goog-user-project"),
            Some(&MetadataValue::Ascii("p".to_string()))
        );
        assert!(opts.deadline().is_some());
        assert!(opts.cancellation_token().is_some());

        let mut builder = TestBuilder::default()
            .with_retry_policy(LimitedAttemptCount::new(3))
            .with_backoff_policy(ExponentialBackoffBuilder::new().build()?)
            .with_polling_error_policy(polling_error_policy::Aip194Strict)
            .with_polling_backoff_policy(ExponentialBackoffBuilder::new().build()?);
        let opts = builder.request_options();
        assert!(opts.retry_policy().is_some(), "{opts:?}");
        assert!(opts.backoff_policy().is_some(), "{opts:?}");
        assert!(opts.polling_error_policy().is_some(), "{opts:?}");
        assert!(opts.polling_backoff_policy().is_some(), "{opts:?}");

        let mut builder = TestBuilder::default().with_retry(Retry::default());
        assert!(builder.request_options().retry_policy().is_some());
        Ok(())
    }
}
