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

//! Provide types for client construction.
//!
//! Some applications need to construct clients with custom configuration, for
//! example, they may need to override the endpoint, the authentication
//! credentials, or the transport. The clients use a generic builder type to
//! provide such functionality. The types in this module implement the client
//! builders.
//!
//! Applications should not create builders directly, instead each client type
//! defines a `builder()` function to obtain the correct type of builder.
//!
//! ## Example: create a client with the default configuration.
//!
//! ```
//! # use aiplatform_gax::client_builder::examples;
//! # use aiplatform_gax::client_builder::Result;
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! pub use examples::Client; // Placeholder for examples
//! let client = Client::builder().build().await?;
//! # Result::<()>::Ok(()) });
//! ```
//!
//! ## Example: create a client with a different endpoint
//!
//! ```
//! # use aiplatform_gax::client_builder::examples;
//! # use aiplatform_gax::client_builder::Result;
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! pub use examples::Client; // Placeholder for examples
//! let client = Client::builder()
//!     .with_endpoint("https://us-central1-aiplatform.googleapis.com")
//!     .build().await?;
//! # Result::<()>::Ok(()) });
//! ```

use crate::backoff_policy::BackoffPolicyArg;
use crate::client_cert::ClientCert;
use crate::client_config::ChannelOptions;
use crate::interceptor::Interceptor;
use crate::polling_backoff_policy::PollingBackoffPolicyArg;
use crate::polling_error_policy::PollingErrorPolicyArg;
use crate::retry::Retry;
use crate::retry_policy::RetryPolicyArg;
use std::sync::Arc;

/// The result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Indicates a problem while constructing a client.
///
/// # Examples
/// ```no_run
/// # use aiplatform_gax::client_builder::examples;
/// use aiplatform_gax::client_builder::Error as Error;
/// use examples::Client; // Placeholder for examples
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let client = match Client::builder().build().await {
///     Ok(c) => c,
///     Err(e) if e.is_mutual_tls() => {
///         println!("cannot load the client certificate: {e}");
///         return Err(e);
///     }
///     Err(e) => {
///         println!("error during client initialization {e}");
///         return Err(e);
///     }
/// };
/// # Ok::<(), Error>(()) });
/// ```
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// If true, the client could not initialize the default credentials.
    pub fn is_default_credentials(&self) -> bool {
        matches!(&self.0, ErrorKind::DefaultCredentials(_))
    }

    /// If true, the client could not initialize the transport client.
    pub fn is_transport(&self) -> bool {
        matches!(&self.0, ErrorKind::Transport(_))
    }

    /// If true, the client could not create a mutual TLS channel.
    ///
    /// This includes failures loading the client certificate.
    pub fn is_mutual_tls(&self) -> bool {
        matches!(&self.0, ErrorKind::MutualTls(_))
    }

    /// If true, the configuration is invalid.
    ///
    /// For example, an unknown transport label, or an invalid value in one of
    /// the environment variables used by the client.
    pub fn is_configuration(&self) -> bool {
        matches!(&self.0, ErrorKind::Configuration(_))
    }

    /// Not part of the public API, subject to change without notice.
    #[doc(hidden)]
    pub fn cred<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::DefaultCredentials(source.into()))
    }

    /// Not part of the public API, subject to change without notice.
    #[doc(hidden)]
    pub fn transport<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Transport(source.into()))
    }

    /// Not part of the public API, subject to change without notice.
    #[doc(hidden)]
    pub fn mtls<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::MutualTls(source.into()))
    }

    /// Not part of the public API, subject to change without notice.
    #[doc(hidden)]
    pub fn configuration<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Configuration(source.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("could not create default credentials")]
    DefaultCredentials(#[source] BoxError),
    #[error("could not initialize transport client")]
    Transport(#[source] BoxError),
    #[error("could not create the mutual TLS channel")]
    MutualTls(#[source] BoxError),
    #[error("invalid client configuration")]
    Configuration(#[source] BoxError),
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A generic builder for clients.
///
/// Each client type defines a `builder()` function returning a
/// `ClientBuilder` with the right generic types. Configure the client with
/// the `with_*()` functions and then call `.build()`:
/// ```
/// # use aiplatform_gax::client_builder::examples;
/// # use aiplatform_gax::client_builder::Result;
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// use examples::Client; // Placeholder for examples
/// let client = Client::builder()
///     .with_transport("rest")
///     .with_tracing()
///     .build().await?;
/// # Result::<()>::Ok(()) });
/// ```
#[derive(Clone, Debug)]
pub struct ClientBuilder<F, Cr> {
    config: internal::ClientConfig<Cr>,
    factory: F,
}

impl<F, Cr> ClientBuilder<F, Cr> {
    /// Creates a new client.
    pub async fn build<C>(self) -> Result<C>
    where
        F: internal::ClientFactory<Client = C, Credentials = Cr>,
    {
        self.factory.build(self.config).await
    }

    /// Sets the endpoint.
    ///
    /// An explicit endpoint overrides the mTLS endpoint selection.
    pub fn with_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.config.endpoint = Some(v.into());
        self
    }

    /// Enables tracing.
    ///
    /// The clients can be dynamically instrumented with the Tokio [tracing]
    /// framework. Setting this flag enables request and response payload
    /// logging at the `DEBUG` level.
    ///
    /// [tracing]: https://docs.rs/tracing/latest/tracing/
    pub fn with_tracing(mut self) -> Self {
        self.config.tracing = true;
        self
    }

    /// Configure the authentication credentials.
    ///
    /// ```
    /// # use aiplatform_gax::client_builder::examples;
    /// # use aiplatform_gax::client_builder::Result;
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// use examples::Client; // Placeholder for examples
    /// use examples::credentials;
    /// let client = Client::builder()
    ///     .with_credentials(credentials::Builder::new().build())
    ///     .build().await?;
    /// # Result::<()>::Ok(()) });
    /// ```
    pub fn with_credentials<T: Into<Cr>>(mut self, v: T) -> Self {
        self.config.cred = Some(v.into());
        self
    }

    /// Configure the OAuth2 scopes requested with the credentials.
    ///
    /// The default is the `cloud-platform` scope.
    pub fn with_scopes<I, V>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.config.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Selects the transport by label.
    ///
    /// The `grpc` and `rest` transports are always available. Without a
    /// label the client uses the first registered transport.
    pub fn with_transport<V: Into<String>>(mut self, label: V) -> Self {
        self.config.transport = Some(label.into());
        self
    }

    /// Configure the retry policy.
    ///
    /// ```
    /// # use aiplatform_gax::client_builder::examples;
    /// # use aiplatform_gax as gax;
    /// # use aiplatform_gax::client_builder::Result;
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// use examples::Client; // Placeholder for examples
    /// use gax::retry_policy::{AlwaysRetry, RetryPolicyExt};
    /// let client = Client::builder()
    ///     .with_retry_policy(AlwaysRetry.with_attempt_limit(3))
    ///     .build().await?;
    /// # Result::<()>::Ok(()) });
    /// ```
    pub fn with_retry_policy<V: Into<RetryPolicyArg>>(mut self, v: V) -> Self {
        self.config.retry_policy = Some(v.into().into());
        self
    }

    /// Configure the retry backoff policy.
    pub fn with_backoff_policy<V: Into<BackoffPolicyArg>>(mut self, v: V) -> Self {
        self.config.backoff_policy = Some(v.into().into());
        self
    }

    /// Configure the retry predicate, backoff, and total timeout in one value.
    ///
    /// ```
    /// # use aiplatform_gax::client_builder::examples;
    /// # use aiplatform_gax as gax;
    /// # use aiplatform_gax::client_builder::Result;
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// use examples::Client; // Placeholder for examples
    /// use gax::error::rpc::Code;
    /// use gax::retry::Retry;
    /// use std::time::Duration;
    /// let retry = Retry::if_codes([Code::Unavailable, Code::ResourceExhausted])
    ///     .with_initial_delay(Duration::from_millis(100))
    ///     .with_total_timeout(Duration::from_secs(30));
    /// let client = Client::builder().with_retry(retry).build().await?;
    /// # Result::<()>::Ok(()) });
    /// ```
    pub fn with_retry(mut self, v: Retry) -> Self {
        let policy = Arc::new(v);
        self.config.retry_policy = Some(policy.clone());
        self.config.backoff_policy = Some(policy);
        self
    }

    /// Configure the polling error policy.
    ///
    /// Some clients support long-running operations, the polling error policy
    /// controls which polling errors are treated as recoverable, and may limit
    /// the number of attempts and/or the total time polling the operation.
    pub fn with_polling_error_policy<V: Into<PollingErrorPolicyArg>>(mut self, v: V) -> Self {
        self.config.polling_error_policy = Some(v.into().0);
        self
    }

    /// Configure the polling backoff policy.
    ///
    /// The polling backoff policy controls how long the client waits between
    /// polling attempts.
    pub fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.config.polling_backoff_policy = Some(v.into().0);
        self
    }

    /// Configure the client certificate source for mutual TLS.
    pub fn with_client_cert_source<V: Into<ClientCert>>(mut self, v: V) -> Self {
        self.config.client_cert_source = Some(v.into());
        self
    }

    /// Configure per-channel options, such as message size limits.
    pub fn with_channel_options(mut self, v: ChannelOptions) -> Self {
        self.config.channel_options = v;
        self
    }

    /// Appends an interceptor to the client's chain.
    ///
    /// Interceptors run in the order they are added.
    pub fn with_interceptor<V: Interceptor + 'static>(mut self, v: V) -> Self {
        self.config.interceptors.push(Arc::new(v));
        self
    }
}

#[doc(hidden)]
pub mod internal {
    use super::*;
    pub use crate::client_config::ClientConfig;

    pub trait ClientFactory {
        type Client;
        type Credentials;
        fn build(
            self,
            config: ClientConfig<Self::Credentials>,
        ) -> impl Future<Output = Result<Self::Client>>;
    }

    pub fn new_builder<F, Cr, C>(factory: F) -> super::ClientBuilder<F, Cr>
    where
        F: ClientFactory<Client = C, Credentials = Cr>,
    {
        super::ClientBuilder {
            factory,
            config: ClientConfig::default(),
        }
    }
}

#[doc(hidden)]
pub mod examples {
    //! This module contains helper types used in the rustdoc examples.
    //!
    //! The examples require relatively complex types to be useful.

    type Config = super::internal::ClientConfig<Credentials>;
    use super::Result;

    /// A client type for use in examples.
    ///
    /// This type is used in examples as a placeholder for a real client. It
    /// does not work, but illustrates how to use `ClientBuilder`.
    #[allow(dead_code)]
    pub struct Client(Config);
    impl Client {
        /// Create a builder to initialize new instances of this client.
        pub fn builder() -> client::Builder {
            super::internal::new_builder(client::Factory)
        }

        async fn new(config: Config) -> Result<Self> {
            Ok(Self(config))
        }
    }
    mod client {
        pub type Builder = super::super::ClientBuilder<Factory, super::Credentials>;
        pub struct Factory;
        impl super::super::internal::ClientFactory for Factory {
            type Credentials = super::Credentials;
            type Client = super::Client;
            async fn build(self, config: super::Config) -> super::Result<Self::Client> {
                Self::Client::new(config).await
            }
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Credentials {
        pub tag: String,
    }

    pub mod credentials {
        #[derive(Clone, Default)]
        pub struct Builder(super::Credentials);
        impl Builder {
            pub fn new() -> Self {
                Self(super::Credentials::default())
            }
            pub fn build(self) -> super::Credentials {
                self.0
            }
            pub fn tag<V: Into<String>>(mut self, v: V) -> Self {
                self.0.tag = v.into();
                self
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, thiserror::Error)]
    #[error("test-only")]
    struct TestError;

    #[test]
    fn error_credentials() {
        let error = Error::cred(TestError);
        assert!(error.is_default_credentials(), "{error:?}");
        assert!(error.to_string().contains("default credentials"), "{error}");
        let got = error.source().and_then(|e| e.downcast_ref::<TestError>());
        assert!(got.is_some(), "{error:?}");
    }

    #[test]
    fn transport() {
        let error = Error::transport(TestError);
        assert!(error.is_transport(), "{error:?}");
        assert!(error.to_string().contains("transport client"), "{error}");
        assert!(!error.is_mutual_tls(), "{error:?}");
    }

    #[test]
    fn mtls() {
        let error = Error::mtls(TestError);
        assert!(error.is_mutual_tls(), "{error:?}");
        assert!(error.to_string().contains("mutual TLS"), "{error}");
    }

    #[test]
    fn configuration() {
        let error = Error::configuration(TestError);
        assert!(error.is_configuration(), "{error:?}");
        assert!(!error.is_default_credentials(), "{error:?}");
        let got = error.source().and_then(|e| e.downcast_ref::<TestError>());
        assert!(got.is_some(), "{error:?}");
    }
}
