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

//! The credentials capability used by the transports.
//!
//! Obtaining credentials (service account keys, metadata servers, workload
//! identity federation, and so on) is not part of the client runtime. The
//! transports only need something that produces the authentication headers
//! for each request. Applications inject that capability with
//! [Credentials::from()] on any type implementing [CredentialsProvider].
//!
//! When the application does not provide credentials the client uses
//! [anonymous()] credentials, which send no authentication headers. This is
//! useful with emulators and with local test servers.

use crate::error::CredentialsError;
use http::HeaderMap;
use std::sync::Arc;

/// The default OAuth2 scope for the Vertex AI Platform services.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// The result type for credential operations.
pub type Result<T> = std::result::Result<T, CredentialsError>;

/// A type-erased credentials provider.
///
/// Credentials are shared by all the calls made with a client, they may be
/// used concurrently, and they are cheap to clone.
#[derive(Clone, Debug)]
pub struct Credentials {
    inner: Arc<dyn dynamic::CredentialsProvider>,
}

impl<T> std::convert::From<T> for Credentials
where
    T: CredentialsProvider + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl Credentials {
    /// Returns the headers to authenticate a request.
    ///
    /// The transports call this function before each attempt. Implementations
    /// are expected to cache and refresh any tokens as needed.
    pub async fn headers(&self, scopes: &[String]) -> Result<HeaderMap> {
        self.inner.headers(scopes).await
    }

    /// Returns the universe domain of the credentials, if known.
    pub async fn universe_domain(&self) -> Option<String> {
        self.inner.universe_domain().await
    }
}

/// Produces authentication headers for requests.
///
/// Implement this trait to use custom credentials, or to mock credentials in
/// tests.
///
/// # Example
/// ```
/// # use aiplatform_gax::credentials::{Credentials, CredentialsProvider, Result};
/// # use http::{HeaderMap, HeaderValue};
/// #[derive(Debug)]
/// struct MyToken(String);
/// impl CredentialsProvider for MyToken {
///     async fn headers(&self, _scopes: &[String]) -> Result<HeaderMap> {
///         let mut headers = HeaderMap::new();
///         let value = HeaderValue::from_str(&format!("Bearer {}", self.0))
///             .map_err(|e| aiplatform_gax::error::CredentialsError::new(false, e))?;
///         headers.insert(http::header::AUTHORIZATION, value);
///         Ok(headers)
///     }
/// }
/// let credentials = Credentials::from(MyToken("test-only".into()));
/// ```
pub trait CredentialsProvider: std::fmt::Debug {
    /// Asynchronously constructs the authentication headers.
    ///
    /// The scopes are the OAuth2 scopes configured in the client, they may be
    /// ignored by credentials that do not use scopes.
    fn headers(&self, scopes: &[String]) -> impl Future<Output = Result<HeaderMap>> + Send;

    /// Retrieves the universe domain associated with the credentials, if any.
    fn universe_domain(&self) -> impl Future<Output = Option<String>> + Send {
        std::future::ready(Some("googleapis.com".to_string()))
    }
}

pub(crate) mod dynamic {
    use super::{HeaderMap, Result};

    /// A dyn-compatible, crate-private version of `CredentialsProvider`.
    #[async_trait::async_trait]
    pub trait CredentialsProvider: Send + Sync + std::fmt::Debug {
        async fn headers(&self, scopes: &[String]) -> Result<HeaderMap>;

        async fn universe_domain(&self) -> Option<String>;
    }

    /// The public `CredentialsProvider` implements the dyn-compatible one.
    #[async_trait::async_trait]
    impl<T> CredentialsProvider for T
    where
        T: super::CredentialsProvider + Send + Sync,
    {
        async fn headers(&self, scopes: &[String]) -> Result<HeaderMap> {
            T::headers(self, scopes).await
        }

        async fn universe_domain(&self) -> Option<String> {
            T::universe_domain(self).await
        }
    }
}

/// Creates credentials that send no authentication headers.
pub fn anonymous() -> Credentials {
    Credentials::from(Anonymous)
}

/// Creates credentials that always send the same bearer token.
///
/// The token is never refreshed, this is only useful for short-lived
/// programs and for tests.
pub fn access_token<T: Into<String>>(token: T) -> Credentials {
    Credentials::from(AccessToken(token.into()))
}

#[derive(Debug)]
struct Anonymous;

impl CredentialsProvider for Anonymous {
    async fn headers(&self, _scopes: &[String]) -> Result<HeaderMap> {
        Ok(HeaderMap::new())
    }
}

struct AccessToken(String);

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken").field(&"[censored]").finish()
    }
}

impl CredentialsProvider for AccessToken {
    async fn headers(&self, _scopes: &[String]) -> Result<HeaderMap> {
        let mut value = http::HeaderValue::from_str(&format!("Bearer {}", self.0))
            .map_err(|e| CredentialsError::new(false, e))?;
        value.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, value);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn anonymous_has_no_headers() -> anyhow::Result<()> {
        let credentials = anonymous();
        let headers = credentials.headers(&[DEFAULT_SCOPE.to_string()]).await?;
        assert!(headers.is_empty(), "{headers:?}");
        assert_eq!(
            credentials.universe_domain().await.as_deref(),
            Some("googleapis.com")
        );
        Ok(())
    }

    #[tokio::test]
    async fn access_token_header() -> anyhow::Result<()> {
        let credentials = access_token("test-token");
        let headers = credentials.headers(&[]).await?;
        let value = headers.get(http::header::AUTHORIZATION);
        assert_eq!(value.and_then(|v| v.to_str().ok()), Some("Bearer test-token"));
        assert!(value.is_some_and(|v| v.is_sensitive()));
        let fmt = format!("{credentials:?}");
        assert!(!fmt.contains("test-token"), "{fmt}");
        Ok(())
    }

    #[tokio::test]
    async fn access_token_invalid() {
        let credentials = access_token("bad\ntoken");
        let err = credentials.headers(&[]).await.unwrap_err();
        assert!(!err.is_transient(), "{err:?}");
    }

    #[derive(Debug)]
    struct Scoped;
    impl CredentialsProvider for Scoped {
        async fn headers(&self, scopes: &[String]) -> Result<HeaderMap> {
            let mut headers = HeaderMap::new();
            let value = http::HeaderValue::from_str(&scopes.join(" "))
                .map_err(|e| CredentialsError::new(false, e))?;
            headers.insert("x-test-scopes", value);
            Ok(headers)
        }
        async fn universe_domain(&self) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn custom_provider() -> anyhow::Result<()> {
        let credentials = Credentials::from(Scoped);
        let headers = credentials
            .headers(&["a".to_string(), "b".to_string()])
            .await?;
        assert_eq!(
            headers.get("x-test-scopes").and_then(|v| v.to_str().ok()),
            Some("a b")
        );
        assert_eq!(credentials.universe_domain().await, None);
        Ok(())
    }
}
