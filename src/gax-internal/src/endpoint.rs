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

//! Endpoint selection, including mutual TLS.
//!
//! The client uses, in order of precedence:
//!
//! 1. The endpoint configured by the application.
//! 2. The mTLS variant of the default endpoint, when
//!    `GOOGLE_API_USE_MTLS_ENDPOINT=always`, or when it is `auto` (the
//!    default) and a client certificate is available.
//! 3. The default endpoint.
//!
//! A client certificate is available if the application configured a
//! certificate source, or if `GOOGLE_API_USE_CLIENT_CERTIFICATE=true` and
//! the default source is configured for this machine.

use crate::options::ClientConfig;
use gax::client_builder::{Error as BuilderError, Result};
use gax::client_cert::{CertificateKeyPair, default_client_cert_source};
use gax::client_config::{EnvironmentConfig, MtlsEndpointMode};
use http::Uri;

/// The default port for both transports.
pub const DEFAULT_PORT: u16 = 443;

/// The result of the endpoint selection.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEndpoint {
    /// The endpoint URI, always including a scheme and a port.
    pub uri: String,
    /// The certificate to present in the TLS handshake, if any.
    pub client_cert: Option<CertificateKeyPair>,
}

impl ResolvedEndpoint {
    /// The host name, used for TLS verification.
    pub fn host(&self) -> Option<String> {
        self.uri
            .parse::<Uri>()
            .ok()
            .and_then(|u| u.host().map(str::to_string))
    }
}

/// Selects the endpoint and loads the client certificate for a client.
pub async fn resolve(config: &ClientConfig, default_endpoint: &str) -> Result<ResolvedEndpoint> {
    let env = EnvironmentConfig::from_env()?;
    let source = match (&config.client_cert_source, env.use_client_certificate) {
        (Some(source), _) => Some(source.clone()),
        (None, true) => default_client_cert_source().map_err(BuilderError::mtls)?,
        (None, false) => None,
    };
    let client_cert = match source {
        None => None,
        Some(s) => Some(s.certificate().await.map_err(BuilderError::mtls)?),
    };
    let endpoint = select(
        config.endpoint.as_deref(),
        default_endpoint,
        env.use_mtls_endpoint,
        client_cert.is_some(),
    );
    tracing::debug!(
        target: "aiplatform::rpc",
        endpoint = %endpoint,
        mtls = client_cert.is_some(),
        "selected endpoint"
    );
    Ok(ResolvedEndpoint {
        uri: with_default_port(&endpoint)?,
        client_cert,
    })
}

/// Applies the endpoint precedence rules.
pub fn select(
    explicit: Option<&str>,
    default_endpoint: &str,
    mode: MtlsEndpointMode,
    has_client_cert: bool,
) -> String {
    if let Some(e) = explicit {
        return e.to_string();
    }
    match (mode, has_client_cert) {
        (MtlsEndpointMode::Always, _) | (MtlsEndpointMode::Auto, true) => {
            mtls_endpoint(default_endpoint)
        }
        _ => default_endpoint.to_string(),
    }
}

/// Converts a `*.googleapis.com` endpoint to its mTLS variant.
///
/// Endpoints outside `googleapis.com`, and endpoints that already are mTLS
/// endpoints, are returned unchanged.
///
/// # Example
/// ```
/// # use aiplatform_gax_internal::endpoint::mtls_endpoint;
/// assert_eq!(
///     mtls_endpoint("https://aiplatform.googleapis.com"),
///     "https://aiplatform.mtls.googleapis.com"
/// );
/// ```
pub fn mtls_endpoint(endpoint: &str) -> String {
    let (scheme, rest) = match endpoint.split_once("://") {
        Some((s, r)) => (Some(s), r),
        None => (None, endpoint),
    };
    let (host, tail) = match rest.find([':', '/']) {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let mtls_host = if host.contains(".mtls.") {
        None
    } else if let Some(name) = host.strip_suffix(".sandbox.googleapis.com") {
        Some(format!("{name}.mtls.sandbox.googleapis.com"))
    } else {
        host.strip_suffix(".googleapis.com")
            .map(|name| format!("{name}.mtls.googleapis.com"))
    };
    let Some(mtls_host) = mtls_host else {
        return endpoint.to_string();
    };
    match scheme {
        Some(s) => format!("{s}://{mtls_host}{tail}"),
        None => format!("{mtls_host}{tail}"),
    }
}

/// Adds the `https` scheme and the default port when they are missing.
pub fn with_default_port(endpoint: &str) -> Result<String> {
    let endpoint = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    };
    let uri = endpoint
        .parse::<Uri>()
        .map_err(BuilderError::configuration)?;
    let authority = uri
        .authority()
        .ok_or_else(|| BuilderError::configuration(MissingAuthority(endpoint.clone())))?;
    if authority.port().is_some() {
        return Ok(endpoint.trim_end_matches('/').to_string());
    }
    let scheme = uri.scheme_str().unwrap_or("https");
    let port = match scheme {
        "http" => 80,
        _ => DEFAULT_PORT,
    };
    Ok(format!("{scheme}://{}:{port}", authority.host()))
}

#[derive(Debug, thiserror::Error)]
#[error("the endpoint `{0}` does not include a host")]
struct MissingAuthority(String);
