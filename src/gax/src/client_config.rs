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

//! Client configuration shared by the client builders and the transports.

use crate::backoff_policy::BackoffPolicy;
use crate::client_builder::{Error, Result};
use crate::client_cert::ClientCert;
use crate::interceptor::Interceptor;
use crate::polling_backoff_policy::PollingBackoffPolicy;
use crate::polling_error_policy::PollingErrorPolicy;
use crate::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// Enables payload logging when set to `true`.
pub const LOGGING_VAR: &str = "GOOGLE_CLOUD_RUST_LOGGING";
/// Controls the mTLS endpoint selection: `never`, `auto`, or `always`.
pub const USE_MTLS_ENDPOINT_VAR: &str = "GOOGLE_API_USE_MTLS_ENDPOINT";
/// Enables discovery of the default client certificate when set to `true`.
pub const USE_CLIENT_CERTIFICATE_VAR: &str = "GOOGLE_API_USE_CLIENT_CERTIFICATE";

/// The configuration for a client.
///
/// Applications change this configuration through [ClientBuilder], the
/// transports consume it.
///
/// [ClientBuilder]: crate::client_builder::ClientBuilder
#[derive(Clone, Debug)]
pub struct ClientConfig<Cr> {
    pub endpoint: Option<String>,
    pub cred: Option<Cr>,
    pub scopes: Option<Vec<String>>,
    pub transport: Option<String>,
    pub tracing: bool,
    pub retry_policy: Option<Arc<dyn RetryPolicy>>,
    pub backoff_policy: Option<Arc<dyn BackoffPolicy>>,
    pub polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
    pub polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    pub client_cert_source: Option<ClientCert>,
    pub channel_options: ChannelOptions,
    pub interceptors: Vec<Arc<dyn Interceptor>>,
}

impl<Cr> std::default::Default for ClientConfig<Cr> {
    fn default() -> Self {
        Self {
            endpoint: None,
            cred: None,
            scopes: None,
            transport: None,
            tracing: false,
            retry_policy: None,
            backoff_policy: None,
            polling_error_policy: None,
            polling_backoff_policy: None,
            client_cert_source: None,
            channel_options: ChannelOptions::default(),
            interceptors: Vec::new(),
        }
    }
}

impl<Cr> ClientConfig<Cr> {
    /// Returns true if the client should log payloads.
    pub fn tracing_enabled(&self) -> bool {
        if self.tracing {
            return true;
        }
        std::env::var(LOGGING_VAR)
            .map(|v| v == "true")
            .unwrap_or(false)
    }
}

/// Per-channel options.
///
/// The gRPC transport uses all of these. The REST transport uses the connect
/// timeout and the keepalive interval.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelOptions {
    pub max_send_message_size: Option<usize>,
    pub max_receive_message_size: Option<usize>,
    pub keepalive_interval: Option<Duration>,
    pub keepalive_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl ChannelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_send_message_size(mut self, v: usize) -> Self {
        self.max_send_message_size = Some(v);
        self
    }

    pub fn set_max_receive_message_size(mut self, v: usize) -> Self {
        self.max_receive_message_size = Some(v);
        self
    }

    pub fn set_keepalive_interval<V: Into<Duration>>(mut self, v: V) -> Self {
        self.keepalive_interval = Some(v.into());
        self
    }

    pub fn set_keepalive_timeout<V: Into<Duration>>(mut self, v: V) -> Self {
        self.keepalive_timeout = Some(v.into());
        self
    }

    pub fn set_connect_timeout<V: Into<Duration>>(mut self, v: V) -> Self {
        self.connect_timeout = Some(v.into());
        self
    }
}

/// When to use the mTLS endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MtlsEndpointMode {
    /// Always use the regular endpoint.
    Never,
    /// Use the mTLS endpoint if a client certificate is available.
    #[default]
    Auto,
    /// Always use the mTLS endpoint.
    Always,
}

impl std::str::FromStr for MtlsEndpointMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "never" => Ok(Self::Never),
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            _ => Err(Error::configuration(InvalidEnvValue {
                name: USE_MTLS_ENDPOINT_VAR,
                value: s.to_string(),
                expected: "`never`, `auto`, or `always`",
            })),
        }
    }
}

/// The configuration taken from environment variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvironmentConfig {
    pub use_mtls_endpoint: MtlsEndpointMode,
    pub use_client_certificate: bool,
}

impl EnvironmentConfig {
    /// Reads the environment.
    ///
    /// Unset variables take their default values, invalid values are
    /// configuration errors.
    pub fn from_env() -> Result<Self> {
        let use_mtls_endpoint = match std::env::var(USE_MTLS_ENDPOINT_VAR) {
            Ok(v) => v.parse()?,
            Err(_) => MtlsEndpointMode::default(),
        };
        let use_client_certificate = match std::env::var(USE_CLIENT_CERTIFICATE_VAR).as_deref() {
            Err(_) | Ok("false") => false,
            Ok("true") => true,
            Ok(v) => {
                return Err(Error::configuration(InvalidEnvValue {
                    name: USE_CLIENT_CERTIFICATE_VAR,
                    value: v.to_string(),
                    expected: "`true` or `false`",
                }));
            }
        };
        Ok(Self {
            use_mtls_endpoint,
            use_client_certificate,
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid value `{value}` for {name}, expected {expected}")]
struct InvalidEnvValue {
    name: &'static str,
    value: String,
    expected: &'static str,
}
