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

pub use gax::credentials::Credentials;

/// The client configuration consumed by the transports.
pub type ClientConfig = gax::client_builder::internal::ClientConfig<Credentials>;

/// Returns the configured credentials, or anonymous credentials.
///
/// Credential discovery is not part of the client runtime. Applications
/// provide credentials explicitly, emulators and tests use the default.
pub fn credentials(config: &ClientConfig) -> Credentials {
    config
        .cred
        .clone()
        .unwrap_or_else(gax::credentials::anonymous)
}

/// Returns the configured scopes, or the default scope.
pub fn scopes(config: &ClientConfig) -> Vec<String> {
    config
        .scopes
        .clone()
        .unwrap_or_else(|| vec![gax::credentials::DEFAULT_SCOPE.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use gax::client_config::LOGGING_VAR;
    use scoped_env::ScopedEnv;

    // This test must run serially because it manipulates the environment.
    #[test]
    #[serial_test::serial]
    fn config_tracing() {
        let _e = ScopedEnv::remove(LOGGING_VAR);
        let config = ClientConfig::default();
        assert!(!config.tracing_enabled(), "expected tracing to be disabled");
        let config = ClientConfig {
            tracing: true,
            ..Default::default()
        };
        assert!(config.tracing_enabled(), "expected tracing to be enabled");

        let _e = ScopedEnv::set(LOGGING_VAR, "true");
        let config = ClientConfig::default();
        assert!(config.tracing_enabled(), "expected tracing to be enabled");

        let _e = ScopedEnv::set(LOGGING_VAR, "not-true");
        let config = ClientConfig::default();
        assert!(!config.tracing_enabled(), "expected tracing to be disabled");
    }

    #[tokio::test]
    async fn defaults() -> anyhow::Result<()> {
        let config = ClientConfig::default();
        let headers = credentials(&config).headers(&scopes(&config)).await?;
        assert!(headers.is_empty(), "{headers:?}");
        assert_eq!(scopes(&config), vec![gax::credentials::DEFAULT_SCOPE]);

        let config = ClientConfig {
            cred: Some(gax::credentials::access_token("test-token")),
            scopes: Some(vec!["scope-a".to_string()]),
            ..Default::default()
        };
        let headers = credentials(&config).headers(&scopes(&config)).await?;
        let auth = headers.get(http::header::AUTHORIZATION);
        assert!(auth.is_some(), "{headers:?}");
        assert_eq!(scopes(&config), vec!["scope-a"]);
        Ok(())
    }
}
