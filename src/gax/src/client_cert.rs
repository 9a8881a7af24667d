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

//! Client certificate sources for mutual TLS.
//!
//! A client certificate source produces a PEM encoded certificate chain and
//! private key. The transports use it to create mutual TLS channels, and the
//! endpoint selection logic uses its presence to decide if the mTLS endpoint
//! should be used.
//!
//! Applications can provide a source with [ClientCert::from()], or let the
//! client discover the default source. The default source is configured in
//! `$HOME/.secureConnect/context_aware_metadata.json`, which names a command
//! that prints the certificate and key to its standard output:
//!
//! ```json
//! { "cert_provider_command": ["/usr/bin/cert-helper", "--print"] }
//! ```

use crate::error::CredentialsError;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The result type for certificate operations.
pub type Result<T> = std::result::Result<T, CredentialsError>;

/// A PEM encoded certificate chain and private key.
#[derive(Clone, PartialEq)]
pub struct CertificateKeyPair {
    pub cert_pem: Bytes,
    pub key_pem: Bytes,
}

impl std::fmt::Debug for CertificateKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateKeyPair")
            .field("cert_pem", &self.cert_pem)
            .field("key_pem", &"[censored]")
            .finish()
    }
}

impl CertificateKeyPair {
    /// Splits the output of a certificate provider into the certificate chain
    /// and the private key.
    ///
    /// The input must contain at least one `CERTIFICATE` block and exactly one
    /// `PRIVATE KEY` block (of any key type).
    pub fn from_combined_pem(pem: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(pem).map_err(|e| CredentialsError::new(false, e))?;
        let mut certs = String::new();
        let mut keys = Vec::new();
        for block in pem_blocks(text) {
            let label = block.label;
            if label == "CERTIFICATE" {
                certs.push_str(block.text);
                certs.push('\n');
            } else if label.ends_with("PRIVATE KEY") {
                keys.push(block.text);
            }
        }
        if certs.is_empty() {
            return Err(CredentialsError::from_msg(
                false,
                "missing CERTIFICATE block in client certificate",
            ));
        }
        match keys.as_slice() {
            [key] => Ok(Self {
                cert_pem: Bytes::from(certs),
                key_pem: Bytes::from(format!("{key}\n")),
            }),
            [] => Err(CredentialsError::from_msg(
                false,
                "missing PRIVATE KEY block in client certificate",
            )),
            _ => Err(CredentialsError::from_msg(
                false,
                "multiple PRIVATE KEY blocks in client certificate",
            )),
        }
    }
}

struct PemBlock<'a> {
    label: &'a str,
    text: &'a str,
}

fn pem_blocks(text: &str) -> impl Iterator<Item = PemBlock<'_>> {
    const BEGIN: &str = "-----BEGIN ";
    let mut remains = text;
    std::iter::from_fn(move || {
        let start = remains.find(BEGIN)?;
        let after = &remains[start + BEGIN.len()..];
        let label_end = after.find("-----")?;
        let label = &after[..label_end];
        let end_marker = format!("-----END {label}-----");
        let end = remains[start..].find(&end_marker)? + start + end_marker.len();
        let block = PemBlock {
            label,
            text: &remains[start..end],
        };
        remains = &remains[end..];
        Some(block)
    })
}

/// Produces client certificates for mutual TLS.
pub trait ClientCertSource: std::fmt::Debug {
    /// Returns the certificate chain and private key.
    fn certificate(&self) -> impl Future<Output = Result<CertificateKeyPair>> + Send;
}

pub(crate) mod dynamic {
    use super::{CertificateKeyPair, Result};

    /// A dyn-compatible, crate-private version of `ClientCertSource`.
    #[async_trait::async_trait]
    pub trait ClientCertSource: Send + Sync + std::fmt::Debug {
        async fn certificate(&self) -> Result<CertificateKeyPair>;
    }

    #[async_trait::async_trait]
    impl<T> ClientCertSource for T
    where
        T: super::ClientCertSource + Send + Sync,
    {
        async fn certificate(&self) -> Result<CertificateKeyPair> {
            T::certificate(self).await
        }
    }
}

/// A type-erased client certificate source.
#[derive(Clone, Debug)]
pub struct ClientCert {
    inner: Arc<dyn dynamic::ClientCertSource>,
}

impl<T> std::convert::From<T> for ClientCert
where
    T: ClientCertSource + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl ClientCert {
    /// Returns the certificate chain and private key.
    pub async fn certificate(&self) -> Result<CertificateKeyPair> {
        self.inner.certificate().await
    }
}

/// A certificate source returning a fixed certificate and key.
#[derive(Clone, Debug)]
pub struct StaticCertSource(CertificateKeyPair);

impl StaticCertSource {
    pub fn new(pair: CertificateKeyPair) -> Self {
        Self(pair)
    }
}

impl ClientCertSource for StaticCertSource {
    async fn certificate(&self) -> Result<CertificateKeyPair> {
        Ok(self.0.clone())
    }
}

/// A certificate source that runs a command and parses its output.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandCertSource {
    program: String,
    args: Vec<String>,
}

impl CommandCertSource {
    /// Creates a source from a command line, the first element is the program.
    pub fn new<I, V>(command: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut command = command.into_iter().map(Into::into);
        let program = command.next().ok_or_else(|| {
            CredentialsError::from_msg(false, "empty client certificate provider command")
        })?;
        Ok(Self {
            program,
            args: command.collect(),
        })
    }
}

impl ClientCertSource for CommandCertSource {
    async fn certificate(&self) -> Result<CertificateKeyPair> {
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| CredentialsError::new(true, e))?;
        if !output.status.success() {
            return Err(CredentialsError::from_msg(
                true,
                format!(
                    "client certificate provider command failed with {}",
                    output.status
                ),
            ));
        }
        CertificateKeyPair::from_combined_pem(&output.stdout)
    }
}

#[derive(serde::Deserialize)]
struct ContextAwareMetadata {
    #[serde(default)]
    cert_provider_command: Vec<String>,
}

const METADATA_PATH: [&str; 2] = [".secureConnect", "context_aware_metadata.json"];

fn metadata_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(METADATA_PATH.iter().fold(PathBuf::from(home), |p, c| p.join(c)))
}

/// Discovers the default client certificate source.
///
/// Returns `Ok(None)` if the metadata file does not exist, and an error if
/// it exists but is not usable.
pub fn default_client_cert_source() -> Result<Option<ClientCert>> {
    match metadata_path() {
        None => Ok(None),
        Some(path) => from_metadata_file(&path),
    }
}

fn from_metadata_file(path: &Path) -> Result<Option<ClientCert>> {
    let contents = match std::fs::read(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CredentialsError::new(false, e)),
    };
    let metadata = serde_json::from_slice::<ContextAwareMetadata>(&contents)
        .map_err(|e| CredentialsError::new(false, e))?;
    if metadata.cert_provider_command.is_empty() {
        return Ok(None);
    }
    tracing::debug!(
        target: "aiplatform::rpc",
        path = %path.display(),
        "using default client certificate provider"
    );
    let source = CommandCertSource::new(metadata.cert_provider_command)?;
    Ok(Some(ClientCert::from(source)))
}
