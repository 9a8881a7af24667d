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

//! The transport contract.
//!
//! A [Transport] turns an [EndpointDescriptor] into a [UnaryCallable], the
//! type-erased function that sends one attempt of an RPC over the wire. The
//! policy layer in [crate::client] wraps these callables with retries,
//! timeouts, metadata composition, and interceptors.
//!
//! Transports are selected by label from a [TransportRegistry]. The registry
//! always contains the `grpc` and `rest` transports, in that order, and uses
//! the first entry when the application does not pick a transport.

use crate::api_header::XGoogApiClient;
use crate::descriptor::EndpointDescriptor;
use crate::options::ClientConfig;
use futures::FutureExt;
use futures::future::BoxFuture;
use gax::Result;
use gax::client_builder::Error as BuilderError;
use gax::error::Error;
use gax::interceptor::{RpcRequest, RpcResponse};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The per-attempt parameters for a [UnaryCallable].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttemptContext {
    /// The time remaining for this attempt, sent to the service as the RPC
    /// deadline.
    pub timeout: Option<Duration>,
    /// The application prefix for the `user-agent` header.
    pub user_agent: Option<String>,
    /// The attempt number, starting at 1.
    pub attempt_count: u32,
}

/// Sends one attempt of an RPC.
///
/// The request metadata contains the caller's entries followed by the entries
/// added by the policy layer. Callables append the authentication and client
/// information headers after those.
#[async_trait::async_trait]
pub trait UnaryCallable: std::fmt::Debug + Send + Sync {
    async fn call(&self, request: RpcRequest, context: &AttemptContext) -> Result<RpcResponse>;
}

/// A wire protocol implementation.
pub trait Transport: std::fmt::Debug + Send + Sync {
    /// The label used to select this transport, e.g. `grpc`.
    fn label(&self) -> &str;

    /// Returns the callable for `descriptor`.
    ///
    /// Callables are created on first use and cached by method name.
    fn callable(&self, descriptor: &EndpointDescriptor) -> Arc<dyn UnaryCallable>;

    /// Closes the transport.
    ///
    /// In-flight calls fail, and any future calls fail, with a
    /// [closed][Error::is_closed] error. Closing is idempotent.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Static information about the service a client talks to.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceInfo {
    /// The default endpoint, e.g. `https://aiplatform.googleapis.com`.
    pub default_endpoint: &'static str,
    pub api_client: XGoogApiClient,
}

/// A per-transport cache of callables.
///
/// Concurrent first use may create two equivalent callables; the first one
/// inserted wins.
#[derive(Debug, Default)]
pub struct CallableCache {
    map: Mutex<HashMap<&'static str, Arc<dyn UnaryCallable>>>,
}

impl CallableCache {
    pub fn get_or_insert_with<F>(&self, name: &'static str, make: F) -> Arc<dyn UnaryCallable>
    where
        F: FnOnce() -> Arc<dyn UnaryCallable>,
    {
        if let Some(c) = self.lock().get(name) {
            return c.clone();
        }
        let callable = make();
        self.lock().entry(name).or_insert(callable).clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<&'static str, Arc<dyn UnaryCallable>>> {
        // The map is always in a consistent state, even if a thread panicked
        // while holding the lock.
        self.map.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Tracks the closed state of a transport.
#[derive(Clone, Debug, Default)]
pub struct Closer(CancellationToken);

impl Closer {
    pub fn close(&self) {
        self.0.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Runs `call`, failing immediately if the transport is (or becomes)
    /// closed.
    pub async fn guard<F, T>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_closed() {
            return Err(Error::closed(TransportClosed));
        }
        tokio::select! {
            biased;
            _ = self.0.cancelled() => Err(Error::closed(TransportClosed)),
            r = call => r,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("the transport is closed")]
struct TransportClosed;

/// The future returned by a [TransportFactory].
pub type TransportFuture = BoxFuture<'static, gax::client_builder::Result<Arc<dyn Transport>>>;

/// Creates a transport from the client configuration.
pub type TransportFactory = Arc<dyn Fn(ClientConfig, ServiceInfo) -> TransportFuture + Send + Sync>;

/// The label of the gRPC transport.
pub const GRPC: &str = "grpc";
/// The label of the REST transport.
pub const REST: &str = "rest";

/// An ordered list of transport factories.
#[derive(Clone)]
pub struct TransportRegistry {
    entries: Vec<(String, TransportFactory)>,
}

impl TransportRegistry {
    /// Creates a registry with no transports.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a transport.
    ///
    /// Re-registering a label replaces the factory and keeps its position.
    pub fn register<L, F>(mut self, label: L, factory: F) -> Self
    where
        L: Into<String>,
        F: Fn(ClientConfig, ServiceInfo) -> TransportFuture + Send + Sync + 'static,
    {
        let label = label.into();
        let factory: TransportFactory = Arc::new(factory);
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((label, factory)),
        }
        self
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    /// Creates the transport selected by `config.transport`, or the first
    /// registered transport if no transport is selected.
    pub async fn create(
        &self,
        config: ClientConfig,
        service: ServiceInfo,
    ) -> gax::client_builder::Result<Arc<dyn Transport>> {
        let entry = match config.transport.as_deref() {
            None => self.entries.first(),
            Some(label) => self.entries.iter().find(|(l, _)| l == label),
        };
        let Some((label, factory)) = entry else {
            return Err(BuilderError::configuration(UnknownTransport {
                label: config.transport.clone().unwrap_or_default(),
                known: self.labels().join(", "),
            }));
        };
        tracing::debug!(target: "aiplatform::rpc", transport = %label, "creating transport");
        factory(config, service).await
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::empty()
            .register(GRPC, |config, service| {
                async move {
                    let t = crate::grpc::GrpcTransport::new(config, service).await?;
                    Ok(Arc::new(t) as Arc<dyn Transport>)
                }
                .boxed()
            })
            .register(REST, |config, service| {
                async move {
                    let t = crate::rest::RestTransport::new(config, service).await?;
                    Ok(Arc::new(t) as Arc<dyn Transport>)
                }
                .boxed()
            })
    }
}

impl std::fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRegistry")
            .field("labels", &self.labels())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown transport `{label}`, the registered transports are: {known}")]
struct UnknownTransport {
    label: String,
    known: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api_header::GAPIC;

    pub(crate) fn service_info() -> ServiceInfo {
        ServiceInfo {
            default_endpoint: "https://test.googleapis.com",
            api_client: XGoogApiClient {
                name: "test-client",
                library_type: GAPIC,
                version: "1.0.0",
            },
        }
    }

    #[derive(Debug)]
    struct Fake {
        label: String,
        closer: Closer,
        cache: CallableCache,
    }

    #[derive(Debug)]
    struct Echo;

    #[async_trait::async_trait]
    impl UnaryCallable for Echo {
        async fn call(&self, request: RpcRequest, _context: &AttemptContext) -> Result<RpcResponse> {
            Ok(RpcResponse {
                message: request.message,
                metadata: request.metadata,
            })
        }
    }

    impl Transport for Fake {
        fn label(&self) -> &str {
            &self.label
        }
        fn callable(&self, descriptor: &EndpointDescriptor) -> Arc<dyn UnaryCallable> {
            self.cache
                .get_or_insert_with(descriptor.full_name, || Arc::new(Echo))
        }
        fn close(&self) {
            self.closer.close()
        }
        fn is_closed(&self) -> bool {
            self.closer.is_closed()
        }
    }

    fn fake(
        label: &'static str,
    ) -> impl Fn(ClientConfig, ServiceInfo) -> TransportFuture + Send + Sync + 'static {
        move |_, _| {
            async move {
                let t = Fake {
                    label: label.to_string(),
                    closer: Closer::default(),
                    cache: CallableCache::default(),
                };
                Ok(Arc::new(t) as Arc<dyn Transport>)
            }
            .boxed()
        }
    }

    #[test]
    fn default_labels() {
        let registry = TransportRegistry::default();
        assert_eq!(registry.labels(), vec![GRPC, REST]);
        let fmt = format!("{registry:?}");
        assert!(fmt.contains("rest"), "{fmt}");
    }

    #[tokio::test]
    async fn select_by_label() -> anyhow::Result<()> {
        let registry = TransportRegistry::empty()
            .register("first", fake("first"))
            .register("second", fake("second"));
        let t = registry
            .create(ClientConfig::default(), service_info())
            .await?;
        assert_eq!(t.label(), "first");

        let config = ClientConfig {
            transport: Some("second".into()),
            ..Default::default()
        };
        let t = registry.create(config, service_info()).await?;
        assert_eq!(t.label(), "second");
        Ok(())
    }

    #[tokio::test]
    async fn register_replaces() -> anyhow::Result<()> {
        let registry = TransportRegistry::empty()
            .register("a", fake("a"))
            .register("b", fake("b"))
            .register("a", fake("replaced"));
        assert_eq!(registry.labels(), vec!["a", "b"]);
        let t = registry
            .create(ClientConfig::default(), service_info())
            .await?;
        assert_eq!(t.label(), "replaced");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_label() {
        let registry = TransportRegistry::empty().register("a", fake("a"));
        let config = ClientConfig {
            transport: Some("carrier-pigeon".into()),
            ..Default::default()
        };
        let got = registry.create(config, service_info()).await;
        let err = got.expect_err("unknown labels should fail");
        assert!(err.is_configuration(), "{err:?}");

        let got = TransportRegistry::empty()
            .create(ClientConfig::default(), service_info())
            .await;
        assert!(matches!(&got, Err(e) if e.is_configuration()), "{got:?}");
    }

    #[test]
    fn cache() {
        let cache = CallableCache::default();
        assert!(cache.is_empty());
        let a = cache.get_or_insert_with("a", || Arc::new(Echo));
        let b = cache.get_or_insert_with("a", || unreachable!("the callable is cached"));
        assert!(Arc::ptr_eq(&a, &b));
        let _ = cache.get_or_insert_with("b", || Arc::new(Echo));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn closer() {
        let closer = Closer::default();
        let got = closer.guard(async { Ok(42) }).await;
        assert!(matches!(got, Ok(42)), "{got:?}");

        let pending = {
            let closer = closer.clone();
            tokio::spawn(async move {
                closer
                    .guard(std::future::pending::<Result<()>>())
                    .await
            })
        };
        closer.close();
        closer.close();
        assert!(closer.is_closed());
        let got = pending.await.expect("task should not panic");
        assert!(matches!(&got, Err(e) if e.is_closed()), "{got:?}");

        let got = closer.guard(async { Ok(42) }).await;
        assert!(matches!(&got, Err(e) if e.is_closed()), "{got:?}");
        assert_eq!(
            got.err().map(|e| e.code()),
            Some(gax::error::rpc::Code::Unavailable)
        );
    }
}
