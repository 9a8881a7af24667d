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

//! The call policy layer.
//!
//! [RpcClient] owns a [Transport] and wraps each of its callables with the
//! behavior shared by every RPC: default idempotency, the routing header,
//! retries with backoff, deadlines, cancellation, interceptors, and tracing.
//! Generated clients hold an `RpcClient` and call [RpcClient::invoke] with the
//! descriptor of each method.

use crate::descriptor::EndpointDescriptor;
use crate::observability::{self, LoggingInterceptor, TARGET};
use crate::operations::{OperationsBindings, OperationsClient};
use crate::options::ClientConfig;
use crate::routing_parameter::{REQUEST_PARAMS_HEADER, request_params};
use crate::transport::{
    AttemptContext, REST, ServiceInfo, Transport, TransportRegistry, UnaryCallable,
};
use gax::Result;
use gax::backoff_policy::BackoffPolicy;
use gax::client_builder::Result as BuilderResult;
use gax::error::Error;
use gax::exponential_backoff::ExponentialBackoff;
use gax::interceptor::{Interceptor, Next, RpcRequest, RpcResponse, Terminal};
use gax::options::RequestOptions;
use gax::paginator::{PageableResponse, Paginator};
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_error_policy::PollingErrorPolicy;
use gax::response::{Parts, Response};
use gax::retry::Retry;
use gax::retry_loop_internal::retry_loop_with_callback;
use gax::retry_policy::{NeverRetry, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use wkt::message::{DynMessage, Message};

/// Issues RPCs over a transport, applying the client and per-call policies.
#[derive(Clone, Debug)]
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Option<Arc<dyn BackoffPolicy>>,
    polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
    polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    operations: Arc<OperationsBindings>,
}

impl RpcClient {
    /// Creates a client using the default transports.
    pub async fn new(config: ClientConfig, service: ServiceInfo) -> BuilderResult<Self> {
        Self::with_registry(config, service, &TransportRegistry::default()).await
    }

    /// Creates a client using the transport selected from `registry`.
    pub async fn with_registry(
        config: ClientConfig,
        service: ServiceInfo,
        registry: &TransportRegistry,
    ) -> BuilderResult<Self> {
        let transport = registry.create(config.clone(), service).await?;
        Ok(Self::from_transport(transport, &config))
    }

    /// Creates a client over an existing transport.
    ///
    /// Only the policies, interceptors, and tracing settings in `config` are
    /// used, the transport is already configured.
    pub fn from_transport(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        let mut interceptors: Vec<Arc<dyn Interceptor>> = Vec::new();
        if config.tracing_enabled() {
            interceptors.push(Arc::new(LoggingInterceptor));
        }
        interceptors.extend(config.interceptors.iter().cloned());
        Self {
            transport,
            retry_policy: config.retry_policy.clone(),
            backoff_policy: config.backoff_policy.clone(),
            polling_error_policy: config.polling_error_policy.clone(),
            polling_backoff_policy: config.polling_backoff_policy.clone(),
            interceptors: interceptors.into(),
            operations: Arc::new(OperationsBindings::default()),
        }
    }

    /// Sets the descriptors used by the operations sub-client.
    pub fn with_operations(mut self, bindings: OperationsBindings) -> Self {
        self.operations = Arc::new(bindings);
        self
    }

    /// The label of the underlying transport.
    pub fn transport_label(&self) -> &str {
        self.transport.label()
    }

    /// Issues a unary RPC.
    ///
    /// The routing header is appended after the caller's metadata. Each
    /// attempt runs through the interceptors and then the transport callable.
    /// Attempts are retried while the retry policy allows it, the deadline has
    /// not passed, and the call is not cancelled.
    pub async fn invoke<Req, Resp>(
        &self,
        descriptor: &EndpointDescriptor,
        request: Req,
        options: RequestOptions,
    ) -> Result<Response<Resp>>
    where
        Req: Message,
        Resp: Message,
    {
        let options = gax::options::internal::set_default_idempotency(options, descriptor.idempotent);
        let idempotent = options.idempotent().unwrap_or(descriptor.idempotent);

        let mut metadata = options.metadata().clone();
        if !descriptor.routing_fields.is_empty() {
            let json = serde_json::to_value(&request).map_err(Error::ser)?;
            if let Some(value) = request_params(&descriptor.routing_fields, &json) {
                // Exactly one routing entry reaches the service.
                metadata.remove(REQUEST_PARAMS_HEADER);
                metadata.push_ascii(REQUEST_PARAMS_HEADER, value);
            }
        }

        let retry_policy = self.retry_policy(&options, idempotent);
        let backoff_policy = self.backoff_policy(&options);
        // Each attempt owns its inputs, the futures do not borrow the caller.
        let attempt = Attempt {
            method: descriptor.full_name,
            callable: self.transport.callable(descriptor),
            interceptors: self.interceptors.clone(),
            descriptor: Arc::new(descriptor.clone()),
            // Spans report REST calls with the `http` system.
            system: match self.transport.label() {
                REST => "http".to_string(),
                label => label.to_string(),
            },
            user_agent: options.user_agent().clone(),
            metadata,
            request: Box::new(request),
        };
        let inner = async move |timeout: Option<Duration>, attempt_count: u32| {
            attempt.run(timeout, attempt_count).await
        };
        let method = descriptor.full_name;
        let on_retry = move |attempt: u32, error: &Error, delay: Duration| {
            tracing::debug!(
                target: TARGET,
                method,
                attempt,
                ?delay,
                code = %error.code(),
                "retrying after error"
            );
        };
        let response = retry_loop_with_callback(
            inner,
            async |d| tokio::time::sleep(d).await,
            idempotent,
            &options,
            retry_policy,
            backoff_policy,
            on_retry,
        )
        .await?;

        let RpcResponse { message, metadata } = response;
        let body = message
            .downcast_ref::<Resp>()
            .cloned()
            .ok_or_else(|| {
                Error::deser(UnexpectedResponseType {
                    want: Resp::typename(),
                    got: message.message_type(),
                })
            })?;
        Ok(Response::from_parts(Parts::new().set_metadata(metadata), body))
    }

    /// Issues the first call of a List RPC and returns a paginator over all
    /// the pages.
    ///
    /// The first response is the first page, it is never requested again.
    /// Every page is requested with the same `options`. `set_token` returns a
    /// copy of the request with the given page token.
    pub async fn paginate<Req, Resp>(
        &self,
        descriptor: &EndpointDescriptor,
        request: Req,
        options: RequestOptions,
        set_token: fn(Req, String) -> Req,
    ) -> Result<Paginator<Resp>>
    where
        Req: Message,
        Resp: Message + PageableResponse,
    {
        let initial = self
            .invoke::<Req, Resp>(descriptor, request.clone(), options.clone())
            .await?
            .into_body();
        let client = self.clone();
        let descriptor = descriptor.clone();
        let execute = move |token: String| {
            let client = client.clone();
            let descriptor = descriptor.clone();
            let request = set_token(request.clone(), token);
            let options = options.clone();
            async move {
                client
                    .invoke::<Req, Resp>(&descriptor, request, options)
                    .await
                    .map(Response::into_body)
            }
        };
        Ok(Paginator::new(initial, execute))
    }

    /// Wraps the operation returned by a long-running RPC.
    ///
    /// The client polling policies apply unless `options` overrides them.
    pub fn operation_future<R, M>(
        &self,
        operation: lro::Operation,
        mut options: RequestOptions,
    ) -> lro::OperationFuture<R, M>
    where
        R: Message,
        M: Message,
    {
        if options.polling_error_policy().is_none() {
            if let Some(p) = &self.polling_error_policy {
                options.set_polling_error_policy(p.clone());
            }
        }
        if options.polling_backoff_policy().is_none() {
            if let Some(p) = &self.polling_backoff_policy {
                options.set_polling_backoff_policy(p.clone());
            }
        }
        lro::OperationFuture::new(operation, self.operations(), options)
    }

    /// The operations sub-client, sharing this client's transport.
    pub fn operations(&self) -> Arc<dyn lro::Operations> {
        Arc::new(OperationsClient::new(self.clone(), self.operations.clone()))
    }

    /// Closes the transport.
    ///
    /// Calls in progress, and any later calls, fail with an `UNAVAILABLE`
    /// error that is never retried.
    pub fn close(&self) {
        self.transport.close()
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    fn retry_policy(&self, options: &RequestOptions, idempotent: bool) -> Arc<dyn RetryPolicy> {
        options
            .retry_policy()
            .clone()
            .or_else(|| self.retry_policy.clone())
            .unwrap_or_else(|| match idempotent {
                true => Arc::new(Retry::default()),
                false => Arc::new(NeverRetry),
            })
    }

    fn backoff_policy(&self, options: &RequestOptions) -> Arc<dyn BackoffPolicy> {
        options
            .backoff_policy()
            .clone()
            .or_else(|| self.backoff_policy.clone())
            .unwrap_or_else(|| Arc::new(ExponentialBackoff::default()))
    }
}

/// Rejects calls that set both a full request and flattened fields.
///
/// Generated clients accept either a complete request, or a few commonly used
/// fields as separate arguments. `flattened` holds those fields, if any are
/// set it must be the only source of the request.
pub fn compose_request<Req: Message>(request: Option<Req>, flattened: Req) -> Result<Req> {
    match request {
        None => Ok(flattened),
        Some(_) if flattened.encoded_len() > 0 => {
            Err(Error::invalid_argument(ConflictingArguments(Req::typename())))
        }
        Some(r) => Ok(r),
    }
}

/// The inputs of one attempt, cloned into each try.
struct Attempt {
    method: &'static str,
    callable: Arc<dyn UnaryCallable>,
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    descriptor: Arc<EndpointDescriptor>,
    system: String,
    user_agent: Option<String>,
    metadata: gax::metadata::Metadata,
    request: Box<dyn DynMessage>,
}

impl Attempt {
    async fn run(&self, timeout: Option<Duration>, attempt_count: u32) -> Result<RpcResponse> {
        let span = observability::attempt_span(&self.descriptor, &self.system, attempt_count);
        let terminal = CallableTerminal {
            callable: self.callable.as_ref(),
            context: AttemptContext {
                timeout,
                user_agent: self.user_agent.clone(),
                attempt_count,
            },
        };
        let request = RpcRequest {
            method: self.method,
            message: self.request.clone(),
            metadata: self.metadata.clone(),
        };
        let result = Next::new(&self.interceptors, &terminal)
            .run(request)
            .instrument(span.clone())
            .await;
        observability::record_attempt(&span, &result);
        result
    }
}

struct CallableTerminal<'a> {
    callable: &'a dyn UnaryCallable,
    context: AttemptContext,
}

#[async_trait::async_trait]
impl Terminal for CallableTerminal<'_> {
    async fn call(&self, request: RpcRequest) -> Result<RpcResponse> {
        self.callable.call(request, &self.context).await
    }
}

#[derive(Debug, thiserror::Error)]
#[error("the response type is {got}, expected {want}")]
struct UnexpectedResponseType {
    want: &'static str,
    got: &'static str,
}

#[derive(Debug, thiserror::Error)]
#[error(
    "a {0} request and individual field arguments are mutually exclusive, set one or the other"
)]
struct ConflictingArguments(&'static str);
