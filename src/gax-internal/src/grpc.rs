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

//! The gRPC transport.
//!
//! Requests and responses cross this transport as already-encoded protobuf
//! bytes. The [EndpointDescriptor] provides the decoder for each response,
//! so a single tonic client serves every method of the service.

mod from_status;

use crate::api_header::{API_CLIENT_HEADER, Protocol};
use crate::descriptor::EndpointDescriptor;
use crate::endpoint::{self, ResolvedEndpoint};
use crate::options::{self, ClientConfig, Credentials};
use crate::transport::{
    AttemptContext, CallableCache, Closer, GRPC, ServiceInfo, Transport, UnaryCallable,
};
use bytes::{Buf, BufMut, Bytes};
use from_status::to_gax_error;
use gax::Result;
use gax::client_builder::{Error as BuilderError, Result as BuilderResult};
use gax::client_config::ChannelOptions;
use gax::error::Error;
use gax::interceptor::{RpcRequest, RpcResponse};
use gax::metadata::Metadata;
use http::header::{HeaderName, HeaderValue, USER_AGENT};
use std::sync::Arc;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::transport::Channel;

#[doc(hidden)]
pub type InnerClient = tonic::client::Grpc<Channel>;

/// A [Transport] sending requests over gRPC, using [tonic].
#[derive(Debug)]
pub struct GrpcTransport {
    shared: Arc<Shared>,
    cache: CallableCache,
}

#[derive(Debug)]
struct Shared {
    inner: InnerClient,
    credentials: Credentials,
    scopes: Vec<String>,
    service: ServiceInfo,
    closer: Closer,
}

impl GrpcTransport {
    /// Creates a transport from the client configuration.
    ///
    /// The channel connects lazily. Connection errors are reported by the
    /// first request.
    pub async fn new(config: ClientConfig, service: ServiceInfo) -> BuilderResult<Self> {
        let resolved = endpoint::resolve(&config, service.default_endpoint).await?;
        let channel = make_channel(&resolved, &config.channel_options)?;
        let inner = make_inner(channel, &config.channel_options);
        Ok(Self::from_parts(
            inner,
            options::credentials(&config),
            options::scopes(&config),
            service,
        ))
    }

    /// Creates a transport over an existing channel.
    ///
    /// The channel is used as-is. Requests carry no credentials.
    pub fn from_channel(channel: Channel, service: ServiceInfo) -> Self {
        Self::from_parts(
            tonic::client::Grpc::new(channel),
            gax::credentials::anonymous(),
            Vec::new(),
            service,
        )
    }

    fn from_parts(
        inner: InnerClient,
        credentials: Credentials,
        scopes: Vec<String>,
        service: ServiceInfo,
    ) -> Self {
        let shared = Shared {
            inner,
            credentials,
            scopes,
            service,
            closer: Closer::default(),
        };
        Self {
            shared: Arc::new(shared),
            cache: CallableCache::default(),
        }
    }
}

impl Transport for GrpcTransport {
    fn label(&self) -> &str {
        GRPC
    }

    fn callable(&self, descriptor: &EndpointDescriptor) -> Arc<dyn UnaryCallable> {
        self.cache.get_or_insert_with(descriptor.full_name, || {
            Arc::new(GrpcCallable {
                shared: self.shared.clone(),
                descriptor: descriptor.clone(),
            })
        })
    }

    fn close(&self) {
        self.shared.closer.close()
    }

    fn is_closed(&self) -> bool {
        self.shared.closer.is_closed()
    }
}

#[derive(Debug)]
struct GrpcCallable {
    shared: Arc<Shared>,
    descriptor: EndpointDescriptor,
}

#[async_trait::async_trait]
impl UnaryCallable for GrpcCallable {
    async fn call(&self, request: RpcRequest, context: &AttemptContext) -> Result<RpcResponse> {
        self.shared
            .closer
            .guard(self.attempt(request, context))
            .await
    }
}

impl GrpcCallable {
    async fn attempt(&self, request: RpcRequest, context: &AttemptContext) -> Result<RpcResponse> {
        let shared = &self.shared;
        let path = self
            .descriptor
            .grpc_path()
            .parse::<http::uri::PathAndQuery>()
            .map_err(Error::binding)?;

        let mut headers = request.metadata.to_header_map().map_err(Error::ser)?;
        let auth = shared
            .credentials
            .headers(&shared.scopes)
            .await
            .map_err(Error::authentication)?;
        for (name, value) in auth.iter() {
            headers.append(name.clone(), value.clone());
        }
        let api_client = shared.service.api_client.header_value(Protocol::Grpc);
        headers.append(
            HeaderName::from_static(API_CLIENT_HEADER),
            HeaderValue::from_str(&api_client).map_err(Error::ser)?,
        );
        let user_agent = shared
            .service
            .api_client
            .user_agent(context.user_agent.as_deref());
        headers.append(
            USER_AGENT,
            HeaderValue::from_str(&user_agent).map_err(Error::ser)?,
        );

        let mut extensions = tonic::Extensions::new();
        extensions.insert(tonic::GrpcMethod::new(
            self.descriptor.service(),
            self.descriptor.method(),
        ));
        let metadata = tonic::metadata::MetadataMap::from_headers(headers);
        let mut grpc_request =
            tonic::Request::from_parts(metadata, extensions, request.message.encode_binary());
        if let Some(timeout) = context.timeout {
            grpc_request.set_timeout(timeout);
        }

        let mut inner = shared.inner.clone();
        inner.ready().await.map_err(Error::io)?;
        let response = inner
            .unary(grpc_request, path, BytesCodec)
            .await
            .map_err(to_gax_error)?;
        let (metadata, body, _) = response.into_parts();
        let message = self.descriptor.decode_binary(body)?;
        Ok(RpcResponse {
            message,
            metadata: Metadata::from_header_map(&metadata.into_headers()),
        })
    }
}

fn make_channel(resolved: &ResolvedEndpoint, options: &ChannelOptions) -> BuilderResult<Channel> {
    use tonic::transport::{ClientTlsConfig, Endpoint, Identity};

    let mut endpoint =
        Endpoint::from_shared(resolved.uri.clone()).map_err(BuilderError::transport)?;
    if resolved.uri.starts_with("https://") {
        let mut tls = ClientTlsConfig::new().with_enabled_roots();
        if let Some(host) = resolved.host() {
            tls = tls.domain_name(host);
        }
        if let Some(pair) = &resolved.client_cert {
            tls = tls.identity(Identity::from_pem(&pair.cert_pem, &pair.key_pem));
        }
        endpoint = endpoint.tls_config(tls).map_err(BuilderError::transport)?;
    }
    if let Some(d) = options.connect_timeout {
        endpoint = endpoint.connect_timeout(d);
    }
    if let Some(d) = options.keepalive_interval {
        endpoint = endpoint
            .http2_keep_alive_interval(d)
            .keep_alive_while_idle(true);
    }
    if let Some(d) = options.keepalive_timeout {
        endpoint = endpoint.keep_alive_timeout(d);
    }
    Ok(endpoint.connect_lazy())
}

fn make_inner(channel: Channel, options: &ChannelOptions) -> InnerClient {
    let mut inner = tonic::client::Grpc::new(channel);
    if let Some(n) = options.max_send_message_size {
        inner = inner.max_encoding_message_size(n);
    }
    if let Some(n) = options.max_receive_message_size {
        inner = inner.max_decoding_message_size(n);
    }
    inner
}

/// A [Codec] for messages that are already serialized.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesCodec;

impl Codec for BytesCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = BytesCodec;
    type Decoder = BytesCodec;

    fn encoder(&mut self) -> Self::Encoder {
        *self
    }

    fn decoder(&mut self) -> Self::Decoder {
        *self
    }
}

impl Encoder for BytesCodec {
    type Item = Bytes;
    type Error = tonic::Status;

    fn encode(&mut self, item: Bytes, dst: &mut EncodeBuf<'_>) -> std::result::Result<(), Self::Error> {
        dst.put(item);
        Ok(())
    }
}

impl Decoder for BytesCodec {
    type Item = Bytes;
    type Error = tonic::Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> std::result::Result<Option<Bytes>, Self::Error> {
        Ok(Some(src.copy_to_bytes(src.remaining())))
    }
}
