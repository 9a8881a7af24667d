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

//! The REST transport.
//!
//! Each request is transcoded to an HTTP request using the method's
//! [HttpRule]. Payloads are JSON, enums are sent and received as integers.
//!
//! [HttpRule]: crate::descriptor::HttpRule

use crate::api_header::{API_CLIENT_HEADER, Protocol};
use crate::descriptor::EndpointDescriptor;
use crate::endpoint::{self, ResolvedEndpoint};
use crate::options::{self, ClientConfig, Credentials};
use crate::transcoding::transcode;
use crate::transport::{
    AttemptContext, CallableCache, Closer, REST, ServiceInfo, Transport, UnaryCallable,
};
use gax::Result;
use gax::client_builder::{Error as BuilderError, Result as BuilderResult};
use gax::client_config::ChannelOptions;
use gax::error::Error;
use gax::error::rpc::Status;
use gax::interceptor::{RpcRequest, RpcResponse};
use gax::metadata::Metadata;
use http::header::{HeaderName, HeaderValue, USER_AGENT};
use std::sync::Arc;

/// A [Transport] sending requests as HTTP/JSON, using [reqwest].
#[derive(Debug)]
pub struct RestTransport {
    shared: Arc<Shared>,
    cache: CallableCache,
}

#[derive(Debug)]
struct Shared {
    inner: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    scopes: Vec<String>,
    service: ServiceInfo,
    closer: Closer,
}

impl RestTransport {
    /// Creates a transport from the client configuration.
    pub async fn new(config: ClientConfig, service: ServiceInfo) -> BuilderResult<Self> {
        let resolved = endpoint::resolve(&config, service.default_endpoint).await?;
        let inner = make_client(&resolved, &config.channel_options)?;
        Ok(Self::from_parts(
            inner,
            resolved.uri,
            options::credentials(&config),
            options::scopes(&config),
            service,
        ))
    }

    /// Creates a transport over an existing HTTP client.
    ///
    /// `endpoint` is used as-is, requests carry no credentials.
    pub fn from_client<E: Into<String>>(
        client: reqwest::Client,
        endpoint: E,
        service: ServiceInfo,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self::from_parts(
            client,
            endpoint.trim_end_matches('/').to_string(),
            gax::credentials::anonymous(),
            Vec::new(),
            service,
        )
    }

    fn from_parts(
        inner: reqwest::Client,
        endpoint: String,
        credentials: Credentials,
        scopes: Vec<String>,
        service: ServiceInfo,
    ) -> Self {
        let shared = Shared {
            inner,
            endpoint,
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

impl Transport for RestTransport {
    fn label(&self) -> &str {
        REST
    }

    fn callable(&self, descriptor: &EndpointDescriptor) -> Arc<dyn UnaryCallable> {
        self.cache.get_or_insert_with(descriptor.full_name, || {
            Arc::new(RestCallable {
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
struct RestCallable {
    shared: Arc<Shared>,
    descriptor: EndpointDescriptor,
}

#[async_trait::async_trait]
impl UnaryCallable for RestCallable {
    async fn call(&self, request: RpcRequest, context: &AttemptContext) -> Result<RpcResponse> {
        self.shared
            .closer
            .guard(self.attempt(request, context))
            .await
    }
}

impl RestCallable {
    async fn attempt(&self, request: RpcRequest, context: &AttemptContext) -> Result<RpcResponse> {
        let shared = &self.shared;
        let rule = self.descriptor.http.as_ref().ok_or_else(|| {
            Error::binding(MissingHttpRule {
                method: self.descriptor.full_name,
            })
        })?;
        let json = request.message.to_json().map_err(Error::ser)?;
        let parts = transcode(rule, json)?;

        let url = format!("{}{}", shared.endpoint, parts.path);
        let mut builder = shared.inner.request(parts.method, url).query(&parts.query);

        let metadata = request.metadata.to_header_map().map_err(Error::ser)?;
        for (name, value) in metadata.iter() {
            builder = builder.header(name, value);
        }
        let auth = shared
            .credentials
            .headers(&shared.scopes)
            .await
            .map_err(Error::authentication)?;
        for (name, value) in auth.iter() {
            builder = builder.header(name, value);
        }
        let api_client = shared.service.api_client.header_value(Protocol::Rest);
        builder = builder.header(
            HeaderName::from_static(API_CLIENT_HEADER),
            HeaderValue::from_str(&api_client).map_err(Error::ser)?,
        );
        let user_agent = shared
            .service
            .api_client
            .user_agent(context.user_agent.as_deref());
        builder = builder.header(
            USER_AGENT,
            HeaderValue::from_str(&user_agent).map_err(Error::ser)?,
        );
        if let Some(body) = &parts.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = context.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        if !response.status().is_success() {
            return Err(to_http_error(response).await);
        }
        to_http_response(&self.descriptor, response).await
    }
}

fn make_client(
    resolved: &ResolvedEndpoint,
    options: &ChannelOptions,
) -> BuilderResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(pair) = &resolved.client_cert {
        let mut pem = pair.cert_pem.to_vec();
        pem.push(b'\n');
        pem.extend_from_slice(&pair.key_pem);
        let identity = reqwest::Identity::from_pem(&pem).map_err(BuilderError::mtls)?;
        builder = builder.identity(identity);
    }
    if let Some(d) = options.connect_timeout {
        builder = builder.connect_timeout(d);
    }
    if let Some(d) = options.keepalive_interval {
        builder = builder.tcp_keepalive(d);
    }
    builder.build().map_err(BuilderError::transport)
}

fn map_send_error(err: reqwest::Error) -> Error {
    match err {
        e if e.is_timeout() => Error::timeout(e),
        e => Error::io(e),
    }
}

/// Converts a failed HTTP response into an error.
///
/// Responses with a `google.rpc.Status` payload become service errors. Any
/// other payload is preserved as-is.
pub(crate) async fn to_http_error(response: reqwest::Response) -> Error {
    let status_code = response.status().as_u16();
    let metadata = Metadata::from_header_map(response.headers());
    let body = match response.bytes().await {
        Ok(b) => b,
        Err(e) => return Error::io(e),
    };
    match Status::try_from(&body) {
        Ok(status) => Error::service_with_metadata(status, Some(status_code), Some(metadata)),
        Err(_) => Error::http(status_code, metadata, body),
    }
}

async fn to_http_response(
    descriptor: &EndpointDescriptor,
    response: reqwest::Response,
) -> Result<RpcResponse> {
    // 204 No Content has no body, which is not valid JSON.
    let no_content = response.status() == reqwest::StatusCode::NO_CONTENT;
    let metadata = Metadata::from_header_map(response.headers());
    let body = response.bytes().await.map_err(Error::io)?;
    let value = match body {
        b if b.is_empty() && no_content => serde_json::Value::Object(Default::default()),
        b => serde_json::from_slice::<serde_json::Value>(&b).map_err(Error::deser)?,
    };
    let message = descriptor.decode_json(value)?;
    Ok(RpcResponse { message, metadata })
}

#[derive(Debug, thiserror::Error)]
#[error("the method {method} has no HTTP binding")]
struct MissingHttpRule {
    method: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::HttpRule;
    use crate::transport::tests::service_info;
    use gax::error::rpc::Code;
    use test_case::test_case;

    fn descriptor() -> EndpointDescriptor {
        EndpointDescriptor::new::<wkt::Empty, wkt::Empty>("google.test.v1.Test/Delete")
            .with_http(HttpRule::delete("/v1/{name=things/*}"))
    }

    fn response(code: u16, content: &str) -> anyhow::Result<reqwest::Response> {
        let response = http::Response::builder()
            .header("content-type", "application/json")
            .status(code)
            .body(content.to_string())?;
        Ok(response.into())
    }

    #[tokio::test]
    async fn http_error_bytes() -> anyhow::Result<()> {
        let err = to_http_error(response(400, r#"{"error": "bad request"}"#)?).await;
        assert_eq!(err.http_status_code(), Some(400));
        assert_eq!(err.code(), Code::InvalidArgument);
        assert!(err.status().is_none(), "{err:?}");
        let content_type = err
            .metadata()
            .and_then(|m| m.get("content-type"))
            .and_then(|v| v.as_str());
        assert_eq!(content_type, Some("application/json"));
        assert_eq!(
            err.http_payload(),
            Some(&bytes::Bytes::from_static(br#"{"error": "bad request"}"#))
        );
        Ok(())
    }

    #[tokio::test]
    async fn http_error_with_status() -> anyhow::Result<()> {
        let body = serde_json::json!({"error": {
            "code": 404,
            "message": "the thing is not there",
            "status": "NOT_FOUND",
        }});
        let err = to_http_error(response(404, &body.to_string())?).await;
        let status = err.status().expect("errors with a status payload are service errors");
        assert_eq!(status.code, Code::NotFound);
        assert_eq!(&status.message, "the thing is not there");
        assert_eq!(err.http_status_code(), Some(404));
        Ok(())
    }

    #[tokio::test]
    #[test_case(400, Code::InvalidArgument)]
    #[test_case(401, Code::Unauthenticated)]
    #[test_case(403, Code::PermissionDenied)]
    #[test_case(404, Code::NotFound)]
    #[test_case(409, Code::Aborted)]
    #[test_case(412, Code::FailedPrecondition)]
    #[test_case(416, Code::OutOfRange)]
    #[test_case(418, Code::FailedPrecondition)]
    #[test_case(429, Code::ResourceExhausted)]
    #[test_case(499, Code::Cancelled)]
    #[test_case(500, Code::Internal)]
    #[test_case(501, Code::Unimplemented)]
    #[test_case(502, Code::Internal)]
    #[test_case(503, Code::Unavailable)]
    #[test_case(504, Code::DeadlineExceeded)]
    async fn http_status_to_code(http: u16, want: Code) -> anyhow::Result<()> {
        let err = to_http_error(response(http, "not json")?).await;
        assert_eq!(err.code(), want, "{err:?}");
        Ok(())
    }

    #[tokio::test]
    #[test_case(200, "{}")]
    #[test_case(204, "{}")]
    #[test_case(204, "")]
    async fn empty_content(code: u16, content: &str) -> anyhow::Result<()> {
        let got = to_http_response(&descriptor(), response(code, content)?).await?;
        assert_eq!(
            got.message.downcast_ref::<wkt::Empty>(),
            Some(&wkt::Empty::default())
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_content_requires_no_content_status() -> anyhow::Result<()> {
        let got = to_http_response(&descriptor(), response(200, "")?).await;
        assert!(matches!(&got, Err(e) if e.is_deserialization()), "{got:?}");
        Ok(())
    }

    #[tokio::test]
    async fn missing_http_rule() -> anyhow::Result<()> {
        let transport =
            RestTransport::from_client(reqwest::Client::new(), "http://127.0.0.1:1", service_info());
        let descriptor =
            EndpointDescriptor::new::<wkt::Empty, wkt::Empty>("google.test.v1.Test/Grpc");
        let callable = transport.callable(&descriptor);
        let request = RpcRequest {
            method: descriptor.full_name,
            message: Box::new(wkt::Empty::default()),
            metadata: Metadata::new(),
        };
        let got = callable.call(request, &AttemptContext::default()).await;
        assert!(matches!(&got, Err(e) if e.is_binding()), "{got:?}");
        Ok(())
    }

    #[tokio::test]
    async fn closed() -> anyhow::Result<()> {
        let transport =
            RestTransport::from_client(reqwest::Client::new(), "http://127.0.0.1:1/", service_info());
        assert_eq!(transport.label(), REST);
        let callable = transport.callable(&descriptor());
        transport.close();
        assert!(transport.is_closed());
        let request = RpcRequest {
            method: descriptor().full_name,
            message: Box::new(wkt::Empty::default()),
            metadata: Metadata::new(),
        };
        let got = callable.call(request, &AttemptContext::default()).await;
        assert!(matches!(&got, Err(e) if e.is_closed()), "{got:?}");
        Ok(())
    }

    #[test]
    fn bad_client_certificate() {
        let resolved = ResolvedEndpoint {
            uri: "https://test.mtls.googleapis.com:443".into(),
            client_cert: Some(gax::client_cert::CertificateKeyPair {
                cert_pem: "not a certificate".into(),
                key_pem: "not a key".into(),
            }),
        };
        let got = make_client(&resolved, &ChannelOptions::default());
        assert!(matches!(&got, Err(e) if e.is_mutual_tls()), "{got:?}");
    }
}
