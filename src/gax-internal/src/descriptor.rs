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

//! Describes the methods of a service.
//!
//! Each generated client defines one [EndpointDescriptor] per RPC. The
//! descriptor contains everything the transports need to issue the call: the
//! fully qualified method name used by gRPC, the HTTP bindings used by REST,
//! the routing fields, the default idempotency, and how to decode responses.

use crate::path_template::PathTemplate;
use bytes::Bytes;
use gax::Result;
use gax::error::Error;
use wkt::message::{DynMessage, Message};

type DecodeBinary = fn(Bytes) -> Result<Box<dyn DynMessage>>;
type DecodeJson = fn(serde_json::Value) -> Result<Box<dyn DynMessage>>;

/// The kind of method, used in diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub enum MethodKind {
    Unary,
    /// A List RPC, the response contains `items_field` and a page token.
    Paged { items_field: &'static str },
    /// The response is a `google.longrunning.Operation`.
    LongRunning {
        response_type: &'static str,
        metadata_type: &'static str,
    },
}

impl MethodKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unary => "unary",
            Self::Paged { .. } => "paged",
            Self::LongRunning { .. } => "long-running",
        }
    }
}

/// Where the request body comes from in an HTTP binding.
#[derive(Clone, Debug, PartialEq)]
pub enum HttpBody {
    /// No body, all the fields not in the path are query parameters.
    None,
    /// The body is the request, minus any fields bound to the path.
    All,
    /// The body is the given (top-level) request field. The remaining fields
    /// not in the path are query parameters.
    Field(&'static str),
}

/// One HTTP binding for a method.
///
/// A binding may include additional bindings. The REST transport uses the
/// first binding whose path variables are all present in the request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRule {
    pub method: http::Method,
    pub uri_template: String,
    pub body: HttpBody,
    pub additional_bindings: Vec<HttpRule>,
}

impl HttpRule {
    pub fn new<T: Into<String>>(method: http::Method, uri_template: T) -> Self {
        Self {
            method,
            uri_template: uri_template.into(),
            body: HttpBody::None,
            additional_bindings: Vec::new(),
        }
    }

    pub fn get<T: Into<String>>(uri_template: T) -> Self {
        Self::new(http::Method::GET, uri_template)
    }

    pub fn post<T: Into<String>>(uri_template: T) -> Self {
        Self::new(http::Method::POST, uri_template)
    }

    pub fn patch<T: Into<String>>(uri_template: T) -> Self {
        Self::new(http::Method::PATCH, uri_template)
    }

    pub fn delete<T: Into<String>>(uri_template: T) -> Self {
        Self::new(http::Method::DELETE, uri_template)
    }

    pub fn with_body(mut self, body: HttpBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_additional_binding(mut self, rule: HttpRule) -> Self {
        self.additional_bindings.push(rule);
        self
    }

    /// The primary binding followed by any additional bindings.
    pub fn bindings(&self) -> impl Iterator<Item = &HttpRule> {
        std::iter::once(self).chain(self.additional_bindings.iter())
    }

    pub fn path_template(&self) -> Result<PathTemplate> {
        PathTemplate::parse(&self.uri_template).map_err(Error::binding)
    }
}

/// Describes a single RPC.
#[derive(Clone)]
pub struct EndpointDescriptor {
    /// The fully qualified method name, e.g.
    /// `google.cloud.aiplatform.v1beta1.DatasetService/GetDataset`.
    pub full_name: &'static str,
    pub request_type: &'static str,
    pub response_type: &'static str,
    pub kind: MethodKind,
    pub http: Option<HttpRule>,
    pub routing_fields: Vec<&'static str>,
    pub idempotent: bool,
    decode_binary: DecodeBinary,
    decode_json: DecodeJson,
}

impl EndpointDescriptor {
    /// Creates a descriptor for a method receiving `Req` and returning `Resp`.
    pub fn new<Req, Resp>(full_name: &'static str) -> Self
    where
        Req: Message,
        Resp: Message,
    {
        Self {
            full_name,
            request_type: Req::typename(),
            response_type: Resp::typename(),
            kind: MethodKind::Unary,
            http: None,
            routing_fields: Vec::new(),
            idempotent: false,
            decode_binary: decode_binary::<Resp>,
            decode_json: decode_json::<Resp>,
        }
    }

    pub fn with_kind(mut self, v: MethodKind) -> Self {
        self.kind = v;
        self
    }

    pub fn with_http(mut self, v: HttpRule) -> Self {
        self.http = Some(v);
        self
    }

    pub fn with_routing<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        self.routing_fields = fields.into_iter().collect();
        self
    }

    pub fn with_idempotency(mut self, v: bool) -> Self {
        self.idempotent = v;
        self
    }

    /// The service name, e.g. `google.cloud.aiplatform.v1beta1.DatasetService`.
    pub fn service(&self) -> &'static str {
        self.full_name
            .split_once('/')
            .map(|(s, _)| s)
            .unwrap_or(self.full_name)
    }

    /// The short method name, e.g. `GetDataset`.
    pub fn method(&self) -> &'static str {
        self.full_name
            .rsplit_once('/')
            .map(|(_, m)| m)
            .unwrap_or(self.full_name)
    }

    /// The gRPC request path, e.g. `/google.cloud.aiplatform.v1beta1.DatasetService/GetDataset`.
    pub fn grpc_path(&self) -> String {
        format!("/{}", self.full_name)
    }

    pub fn decode_binary(&self, bytes: Bytes) -> Result<Box<dyn DynMessage>> {
        (self.decode_binary)(bytes)
    }

    pub fn decode_json(&self, value: serde_json::Value) -> Result<Box<dyn DynMessage>> {
        (self.decode_json)(value)
    }
}

impl std::fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointDescriptor")
            .field("full_name", &self.full_name)
            .field("request_type", &self.request_type)
            .field("response_type", &self.response_type)
            .field("kind", &self.kind)
            .field("http", &self.http)
            .field("routing_fields", &self.routing_fields)
            .field("idempotent", &self.idempotent)
            .finish_non_exhaustive()
    }
}

fn decode_binary<T: Message>(bytes: Bytes) -> Result<Box<dyn DynMessage>> {
    let message = wkt::message::from_binary::<T>(bytes).map_err(Error::deser)?;
    Ok(Box::new(message))
}

fn decode_json<T: Message>(value: serde_json::Value) -> Result<Box<dyn DynMessage>> {
    let message = wkt::message::from_json::<T>(value).map_err(Error::deser)?;
    Ok(Box::new(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;
    use serde_json::json;
    use wkt::Duration;

    fn descriptor() -> EndpointDescriptor {
        EndpointDescriptor::new::<Duration, Duration>("test.v1.TestService/GetThing")
            .with_http(
                HttpRule::get("/v1/{name=things/*}")
                    .with_additional_binding(HttpRule::get("/v1/{name=others/*}")),
            )
            .with_routing(["name"])
            .with_idempotency(true)
    }

    #[test]
    fn names() {
        let d = descriptor();
        assert_eq!(d.service(), "test.v1.TestService");
        assert_eq!(d.method(), "GetThing");
        assert_eq!(d.grpc_path(), "/test.v1.TestService/GetThing");
        assert_eq!(d.request_type, Duration::typename());
        assert_eq!(d.kind.name(), "unary");
        assert!(d.idempotent);
        let fmt = format!("{d:?}");
        assert!(fmt.contains("GetThing"), "{fmt}");
    }

    #[test]
    fn bindings() -> anyhow::Result<()> {
        let d = descriptor();
        let http = d.http.as_ref().expect("descriptor has bindings");
        let templates: Vec<_> = http.bindings().map(|b| b.uri_template.as_str()).collect();
        assert_eq!(templates, vec!["/v1/{name=things/*}", "/v1/{name=others/*}"]);
        for b in http.bindings() {
            b.path_template()?;
        }
        let bad = HttpRule::get("/v1/{name");
        let got = bad.path_template();
        assert!(matches!(&got, Err(e) if e.is_binding()), "{got:?}");
        Ok(())
    }

    #[test]
    fn decode() -> anyhow::Result<()> {
        let d = descriptor();
        let want = Duration::clamp(5, 0);
        let got = d.decode_binary(want.encode_to_vec().into())?;
        assert_eq!(got.downcast_ref::<Duration>(), Some(&want));

        let got = d.decode_json(json!("5s"))?;
        assert_eq!(got.downcast_ref::<Duration>(), Some(&want));

        let got = d.decode_json(json!({"bad": 1}));
        assert!(matches!(&got, Err(e) if e.is_deserialization()), "{got:?}");
        Ok(())
    }
}
