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

//! Maps request messages to HTTP requests.
//!
//! The REST transport sends each RPC as an HTTP request built from the
//! method's [HttpRule]. The request fields referenced by the URI template
//! become path segments, the field selected by the `body` of the rule (if
//! any) becomes the JSON payload, and any remaining fields become query
//! parameters.

use crate::descriptor::{HttpBody, HttpRule};
use crate::fields;
use crate::path_template::PathTemplateError;
use crate::query_parameter;
use gax::Result;
use gax::error::Error;
use serde_json::{Map, Value};

/// Requests JSON responses, with enums encoded as integers.
pub const ALT_PARAMETER: (&str, &str) = ("$alt", "json;enum-encoding=int");

/// The HTTP request for a single RPC.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequestParts {
    pub method: http::Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Builds the HTTP request for `request` using the first matching binding.
///
/// A binding matches if all its path variables are present in the request and
/// match their patterns. Returns a [binding][Error::binding] error if no
/// binding matches.
pub fn transcode(rule: &HttpRule, request: Value) -> Result<HttpRequestParts> {
    let mut failures = Vec::new();
    for binding in rule.bindings() {
        let template = binding.path_template()?;
        let lookup = |field: &str| {
            fields::lookup(&request, field)
                .and_then(fields::scalar)
                .filter(|v| !v.is_empty())
        };
        match template.expand(lookup) {
            Ok(path) => {
                let fields = template
                    .fields()
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                return Ok(assemble(binding, path, &fields, request));
            }
            Err(e @ PathTemplateError::MissingField(_))
            | Err(e @ PathTemplateError::Mismatch { .. }) => {
                failures.push((binding.uri_template.clone(), e));
            }
            Err(e) => return Err(Error::binding(e)),
        }
    }
    Err(Error::binding(NoMatchingBinding(failures)))
}

fn assemble(binding: &HttpRule, path: String, path_fields: &[String], mut request: Value) -> HttpRequestParts {
    for field in path_fields {
        let _ = fields::remove(&mut request, field);
    }
    let (body, rest) = match &binding.body {
        HttpBody::All => (Some(request), Map::new()),
        HttpBody::Field(name) => {
            let body = fields::remove(&mut request, name).unwrap_or_else(|| Value::Object(Map::new()));
            (Some(body), into_object(request))
        }
        HttpBody::None => (None, into_object(request)),
    };
    let mut query = query_parameter::from_object(rest);
    query.push((ALT_PARAMETER.0.to_string(), ALT_PARAMETER.1.to_string()));
    HttpRequestParts {
        method: binding.method.clone(),
        path,
        query,
        body,
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(o) => o,
        _ => Map::new(),
    }
}

#[derive(Debug)]
struct NoMatchingBinding(Vec<(String, PathTemplateError)>);

impl std::fmt::Display for NoMatchingBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "the request does not match any HTTP binding")?;
        for (template, error) in &self.0 {
            write!(f, "; {template}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for NoMatchingBinding {}
