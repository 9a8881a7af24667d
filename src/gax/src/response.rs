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

//! Response types.
//!
//! A response consists of a body and the metadata returned by the service:
//! the HTTP headers for REST calls, or the initial metadata for gRPC calls.
//!
//! # Example
//! ```
//! # use aiplatform_gax::response::{Parts, Response};
//! # use aiplatform_gax::metadata::Metadata;
//! let parts = Parts::new().set_metadata(Metadata::new().with_ascii("x-server", "test"));
//! let response = Response::from_parts(parts, "body".to_string());
//! assert!(response.metadata().contains_key("x-server"));
//! assert_eq!(response.body(), "body");
//! ```

use crate::metadata::Metadata;

/// Represents a service response.
///
/// Typically you get a response as the result of making a request. You may
/// also create responses directly when mocking clients in tests.
#[derive(Clone, Debug)]
pub struct Response<T> {
    parts: Parts,
    body: T,
}

impl<T> Response<T> {
    /// Creates a response from the body, with empty metadata.
    pub fn from(body: T) -> Self {
        Self {
            body,
            parts: Parts::default(),
        }
    }

    /// Creates a response from the given parts.
    pub fn from_parts(parts: Parts, body: T) -> Self {
        Self { parts, body }
    }

    /// Returns the response metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.parts.metadata
    }

    /// Returns a mutable reference to the response metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.parts.metadata
    }

    /// Returns the body.
    pub fn body(&self) -> &T {
        &self.body
    }

    /// Consumes the response returning the metadata and body.
    pub fn into_parts(self) -> (Parts, T) {
        (self.parts, self.body)
    }

    /// Consumes the response returning only its body.
    pub fn into_body(self) -> T {
        self.body
    }

    /// Transforms the body, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            parts: self.parts,
            body: f(self.body),
        }
    }
}

/// Component parts of a response.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct Parts {
    /// The response metadata.
    pub metadata: Metadata,
}

impl Parts {
    /// Create a new instance.
    pub fn new() -> Self {
        Parts::default()
    }

    /// Set the metadata.
    pub fn set_metadata<V: Into<Metadata>>(mut self, v: V) -> Self {
        self.metadata = v.into();
        self
    }
}
