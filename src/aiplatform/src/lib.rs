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

//! Google Cloud Client Libraries for Rust - Vertex AI Platform API (v1beta1)
//!
//! **WARNING:** this crate is under active development. We expect multiple
//! breaking changes in the upcoming releases. Testing is also incomplete, we do
//! **not** recommend that you use this crate in production. We welcome feedback
//! about the APIs, documentation, missing features, bugs, etc.
//!
//! This crate contains traits, types, and functions to interact with the
//! [Vertex AI] dataset service.
//!
//! The main types to work with this crate are the clients:
//!
//! * [DatasetService](client::DatasetService)
//! * [blocking::DatasetService] for applications that do not use `async`
//!
//! [Vertex AI]: https://cloud.google.com/vertex-ai

pub use gax::Result;
pub use gax::error::Error;

/// The long-running operation types returned by this client library.
pub use lro::{OperationFuture, OperationState, PollingResult};

pub mod blocking;
pub mod builder;
pub mod client;
pub mod hooks;
pub mod model;
pub mod resources;

pub(crate) mod descriptors;

const DEFAULT_HOST: &str = "https://aiplatform.googleapis.com";

mod info {
    use gaxi::api_header::{GAPIC, XGoogApiClient};
    use gaxi::transport::ServiceInfo;

    const NAME: &str = env!("CARGO_PKG_NAME");
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub(crate) const SERVICE: ServiceInfo = ServiceInfo {
        default_endpoint: super::DEFAULT_HOST,
        api_client: XGoogApiClient {
            name: NAME,
            version: VERSION,
            library_type: GAPIC,
        },
    };
}
