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

//! Implementation details for the Vertex AI Platform clients.
//!
//! All the types, traits, and functions defined in this crate are **not**
//! intended for general use. This crate will remain unstable for the
//! foreseeable future, the generated clients and this crate change together.
//!
//! The crate contains the transport contract and its gRPC and REST
//! implementations, the HTTP/JSON transcoding used by REST, and the call
//! policy layer shared by all the methods of a generated client.

pub mod api_header;
pub mod client;
pub mod descriptor;
pub mod endpoint;
pub mod grpc;
pub mod observability;
pub mod operations;
pub mod options;
pub mod path_template;
pub mod query_parameter;
pub mod rest;
pub mod routing_parameter;
pub mod transcoding;
pub mod transport;

pub(crate) mod fields;
