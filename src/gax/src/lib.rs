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

//! Call policies, errors, and pagination for the Vertex AI Platform clients.
//!
//! This crate contains the types shared by every client and transport in the
//! Vertex AI Platform client runtime:
//!
//! - the [error] taxonomy and [Result] type,
//! - per-call [options], ordered call [metadata], and [response] wrappers,
//! - [retry], [retry_policy], [backoff_policy] and the polling policies,
//! - the [paginator] for List RPCs,
//! - the [interceptor] chain and typed RPC hooks,
//! - the [client_builder] and the injected [credentials] capability.
//!
//! Most applications use these types through a generated client, such as the
//! `aiplatform-v1beta1` crate.

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all functions wrapping RPCs.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

pub mod backoff_policy;
pub mod client_builder;
pub mod client_cert;
pub mod client_config;
pub mod credentials;
pub mod error;
pub mod exponential_backoff;
pub mod interceptor;
pub mod metadata;
pub mod options;
pub mod paginator;
pub mod polling_backoff_policy;
pub mod polling_error_policy;
pub mod response;
pub mod retry;
pub mod retry_policy;
pub mod retry_result;
pub mod retry_state;

#[doc(hidden)]
pub mod retry_loop_internal;
