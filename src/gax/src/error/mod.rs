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

//! The core error types used by the client runtime.
//!
//! The runtime distinguishes between errors detected before an RPC is sent
//! (e.g. conflicting request arguments, a closed transport), errors detected
//! while sending or receiving (e.g. a dropped connection, a timeout), and
//! errors returned by the service itself.
//!
//! All of them are reported as [Error]. Use [Error::code()] to classify any
//! error into the canonical [rpc::Code] taxonomy.

mod core_error;
pub use core_error::*;
mod credentials;
pub use credentials::*;

pub mod rpc;
