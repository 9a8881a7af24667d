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

//! Well-known types shared by the Vertex AI Platform client runtime.
//!
//! Every message in the client runtime supports two encodings: the protobuf
//! binary encoding used by the gRPC transport, and the JSON encoding used by
//! the REST transport. The [Message][message::Message] trait captures both.
//!
//! This crate also defines the handful of well-known messages the runtime
//! needs directly: [Any], [Duration], [Empty], and the wire form of
//! `google.rpc.Status`.

mod any;
pub use crate::any::*;
mod duration;
pub use crate::duration::*;
mod empty;
pub use crate::empty::*;
pub mod message;
mod status;
pub use crate::status::*;
