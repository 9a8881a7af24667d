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

use crate::Any;

/// The wire representation of `google.rpc.Status`.
///
/// Services return this message in the `grpc-status-details-bin` trailer of
/// failed gRPC calls, in the `error` field of completed long-running
/// operations, and (with a slightly different envelope) in the body of
/// failed REST calls.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Status {
    /// The status code, which should be an enum value of `google.rpc.Code`.
    #[prost(int32, tag = "1")]
    #[serde(skip_serializing_if = "is_zero")]
    pub code: i32,

    /// A developer-facing error message.
    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// A list of messages that carry the error details.
    #[prost(message, repeated, tag = "3")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Any>,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

impl Status {
    /// Sets the value of [code][Status::code].
    pub fn set_code<T: Into<i32>>(mut self, v: T) -> Self {
        self.code = v.into();
        self
    }

    /// Sets the value of [message][Status::message].
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    /// Sets the value of [details][Status::details].
    pub fn set_details<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<Any>,
    {
        self.details = v.into_iter().map(|i| i.into()).collect();
        self
    }
}

impl crate::message::Message for Status {
    fn typename() -> &'static str {
        "type.googleapis.com/google.rpc.Status"
    }
}
