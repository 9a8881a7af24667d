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

//! The `google.longrunning` messages.
//!
//! These are the messages used by every long-running operation: the
//! [Operation] handle returned by the initiating RPC, and the requests and
//! responses of the operations service.

use gax::paginator::PageableResponse;

/// A handle to a long-running operation.
///
/// The service returns this message from the initiating RPC, and from each
/// poll of the operations service. Once `done` is true exactly one of
/// `error` or `response` is set.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Operation {
    /// The server-assigned name, unique within the service that returned it.
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Service-specific progress information, such as the create time.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<wkt::Any>,

    /// If `true` the operation is completed and `result` is set.
    #[prost(bool, tag = "3")]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub done: bool,

    /// The operation outcome.
    #[prost(oneof = "operation::Result", tags = "4, 5")]
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub result: Option<operation::Result>,
}

/// Types nested in [Operation].
pub mod operation {
    /// The outcome of a completed operation.
    #[derive(Clone, PartialEq, prost::Oneof, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub enum Result {
        /// The error result of the operation in case of failure or
        /// cancellation.
        #[prost(message, tag = "4")]
        Error(wkt::Status),

        /// The normal response of the operation in case of success.
        #[prost(message, tag = "5")]
        Response(wkt::Any),
    }
}

impl Operation {
    /// Sets the value of [name][Operation::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value of [metadata][Operation::metadata].
    pub fn set_metadata<T: Into<wkt::Any>>(mut self, v: T) -> Self {
        self.metadata = Some(v.into());
        self
    }

    /// Sets the value of [done][Operation::done].
    pub fn set_done(mut self, v: bool) -> Self {
        self.done = v;
        self
    }

    /// Sets `result` to a successful response.
    pub fn set_response<T: Into<wkt::Any>>(mut self, v: T) -> Self {
        self.result = Some(operation::Result::Response(v.into()));
        self
    }

    /// Sets `result` to an error.
    pub fn set_error<T: Into<wkt::Status>>(mut self, v: T) -> Self {
        self.result = Some(operation::Result::Error(v.into()));
        self
    }

    /// The response, if the operation completed successfully.
    pub fn response(&self) -> Option<&wkt::Any> {
        match &self.result {
            Some(operation::Result::Response(r)) => Some(r),
            _ => None,
        }
    }

    /// The error, if the operation failed or was cancelled.
    pub fn error(&self) -> Option<&wkt::Status> {
        match &self.result {
            Some(operation::Result::Error(e)) => Some(e),
            _ => None,
        }
    }
}

impl wkt::message::Message for Operation {
    fn typename() -> &'static str {
        "type.googleapis.com/google.longrunning.Operation"
    }
}

/// The request message for `Operations.GetOperation`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetOperationRequest {
    /// The name of the operation resource.
    #[prost(string, tag = "1")]
    pub name: String,
}

impl GetOperationRequest {
    /// Sets the value of [name][GetOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

impl wkt::message::Message for GetOperationRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.longrunning.GetOperationRequest"
    }
}

/// The request message for `Operations.ListOperations`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListOperationsRequest {
    /// The name of the operation's parent resource.
    #[prost(string, tag = "4")]
    pub name: String,

    /// The standard list filter.
    #[prost(string, tag = "1")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,

    /// The standard list page size.
    #[prost(int32, tag = "2")]
    #[serde(skip_serializing_if = "is_default")]
    pub page_size: i32,

    /// The standard list page token.
    #[prost(string, tag = "3")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub page_token: String,
}

impl ListOperationsRequest {
    /// Sets the value of [name][ListOperationsRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value of [filter][ListOperationsRequest::filter].
    pub fn set_filter<T: Into<String>>(mut self, v: T) -> Self {
        self.filter = v.into();
        self
    }

    /// Sets the value of [page_size][ListOperationsRequest::page_size].
    pub fn set_page_size<T: Into<i32>>(mut self, v: T) -> Self {
        self.page_size = v.into();
        self
    }

    /// Sets the value of [page_token][ListOperationsRequest::page_token].
    pub fn set_page_token<T: Into<String>>(mut self, v: T) -> Self {
        self.page_token = v.into();
        self
    }
}

impl wkt::message::Message for ListOperationsRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.longrunning.ListOperationsRequest"
    }
}

/// The response message for `Operations.ListOperations`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListOperationsResponse {
    /// A list of operations that matches the filter in the request.
    #[prost(message, repeated, tag = "1")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<Operation>,

    /// The standard list next-page token.
    #[prost(string, tag = "2")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub next_page_token: String,

    /// Locations that could not be reached.
    #[prost(string, repeated, tag = "3")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreachable: Vec<String>,
}

impl ListOperationsResponse {
    /// Sets the value of [operations][ListOperationsResponse::operations].
    pub fn set_operations<T, V>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<Operation>,
    {
        self.operations = v.into_iter().map(|i| i.into()).collect();
        self
    }

    /// Sets the value of [next_page_token][ListOperationsResponse::next_page_token].
    pub fn set_next_page_token<T: Into<String>>(mut self, v: T) -> Self {
        self.next_page_token = v.into();
        self
    }
}

impl wkt::message::Message for ListOperationsResponse {
    fn typename() -> &'static str {
        "type.googleapis.com/google.longrunning.ListOperationsResponse"
    }
}

impl PageableResponse for ListOperationsResponse {
    type PageItem = Operation;

    fn items(self) -> Vec<Self::PageItem> {
        self.operations
    }

    fn next_page_token(&self) -> String {
        self.next_page_token.clone()
    }
}

/// The request message for `Operations.CancelOperation`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CancelOperationRequest {
    /// The name of the operation resource to be cancelled.
    #[prost(string, tag = "1")]
    pub name: String,
}

impl CancelOperationRequest {
    /// Sets the value of [name][CancelOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

impl wkt::message::Message for CancelOperationRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.longrunning.CancelOperationRequest"
    }
}

/// The request message for `Operations.DeleteOperation`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteOperationRequest {
    /// The name of the operation resource to be deleted.
    #[prost(string, tag = "1")]
    pub name: String,
}

impl DeleteOperationRequest {
    /// Sets the value of [name][DeleteOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

impl wkt::message::Message for DeleteOperationRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.longrunning.DeleteOperationRequest"
    }
}

/// The request message for `Operations.WaitOperation`.
#[derive(Clone, PartialEq, prost::Message, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaitOperationRequest {
    /// The name of the operation resource to wait on.
    #[prost(string, tag = "1")]
    pub name: String,

    /// The maximum duration to wait before timing out.
    #[prost(message, optional, tag = "2")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<wkt::Duration>,
}

impl WaitOperationRequest {
    /// Sets the value of [name][WaitOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value of [timeout][WaitOperationRequest::timeout].
    pub fn set_timeout<T: Into<wkt::Duration>>(mut self, v: T) -> Self {
        self.timeout = Some(v.into());
        self
    }
}

impl wkt::message::Message for WaitOperationRequest {
    fn typename() -> &'static str {
        "type.googleapis.com/google.longrunning.WaitOperationRequest"
    }
}

fn is_default<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}
