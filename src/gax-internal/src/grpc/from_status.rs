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

//! Maps `tonic::Status` values into the client error taxonomy.

use gax::error::Error;
use gax::error::rpc::{Code, Status};
use gax::metadata::Metadata;
use prost::Message;
use std::error::Error as _;

/// How a failed gRPC call is reported to the caller.
#[derive(Debug, PartialEq)]
enum Failure {
    /// The attempt ran out of time in the transport.
    Timeout,
    /// No usable response came back, e.g. the connection failed.
    Io,
    /// The peer answered, but not with gRPC.
    NotGrpc,
    /// The service returned a status.
    Service,
}

fn classify(status: &tonic::Status) -> Failure {
    if has_source::<tonic::TimeoutExpired>(status) {
        return Failure::Timeout;
    }
    if has_source::<tonic::ConnectError>(status) || has_source::<tonic::transport::Error>(status)
    {
        return Failure::Io;
    }
    match status.metadata().get("content-type") {
        Some(v) if !v.as_bytes().starts_with(b"application/grpc") => Failure::NotGrpc,
        _ => Failure::Service,
    }
}

// Walks the `source()` chain, up to a fixed depth.
fn has_source<T>(status: &tonic::Status) -> bool
where
    T: std::error::Error + 'static,
{
    let mut source = status.source();
    for _ in 0..16 {
        match source {
            Some(e) if e.is::<T>() => return true,
            Some(e) => source = e.source(),
            None => return false,
        }
    }
    false
}

/// The status carried by a gRPC error.
///
/// The details travel in the `grpc-status-details-bin` trailer as an encoded
/// `google.rpc.Status`. Code and message always come from the gRPC status
/// itself.
fn service_status(status: &tonic::Status) -> Status {
    let details = wkt::Status::decode(status.details()).unwrap_or_default();
    Status::from(details)
        .set_code(Code::from(status.code() as i32))
        .set_message(status.message())
}

/// Converts a failed gRPC call into an [Error].
pub fn to_gax_error(status: tonic::Status) -> Error {
    match classify(&status) {
        Failure::Timeout => Error::timeout(status),
        Failure::Io => Error::io(status),
        Failure::NotGrpc => Error::io(NotGrpcResponse(status)),
        Failure::Service => {
            let metadata = Metadata::from_header_map(&status.metadata().clone().into_headers());
            Error::service_with_metadata(service_status(&status), None, Some(metadata))
        }
    }
}

/// The endpoint answered with something other than gRPC.
///
/// This usually means the endpoint is wrong, or does not serve this API over
/// gRPC.
#[derive(Debug, thiserror::Error)]
#[error("the response content-type is not application/grpc, check the endpoint serves this API over gRPC")]
struct NotGrpcResponse(#[source] tonic::Status);
