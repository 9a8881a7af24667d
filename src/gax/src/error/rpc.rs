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

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// An error returned by the service: a code, a message, and typed details.
///
/// Long-running operations that fail carry a `Status` in their `error`
/// field. The runtime surfaces it unchanged: the code, message, and details
/// sent by the service are exactly the ones the application observes.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Status {
    /// The status code.
    pub code: Code,

    /// The message sent by the service.
    pub message: String,

    /// Typed details, such as retry hints or field violations.
    pub details: Vec<wkt::Any>,
}

impl Status {
    /// Sets the value for [code][Status::code].
    pub fn set_code<T: Into<Code>>(mut self, v: T) -> Self {
        self.code = v.into();
        self
    }

    /// Sets the value for [message][Status::message].
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    /// Sets the value for [details][Status::details].
    pub fn set_details<T, I>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: Into<wkt::Any>,
    {
        self.details = v.into_iter().map(|v| v.into()).collect();
        self
    }
}

/// The canonical error codes shared by gRPC and REST APIs.
///
/// Services return the most specific code that applies. The REST transport
/// maps HTTP statuses to these codes with [Code::from_http_status].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Code {
    /// Not an error.
    Ok = 0,
    /// The call was cancelled, usually by the caller. HTTP 499.
    Cancelled = 1,
    /// An error with no better classification. HTTP 500.
    #[default]
    Unknown = 2,
    /// The request is malformed, regardless of the system state. HTTP 400.
    InvalidArgument = 3,
    /// The deadline expired before the call completed. HTTP 504.
    DeadlineExceeded = 4,
    /// The requested resource does not exist. HTTP 404.
    NotFound = 5,
    /// The resource the caller tried to create already exists. HTTP 409.
    AlreadyExists = 6,
    /// The caller lacks permission for this call. HTTP 403.
    PermissionDenied = 7,
    /// A quota or rate limit ran out. HTTP 429.
    ResourceExhausted = 8,
    /// The system is not in a state that allows this call. HTTP 400.
    FailedPrecondition = 9,
    /// The call was aborted, often by a concurrency conflict. HTTP 409.
    Aborted = 10,
    /// The call went past the valid range, e.g. reading past the end. HTTP 400.
    OutOfRange = 11,
    /// The service does not implement or enable this call. HTTP 501.
    Unimplemented = 12,
    /// An invariant in the service broke. HTTP 500.
    Internal = 13,
    /// The service is temporarily unreachable, retrying may help. HTTP 503.
    Unavailable = 14,
    /// Data was lost or corrupted beyond recovery. HTTP 500.
    DataLoss = 15,
    /// The request lacks valid credentials. HTTP 401.
    Unauthenticated = 16,
}

/// Every code with its canonical name, indexed by the numeric value.
const NAMES: [(Code, &str); 17] = [
    (Code::Ok, "OK"),
    (Code::Cancelled, "CANCELLED"),
    (Code::Unknown, "UNKNOWN"),
    (Code::InvalidArgument, "INVALID_ARGUMENT"),
    (Code::DeadlineExceeded, "DEADLINE_EXCEEDED"),
    (Code::NotFound, "NOT_FOUND"),
    (Code::AlreadyExists, "ALREADY_EXISTS"),
    (Code::PermissionDenied, "PERMISSION_DENIED"),
    (Code::ResourceExhausted, "RESOURCE_EXHAUSTED"),
    (Code::FailedPrecondition, "FAILED_PRECONDITION"),
    (Code::Aborted, "ABORTED"),
    (Code::OutOfRange, "OUT_OF_RANGE"),
    (Code::Unimplemented, "UNIMPLEMENTED"),
    (Code::Internal, "INTERNAL"),
    (Code::Unavailable, "UNAVAILABLE"),
    (Code::DataLoss, "DATA_LOSS"),
    (Code::Unauthenticated, "UNAUTHENTICATED"),
];

impl Code {
    /// The canonical name, as used in the `status` field of REST errors.
    pub fn name(&self) -> &str {
        NAMES[*self as usize].1
    }

    /// Maps an HTTP status code to the closest canonical code.
    ///
    /// REST responses that fail without a parseable `error` object are
    /// classified with this mapping.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax::error::rpc::Code;
    /// assert_eq!(Code::from_http_status(404), Code::NotFound);
    /// assert_eq!(Code::from_http_status(418), Code::FailedPrecondition);
    /// assert_eq!(Code::from_http_status(502), Code::Internal);
    /// ```
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200..=299 => Code::Ok,
            400 => Code::InvalidArgument,
            401 => Code::Unauthenticated,
            403 => Code::PermissionDenied,
            404 => Code::NotFound,
            409 => Code::Aborted,
            412 => Code::FailedPrecondition,
            416 => Code::OutOfRange,
            429 => Code::ResourceExhausted,
            499 => Code::Cancelled,
            501 => Code::Unimplemented,
            503 => Code::Unavailable,
            504 => Code::DeadlineExceeded,
            400..=499 => Code::FailedPrecondition,
            500..=599 => Code::Internal,
            _ => Code::Unknown,
        }
    }
}

/// Values outside the canonical range become [Code::Unknown].
impl From<i32> for Code {
    fn from(value: i32) -> Self {
        usize::try_from(value)
            .ok()
            .and_then(|i| NAMES.get(i))
            .map(|(code, _)| *code)
            .unwrap_or_default()
    }
}

impl From<Code> for i32 {
    fn from(value: Code) -> i32 {
        value as i32
    }
}

impl From<Code> for String {
    fn from(value: Code) -> String {
        value.name().to_string()
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&str> for Code {
    type Error = String;
    fn try_from(value: &str) -> std::result::Result<Code, Self::Error> {
        NAMES
            .iter()
            .find(|(_, name)| *name == value)
            .map(|(code, _)| *code)
            .ok_or_else(|| format!("unknown status code value {value}"))
    }
}

impl Serialize for Code {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Code::from)
    }
}

/// A helper class to deserialize wrapped Status messages.
#[derive(Clone, Debug, Deserialize)]
struct ErrorWrapper {
    error: WrapperStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct WrapperStatus {
    code: u16,
    message: String,
    status: Option<String>,
    details: Vec<wkt::Any>,
}

/// Parses the body of a failed REST response.
///
/// The REST envelope carries the HTTP status in `code` and the canonical
/// code name in `status`. The latter wins when present.
impl TryFrom<&bytes::Bytes> for Status {
    type Error = Error;

    fn try_from(value: &bytes::Bytes) -> Result<Self, Self::Error> {
        let wrapper = serde_json::from_slice::<ErrorWrapper>(value)
            .map(|w| w.error)
            .map_err(Error::deser)?;
        let code = match wrapper.status.as_deref().map(Code::try_from) {
            Some(Ok(code)) => code,
            Some(Err(_)) | None => Code::from_http_status(wrapper.code),
        };
        Ok(Status {
            code,
            message: wrapper.message,
            details: wrapper.details,
        })
    }
}

impl From<wkt::Status> for Status {
    fn from(value: wkt::Status) -> Self {
        Self {
            code: Code::from(value.code),
            message: value.message,
            details: value.details,
        }
    }
}

impl From<&wkt::Status> for Status {
    fn from(value: &wkt::Status) -> Self {
        Self::from(value.clone())
    }
}

impl From<Status> for wkt::Status {
    fn from(value: Status) -> Self {
        wkt::Status::default()
            .set_code(value.code)
            .set_message(value.message)
            .set_details(value.details)
    }
}
