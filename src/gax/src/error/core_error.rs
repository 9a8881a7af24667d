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

use super::CredentialsError;
use super::rpc::{Code, Status};
use crate::metadata::Metadata;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by all client libraries.
///
/// The client libraries report errors from multiple sources. For example, the
/// service may return an error, the transport may be unable to create the
/// necessary connection to make a request, the request may timeout before a
/// response is received, the retry policy may be exhausted, or the library may
/// reject the request because the application provided conflicting inputs.
///
/// Most applications will just return the error or log it, without any further
/// action. Applications that need to react to specific failures can use
/// [code()][Error::code] to classify any error into the canonical taxonomy,
/// or the predicates and accessors to query the error details.
///
/// # Example
/// ```
/// use aiplatform_gax::error::Error;
/// use aiplatform_gax::error::rpc::Code;
/// match example_function() {
///     Err(e) if e.code() == Code::NotFound => { println!("not found {e}"); },
///     Err(e) if e.is_timeout() => { println!("not enough time {e}"); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # use aiplatform_gax::error::rpc::Status;
///     # Err(Error::service(Status::default().set_code(Code::NotFound).set_message("NOT FOUND")))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error with the information returned by the service.
    ///
    /// # Example
    /// ```
    /// use aiplatform_gax::error::Error;
    /// use aiplatform_gax::error::rpc::{Code, Status};
    /// let status = Status::default().set_code(Code::NotFound).set_message("NOT FOUND");
    /// let error = Error::service(status.clone());
    /// assert_eq!(error.status(), Some(&status));
    /// assert_eq!(error.code(), Code::NotFound);
    /// ```
    pub fn service(status: Status) -> Self {
        Self::service_with_metadata(status, None, None)
    }

    /// Creates a service error including the transport metadata.
    pub fn service_with_metadata(
        status: Status,
        status_code: Option<u16>,
        metadata: Option<Metadata>,
    ) -> Self {
        let details = ServiceDetails {
            status_code,
            metadata,
            status,
        };
        Self {
            kind: ErrorKind::Service(Box::new(details)),
            source: None,
        }
    }

    /// Creates an error representing a timeout.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use aiplatform_gax::error::{Error, rpc::Code};
    /// let error = Error::timeout("simulated timeout");
    /// assert!(error.is_timeout());
    /// assert_eq!(error.code(), Code::DeadlineExceeded);
    /// assert!(error.source().is_some());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            source: Some(source.into()),
        }
    }

    /// The request could not be completed before its deadline.
    ///
    /// This is always a client-side generated error. Note that the request may
    /// or may not have started, and it may or may not complete in the service.
    ///
    /// # Troubleshooting
    ///
    /// The most common cause of this problem is setting a timeout value that is
    /// based on the observed latency when the service is not under load.
    /// Consider increasing the timeout value to handle temporary latency
    /// increases too.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Creates an error representing an exhausted policy.
    ///
    /// The source is typically the last error observed by the retry loop.
    pub fn exhausted<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Exhausted,
            source: Some(source.into()),
        }
    }

    /// The request could not complete before the retry policy expired.
    ///
    /// This is always a client-side generated error, but it may be the result
    /// of multiple errors received from the service. The last such error is
    /// available via [source()][std::error::Error::source].
    ///
    /// # Troubleshooting
    ///
    /// The most common cause of this problem is a transient problem that lasts
    /// longer than your retry policy. If your application can tolerate longer
    /// recovery times then extend the retry policy.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind, ErrorKind::Exhausted)
    }

    /// Creates an error representing a deserialization problem.
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            source: Some(source.into()),
        }
    }

    /// The response could not be deserialized.
    ///
    /// # Troubleshooting
    ///
    /// The most common cause for deserialization problems are bugs in the
    /// client library and (rarely) bugs in the service. A long-running
    /// operation that completes with a result of an unexpected type is also
    /// reported with this error.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Creates an error representing a serialization problem.
    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Serialization,
            source: Some(source.into()),
        }
    }

    /// The request could not be serialized.
    ///
    /// This is always a client-side generated error, generated before the
    /// request is made. This error is never transient.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Serialization)
    }

    /// Cannot find a valid HTTP binding to make the request.
    ///
    /// This indicates the request is missing required parameters, or the
    /// required parameters do not have a valid format.
    pub fn binding<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Binding,
            source: Some(source.into()),
        }
    }

    /// If true, the request was missing required parameters or the parameters
    /// did not match any of the expected formats.
    ///
    /// # Troubleshooting
    ///
    /// Typically this indicates a problem in the application. A field used in
    /// the request URL was not initialized or does not match the resource
    /// name format expected by the RPC.
    pub fn is_binding(&self) -> bool {
        matches!(&self.kind, ErrorKind::Binding)
    }

    /// Creates an error representing invalid arguments detected before any
    /// network I/O.
    ///
    /// # Example
    /// ```
    /// use aiplatform_gax::error::{Error, rpc::Code};
    /// let error = Error::invalid_argument("request and flattened fields are mutually exclusive");
    /// assert!(error.is_invalid_argument());
    /// assert_eq!(error.code(), Code::InvalidArgument);
    /// ```
    pub fn invalid_argument<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::InvalidArgument,
            source: Some(source.into()),
        }
    }

    /// The application provided arguments that cannot be used together, or a
    /// malformed resource name.
    ///
    /// # Troubleshooting
    ///
    /// The most common cause is calling an RPC with both a request object and
    /// one or more flattened field setters. Use one or the other.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(&self.kind, ErrorKind::InvalidArgument)
    }

    /// Cannot create the authentication headers.
    pub fn authentication(source: CredentialsError) -> Self {
        Self {
            kind: ErrorKind::Authentication,
            source: Some(source.into()),
        }
    }

    /// Could not create the authentication headers before sending the request.
    ///
    /// # Troubleshooting
    ///
    /// Typically this indicates a misconfigured authentication environment for
    /// your application.
    pub fn is_authentication(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication)
    }

    /// Creates an error representing a call cancelled by the application.
    pub fn cancelled<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            source: Some(source.into()),
        }
    }

    /// The application cancelled the call before it completed.
    ///
    /// Note that long-running operations cancelled on the service side are
    /// reported as service errors with [Code::Cancelled]. Use
    /// [code()][Error::code] to detect both.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Creates an error representing a call on a closed transport.
    pub fn closed<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Closed,
            source: Some(source.into()),
        }
    }

    /// The transport was closed before or during the call.
    pub fn is_closed(&self) -> bool {
        matches!(self.kind, ErrorKind::Closed)
    }

    /// Creates an error representing a failure to load the client
    /// certificate used for mutual TLS.
    pub fn mtls<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::MutualTls,
            source: Some(source.into()),
        }
    }

    /// The client certificate source failed while creating the channel.
    ///
    /// # Troubleshooting
    ///
    /// Verify the certificate provider configured for your environment
    /// produces a PEM encoded certificate and private key.
    pub fn is_mtls(&self) -> bool {
        matches!(self.kind, ErrorKind::MutualTls)
    }

    /// A problem reported by the transport layer.
    pub fn http(status_code: u16, metadata: Metadata, payload: bytes::Bytes) -> Self {
        let details = TransportDetails {
            status_code: Some(status_code),
            metadata: Some(metadata),
            payload: Some(payload),
        };
        let kind = ErrorKind::Transport(Box::new(details));
        Self { kind, source: None }
    }

    /// A problem in the transport layer without a full HTTP response.
    ///
    /// Examples include: a broken connection after the request is sent, or a
    /// connection refused by the server.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        let details = TransportDetails {
            status_code: None,
            metadata: None,
            payload: None,
        };
        Self {
            kind: ErrorKind::Transport(Box::new(details)),
            source: Some(source.into()),
        }
    }

    /// A problem in the transport layer without a full response.
    ///
    /// # Troubleshooting
    ///
    /// This indicates a problem completing the request. Most often, the
    /// solution is to use the right retry policy.
    pub fn is_io(&self) -> bool {
        matches!(
        &self.kind,
        ErrorKind::Transport(d) if matches!(**d, TransportDetails {
            status_code: None,
            metadata: None,
            payload: None,
        }))
    }

    /// A problem reported by the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(&self.kind, ErrorKind::Transport { .. })
    }

    #[doc(hidden)]
    pub fn other<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Other,
            source: Some(source.into()),
        }
    }

    /// The [Status] payload associated with this error.
    ///
    /// Services return a detailed `Status` message including a numeric code
    /// for the error type, a human-readable message, and a sequence of details.
    pub fn status(&self) -> Option<&Status> {
        match &self.kind {
            ErrorKind::Service(d) => Some(&d.as_ref().status),
            _ => None,
        }
    }

    /// The HTTP status code, if any, associated with this error.
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Transport(d) => d.as_ref().status_code,
            ErrorKind::Service(d) => d.as_ref().status_code,
            _ => None,
        }
    }

    /// The response metadata (HTTP headers or gRPC trailers), if any.
    pub fn metadata(&self) -> Option<&Metadata> {
        match &self.kind {
            ErrorKind::Transport(d) => d.as_ref().metadata.as_ref(),
            ErrorKind::Service(d) => d.as_ref().metadata.as_ref(),
            _ => None,
        }
    }

    /// The payload, if any, associated with this error.
    pub fn http_payload(&self) -> Option<&bytes::Bytes> {
        match &self.kind {
            ErrorKind::Transport(d) => d.payload.as_ref(),
            _ => None,
        }
    }

    /// Classifies the error into the canonical [Code] taxonomy.
    ///
    /// Errors generated by the client library map to the code that best
    /// describes them: timeouts and exhausted retry budgets are
    /// `DEADLINE_EXCEEDED`, conflicting arguments are `INVALID_ARGUMENT`,
    /// transport failures and closed transports are `UNAVAILABLE`.
    ///
    /// # Example
    /// ```
    /// use aiplatform_gax::error::{Error, rpc::Code};
    /// assert_eq!(Error::io("connection reset").code(), Code::Unavailable);
    /// assert_eq!(Error::exhausted("out of time").code(), Code::DeadlineExceeded);
    /// assert_eq!(Error::cancelled("by the application").code(), Code::Cancelled);
    /// ```
    pub fn code(&self) -> Code {
        match &self.kind {
            ErrorKind::Service(d) => d.status.code,
            ErrorKind::Timeout | ErrorKind::Exhausted => Code::DeadlineExceeded,
            ErrorKind::Binding | ErrorKind::Serialization | ErrorKind::InvalidArgument => {
                Code::InvalidArgument
            }
            ErrorKind::Deserialization => Code::Internal,
            ErrorKind::Authentication => Code::Unauthenticated,
            ErrorKind::Cancelled => Code::Cancelled,
            ErrorKind::Closed | ErrorKind::MutualTls => Code::Unavailable,
            ErrorKind::Transport(d) => d
                .status_code
                .map(Code::from_http_status)
                .unwrap_or(Code::Unavailable),
            ErrorKind::Other => Code::Unknown,
        }
    }

    /// The error was generated before the RPC started and is transient.
    pub(crate) fn is_transient_and_before_rpc(&self) -> bool {
        if !matches!(&self.kind, ErrorKind::Authentication) {
            return false;
        }
        self.source
            .as_ref()
            .and_then(|e| e.downcast_ref::<CredentialsError>())
            .map(|e| e.is_transient())
            .unwrap_or(false)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Binding, Some(e)) => {
                write!(f, "cannot find a matching binding to send the request {e}")
            }
            (ErrorKind::Serialization, Some(e)) => write!(f, "cannot serialize the request {e}"),
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the response {e}")
            }
            (ErrorKind::InvalidArgument, Some(e)) => write!(f, "invalid argument: {e}"),
            (ErrorKind::Authentication, Some(e)) => {
                write!(f, "cannot create the authentication headers {e}")
            }
            (ErrorKind::Timeout, Some(e)) => {
                write!(f, "the request exceeded the request deadline {e}")
            }
            (ErrorKind::Exhausted, Some(e)) => write!(f, "the retry policy is exhausted: {e}"),
            (ErrorKind::Cancelled, Some(e)) => write!(f, "the call was cancelled: {e}"),
            (ErrorKind::Closed, Some(e)) => write!(f, "the transport is closed: {e}"),
            (ErrorKind::MutualTls, Some(e)) => {
                write!(f, "cannot configure the mutual TLS channel: {e}")
            }
            (ErrorKind::Transport(details), _) => details.display(self.source(), f),
            (ErrorKind::Service(d), _) => {
                write!(
                    f,
                    "the service reports an error with code {} described as: {}",
                    d.status.code, d.status.message
                )
            }
            (ErrorKind::Other, Some(e)) => {
                write!(f, "an unclassified problem making a request: {e}")
            }
            (_, None) => write!(f, "{:?}", self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error))
    }
}

/// The type of error held by an [Error] instance.
#[derive(Debug)]
enum ErrorKind {
    Binding,
    Serialization,
    Deserialization,
    InvalidArgument,
    Authentication,
    Timeout,
    Exhausted,
    Cancelled,
    Closed,
    MutualTls,
    Transport(Box<TransportDetails>),
    Service(Box<ServiceDetails>),
    /// A uncategorized error.
    Other,
}

#[derive(Debug)]
struct TransportDetails {
    status_code: Option<u16>,
    metadata: Option<Metadata>,
    payload: Option<bytes::Bytes>,
}

impl TransportDetails {
    fn display(
        &self,
        source: Option<&(dyn StdError + 'static)>,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match (source, &self) {
            (
                _,
                TransportDetails {
                    status_code: Some(code),
                    payload: Some(p),
                    ..
                },
            ) => {
                if let Ok(message) = std::str::from_utf8(p.as_ref()) {
                    write!(f, "the HTTP transport reports a [{code}] error: {message}")
                } else {
                    write!(f, "the HTTP transport reports a [{code}] error: {p:?}")
                }
            }
            (Some(source), _) => {
                write!(f, "the transport reports an error: {source}")
            }
            (None, _) => write!(f, "the transport reports an unknown error"),
        }
    }
}

#[derive(Debug)]
struct ServiceDetails {
    status_code: Option<u16>,
    metadata: Option<Metadata>,
    status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use test_case::test_case;

    #[test]
    fn service() {
        let status = Status::default()
            .set_code(Code::NotFound)
            .set_message("NOT FOUND");
        let error = Error::service(status.clone());
        assert!(error.source().is_none(), "{error:?}");
        assert_eq!(error.status(), Some(&status));
        assert_eq!(error.code(), Code::NotFound);
        assert!(error.to_string().contains("NOT FOUND"), "{error}");
        assert!(error.to_string().contains(Code::NotFound.name()), "{error}");
        assert!(!error.is_transient_and_before_rpc(), "{error:?}");
    }

    #[test]
    fn service_with_metadata() {
        let status = Status::default().set_code(Code::Unavailable);
        let metadata = Metadata::new().with_ascii("x-test", "value");
        let error = Error::service_with_metadata(status, Some(503), Some(metadata.clone()));
        assert_eq!(error.http_status_code(), Some(503));
        assert_eq!(error.metadata(), Some(&metadata));
        assert_eq!(error.code(), Code::Unavailable);
    }

    #[test]
    fn timeout() {
        let error = Error::timeout("simulated");
        assert!(error.is_timeout(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
        assert!(error.to_string().contains("simulated"), "{error}");
        assert!(error.metadata().is_none(), "{error:?}");
        assert!(error.http_status_code().is_none(), "{error:?}");
        assert!(error.http_payload().is_none(), "{error:?}");
        assert!(error.status().is_none(), "{error:?}");
    }

    #[test]
    fn exhausted() {
        let inner = Error::service(Status::default().set_code(Code::Unavailable));
        let error = Error::exhausted(inner);
        assert!(error.is_exhausted(), "{error:?}");
        let got = error.source().and_then(|e| e.downcast_ref::<Error>());
        assert!(
            matches!(got, Some(e) if e.code() == Code::Unavailable),
            "{error:?}"
        );
        assert_eq!(error.code(), Code::DeadlineExceeded);
    }

    #[test]
    fn http() {
        let metadata = Metadata::new().with_ascii("content-type", "text/plain");
        let error = Error::http(404, metadata.clone(), bytes::Bytes::from_static(b"NOT FOUND"));
        assert!(error.is_transport(), "{error:?}");
        assert!(!error.is_io(), "{error:?}");
        assert_eq!(error.http_status_code(), Some(404));
        assert_eq!(error.metadata(), Some(&metadata));
        assert_eq!(
            error.http_payload(),
            Some(&bytes::Bytes::from_static(b"NOT FOUND"))
        );
        assert_eq!(error.code(), Code::NotFound);
        assert!(error.to_string().contains("NOT FOUND"), "{error}");
    }

    #[test]
    fn io() {
        let error = Error::io("connection reset");
        assert!(error.is_io(), "{error:?}");
        assert!(error.is_transport(), "{error:?}");
        assert_eq!(error.code(), Code::Unavailable);
        assert!(error.to_string().contains("connection reset"), "{error}");
    }

    #[test]
    fn authentication() {
        let error = Error::authentication(CredentialsError::from_msg(true, "try again"));
        assert!(error.is_authentication(), "{error:?}");
        assert!(error.is_transient_and_before_rpc(), "{error:?}");
        assert_eq!(error.code(), Code::Unauthenticated);

        let error = Error::authentication(CredentialsError::from_msg(false, "bad file"));
        assert!(!error.is_transient_and_before_rpc(), "{error:?}");
    }

    #[test_case(Error::binding("missing name"), Code::InvalidArgument)]
    #[test_case(Error::ser("bad enum"), Code::InvalidArgument)]
    #[test_case(Error::invalid_argument("conflict"), Code::InvalidArgument)]
    #[test_case(Error::deser("bad json"), Code::Internal)]
    #[test_case(Error::cancelled("by caller"), Code::Cancelled)]
    #[test_case(Error::closed("closed"), Code::Unavailable)]
    #[test_case(Error::mtls("no cert"), Code::Unavailable)]
    #[test_case(Error::other("what"), Code::Unknown)]
    fn codes(error: Error, want: Code) {
        assert_eq!(error.code(), want, "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
        assert!(!error.to_string().is_empty(), "{error:?}");
    }

    #[test]
    fn predicates() {
        assert!(Error::cancelled("x").is_cancelled());
        assert!(Error::closed("x").is_closed());
        assert!(Error::mtls("x").is_mtls());
        assert!(Error::binding("x").is_binding());
        assert!(Error::ser("x").is_serialization());
        assert!(Error::deser("x").is_deserialization());
        assert!(Error::invalid_argument("x").is_invalid_argument());
    }
}
