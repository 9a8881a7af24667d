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

//! Tracing support for the RPC runtime.
//!
//! Every attempt runs inside an `rpc.attempt` span. When tracing is enabled
//! for a client, the [LoggingInterceptor] also emits `DEBUG` events with the
//! request and response payloads, rendered as JSON. Binary metadata values
//! (keys ending in `-bin`) are rendered as base64.
//!
//! All events and spans use the [TARGET] target, applications can filter
//! them with `aiplatform::rpc=debug`.

use crate::descriptor::EndpointDescriptor;
use gax::Result;
use gax::interceptor::{Interceptor, Next, RpcRequest, RpcResponse};
use gax::metadata::Metadata;
use tracing::{Span, field};
use wkt::message::DynMessage;

/// The tracing target for all the runtime events.
pub const TARGET: &str = "aiplatform::rpc";

// Span attribute keys.
pub const RPC_SYSTEM: &str = "rpc.system";
pub const RPC_SERVICE: &str = "rpc.service";
pub const RPC_METHOD: &str = "rpc.method";
pub const RPC_ATTEMPT: &str = "gcp.rpc.attempt";
pub const RPC_STATUS_CODE: &str = "rpc.status_code";

/// Creates the span for one attempt of an RPC.
///
/// `system` is the label of the transport, `attempt` starts at 1.
pub fn attempt_span(descriptor: &EndpointDescriptor, system: &str, attempt: u32) -> Span {
    tracing::info_span!(
        target: TARGET,
        "rpc.attempt",
        { RPC_SYSTEM } = system,
        { RPC_SERVICE } = descriptor.service(),
        { RPC_METHOD } = descriptor.method(),
        { RPC_ATTEMPT } = attempt,
        { RPC_STATUS_CODE } = field::Empty,
    )
}

/// Records the outcome of an attempt in its span.
pub fn record_attempt<T>(span: &Span, result: &Result<T>) {
    let code = match result {
        Ok(_) => gax::error::rpc::Code::Ok,
        Err(e) => e.code(),
    };
    span.record(RPC_STATUS_CODE, code.name());
}

/// Logs request and response payloads.
///
/// Installed as the outermost interceptor when tracing is enabled, so it
/// observes the request after all the metadata is composed.
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor;

#[async_trait::async_trait]
impl Interceptor for LoggingInterceptor {
    async fn intercept(&self, request: RpcRequest, next: Next<'_>) -> Result<RpcResponse> {
        if !tracing::enabled!(target: TARGET, tracing::Level::DEBUG) {
            return next.run(request).await;
        }
        let method = request.method;
        tracing::debug!(
            target: TARGET,
            method,
            payload = %render_message(request.message.as_ref()),
            metadata = %render_metadata(&request.metadata),
            "sending request"
        );
        let result = next.run(request).await;
        match &result {
            Ok(response) => tracing::debug!(
                target: TARGET,
                method,
                payload = %render_message(response.message.as_ref()),
                metadata = %render_metadata(&response.metadata),
                "received response"
            ),
            Err(e) => tracing::debug!(
                target: TARGET,
                method,
                code = %e.code(),
                error = %e,
                "request failed"
            ),
        }
        result
    }
}

/// Renders a message as JSON.
pub fn render_message(message: &dyn DynMessage) -> String {
    match message.to_json() {
        Ok(v) => v.to_string(),
        Err(e) => format!("<{} cannot be rendered: {e}>", message.message_type()),
    }
}

/// Renders metadata as a JSON array of `[key, value]` pairs.
pub fn render_metadata(metadata: &Metadata) -> String {
    serde_json::to_string(metadata).unwrap_or_else(|e| format!("<invalid metadata: {e}>"))
}
