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

//! The `google.longrunning.Operations` sub-client.
//!
//! Services with long-running methods expose the operations mixin next to
//! their own methods, on the same endpoint. The gRPC paths are fixed, the HTTP
//! paths depend on the API version and on the resource collections that own
//! operations, e.g. `projects/*/locations/*`.

use crate::client::RpcClient;
use crate::descriptor::{EndpointDescriptor, HttpRule, MethodKind};
use gax::Result;
use gax::options::RequestOptions;
use gax::response::Response;
use lro::model::*;
use std::sync::Arc;

const GET: &str = "google.longrunning.Operations/GetOperation";
const LIST: &str = "google.longrunning.Operations/ListOperations";
const CANCEL: &str = "google.longrunning.Operations/CancelOperation";
const DELETE: &str = "google.longrunning.Operations/DeleteOperation";
const WAIT: &str = "google.longrunning.Operations/WaitOperation";

/// The descriptors for the five operations methods.
#[derive(Clone, Debug)]
pub struct OperationsBindings {
    pub get: EndpointDescriptor,
    pub list: EndpointDescriptor,
    pub cancel: EndpointDescriptor,
    pub delete: EndpointDescriptor,
    pub wait: EndpointDescriptor,
}

impl OperationsBindings {
    /// Creates the descriptors for a service.
    ///
    /// `version` is the first segment of every HTTP path, e.g. `v1beta1`.
    /// `collections` are the patterns of the resources owning operations. The
    /// first one becomes the primary HTTP binding, the rest become additional
    /// bindings. Without collections the methods are only available over gRPC.
    pub fn generate(version: &str, collections: &[&str]) -> Self {
        let item = |c: &str| format!("/{version}/{{name={c}/operations/*}}");
        let rules = |make: &dyn Fn(&str) -> HttpRule| -> Option<HttpRule> {
            let (first, rest) = collections.split_first()?;
            Some(
                rest.iter()
                    .fold(make(first), |rule, c| rule.with_additional_binding(make(c))),
            )
        };
        let with_rules = |d: EndpointDescriptor, rule: Option<HttpRule>| match rule {
            Some(r) => d.with_http(r),
            None => d,
        };

        let get = EndpointDescriptor::new::<GetOperationRequest, Operation>(GET)
            .with_routing(["name"])
            .with_idempotency(true);
        let list = EndpointDescriptor::new::<ListOperationsRequest, ListOperationsResponse>(LIST)
            .with_kind(MethodKind::Paged {
                items_field: "operations",
            })
            .with_routing(["name"])
            .with_idempotency(true);
        let cancel = EndpointDescriptor::new::<CancelOperationRequest, wkt::Empty>(CANCEL)
            .with_routing(["name"]);
        let delete = EndpointDescriptor::new::<DeleteOperationRequest, wkt::Empty>(DELETE)
            .with_routing(["name"])
            .with_idempotency(true);
        let wait = EndpointDescriptor::new::<WaitOperationRequest, Operation>(WAIT)
            .with_routing(["name"]);

        Self {
            get: with_rules(get, rules(&|c| HttpRule::get(item(c)))),
            list: with_rules(
                list,
                rules(&|c| HttpRule::get(format!("/{version}/{{name={c}}}/operations"))),
            ),
            cancel: with_rules(
                cancel,
                rules(&|c| HttpRule::post(format!("{}:cancel", item(c)))),
            ),
            delete: with_rules(delete, rules(&|c| HttpRule::delete(item(c)))),
            wait: with_rules(wait, rules(&|c| HttpRule::post(format!("{}:wait", item(c))))),
        }
    }
}

impl Default for OperationsBindings {
    /// Descriptors with no HTTP bindings.
    fn default() -> Self {
        Self::generate("v1", &[])
    }
}

/// Implements [lro::Operations] using the client's transport.
#[derive(Clone, Debug)]
pub struct OperationsClient {
    client: RpcClient,
    bindings: Arc<OperationsBindings>,
}

impl OperationsClient {
    pub fn new(client: RpcClient, bindings: Arc<OperationsBindings>) -> Self {
        Self { client, bindings }
    }
}

#[async_trait::async_trait]
impl lro::Operations for OperationsClient {
    async fn get_operation(
        &self,
        request: GetOperationRequest,
        options: RequestOptions,
    ) -> Result<Operation> {
        self.client
            .invoke(&self.bindings.get, request, options)
            .await
            .map(Response::into_body)
    }

    async fn list_operations(
        &self,
        request: ListOperationsRequest,
        options: RequestOptions,
    ) -> Result<ListOperationsResponse> {
        self.client
            .invoke(&self.bindings.list, request, options)
            .await
            .map(Response::into_body)
    }

    async fn cancel_operation(
        &self,
        request: CancelOperationRequest,
        options: RequestOptions,
    ) -> Result<()> {
        self.client
            .invoke::<_, wkt::Empty>(&self.bindings.cancel, request, options)
            .await
            .map(|_| ())
    }

    async fn delete_operation(
        &self,
        request: DeleteOperationRequest,
        options: RequestOptions,
    ) -> Result<()> {
        self.client
            .invoke::<_, wkt::Empty>(&self.bindings.delete, request, options)
            .await
            .map(|_| ())
    }

    async fn wait_operation(
        &self,
        request: WaitOperationRequest,
        options: RequestOptions,
    ) -> Result<Operation> {
        self.client
            .invoke(&self.bindings.wait, request, options)
            .await
            .map(Response::into_body)
    }
}
