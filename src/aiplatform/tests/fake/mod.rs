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

//! A scripted transport for the client tests.
//!
//! Each RPC pops the next scripted reply for its method. Every attempt is
//! recorded, with its request as JSON, its metadata, and the (virtual) time
//! it was made.

#![allow(dead_code)]

use aiplatform_v1beta1::client::DatasetService;
use futures::FutureExt;
use gax::error::Error;
use gax::error::rpc::{Code, Status};
use gax::interceptor::{RpcRequest, RpcResponse};
use gax::metadata::Metadata;
use gaxi::descriptor::EndpointDescriptor;
use gaxi::transport::{AttemptContext, Closer, Transport, TransportRegistry, UnaryCallable};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use wkt::message::Message;

pub const GET_DATASET: &str = "google.cloud.aiplatform.v1beta1.DatasetService/GetDataset";
pub const LIST_DATASETS: &str = "google.cloud.aiplatform.v1beta1.DatasetService/ListDatasets";
pub const CREATE_DATASET: &str = "google.cloud.aiplatform.v1beta1.DatasetService/CreateDataset";
pub const GET_OPERATION: &str = "google.longrunning.Operations/GetOperation";
pub const CANCEL_OPERATION: &str = "google.longrunning.Operations/CancelOperation";

#[derive(Clone, Debug)]
pub struct Call {
    pub method: &'static str,
    pub request: serde_json::Value,
    pub metadata: Metadata,
    pub context: AttemptContext,
    pub at: tokio::time::Instant,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    replies: HashMap<&'static str, VecDeque<gax::Result<RpcResponse>>>,
}

#[derive(Clone, Debug, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
    closer: Closer,
}

impl FakeTransport {
    /// Scripts the next reply for `method`.
    pub fn push<M: Message>(&self, method: &'static str, reply: gax::Result<M>) {
        let reply = reply.map(|m| RpcResponse {
            message: Box::new(m),
            metadata: Metadata::new().with_ascii("x-fake-server", "true"),
        });
        self.lock().replies.entry(method).or_default().push_back(reply);
    }

    pub fn push_ok<M: Message>(&self, method: &'static str, reply: M) {
        self.push(method, Ok(reply));
    }

    pub fn push_err(&self, method: &'static str, code: Code, message: &str) {
        self.push::<wkt::Empty>(method, Err(status(code, message)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.lock().calls.iter().map(|c| c.method).collect()
    }

    /// A registry containing only this transport.
    pub fn registry(&self) -> TransportRegistry {
        let transport = self.clone();
        TransportRegistry::empty().register("fake", move |_config, _service| {
            let transport = transport.clone();
            async move { Ok(Arc::new(transport) as Arc<dyn Transport>) }.boxed()
        })
    }

    pub async fn client(&self) -> anyhow::Result<DatasetService> {
        let client = DatasetService::builder_with_transports(self.registry())
            .build()
            .await?;
        Ok(client)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake transport state is not poisoned")
    }
}

impl Transport for FakeTransport {
    fn label(&self) -> &str {
        "fake"
    }

    fn callable(&self, _descriptor: &EndpointDescriptor) -> Arc<dyn UnaryCallable> {
        Arc::new(self.clone())
    }

    fn close(&self) {
        self.closer.close();
    }

    fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }
}

#[async_trait::async_trait]
impl UnaryCallable for FakeTransport {
    async fn call(&self, request: RpcRequest, context: &AttemptContext) -> gax::Result<RpcResponse> {
        let reply = {
            let mut state = self.lock();
            state.calls.push(Call {
                method: request.method,
                request: request.message.to_json().unwrap_or_default(),
                metadata: request.metadata,
                context: context.clone(),
                at: tokio::time::Instant::now(),
            });
            state
                .replies
                .get_mut(request.method)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err(status(Code::Unimplemented, "no scripted reply")))
        };
        self.closer.guard(async move { reply }).await
    }
}

pub fn status(code: Code, message: &str) -> Error {
    Error::service(Status::default().set_code(code).set_message(message))
}
