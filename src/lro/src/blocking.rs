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

//! Blocking wrappers for long-running operations.

use crate::future::{OperationFuture, OperationState};
use crate::model::Operation;
use gax::Result;
use std::sync::Arc;
use std::time::Duration;
use wkt::message::Message;

/// A blocking handle to a long-running operation.
///
/// Each method runs the corresponding [OperationFuture] method to completion
/// on the runtime shared with the blocking client that created the handle.
#[derive(Debug)]
pub struct BlockingOperationFuture<R, M> {
    runtime: Arc<tokio::runtime::Runtime>,
    inner: OperationFuture<R, M>,
}

impl<R, M> BlockingOperationFuture<R, M>
where
    R: Message,
    M: Message,
{
    pub fn new(runtime: Arc<tokio::runtime::Runtime>, inner: OperationFuture<R, M>) -> Self {
        Self { runtime, inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn operation(&self) -> &Operation {
        self.inner.operation()
    }

    pub fn done(&self) -> bool {
        self.inner.done()
    }

    pub fn state(&self) -> OperationState {
        self.inner.state()
    }

    pub fn metadata(&self) -> Result<Option<M>> {
        self.inner.metadata()
    }

    pub fn poll(&mut self) -> Result<bool> {
        self.runtime.block_on(self.inner.poll())
    }

    /// Blocks until the operation completes or `deadline` elapses.
    pub fn result(&mut self, deadline: Option<Duration>) -> Result<R> {
        self.runtime.block_on(self.inner.result(deadline))
    }

    pub fn cancel(&self) -> Result<()> {
        self.runtime.block_on(self.inner.cancel())
    }

    /// Returns the asynchronous handle.
    pub fn into_async(self) -> OperationFuture<R, M> {
        self.inner
    }
}
