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

//! Long-running operation support for the Vertex AI client runtime.
//!
//! Methods that start long-running operations (LROs) return an
//! [OperationFuture]. The future can be polled once, awaited until
//! completion, cancelled, or turned into a stream of [PollingResult]s.
//!
//! The [Operations] trait is the operations sub-client each transport
//! provides. It is used by the futures to poll and cancel, and by
//! applications to manage operations by name.
//!
//! # Example
//! ```no_run
//! # use aiplatform_lro::OperationFuture;
//! # async fn sample(mut op: OperationFuture<wkt::Empty, wkt::Empty>) -> gax::Result<()> {
//! let deadline = std::time::Duration::from_secs(300);
//! match op.result(Some(deadline)).await {
//!     Ok(_) => println!("operation {} completed", op.name()),
//!     Err(e) => println!("operation {} failed or timed out: {e}", op.name()),
//! }
//! # Ok(()) }
//! ```

pub mod blocking;
pub mod clock;
mod future;
pub use future::*;
pub mod model;
pub use model::{
    CancelOperationRequest, DeleteOperationRequest, GetOperationRequest, ListOperationsRequest,
    ListOperationsResponse, Operation, WaitOperationRequest,
};
mod operations;
pub use operations::*;
