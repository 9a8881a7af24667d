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

//! Typed interceptor hooks for the `DatasetService`.
//!
//! Implement [DatasetServiceHooks], overriding only the hooks you need, and
//! install it with [DatasetServiceInterceptor]:
//!
//! ```
//! # use aiplatform_v1beta1::client::DatasetService;
//! # use aiplatform_v1beta1::hooks::{DatasetServiceHooks, DatasetServiceInterceptor};
//! # use aiplatform_v1beta1::model::Dataset;
//! #[derive(Debug)]
//! struct Redact;
//! impl DatasetServiceHooks for Redact {
//!     fn post_get_dataset(&self, response: Dataset) -> Dataset {
//!         response.set_etag("")
//!     }
//! }
//! let builder = DatasetService::builder().with_interceptor(DatasetServiceInterceptor::new(Redact));
//! ```
//!
//! For each RPC the hooks run in this order: `pre_*` before the request is
//! sent, then `post_*` and `post_*_with_metadata` after a successful
//! response. All the hooks run once per attempt.

use crate::descriptors::{CREATE_DATASET, DELETE_DATASET, GET_DATASET, LIST_DATASETS};
use crate::model::*;
use gax::Result;
use gax::interceptor::{Interceptor, Next, RpcRequest, RpcResponse, apply_hooks};
use gax::metadata::Metadata;

/// Per-RPC hooks for the `DatasetService`.
///
/// Every hook defaults to the identity function.
pub trait DatasetServiceHooks: std::fmt::Debug + Send + Sync {
    fn pre_get_dataset(
        &self,
        request: GetDatasetRequest,
        metadata: Metadata,
    ) -> (GetDatasetRequest, Metadata) {
        (request, metadata)
    }

    fn post_get_dataset(&self, response: Dataset) -> Dataset {
        response
    }

    /// Runs after [post_get_dataset][DatasetServiceHooks::post_get_dataset],
    /// with the response metadata.
    fn post_get_dataset_with_metadata(
        &self,
        response: Dataset,
        metadata: Metadata,
    ) -> (Dataset, Metadata) {
        (response, metadata)
    }

    /// Runs before each page is requested.
    fn pre_list_datasets(
        &self,
        request: ListDatasetsRequest,
        metadata: Metadata,
    ) -> (ListDatasetsRequest, Metadata) {
        (request, metadata)
    }

    fn post_list_datasets(&self, response: ListDatasetsResponse) -> ListDatasetsResponse {
        response
    }

    fn post_list_datasets_with_metadata(
        &self,
        response: ListDatasetsResponse,
        metadata: Metadata,
    ) -> (ListDatasetsResponse, Metadata) {
        (response, metadata)
    }

    fn pre_create_dataset(
        &self,
        request: CreateDatasetRequest,
        metadata: Metadata,
    ) -> (CreateDatasetRequest, Metadata) {
        (request, metadata)
    }

    /// Receives the operation returned by the initial request, polling
    /// requests do not run this hook.
    fn post_create_dataset(&self, response: lro::Operation) -> lro::Operation {
        response
    }

    fn post_create_dataset_with_metadata(
        &self,
        response: lro::Operation,
        metadata: Metadata,
    ) -> (lro::Operation, Metadata) {
        (response, metadata)
    }

    fn pre_delete_dataset(
        &self,
        request: DeleteDatasetRequest,
        metadata: Metadata,
    ) -> (DeleteDatasetRequest, Metadata) {
        (request, metadata)
    }

    fn post_delete_dataset(&self, response: lro::Operation) -> lro::Operation {
        response
    }

    fn post_delete_dataset_with_metadata(
        &self,
        response: lro::Operation,
        metadata: Metadata,
    ) -> (lro::Operation, Metadata) {
        (response, metadata)
    }
}

/// Runs a [DatasetServiceHooks] implementation as part of the interceptor
/// chain.
///
/// Requests for other services pass through unchanged.
#[derive(Debug)]
pub struct DatasetServiceInterceptor<H> {
    hooks: H,
}

impl<H> DatasetServiceInterceptor<H>
where
    H: DatasetServiceHooks,
{
    pub fn new(hooks: H) -> Self {
        Self { hooks }
    }
}

#[async_trait::async_trait]
impl<H> Interceptor for DatasetServiceInterceptor<H>
where
    H: DatasetServiceHooks + 'static,
{
    async fn intercept(&self, request: RpcRequest, next: Next<'_>) -> Result<RpcResponse> {
        let h = &self.hooks;
        match request.method {
            GET_DATASET => {
                apply_hooks::<GetDatasetRequest, Dataset, _, _, _>(
                    request,
                    next,
                    |r, m| h.pre_get_dataset(r, m),
                    |r| h.post_get_dataset(r),
                    |r, m| h.post_get_dataset_with_metadata(r, m),
                )
                .await
            }
            LIST_DATASETS => {
                apply_hooks::<ListDatasetsRequest, ListDatasetsResponse, _, _, _>(
                    request,
                    next,
                    |r, m| h.pre_list_datasets(r, m),
                    |r| h.post_list_datasets(r),
                    |r, m| h.post_list_datasets_with_metadata(r, m),
                )
                .await
            }
            CREATE_DATASET => {
                apply_hooks::<CreateDatasetRequest, lro::Operation, _, _, _>(
                    request,
                    next,
                    |r, m| h.pre_create_dataset(r, m),
                    |r| h.post_create_dataset(r),
                    |r, m| h.post_create_dataset_with_metadata(r, m),
                )
                .await
            }
            DELETE_DATASET => {
                apply_hooks::<DeleteDatasetRequest, lro::Operation, _, _, _>(
                    request,
                    next,
                    |r, m| h.pre_delete_dataset(r, m),
                    |r| h.post_delete_dataset(r),
                    |r, m| h.post_delete_dataset_with_metadata(r, m),
                )
                .await
            }
            _ => next.run(request).await,
        }
    }
}
